use crate::domain::payment::PaymentRecord;
use anyhow::Result;
use sqlx::PgPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A row with this `payment_id` already existed; nothing was written.
    Duplicate,
}

#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert(&self, record: &PaymentRecord) -> Result<InsertOutcome>;

    /// Marks the payment's notification as taken. Returns `false` when an
    /// earlier request already claimed it.
    async fn claim_notification(&self, payment_id: &str) -> Result<bool>;

    async fn ping(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct PaymentsRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl PaymentStore for PaymentsRepo {
    async fn insert(&self, data: &PaymentRecord) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (
                payment_id, order_id, amount, email, phone, first_name, last_name,
                company_name, gst_number, description, paid_for,
                utm_source, utm_medium, utm_campaign, created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                $8, $9, $10, $11,
                $12, $13, $14, $15
            )
            ON CONFLICT (payment_id) DO NOTHING
            "#,
        )
        .bind(&data.payment_id)
        .bind(&data.order_id)
        .bind(data.amount)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.company_name)
        .bind(&data.gst_number)
        .bind(&data.description)
        .bind(&data.paid_for)
        .bind(&data.utm_source)
        .bind(&data.utm_medium)
        .bind(&data.utm_campaign)
        .bind(data.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Duplicate)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn claim_notification(&self, payment_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET notification_claimed_at = now()
            WHERE payment_id = $1 AND notification_claimed_at IS NULL
            "#,
        )
        .bind(payment_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
