use crate::domain::notification::TemplateData;
use crate::domain::payment::PaymentRecord;
use crate::gateways::{GatewayOrder, GatewayPayment};

/// Maps the gateway's payment and order into the stored record. Amount goes
/// from minor to major units; `created_at` is the gateway's payment time.
pub fn build(payment: &GatewayPayment, order: &GatewayOrder) -> PaymentRecord {
    let notes = &order.notes;
    PaymentRecord {
        payment_id: payment.id.clone(),
        order_id: order.id.clone(),
        amount: payment.amount as f64 / 100.0,
        email: notes.email.clone(),
        phone: notes.phone.clone(),
        first_name: notes.first_name.clone(),
        last_name: notes.last_name.clone(),
        company_name: notes.company_name.clone(),
        gst_number: notes.gst_number.clone(),
        description: notes.description.clone(),
        paid_for: notes.paid_for.clone(),
        utm_source: notes.utm_source.clone(),
        utm_medium: notes.utm_medium.clone(),
        utm_campaign: notes.utm_campaign.clone(),
        created_at: payment.created_at,
    }
}

pub fn template_data(record: &PaymentRecord) -> TemplateData {
    TemplateData {
        name: record.display_name(),
        amount: record.amount,
        paid_for: record.paid_for.clone(),
        transaction_id: record.payment_id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::OrderNotes;
    use chrono::TimeZone;

    fn payment(amount: i64) -> GatewayPayment {
        GatewayPayment {
            id: "pay_1".to_string(),
            order_id: Some("order_1".to_string()),
            amount,
            currency: "INR".to_string(),
            status: Some("captured".to_string()),
            method: Some("upi".to_string()),
            created_at: chrono::Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    fn order(notes: OrderNotes) -> GatewayOrder {
        GatewayOrder {
            id: "order_1".to_string(),
            amount: 825900,
            currency: "INR".to_string(),
            receipt: None,
            status: Some("paid".to_string()),
            notes,
        }
    }

    #[test]
    fn converts_minor_units() {
        let record = build(&payment(825900), &order(OrderNotes::default()));
        assert_eq!(record.amount, 8259.0);
        assert_eq!(build(&payment(49950), &order(OrderNotes::default())).amount, 499.5);
    }

    #[test]
    fn created_at_comes_from_gateway() {
        let record = build(&payment(100), &order(OrderNotes::default()));
        assert_eq!(record.created_at.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn missing_notes_are_none() {
        let record = build(&payment(100), &order(OrderNotes::default()));
        assert_eq!(record.phone, None);
        assert_eq!(record.utm_campaign, None);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["gst_number"].is_null());
    }

    #[test]
    fn copies_notes_and_is_deterministic() {
        let notes = OrderNotes {
            email: Some("asha@example.com".to_string()),
            phone: Some("9876543210".to_string()),
            first_name: Some("Asha".to_string()),
            paid_for: Some("Core Membership".to_string()),
            utm_source: Some("instagram".to_string()),
            ..OrderNotes::default()
        };
        let a = build(&payment(100), &order(notes.clone()));
        let b = build(&payment(100), &order(notes));
        assert_eq!(a, b);
        assert_eq!(a.email.as_deref(), Some("asha@example.com"));
        assert_eq!(a.utm_source.as_deref(), Some("instagram"));
        assert_eq!(template_data(&a).name, "Asha");
    }
}
