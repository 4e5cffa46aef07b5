mod support;

use bizcivitas_payments::domain::notification::{Channel, TemplateData};
use bizcivitas_payments::messaging::mock::MockSender;
use bizcivitas_payments::service::notification_dispatcher::{DispatchError, DispatchSummary, NotificationDispatcher};
use std::sync::Arc;

fn dispatcher(sender: &MockSender) -> NotificationDispatcher {
    NotificationDispatcher {
        sender: Arc::new(sender.clone()),
        contact: support::contact(),
        default_country_code: "91".to_string(),
    }
}

fn data(paid_for: &str) -> TemplateData {
    TemplateData {
        name: "Asha Rao".to_string(),
        amount: 8259.0,
        paid_for: Some(paid_for.to_string()),
        transaction_id: "pay_1".to_string(),
    }
}

#[tokio::test]
async fn primary_success_sends_one_composite_message() {
    let sender = MockSender::new();
    let delivery = dispatcher(&sender)
        .dispatch(Some("98765 43210"), &data("Core Membership"), Channel::Whatsapp)
        .await
        .unwrap();

    assert_eq!(delivery.channel_used, Channel::Whatsapp);
    assert!(!delivery.fallback_used);
    let messages = sender.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].to, "+919876543210");
    assert!(messages[0].body.contains("Your membership includes"));
    assert!(messages[0].body.contains("info@bizcivitas.com"));
}

#[tokio::test]
async fn fallback_uses_the_other_channel_whichever_is_preferred() {
    for preferred in [Channel::Whatsapp, Channel::Sms] {
        let sender = MockSender::failing_on(&[preferred]);
        let delivery = dispatcher(&sender)
            .dispatch(Some("9876543210"), &data("Core Membership"), preferred)
            .await
            .unwrap();

        assert_eq!(delivery.channel_used, preferred.other());
        assert!(delivery.fallback_used);
        let summary = DispatchSummary::from(&Ok(delivery));
        assert!(summary.success);
        assert_eq!(summary.channel_used, Some(preferred.other()));
    }
}

#[tokio::test]
async fn exactly_one_fallback_attempt_when_everything_fails() {
    let sender = MockSender::failing_on(&[Channel::Whatsapp, Channel::Sms]);
    let result = dispatcher(&sender)
        .dispatch(Some("9876543210"), &data("Core Membership"), Channel::Whatsapp)
        .await;

    match &result {
        Err(DispatchError::AllChannelsFailed {
            primary_channel,
            fallback_channel,
            ..
        }) => {
            assert_eq!(*primary_channel, Channel::Whatsapp);
            assert_eq!(*fallback_channel, Channel::Sms);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(sender.messages().len(), 2);

    let summary = DispatchSummary::from(&result);
    assert!(!summary.success);
    assert!(summary.error.unwrap().contains("unavailable"));
}

#[tokio::test]
async fn absent_or_blank_phone_is_skipped() {
    let sender = MockSender::new();
    let d = dispatcher(&sender);

    for phone in [None, Some(""), Some("   ")] {
        let result = d.dispatch(phone, &data("Core Membership"), Channel::Whatsapp).await;
        assert_eq!(result, Err(DispatchError::NoRecipient));
    }
    assert!(sender.messages().is_empty());
}

#[tokio::test]
async fn unnormalizable_phone_is_still_attempted_as_entered() {
    let sender = MockSender::failing_on(&[Channel::Whatsapp]);
    let delivery = dispatcher(&sender)
        .dispatch(Some(" 12345 "), &data("Core Membership"), Channel::Whatsapp)
        .await
        .unwrap();

    assert_eq!(delivery.channel_used, Channel::Sms);
    assert!(delivery.fallback_used);
    let messages = sender.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.to == "12345"));
    assert_eq!(messages[0].channel, Channel::Whatsapp);
}

#[tokio::test]
async fn national_numbers_use_the_configured_country_code() {
    let sender = MockSender::new();
    let d = NotificationDispatcher {
        default_country_code: "1".to_string(),
        ..dispatcher(&sender)
    };
    d.dispatch(Some("415 555 0100"), &data("Core Membership"), Channel::Sms)
        .await
        .unwrap();
    assert_eq!(sender.messages()[0].to, "+14155550100");
}

#[tokio::test]
async fn event_wording_is_case_insensitive() {
    let sender = MockSender::new();
    dispatcher(&sender)
        .dispatch(Some("9876543210"), &data("Annual Gala EvEnT"), Channel::Sms)
        .await
        .unwrap();
    let body = &sender.messages()[0].body;
    assert!(body.contains("Make the most of the event"));
    assert!(!body.contains("Your membership includes"));
}
