use crate::domain::notification::{ContactInfo, TemplateData};

pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("₹{:.0}", amount)
    } else {
        format!("₹{:.2}", amount)
    }
}

fn benefits_section() -> &'static str {
    "Your membership includes:\n\
     • Access to weekly business networking meetups\n\
     • Member-only referral exchange\n\
     • Listing in the BizCivitas member directory\n\
     • Invitations to masterclasses and community events"
}

fn networking_tips_section() -> &'static str {
    "Make the most of the event:\n\
     • Bring business cards and a 30-second introduction\n\
     • Arrive early to meet the host chapter\n\
     • Follow up with new connections within 48 hours"
}

fn contact_section(contact: &ContactInfo) -> String {
    format!(
        "Questions? Reach us at {} or {}.",
        contact.email, contact.phone
    )
}

/// Full welcome message sent over the primary channel. Benefits are listed
/// for memberships, networking tips for events.
pub fn composite_message(data: &TemplateData, contact: &ContactInfo) -> String {
    let paid_for = data.paid_for.as_deref().unwrap_or("BizCivitas");
    let mut sections = vec![format!(
        "Hi {}, thank you for your payment of {} for {}.\nTransaction ID: {}",
        data.name,
        format_amount(data.amount),
        paid_for,
        data.transaction_id
    )];

    if data.is_event() {
        sections.push(networking_tips_section().to_string());
    } else {
        sections.push(benefits_section().to_string());
    }
    sections.push(contact_section(contact));
    sections.push("- Team BizCivitas".to_string());

    sections.join("\n\n")
}

/// Short confirmation used when the primary channel fails.
pub fn confirmation_message(data: &TemplateData) -> String {
    let paid_for = data
        .paid_for
        .as_deref()
        .map(|p| format!(" for {}", p))
        .unwrap_or_default();
    format!(
        "Payment confirmation: Hi {}, we received {}{}. Transaction ID: {}. - BizCivitas",
        data.name,
        format_amount(data.amount),
        paid_for,
        data.transaction_id
    )
}
