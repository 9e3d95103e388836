//! Outbound Notifications
//!
//! Composes the plain-text messages the site sends on RFQ and form
//! activity. Actual delivery is an external collaborator; this module
//! hands finished messages to the log-backed outbox so a mail relay can
//! pick them up.

use dynforms::FieldValue;
use tracing::info;

use crate::config::Config;
use crate::models::{RfqRequest, RfqStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

#[derive(Clone)]
pub struct Notifier {
    site_name: String,
    from_email: String,
    admin_email: Option<String>,
}

impl Notifier {
    pub fn new(config: &Config) -> Self {
        Self {
            site_name: config.site_name.clone(),
            from_email: config.from_email.clone(),
            admin_email: config.admin_email.clone(),
        }
    }

    fn dispatch(&self, mail: OutboundEmail) {
        info!(
            to = mail.to.as_str(),
            subject = mail.subject.as_str(),
            "queued outbound email"
        );
    }

    /// Confirmation to the customer when a new RFQ arrives.
    pub fn rfq_received(&self, rfq: &RfqRequest) {
        let mail = self.compose_rfq_received(rfq);
        self.dispatch(mail);
    }

    pub fn compose_rfq_received(&self, rfq: &RfqRequest) -> OutboundEmail {
        let body = [
            format!("Hello {},", rfq.name),
            String::new(),
            format!(
                "Thank you for submitting a request for quotation with {}.",
                self.site_name
            ),
            format!("Your Request ID: {}", rfq.id),
            String::new(),
            "We have received your request and our team will review it shortly.".to_string(),
            "You will receive an email update once we have prepared a quotation for you."
                .to_string(),
        ]
        .join("\n");

        OutboundEmail {
            to: rfq.email.clone(),
            from: self.from_email.clone(),
            subject: "We have received your request for quotation".to_string(),
            body,
        }
    }

    /// Alert to the configured admin address, if any.
    pub fn rfq_admin_alert(&self, rfq: &RfqRequest, product_name: Option<&str>) {
        if let Some(mail) = self.compose_rfq_admin_alert(rfq, product_name) {
            self.dispatch(mail);
        }
    }

    pub fn compose_rfq_admin_alert(
        &self,
        rfq: &RfqRequest,
        product_name: Option<&str>,
    ) -> Option<OutboundEmail> {
        let admin_email = self.admin_email.as_ref()?;
        let body = [
            "New Request for Quotation received".to_string(),
            String::new(),
            format!("Customer: {}", rfq.name),
            format!("Email: {}", rfq.email),
            format!("Phone: {}", rfq.phone),
            format!("Company: {}", or_na(&rfq.company)),
            format!("Subject: {}", or_na(&rfq.subject)),
            format!("Quantity: {}", rfq.quantity),
            format!("Product: {}", product_name.unwrap_or("General Inquiry")),
            String::new(),
            "Message/Requirements:".to_string(),
            rfq.message.clone(),
        ]
        .join("\n");

        Some(OutboundEmail {
            to: admin_email.clone(),
            from: self.from_email.clone(),
            subject: format!("New RFQ Request #{} from {}", rfq.id, rfq.name),
            body,
        })
    }

    /// Update to the customer when the quotation status changes.
    pub fn rfq_status_changed(&self, rfq: &RfqRequest) {
        let mail = self.compose_rfq_status_changed(rfq);
        self.dispatch(mail);
    }

    pub fn compose_rfq_status_changed(&self, rfq: &RfqRequest) -> OutboundEmail {
        let mut lines = vec![
            format!("Hello {},", rfq.name),
            String::new(),
            format!(
                "We have updated the status of your quotation request (ID: {}).",
                rfq.id
            ),
            format!("New status: {}", rfq.status.label()),
        ];
        if !rfq.admin_notes.is_empty() {
            lines.push(String::new());
            lines.push("Notes from our team:".to_string());
            lines.push(rfq.admin_notes.clone());
        }

        OutboundEmail {
            to: rfq.email.clone(),
            from: self.from_email.clone(),
            subject: format!("Your quotation status changed to {}", rfq.status.label()),
            body: lines.join("\n"),
        }
    }

    /// Copy of a dynamic-form submission to its configured recipient.
    pub fn form_submission(&self, to: &str, form_title: &str, values: &[FieldValue]) {
        let mail = self.compose_form_submission(to, form_title, values);
        self.dispatch(mail);
    }

    pub fn compose_form_submission(
        &self,
        to: &str,
        form_title: &str,
        values: &[FieldValue],
    ) -> OutboundEmail {
        let mut lines = vec![
            format!("Form: {}", form_title),
            String::new(),
            "Submitted Data:".to_string(),
            "-".repeat(50),
        ];
        for value in values {
            lines.push(format!("{}: {}", value.label, value.value));
        }

        OutboundEmail {
            to: to.to_string(),
            from: self.from_email.clone(),
            subject: format!("New Form Submission: {}", form_title),
            body: lines.join("\n"),
        }
    }
}

fn or_na(value: &str) -> &str {
    if value.is_empty() { "N/A" } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier(admin: Option<&str>) -> Notifier {
        Notifier {
            site_name: "Storefront".to_string(),
            from_email: "noreply@storefront.local".to_string(),
            admin_email: admin.map(str::to_string),
        }
    }

    fn rfq() -> RfqRequest {
        RfqRequest {
            id: 7,
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            phone: "+15550001".to_string(),
            company: String::new(),
            address: String::new(),
            subject: "Bulk order".to_string(),
            message: "Need 40 units".to_string(),
            quantity: 40,
            product_id: None,
            status: RfqStatus::Quoted,
            admin_notes: "Quoted at list price".to_string(),
            created_at: "2025-02-01 10:00:00".to_string(),
            updated_at: "2025-02-02 09:00:00".to_string(),
        }
    }

    #[test]
    fn test_rfq_confirmation_addresses_customer() {
        let mail = notifier(None).compose_rfq_received(&rfq());
        assert_eq!(mail.to, "dana@example.com");
        assert!(mail.body.contains("Hello Dana,"));
        assert!(mail.body.contains("Your Request ID: 7"));
    }

    #[test]
    fn test_admin_alert_requires_configured_address() {
        assert!(notifier(None)
            .compose_rfq_admin_alert(&rfq(), None)
            .is_none());

        let mail = notifier(Some("sales@example.com"))
            .compose_rfq_admin_alert(&rfq(), Some("Solar Kit"))
            .unwrap();
        assert_eq!(mail.to, "sales@example.com");
        assert!(mail.body.contains("Product: Solar Kit"));
        assert!(mail.body.contains("Company: N/A"));
    }

    #[test]
    fn test_status_change_includes_notes() {
        let mail = notifier(None).compose_rfq_status_changed(&rfq());
        assert!(mail.subject.contains("Quoted"));
        assert!(mail.body.contains("Quoted at list price"));
    }

    #[test]
    fn test_form_submission_lists_values() {
        let values = vec![
            FieldValue {
                label: "Name".to_string(),
                value: "Dana".to_string(),
            },
            FieldValue {
                label: "Email".to_string(),
                value: "dana@example.com".to_string(),
            },
        ];
        let mail = notifier(None).compose_form_submission("ops@example.com", "Survey", &values);
        assert!(mail.body.contains("Name: Dana"));
        assert!(mail.body.contains("Email: dana@example.com"));
    }
}
