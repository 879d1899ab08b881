//! Template rendering for delivered notifications.
//!
//! Every message leaves the system as a named template plus positional
//! parameters, never as free-form text. OTP codes pass through verbatim
//! (that is the product); everything else is masked or truncated before
//! it becomes a parameter.

use sealpost_proto::MessageCategory;

use crate::text;

/// Placeholder when an OTP message matched but no code could be pulled
/// out of it.
const MISSING_CODE: &str = "******";

/// Template names registered with the delivery provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCatalog {
    /// OTP relay template: `[sender, code]`.
    pub otp: String,
    /// Transaction alert template: `[label, sender, masked summary]`.
    pub transaction: String,
    /// Bill reminder template: `[sender, masked summary]`.
    pub bill: String,
    /// Security alert template: `[sender, summary]`.
    pub security: String,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self {
            otp: "otp_notification".to_string(),
            transaction: "transaction_alert".to_string(),
            bill: "bill_notification".to_string(),
            security: "security_alert".to_string(),
        }
    }
}

/// One renderable outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMessage {
    /// Provider-side template name.
    pub template: String,
    /// Positional template parameters, in order.
    pub params: Vec<String>,
}

impl TemplateCatalog {
    /// Render the outbound message for a classified body.
    ///
    /// Unknown messages ride the OTP relay template with a truncated
    /// summary, so nothing classified gets silently dropped.
    #[must_use]
    pub fn render(&self, category: MessageCategory, sender: &str, body: &str) -> TemplateMessage {
        match category {
            MessageCategory::Otp => {
                let code = text::first_digit_run(body, 4, 8)
                    .unwrap_or_else(|| MISSING_CODE.to_string());
                TemplateMessage {
                    template: self.otp.clone(),
                    params: vec![sender.to_string(), code],
                }
            },
            MessageCategory::Transaction => TemplateMessage {
                template: self.transaction.clone(),
                params: vec![
                    transaction_label(body).to_string(),
                    sender.to_string(),
                    text::mask_sensitive(body),
                ],
            },
            MessageCategory::Bill => TemplateMessage {
                template: self.bill.clone(),
                params: vec![sender.to_string(), text::mask_sensitive(body)],
            },
            MessageCategory::SecurityAlert => TemplateMessage {
                template: self.security.clone(),
                params: vec![sender.to_string(), text::truncate_summary(body)],
            },
            MessageCategory::Unknown => TemplateMessage {
                template: self.otp.clone(),
                params: vec![sender.to_string(), text::truncate_summary(body)],
            },
        }
    }
}

/// Direction label for transaction alerts.
fn transaction_label(body: &str) -> &'static str {
    let lower = body.to_lowercase();
    if lower.contains("debit") || lower.contains("withdraw") {
        "Debit Alert"
    } else if lower.contains("credit") || lower.contains("deposit") {
        "Credit Alert"
    } else {
        "Transaction Alert"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_passes_code_verbatim() {
        let catalog = TemplateCatalog::default();
        let msg = catalog.render(MessageCategory::Otp, "BANK-ALERT", "Your OTP is 482913");
        assert_eq!(msg.template, "otp_notification");
        assert_eq!(msg.params, vec!["BANK-ALERT".to_string(), "482913".to_string()]);
    }

    #[test]
    fn otp_without_extractable_code_uses_placeholder() {
        let catalog = TemplateCatalog::default();
        let msg = catalog.render(MessageCategory::Otp, "BANK", "Your code was sent separately");
        assert_eq!(msg.params[1], MISSING_CODE);
    }

    #[test]
    fn transaction_is_masked_and_labeled() {
        let catalog = TemplateCatalog::default();
        let msg = catalog.render(
            MessageCategory::Transaction,
            "HDFCBK",
            "Rs.5000 debited from A/c XX1234",
        );
        assert_eq!(msg.template, "transaction_alert");
        assert_eq!(msg.params[0], "Debit Alert");
        assert_eq!(msg.params[1], "HDFCBK");
        assert!(!msg.params[2].contains("5000"));
        assert!(!msg.params[2].contains("1234"));
    }

    #[test]
    fn credit_gets_credit_label() {
        let catalog = TemplateCatalog::default();
        let msg =
            catalog.render(MessageCategory::Transaction, "SBI", "INR 900 credited to XX8876");
        assert_eq!(msg.params[0], "Credit Alert");
    }

    #[test]
    fn bill_summary_is_masked() {
        let catalog = TemplateCatalog::default();
        let msg = catalog.render(MessageCategory::Bill, "POWERCO", "Bill of Rs.1450 due on 05-Mar");
        assert_eq!(msg.template, "bill_notification");
        assert!(!msg.params[1].contains("1450"));
    }

    #[test]
    fn security_summary_is_truncated_not_masked() {
        let catalog = TemplateCatalog::default();
        let body = "Suspicious login attempt blocked from new device";
        let msg = catalog.render(MessageCategory::SecurityAlert, "BANK", body);
        assert_eq!(msg.template, "security_alert");
        assert_eq!(msg.params[1], body);
    }

    #[test]
    fn unknown_rides_the_relay_template() {
        let catalog = TemplateCatalog::default();
        let msg = catalog.render(MessageCategory::Unknown, "FRIEND", "Lunch at noon?");
        assert_eq!(msg.template, "otp_notification");
        assert_eq!(msg.params, vec!["FRIEND".to_string(), "Lunch at noon?".to_string()]);
    }

    #[test]
    fn long_summaries_are_bounded() {
        let catalog = TemplateCatalog::default();
        let body = "alert ".repeat(100);
        let msg = catalog.render(MessageCategory::SecurityAlert, "BANK", &body);
        assert!(msg.params[1].chars().count() <= 200);
        assert!(msg.params[1].ends_with("..."));
    }
}
