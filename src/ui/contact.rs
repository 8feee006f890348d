use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

pub const SUCCESS_NOTICE_DURATION: Duration = Duration::from_millis(5000);
pub const SUBMIT_LABEL: &str = "Send Message";
pub const SENDING_LABEL: &str = "Sending...";
const INVALID_MESSAGE: &str = "❌ Please fill in all fields";
const SENT_MESSAGE: &str = "✅ Message sent successfully! I'll reply soon.";
const NETWORK_MESSAGE: &str = "❌ Network error. Please try again or email directly.";
const REJECTED_FALLBACK: &str = "Failed to send message";

/// Payload shared by the contact form and both relay endpoints.
///
/// Missing and `null` JSON fields deserialize as empty strings so that
/// validation, not the parser, decides what counts as missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactMessage {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub message: String,
}

pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ContactMessage {
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.subject, &self.message]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }
}

/// Response envelope of the contact relay.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayReply {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FormStatus {
    #[default]
    Idle,
    Invalid,
    Sending,
    Sent,
    Failed(String),
}

pub enum SubmitOutcome {
    Sent,
    Rejected(Option<String>),
    Network,
}

impl From<RelayReply> for SubmitOutcome {
    fn from(reply: RelayReply) -> Self {
        if reply.ok {
            Self::Sent
        } else {
            Self::Rejected(reply.error)
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub fields: ContactMessage,
    pub status: FormStatus,
}

impl ContactForm {
    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.fields.name = value,
            Field::Email => self.fields.email = value,
            Field::Subject => self.fields.subject = value,
            Field::Message => self.fields.message = value,
        }
    }

    /// Validates and moves to `Sending`, handing back the message to post.
    ///
    /// Returns `None` when a field is blank (status becomes `Invalid`) or a
    /// submission is already in flight.
    pub fn submit(&mut self) -> Option<ContactMessage> {
        if self.status == FormStatus::Sending {
            return None;
        }

        if !self.fields.is_complete() {
            self.status = FormStatus::Invalid;
            return None;
        }

        self.status = FormStatus::Sending;
        Some(self.fields.trimmed())
    }

    pub fn finish(&mut self, outcome: SubmitOutcome) {
        self.status = match outcome {
            SubmitOutcome::Sent => {
                self.fields = ContactMessage::default();
                FormStatus::Sent
            }
            SubmitOutcome::Rejected(error) => FormStatus::Failed(format!(
                "❌ {}",
                error
                    .filter(|text| !text.trim().is_empty())
                    .unwrap_or_else(|| REJECTED_FALLBACK.to_string())
            )),
            SubmitOutcome::Network => FormStatus::Failed(NETWORK_MESSAGE.to_string()),
        };
    }

    /// Fired `SUCCESS_NOTICE_DURATION` after a successful send.
    pub fn clear_notice(&mut self) {
        if self.status == FormStatus::Sent {
            self.status = FormStatus::Idle;
        }
    }

    pub fn is_sending(&self) -> bool {
        self.status == FormStatus::Sending
    }

    pub fn button_label(&self) -> &'static str {
        if self.is_sending() {
            SENDING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    pub fn notice(&self) -> Option<(&'static str, String)> {
        match &self.status {
            FormStatus::Idle | FormStatus::Sending => None,
            FormStatus::Invalid => Some(("error", INVALID_MESSAGE.to_string())),
            FormStatus::Sent => Some(("success", SENT_MESSAGE.to_string())),
            FormStatus::Failed(message) => Some(("error", message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ContactForm {
        let mut form = ContactForm::default();
        form.set(Field::Name, " Ada ".to_string());
        form.set(Field::Email, "ada@example.com".to_string());
        form.set(Field::Subject, "Hello".to_string());
        form.set(Field::Message, "Nice site\n".to_string());
        form
    }

    #[test]
    fn blank_field_blocks_submission() {
        let mut form = filled();
        form.set(Field::Message, "   ".to_string());

        assert_eq!(form.submit(), None);
        assert_eq!(form.status, FormStatus::Invalid);
        assert_eq!(
            form.notice(),
            Some(("error", "❌ Please fill in all fields".to_string()))
        );
    }

    #[test]
    fn submit_trims_and_marks_sending() {
        let mut form = filled();
        let message = form.submit().expect("complete form");

        assert_eq!(message.name, "Ada");
        assert_eq!(message.message, "Nice site");
        assert!(form.is_sending());
        assert_eq!(form.button_label(), SENDING_LABEL);
        assert_eq!(form.submit(), None, "double submit is ignored");
    }

    #[test]
    fn success_resets_fields_and_clears_notice_later() {
        let mut form = filled();
        form.submit();
        form.finish(RelayReply { ok: true, error: None }.into());

        assert_eq!(form.fields, ContactMessage::default());
        assert_eq!(form.notice().map(|(class, _)| class), Some("success"));

        form.clear_notice();
        assert_eq!(form.status, FormStatus::Idle);
    }

    #[test]
    fn rejection_uses_upstream_text_or_fallback() {
        let mut form = filled();
        form.submit();
        form.finish(SubmitOutcome::Rejected(Some("Invalid email".to_string())));
        assert_eq!(form.status, FormStatus::Failed("❌ Invalid email".to_string()));
        assert_eq!(form.fields.name, " Ada ");

        form.finish(SubmitOutcome::Rejected(None));
        assert_eq!(
            form.status,
            FormStatus::Failed("❌ Failed to send message".to_string())
        );
    }

    #[test]
    fn network_failure_message() {
        let mut form = filled();
        form.submit();
        form.finish(SubmitOutcome::Network);
        assert_eq!(form.button_label(), SUBMIT_LABEL);
        assert!(matches!(form.status, FormStatus::Failed(ref text) if text.contains("Network error")));
    }

    #[test]
    fn missing_json_fields_deserialize_as_blank() {
        let message: ContactMessage =
            serde_json::from_str(r#"{"name":"a","email":"b","subject":"c"}"#).expect("valid json");
        assert!(!message.is_complete());
    }

    #[test]
    fn null_json_fields_deserialize_as_blank() {
        let message: ContactMessage =
            serde_json::from_str(r#"{"name":null,"email":"b","subject":"c","message":"d"}"#)
                .expect("valid json");
        assert_eq!(message.name, "");
        assert!(!message.is_complete());
    }
}
