//! Provider response types and code extraction.
//!
//! Every field is defaulted so partial payloads still decode; the provider
//! omits most fields when `result` is `false` and sends `null` for some
//! informational ones.

use crate::matcher::Matcher;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use tracing::debug;

/// Timestamp format used by the list endpoint.
const MAIL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Decodes a field, treating `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response of the mail list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailList {
    /// Whether the provider accepted the request.
    #[serde(deserialize_with = "null_as_default")]
    pub result: bool,
    /// Id of the newest mail, if any.
    pub first_id: Option<u64>,
    /// Id of the oldest mail in this page.
    pub last_id: Option<u64>,
    /// Number of mails in the mailbox.
    #[serde(deserialize_with = "null_as_default")]
    pub count: u32,
    /// Whether more mails exist beyond this page.
    #[serde(deserialize_with = "null_as_default")]
    pub more: bool,
    /// Mails in this page, newest first.
    #[serde(deserialize_with = "null_as_default")]
    pub mail_list: Vec<MailSummary>,
}

/// One entry of [`MailList::mail_list`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailSummary {
    /// Provider mail id.
    #[serde(deserialize_with = "null_as_default")]
    pub mail_id: u64,
    /// Sender address.
    #[serde(deserialize_with = "null_as_default")]
    pub from_mail: String,
    /// Sender display name.
    #[serde(deserialize_with = "null_as_default")]
    pub from_name: String,
    /// Mail subject.
    #[serde(deserialize_with = "null_as_default")]
    pub subject: String,
    /// Receive time as sent by the provider (`YYYY-MM-DD HH:MM:SS`).
    #[serde(deserialize_with = "null_as_default")]
    pub time: String,
    /// Whether the mail is unread.
    #[serde(deserialize_with = "null_as_default")]
    pub is_new: bool,
    /// Number of attachments.
    #[serde(deserialize_with = "null_as_default")]
    pub attachment_count: u32,
}

impl MailSummary {
    /// Parses [`time`](Self::time), returning `None` if it is malformed.
    #[must_use]
    pub fn received_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.time, MAIL_TIME_FORMAT).ok()
    }
}

/// Response of the mail detail endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailDetail {
    /// Whether the provider returned the mail.
    #[serde(deserialize_with = "null_as_default")]
    pub result: bool,
    /// Mail subject.
    #[serde(deserialize_with = "null_as_default")]
    pub subject: String,
    /// Plain-text body.
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    /// HTML body.
    #[serde(deserialize_with = "null_as_default")]
    pub html: String,
    /// Sender address.
    #[serde(deserialize_with = "null_as_default")]
    pub from_mail: String,
    /// Date header as sent by the provider.
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
}

/// Response of the delete endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DeleteResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub result: bool,
}

/// Result of attempting to extract a code from a mail.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ExtractResult {
    /// A code was found
    Match(String),
    /// The mail holds no code
    NoMatch,
    /// The provider did not return the mail
    Unavailable,
}

/// Returns the id of the newest mail, or `None` when the list is empty or
/// was rejected.
pub(crate) fn latest_mail_id(list: &MailList) -> Option<u64> {
    if !list.result {
        return None;
    }
    list.first_id.filter(|&id| id != 0)
}

/// Extracts a code from the plain-text body of `detail`.
pub(crate) fn extract_code(detail: &MailDetail, matcher: &dyn Matcher) -> ExtractResult {
    if !detail.result {
        return ExtractResult::Unavailable;
    }

    match matcher.find_match(&detail.text) {
        Some(code) => {
            debug!(
                matcher = %matcher.description(),
                "Found code in mail"
            );
            ExtractResult::Match(code.into_owned())
        }
        None => {
            debug!(
                matcher = %matcher.description(),
                text_len = detail.text.len(),
                "No code found in mail text"
            );
            ExtractResult::NoMatch
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::VerificationCodeMatcher;

    #[test]
    fn test_decode_mail_list() {
        let json = r#"{
            "count": 2,
            "first_id": 2817263,
            "last_id": 2817001,
            "limit": 20,
            "mail_list": [
                {
                    "attachment_count": 0,
                    "first_attachment_name": "",
                    "from_mail": "no-reply@example.com",
                    "from_name": "Example",
                    "is_new": true,
                    "mail_id": 2817263,
                    "subject": "Verify your email",
                    "time": "2025-03-01 08:15:42"
                }
            ],
            "more": false,
            "result": true
        }"#;

        let list: MailList = serde_json::from_str(json).unwrap();
        assert!(list.result);
        assert_eq!(latest_mail_id(&list), Some(2_817_263));
        assert_eq!(list.mail_list.len(), 1);

        let mail = &list.mail_list[0];
        assert_eq!(mail.subject, "Verify your email");
        assert_eq!(
            mail.received_at().map(|t| t.to_string()).as_deref(),
            Some("2025-03-01 08:15:42")
        );
    }

    #[test]
    fn test_null_fields_decode_as_defaults() {
        let json = r#"{
            "result": true,
            "first_id": 900,
            "last_id": null,
            "count": null,
            "mail_list": [
                {
                    "mail_id": 900,
                    "from_name": null,
                    "first_attachment_name": null,
                    "subject": "Code",
                    "time": null
                }
            ]
        }"#;

        let list: MailList = serde_json::from_str(json).unwrap();
        assert_eq!(latest_mail_id(&list), Some(900));
        assert_eq!(list.count, 0);
        assert_eq!(list.mail_list[0].from_name, "");
        assert!(list.mail_list[0].received_at().is_none());

        let detail: MailDetail = serde_json::from_str(
            r#"{"result": true, "subject": null, "text": "code 123456", "html": null, "date": null}"#,
        )
        .unwrap();
        assert_eq!(detail.html, "");
        assert_eq!(
            extract_code(&detail, &VerificationCodeMatcher::new()),
            ExtractResult::Match("123456".into())
        );
    }

    #[test]
    fn test_latest_mail_id_empty_or_rejected() {
        let list: MailList = serde_json::from_str(r#"{"result": false}"#).unwrap();
        assert_eq!(latest_mail_id(&list), None);

        let list: MailList =
            serde_json::from_str(r#"{"result": true, "first_id": 0, "mail_list": []}"#).unwrap();
        assert_eq!(latest_mail_id(&list), None);

        let list: MailList = serde_json::from_str(r#"{"result": true}"#).unwrap();
        assert_eq!(latest_mail_id(&list), None);
    }

    #[test]
    fn test_received_at_malformed() {
        let mail = MailSummary {
            time: "yesterday".into(),
            ..MailSummary::default()
        };
        assert!(mail.received_at().is_none());
    }

    #[test]
    fn test_extract_code_from_text() {
        let detail: MailDetail = serde_json::from_str(
            r#"{"result": true, "subject": "Code", "text": "Your verification code is 654321."}"#,
        )
        .unwrap();

        let result = extract_code(&detail, &VerificationCodeMatcher::new());
        assert_eq!(result, ExtractResult::Match("654321".into()));
    }

    #[test]
    fn test_extract_code_ignores_html() {
        let detail = MailDetail {
            result: true,
            text: "Welcome!".into(),
            html: "<b>123456</b>".into(),
            ..MailDetail::default()
        };

        let result = extract_code(&detail, &VerificationCodeMatcher::new());
        assert_eq!(result, ExtractResult::NoMatch);
    }

    #[test]
    fn test_extract_code_unavailable() {
        let detail: MailDetail = serde_json::from_str(r#"{"result": false}"#).unwrap();
        let result = extract_code(&detail, &VerificationCodeMatcher::new());
        assert_eq!(result, ExtractResult::Unavailable);
    }
}
