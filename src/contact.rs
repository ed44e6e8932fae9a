use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const GENERIC_FAILURE: &str = "Something went wrong sending your message. Please try again.";
pub const SUCCESS: &str = "Thanks for reaching out! We'll get back to you shortly.";

/// Payload posted by the contact form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub service: Option<String>,
    pub budget: Option<String>,
    pub message: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("malformed submission: {0}")]
    Malformed(String),
}

impl ContactError {
    /// Text shown next to the form.
    pub fn user_message(&self) -> String {
        match self {
            ContactError::MissingField(field) => format!("Please fill in your {field}."),
            ContactError::InvalidEmail => "Please enter a valid email address.".to_string(),
            ContactError::Malformed(_) => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Body returned to the form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

impl ContactResponse {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: SUCCESS.to_string(),
        }
    }

    pub fn rejected(error: &ContactError) -> Self {
        Self {
            success: false,
            message: error.user_message(),
        }
    }

    /// Delivery failed for a reason the visitor cannot fix.
    pub fn failed() -> Self {
        Self {
            success: false,
            message: GENERIC_FAILURE.to_string(),
        }
    }
}

impl ContactSubmission {
    pub fn validate(&self) -> Result<(), ContactError> {
        if self.name.trim().is_empty() {
            return Err(ContactError::MissingField("name"));
        }
        if self.email.trim().is_empty() {
            return Err(ContactError::MissingField("email"));
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ContactError::InvalidEmail);
        }
        if self.message.trim().is_empty() {
            return Err(ContactError::MissingField("message"));
        }
        Ok(())
    }
}

/// `local@domain.tld` with no whitespace and at least two domain labels.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| is_domain_label(label))
}

/// Letters, digits and inner hyphens.
fn is_domain_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_alphanumeric() || c == '-')
}

/// Validates a raw json submission and logs the outcome.
pub fn handle_submission(json: &str) -> ContactResponse {
    let submission = match serde_json::from_str::<ContactSubmission>(json) {
        Ok(submission) => submission,
        Err(error) => {
            let error = ContactError::Malformed(error.to_string());
            warn!("contact submission rejected: {}", error);
            return ContactResponse::rejected(&error);
        }
    };

    if let Err(error) = submission.validate() {
        warn!("contact submission rejected: {}", error);
        return ContactResponse::rejected(&error);
    }

    info!(
        name = %submission.name,
        email = %submission.email,
        company = submission.company.as_deref().unwrap_or("-"),
        service = submission.service.as_deref().unwrap_or("-"),
        budget = submission.budget.as_deref().unwrap_or("-"),
        "contact submission received"
    );

    ContactResponse::accepted()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            message: "We need a new site.".into(),
            ..ContactSubmission::default()
        }
    }

    #[test]
    fn accepts_minimal_submission() {
        assert_eq!(submission().validate(), Ok(()));
    }

    #[test]
    fn requires_name_email_and_message() {
        let blank_name = ContactSubmission {
            name: "   ".into(),
            ..submission()
        };
        assert_eq!(blank_name.validate(), Err(ContactError::MissingField("name")));

        let no_email = ContactSubmission {
            email: String::new(),
            ..submission()
        };
        assert_eq!(no_email.validate(), Err(ContactError::MissingField("email")));

        let no_message = ContactSubmission {
            message: "\n".into(),
            ..submission()
        };
        assert_eq!(no_message.validate(), Err(ContactError::MissingField("message")));
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in [
            "ada",
            "ada@",
            "@example.com",
            "ada@example",
            "ada@.com",
            "a b@x.io",
            "a@b@c.io",
            "ada@example..com",
            "ada@example.com.",
            "ada@-.com",
            "ada@studio-.io",
            "ada@stu_dio.io",
        ] {
            assert!(!is_valid_email(email), "{email}");
        }
        for email in ["ada@example.com", "a.b+tag@studio.co.uk", "ada@my-studio.io"] {
            assert!(is_valid_email(email), "{email}");
        }
    }

    #[test]
    fn handles_json_payloads() {
        let ok = handle_submission(
            r#"{"name":"Ada","email":"ada@example.com","service":"branding","message":"Hi"}"#,
        );
        assert_eq!(ok, ContactResponse::accepted());

        let invalid = handle_submission(r#"{"name":"Ada","email":"nope","message":"Hi"}"#);
        assert!(!invalid.success);
        assert_eq!(invalid.message, "Please enter a valid email address.");

        let garbage = handle_submission("not json");
        assert!(!garbage.success);
        assert_eq!(garbage.message, GENERIC_FAILURE);
    }
}
