use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::contract::ContactRequest;

/// Accepts `jane@example.com`, `<jane@example.com>` and
/// `"Jane Doe" <jane@example.com>`.
static EMAIL_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:"?([^"]*)"?\s)?(?:<?(.+@[^>]+)>?)$"#).expect("email pattern should compile")
});

pub const NOT_AN_OBJECT_MESSAGE: &str = "Request payload must be a JSON object";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// Every rule that failed for one payload, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<FieldViolation>,
}

impl ValidationReport {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field,
            message: message.into(),
        });
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().map(|violation| violation.field).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .violations
            .iter()
            .map(|violation| violation.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Options that change which rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    pub require_recaptcha: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            require_recaptcha: true,
        }
    }
}

/// Checks a raw submission against every field rule and returns the typed
/// request, or a report naming all failing fields.
pub fn validate_submission(
    raw: &Value,
    rules: ValidationRules,
) -> Result<ContactRequest, ValidationReport> {
    let mut report = ValidationReport::default();
    let Some(object) = raw.as_object() else {
        report.push("payload", NOT_AN_OBJECT_MESSAGE);
        return Err(report);
    };

    let from = required_string(object.get("from"), "from", "From", &mut report);
    if let Some(address) = from {
        if !EMAIL_LIKE.is_match(address) {
            report.push("from", "From doesn't look like a valid email");
        }
    }

    let text = required_string(object.get("text"), "text", "Text", &mut report);

    let recaptcha = if rules.require_recaptcha {
        required_string(object.get("recaptcha"), "recaptcha", "Recaptcha", &mut report)
    } else {
        optional_string(object.get("recaptcha"), "recaptcha", "Recaptcha", &mut report)
    };

    let html = optional_string(object.get("html"), "html", "Html", &mut report);

    if !report.is_empty() {
        return Err(report);
    }

    Ok(ContactRequest {
        from: from.unwrap_or_default().to_string(),
        text: text.unwrap_or_default().to_string(),
        html: html.unwrap_or_default().to_string(),
        recaptcha_token: recaptcha.unwrap_or_default().to_string(),
    })
}

fn required_string<'a>(
    value: Option<&'a Value>,
    field: &'static str,
    label: &str,
    report: &mut ValidationReport,
) -> Option<&'a str> {
    match value {
        None | Some(Value::Null) => {
            report.push(field, format!("{label} can't be blank"));
            None
        }
        Some(Value::String(text)) if text.trim().is_empty() => {
            report.push(field, format!("{label} can't be blank"));
            None
        }
        Some(Value::String(text)) => Some(text.as_str()),
        Some(_) => {
            report.push(field, format!("{label} must be a string"));
            None
        }
    }
}

fn optional_string<'a>(
    value: Option<&'a Value>,
    field: &'static str,
    label: &str,
    report: &mut ValidationReport,
) -> Option<&'a str> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.as_str()),
        Some(_) => {
            report.push(field, format!("{label} must be a string"));
            None
        }
    }
}
