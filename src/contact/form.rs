//! Contact form payload and its validation.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::errors::ClassifiedError;

/// Body of `POST /api/contact`.
///
/// Missing text fields deserialize as empty strings so they are reported by
/// [`ContactForm::validate`] rather than as a JSON error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub subject: String,
    pub message: String,
    pub callback_requested: bool,
}

/// One failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

impl ContactForm {
    /// Build a form from an already-parsed JSON body.
    ///
    /// Wrong-typed fields are reported next to content issues, so a body that
    /// is valid JSON never fails as a parse error. Missing and `null` fields
    /// take their defaults.
    pub fn from_value(value: Value) -> Result<Self, ClassifiedError> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(invalid_request(vec![FieldIssue {
                    field: "body",
                    message: format!("Expected object, received {}", type_name(&other)),
                }]))
            }
        };

        let mut issues = Vec::new();
        let form = ContactForm {
            first_name: text_field(&map, "firstName", &mut issues).unwrap_or_default(),
            last_name: text_field(&map, "lastName", &mut issues).unwrap_or_default(),
            email: text_field(&map, "email", &mut issues).unwrap_or_default(),
            phone_number: text_field(&map, "phoneNumber", &mut issues),
            subject: text_field(&map, "subject", &mut issues).unwrap_or_default(),
            message: text_field(&map, "message", &mut issues).unwrap_or_default(),
            callback_requested: flag_field(&map, "callbackRequested", &mut issues),
        };

        // A wrong-typed field already has its issue.
        let mut content = form.issues();
        content.retain(|c| !issues.iter().any(|t: &FieldIssue| t.field == c.field));
        issues.extend(content);

        if issues.is_empty() {
            Ok(form)
        } else {
            Err(invalid_request(issues))
        }
    }

    /// Validate every field, reporting all issues at once.
    ///
    /// Fails with VALIDATION / `INVALID_REQUEST`; the issues are the details.
    pub fn validate(&self) -> Result<(), ClassifiedError> {
        let issues = self.issues();
        if issues.is_empty() {
            return Ok(());
        }

        Err(invalid_request(issues))
    }

    fn issues(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();

        check_text(&mut issues, "firstName", &self.first_name, "First name is required", 100);
        check_text(&mut issues, "lastName", &self.last_name, "Last name is required", 100);
        if !is_valid_email(&self.email) {
            issues.push(FieldIssue {
                field: "email",
                message: "Invalid email address".to_string(),
            });
        }
        check_text(&mut issues, "subject", &self.subject, "Subject is required", 200);
        check_text(&mut issues, "message", &self.message, "Message is required", 5000);

        issues
    }

    /// Phone number to call back, if the sender asked for a callback.
    pub fn callback_phone(&self) -> Option<&str> {
        if !self.callback_requested {
            return None;
        }
        self.phone_number.as_deref().filter(|p| !p.trim().is_empty())
    }
}

fn invalid_request(issues: Vec<FieldIssue>) -> ClassifiedError {
    ClassifiedError::validation("INVALID_REQUEST", "Validation error").with_details(json!(issues))
}

fn text_field(
    map: &Map<String, Value>,
    field: &'static str,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    match map.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            issues.push(type_issue(field, "string", other));
            None
        }
    }
}

fn flag_field(map: &Map<String, Value>, field: &'static str, issues: &mut Vec<FieldIssue>) -> bool {
    match map.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            issues.push(type_issue(field, "boolean", other));
            false
        }
    }
}

fn type_issue(field: &'static str, expected: &str, received: &Value) -> FieldIssue {
    FieldIssue {
        field,
        message: format!("Expected {expected}, received {}", type_name(received)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_text(
    issues: &mut Vec<FieldIssue>,
    field: &'static str,
    value: &str,
    required: &str,
    max_chars: usize,
) {
    let len = value.chars().count();
    if len == 0 {
        issues.push(FieldIssue {
            field,
            message: required.to_string(),
        });
    } else if len > max_chars {
        issues.push(FieldIssue {
            field,
            message: format!("Must be at most {max_chars} characters"),
        });
    }
}

fn is_valid_email(email: &str) -> bool {
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
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}
