//! Submission validation against a form schema.
//!
//! Errors are collected per field rather than failing on the first one,
//! so a renderer can show every problem at once.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use regex::Regex;

use crate::field::{FieldKind, FormSchema};

/// A cleaned answer, keyed by the field label. The label is stored with
/// the value so submissions stay readable even if the field definition
/// is later deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub label: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.label, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate submitted values against the schema.
///
/// Returns one `FieldValue` per schema field (unchecked optional
/// checkboxes come back as `"false"`, other blank optional fields as an
/// empty string), or every validation failure at once.
pub fn validate(
    schema: &FormSchema,
    values: &HashMap<String, String>,
) -> Result<Vec<FieldValue>, ValidationErrors> {
    let mut cleaned = Vec::with_capacity(schema.fields.len());
    let mut errors = Vec::new();

    for field in &schema.fields {
        let raw = values
            .get(&field.label)
            .map(|v| v.trim())
            .unwrap_or_default();

        if field.kind == FieldKind::Checkbox {
            let checked = matches!(raw, "on" | "true" | "1");
            if field.required && !checked {
                errors.push(FieldError {
                    label: field.label.clone(),
                    message: "this field is required".to_string(),
                });
            } else {
                cleaned.push(FieldValue {
                    label: field.label.clone(),
                    value: checked.to_string(),
                });
            }
            continue;
        }

        if raw.is_empty() {
            if field.required {
                errors.push(FieldError {
                    label: field.label.clone(),
                    message: "this field is required".to_string(),
                });
            } else {
                cleaned.push(FieldValue {
                    label: field.label.clone(),
                    value: String::new(),
                });
            }
            continue;
        }

        if let Some(message) = check_kind(field.kind, raw, &field.choices) {
            errors.push(FieldError {
                label: field.label.clone(),
                message,
            });
            continue;
        }

        if !field.pattern.is_empty() {
            match Regex::new(&field.pattern) {
                Ok(re) if !re.is_match(raw) => {
                    errors.push(FieldError {
                        label: field.label.clone(),
                        message: "value does not match the expected format".to_string(),
                    });
                    continue;
                }
                // A broken stored pattern is an admin mistake the
                // submitter cannot fix, so it does not reject the value.
                Err(_) => {}
                Ok(_) => {}
            }
        }

        cleaned.push(FieldValue {
            label: field.label.clone(),
            value: raw.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(cleaned)
    } else {
        Err(ValidationErrors(errors))
    }
}

fn check_kind(kind: FieldKind, raw: &str, choices: &[String]) -> Option<String> {
    match kind {
        FieldKind::Email => {
            let mut parts = raw.splitn(2, '@');
            let local = parts.next().unwrap_or_default();
            let domain = parts.next().unwrap_or_default();
            if local.is_empty() || domain.is_empty() || !domain.contains('.') {
                return Some("enter a valid email address".to_string());
            }
            None
        }
        FieldKind::Number => {
            if raw.parse::<i64>().is_err() {
                return Some("enter a whole number".to_string());
            }
            None
        }
        FieldKind::Date => {
            if NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_err() {
                return Some("enter a date as YYYY-MM-DD".to_string());
            }
            None
        }
        FieldKind::Select | FieldKind::Radio => {
            if !choices.iter().any(|c| c == raw) {
                return Some("select one of the available options".to_string());
            }
            None
        }
        FieldKind::Text | FieldKind::Textarea | FieldKind::Phone | FieldKind::Checkbox => None,
    }
}
