use serde::{Deserialize, Serialize};

/// The kinds of input a dynamic form field can take. Stored as the
/// lowercase strings in the `field_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
    Phone,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Number => "number",
            FieldKind::Textarea => "textarea",
            FieldKind::Select => "select",
            FieldKind::Radio => "radio",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Date => "date",
            FieldKind::Phone => "phone",
        }
    }

    pub fn parse(value: &str) -> Option<FieldKind> {
        match value {
            "text" => Some(FieldKind::Text),
            "email" => Some(FieldKind::Email),
            "number" => Some(FieldKind::Number),
            "textarea" => Some(FieldKind::Textarea),
            "select" => Some(FieldKind::Select),
            "radio" => Some(FieldKind::Radio),
            "checkbox" => Some(FieldKind::Checkbox),
            "date" => Some(FieldKind::Date),
            "phone" => Some(FieldKind::Phone),
            _ => None,
        }
    }

    /// Whether this kind renders with a fixed option list.
    pub fn has_choices(&self) -> bool {
        matches!(self, FieldKind::Select | FieldKind::Radio)
    }
}

/// One field of a dynamic form, as described by an administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub label: String,
    pub kind: FieldKind,
    pub help_text: String,
    pub required: bool,
    pub sort_order: i64,
    /// Options for select/radio kinds; empty otherwise.
    pub choices: Vec<String>,
    pub placeholder: String,
    /// Optional regex the raw value must match.
    pub pattern: String,
}

impl FieldSpec {
    /// Parse the comma-separated storage form of `choices`.
    pub fn parse_choices(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// A complete form schema: the form's metadata plus its ordered fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSchema {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn new(title: &str, slug: &str, description: &str, mut fields: Vec<FieldSpec>) -> Self {
        fields.sort_by_key(|f| f.sort_order);
        Self {
            title: title.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            FieldKind::Text,
            FieldKind::Email,
            FieldKind::Number,
            FieldKind::Textarea,
            FieldKind::Select,
            FieldKind::Radio,
            FieldKind::Checkbox,
            FieldKind::Date,
            FieldKind::Phone,
        ] {
            assert_eq!(FieldKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(FieldKind::parse("file"), None);
    }

    #[test]
    fn test_parse_choices_trims_and_drops_empties() {
        assert_eq!(
            FieldSpec::parse_choices("Red, Green , ,Blue"),
            vec!["Red", "Green", "Blue"]
        );
        assert!(FieldSpec::parse_choices("").is_empty());
    }

    #[test]
    fn test_schema_orders_fields() {
        let field = |label: &str, sort_order: i64| FieldSpec {
            label: label.to_string(),
            kind: FieldKind::Text,
            help_text: String::new(),
            required: false,
            sort_order,
            choices: Vec::new(),
            placeholder: String::new(),
            pattern: String::new(),
        };
        let schema = FormSchema::new(
            "Survey",
            "survey",
            "",
            vec![field("Second", 2), field("First", 1)],
        );
        let labels: Vec<&str> = schema.fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["First", "Second"]);
    }
}
