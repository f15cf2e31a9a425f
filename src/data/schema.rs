//! Declarative field rules for request bodies.
//!
//! A type lists its fields and the [`Rule`]s each must satisfy in
//! [`Schema::FIELDS`], and exposes field values through [`Schema::value_of`].
//! Validation walks the table, so the rules live in one place and know nothing
//! about the store.

use axum::extract::rejection::JsonRejection;
use email_address::{EmailAddress, Options};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Rule {
    NonEmpty,
    Email,
    AtMost(f64),
}

#[derive(Debug, Copy, Clone)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
}

#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub rules: &'static [Rule],
}

impl Rule {
    ///returns `(message, kind)` if the value breaks the rule
    fn check(self, value: FieldValue<'_>) -> Option<(String, &'static str)> {
        match (self, value) {
            (Self::NonEmpty, FieldValue::Text(text)) if text.trim().is_empty() => Some((
                "String should have at least 1 character".to_string(),
                "string_too_short",
            )),
            (Self::Email, FieldValue::Text(text)) if !is_plain_email(text) => Some((
                "value is not a valid email address".to_string(),
                "value_error",
            )),
            (Self::AtMost(max), FieldValue::Number(number)) if number > max => Some((
                format!("Input should be less than or equal to {max}"),
                "less_than_equal",
            )),
            _ => None,
        }
    }
}

///bare `local@domain.tld`, no display name or `[ip]` domain
fn is_plain_email(text: &str) -> bool {
    let options = Options::default()
        .without_display_text()
        .without_domain_literal()
        .with_required_tld();

    EmailAddress::parse_with_options(text, options).is_ok()
}

pub trait Schema {
    const FIELDS: &'static [Field];

    /// `None` means the field is absent, which only partial bodies allow.
    fn value_of(&self, field: &str) -> Option<FieldValue<'_>>;

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for field in Self::FIELDS {
            let Some(value) = self.value_of(field.name) else {
                continue;
            };

            for rule in field.rules {
                if let Some((msg, kind)) = rule.check(value) {
                    errors.push(vec!["body".into(), field.name.into()], msg, kind);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Body of a 422 response: `{"detail": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub detail: Vec<Violation>,
}

impl ValidationErrors {
    pub fn push(&mut self, loc: Vec<String>, msg: impl Into<String>, kind: impl Into<String>) {
        self.detail.push(Violation {
            loc,
            msg: msg.into(),
            kind: kind.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.detail.is_empty()
    }

    pub fn from_rejection(rejection: &JsonRejection) -> Self {
        let kind = match rejection {
            JsonRejection::JsonDataError(_) => "json_data",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "content_type",
            _ => "body",
        };

        let mut errors = Self::default();
        errors.push(vec!["body".into()], rejection.body_text(), kind);
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Reading {
        label: Option<String>,
        contact: String,
        level: f64,
    }

    impl Schema for Reading {
        const FIELDS: &'static [Field] = &[
            Field {
                name: "label",
                rules: &[Rule::NonEmpty],
            },
            Field {
                name: "contact",
                rules: &[Rule::NonEmpty, Rule::Email],
            },
            Field {
                name: "level",
                rules: &[Rule::AtMost(10.0)],
            },
        ];

        fn value_of(&self, field: &str) -> Option<FieldValue<'_>> {
            match field {
                "label" => self.label.as_deref().map(FieldValue::Text),
                "contact" => Some(FieldValue::Text(&self.contact)),
                "level" => Some(FieldValue::Number(self.level)),
                _ => None,
            }
        }
    }

    #[test]
    fn absent_fields_are_skipped() {
        let reading = Reading {
            label: None,
            contact: "someone@example.com".into(),
            level: 10.0,
        };
        assert_eq!(reading.validate(), Ok(()));
    }

    #[test]
    fn every_broken_rule_is_reported() {
        let reading = Reading {
            label: Some("   ".into()),
            contact: String::new(),
            level: 10.5,
        };
        let errors = reading.validate().unwrap_err();

        let kinds: Vec<_> = errors
            .detail
            .iter()
            .map(|v| (v.loc[1].as_str(), v.kind.as_str()))
            .collect();
        assert_eq!(
            kinds,
            [
                ("label", "string_too_short"),
                ("contact", "string_too_short"),
                ("contact", "value_error"),
                ("level", "less_than_equal"),
            ]
        );
        assert!(errors.detail.iter().all(|v| v.loc[0] == "body"));
    }

    #[test]
    fn serialises_kind_as_type() {
        let mut errors = ValidationErrors::default();
        errors.push(vec!["body".into(), "gpa".into()], "too big", "less_than_equal");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "detail": [{"loc": ["body", "gpa"], "msg": "too big", "type": "less_than_equal"}]
            })
        );
    }
}
