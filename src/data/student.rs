use crate::data::schema::{Field, FieldValue, Rule, Schema};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_GPA: f64 = 4.0;

const STUDENT_FIELDS: &[Field] = &[
    Field {
        name: "name",
        rules: &[Rule::NonEmpty],
    },
    Field {
        name: "email",
        rules: &[Rule::Email],
    },
    Field {
        name: "course",
        rules: &[Rule::NonEmpty],
    },
    Field {
        name: "gpa",
        rules: &[Rule::AtMost(MAX_GPA)],
    },
];

/// A stored student. `id` is the public lookup key, never the store's own key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub course: String,
    pub gpa: f64,
}

/// Body of a create request. Any `id` the caller sends is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub course: String,
    pub gpa: f64,
}

/// Body of an update request, only the fields that are present get applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateStudent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
}

///32 lowercase hex chars
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

impl NewStudent {
    pub fn into_student(self) -> Student {
        let Self {
            name,
            email,
            course,
            gpa,
        } = self;

        Student {
            id: generate_id(),
            name,
            email,
            course,
            gpa,
        }
    }
}

impl Student {
    ///returns whether anything actually changed
    #[allow(clippy::float_cmp)]
    pub fn apply(&mut self, changes: &UpdateStudent) -> bool {
        let mut changed = false;

        let mut set_text = |current: &mut String, new: &Option<String>| {
            if let Some(new) = new {
                if current != new {
                    current.clone_from(new);
                    changed = true;
                }
            }
        };
        set_text(&mut self.name, &changes.name);
        set_text(&mut self.email, &changes.email);
        set_text(&mut self.course, &changes.course);

        if let Some(gpa) = changes.gpa {
            if self.gpa != gpa {
                self.gpa = gpa;
                changed = true;
            }
        }

        changed
    }
}

impl UpdateStudent {
    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        let Self {
            name,
            email,
            course,
            gpa,
        } = self;

        [
            ("name", name.is_some()),
            ("email", email.is_some()),
            ("course", course.is_some()),
            ("gpa", gpa.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }
}

impl Schema for NewStudent {
    const FIELDS: &'static [Field] = STUDENT_FIELDS;

    fn value_of(&self, field: &str) -> Option<FieldValue<'_>> {
        match field {
            "name" => Some(FieldValue::Text(&self.name)),
            "email" => Some(FieldValue::Text(&self.email)),
            "course" => Some(FieldValue::Text(&self.course)),
            "gpa" => Some(FieldValue::Number(self.gpa)),
            _ => None,
        }
    }
}

impl Schema for UpdateStudent {
    const FIELDS: &'static [Field] = STUDENT_FIELDS;

    fn value_of(&self, field: &str) -> Option<FieldValue<'_>> {
        match field {
            "name" => self.name.as_deref().map(FieldValue::Text),
            "email" => self.email.as_deref().map(FieldValue::Text),
            "course" => self.course.as_deref().map(FieldValue::Text),
            "gpa" => self.gpa.map(FieldValue::Number),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_student(gpa: f64) -> NewStudent {
        NewStudent {
            name: "Jane Doe".into(),
            email: "jdoe@example.com".into(),
            course: "Experiments, Science, and Fashion in Nanophotonics".into(),
            gpa,
        }
    }

    fn rejected_fields(errors: &crate::data::schema::ValidationErrors) -> Vec<&str> {
        errors.detail.iter().map(|v| v.loc[1].as_str()).collect()
    }

    #[test]
    fn gpa_boundary() {
        assert!(new_student(4.0).validate().is_ok());
        assert!(new_student(-1.0).validate().is_ok());

        let errors = new_student(4.01).validate().unwrap_err();
        assert_eq!(rejected_fields(&errors), ["gpa"]);
    }

    #[test]
    fn rejects_bad_email_and_blank_strings() {
        let student = NewStudent {
            name: String::new(),
            email: "not-an-email".into(),
            course: " ".into(),
            gpa: 3.0,
        };
        let errors = student.validate().unwrap_err();
        assert_eq!(rejected_fields(&errors), ["name", "email", "course"]);
    }

    #[test]
    fn email_must_be_a_bare_address() {
        for email in ["Jane <jane@x.com>", "a@x", "a@[127.0.0.1]", "a@@x.com"] {
            let student = NewStudent {
                email: email.into(),
                ..new_student(3.0)
            };
            let errors = student.validate().unwrap_err();
            assert_eq!(rejected_fields(&errors), ["email"], "{email}");
        }

        for email in ["a@x.com", "first.last+tag@sub.example.org"] {
            let student = NewStudent {
                email: email.into(),
                ..new_student(3.0)
            };
            assert!(student.validate().is_ok(), "{email}");
        }
    }

    #[test]
    fn generated_ids_are_opaque_hex() {
        let first = new_student(3.0).into_student();
        let second = new_student(3.0).into_student();

        assert_eq!(first.id.len(), 32);
        assert!(first.id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn ignores_caller_supplied_id() {
        let parsed: NewStudent = serde_json::from_str(
            r#"{"id": "mine", "name": "A", "email": "a@x.com", "course": "C", "gpa": 3.0}"#,
        )
        .unwrap();
        assert_ne!(parsed.into_student().id, "mine");
    }

    #[test]
    fn partial_update_only_validates_present_fields() {
        let changes = UpdateStudent {
            gpa: Some(3.5),
            ..UpdateStudent::default()
        };
        assert!(changes.validate().is_ok());

        let changes = UpdateStudent {
            email: Some("nope".into()),
            gpa: Some(5.0),
            ..UpdateStudent::default()
        };
        let errors = changes.validate().unwrap_err();
        assert_eq!(rejected_fields(&errors), ["email", "gpa"]);
    }

    #[test]
    fn null_and_missing_fields_are_stripped() {
        let changes: UpdateStudent = serde_json::from_str(r#"{"name": null, "gpa": 3.5}"#).unwrap();
        assert_eq!(changes.field_names(), ["gpa"]);
        assert_eq!(serde_json::to_string(&changes).unwrap(), r#"{"gpa":3.5}"#);

        let empty: UpdateStudent = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn apply_reports_real_changes_only() {
        let mut student = new_student(3.0).into_student();
        let before = student.clone();

        let same = UpdateStudent {
            name: Some(before.name.clone()),
            gpa: Some(3.0),
            ..UpdateStudent::default()
        };
        assert!(!student.apply(&same));
        assert_eq!(student, before);

        let different = UpdateStudent {
            gpa: Some(3.5),
            ..UpdateStudent::default()
        };
        assert!(student.apply(&different));
        assert_eq!(student.gpa, 3.5);
        assert_eq!(student.name, before.name);
        assert_eq!(student.id, before.id);
    }
}
