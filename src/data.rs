use crate::data::student::Student;
use serde::{Deserialize, Serialize};

pub mod schema;
pub mod student;

/// The `{success, message, content}` wrapper every endpoint responds with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    pub message: String,
    pub content: Vec<Student>,
}

impl Envelope {
    pub fn success(message: impl Into<String>, content: Vec<Student>) -> Self {
        Self {
            success: true,
            message: message.into(),
            content,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            content: vec![],
        }
    }
}
