use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::datetime::date_component;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: u64,

    pub text: String,

    pub completed: bool,

    #[serde(default)]
    pub created_at: Option<String>,
}

impl Task {
    pub fn new(id: u64, text: String, completed: bool, created_at: Option<String>) -> Self {
        Self {
            id,
            text,
            completed,
            created_at,
        }
    }

    pub fn created_date(&self) -> Option<NaiveDate> {
        self.created_at.as_deref().and_then(date_component)
    }
}
