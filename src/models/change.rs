//! Change history entries.

use chrono::{DateTime, FixedOffset};

use crate::error::{Result, WeblateError};
use crate::models::{Resource, Schema, Translation};

#[derive(Debug, Clone, Copy)]
pub struct ChangeSchema;

impl Schema for ChangeSchema {
    const KIND: &'static str = "Change";
    const FIELDS: &'static [&'static str] = &[
        "url",
        "id",
        "timestamp",
        "action",
        "action_name",
        "target",
        "user",
        "author",
        "unit",
        "translation",
        "component",
    ];
    const OPTIONALS: &'static [&'static str] = &[
        "id",
        "action",
        "target",
        "user",
        "author",
        "unit",
        "translation",
        "component",
    ];
    const ID: &'static str = "id";
}

/// One recorded change.
pub type Change = Resource<ChangeSchema>;

impl Resource<ChangeSchema> {
    /// When the change happened.
    ///
    /// # Errors
    ///
    /// Returns [`Protocol`](WeblateError::Protocol) if the server sent a
    /// timestamp that is not RFC 3339.
    pub fn timestamp(&self) -> Result<DateTime<FixedOffset>> {
        let raw = self.str_field("timestamp")?;
        DateTime::parse_from_rfc3339(raw)
            .map_err(|e| WeblateError::Protocol(format!("invalid timestamp {raw:?}: {e}")))
    }

    pub fn action_name(&self) -> Result<&str> {
        self.str_field("action_name")
    }

    /// The translation this change was made in, if any.
    pub fn translation(&self) -> Result<Option<Translation>> {
        match self.data().get("translation") {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(_) => self.nested("translation").map(Some),
        }
    }
}
