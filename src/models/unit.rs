//! Translation unit model.

use serde_json::json;

use crate::error::Result;
use crate::models::{Resource, Schema, Translation};

#[derive(Debug, Clone, Copy)]
pub struct UnitSchema;

impl Schema for UnitSchema {
    const KIND: &'static str = "Unit";
    const FIELDS: &'static [&'static str] = &[
        "url",
        "id",
        "translation",
        "source",
        "previous_source",
        "target",
        "id_hash",
        "content_hash",
        "location",
        "context",
        "note",
        "flags",
        "state",
        "fuzzy",
        "translated",
        "approved",
        "position",
        "has_suggestion",
        "has_comment",
        "has_failing_check",
        "num_words",
        "priority",
        "explanation",
        "extra_flags",
        "web_url",
        "source_unit",
        "pending",
        "timestamp",
    ];
    const OPTIONALS: &'static [&'static str] = &[
        "previous_source",
        "id_hash",
        "content_hash",
        "location",
        "context",
        "note",
        "flags",
        "approved",
        "position",
        "has_suggestion",
        "has_comment",
        "has_failing_check",
        "num_words",
        "priority",
        "explanation",
        "extra_flags",
        "web_url",
        "source_unit",
        "pending",
        "timestamp",
    ];
    const ID: &'static str = "id";
}

/// One translatable string.
pub type Unit = Resource<UnitSchema>;

/// Review state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Empty,
    NeedsEditing,
    Translated,
    Approved,
}

impl UnitState {
    /// Numeric state used by the API.
    pub fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::NeedsEditing => 10,
            Self::Translated => 20,
            Self::Approved => 30,
        }
    }
}

impl Resource<UnitSchema> {
    pub fn id(&self) -> Result<u64> {
        self.u64_field("id")
    }

    /// The translation containing this unit.
    pub fn translation(&self) -> Result<Translation> {
        self.nested("translation")
    }

    /// Store new target strings (one per plural form) with `state`.
    ///
    /// The unit data is replaced with the server's reply.
    #[tracing::instrument(skip(self, targets), fields(url = %self.url()))]
    pub fn translate<I, T>(&mut self, targets: I, state: UnitState) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let targets: Vec<String> = targets.into_iter().map(Into::into).collect();
        self.patch(&json!({ "target": targets, "state": state.code() }))
    }
}
