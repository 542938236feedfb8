use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("group data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("group data must be an array or an object with a `groups` array, found {found}")]
    UnexpectedShape { found: &'static str },
}

/// Why a single record was dropped while loading. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("record is not an object")]
    NotAnObject,
    #[error("record has no numeric `Id`")]
    MissingId,
    #[error("record {id} has no `Name`")]
    MissingName { id: i64 },
    #[error("record {id} has neither `GroupTypeId` nor a known `Kind`")]
    MissingKind { id: i64 },
    #[error("record {id} is malformed: {detail}")]
    Malformed { id: i64, detail: String },
}
