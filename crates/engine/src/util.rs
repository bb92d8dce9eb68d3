//! Internal helpers for model conversion.
//!
//! These utilities are **not** part of the public API. They centralize the
//! mapping of stored columns back into typed values.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::Corrupted(format!("invalid {label} id")))
}

/// Parse an enum stored as text, labeling the failure with the column name.
pub(crate) fn parse_stored<T>(value: &str, label: &str) -> ResultEngine<T>
where
    T: for<'a> TryFrom<&'a str, Error = String>,
{
    T::try_from(value).map_err(|err| EngineError::Corrupted(format!("{label}: {err}")))
}
