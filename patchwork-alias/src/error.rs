use thiserror::Error;

/// Errors from alias condition lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AliasError {
    #[error("Unable to find condition matching the given criteria")]
    ConditionNotFound,
}
