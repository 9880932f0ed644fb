//! The module contains the errors the collector can throw.
//!
//! - [`StoreError`] thrown when the finished record can't be written.
//! - [`SessionError`] thrown when an answer doesn't fit the session state.
use sea_orm::DbErr;
use thiserror::Error;

/// Errors of the durable record store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Errors of the dialogue state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("the dialogue is already complete")]
    AlreadyComplete,
    #[error("\"{0}\" was already answered")]
    FieldAlreadySet(&'static str),
}
