use std::fmt;

use sea_orm::{DbErr, TransactionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOp::Create => f.write_str("create"),
            WriteOp::Update => f.write_str("update"),
            WriteOp::Delete => f.write_str("delete"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WriteFailure {
    #[error("{entity} {id} does not exist")]
    NotFound { entity: &'static str, id: i64 },
    #[error("invalid {field}: {value:?}")]
    Invalid { field: &'static str, value: String },
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// A create, update or delete that did not take effect.
///
/// The surrounding transaction has already been rolled back when this is returned.
#[derive(Debug, thiserror::Error)]
#[error("{op} {entity} failed: {failure}")]
pub struct WriteError {
    pub op: WriteOp,
    pub entity: &'static str,
    #[source]
    pub failure: WriteFailure,
}

impl WriteError {
    pub fn new(op: WriteOp, entity: &'static str, failure: WriteFailure) -> Self {
        Self {
            op,
            entity,
            failure,
        }
    }

    /// Wraps the outcome of `TransactionTrait::transaction` for this operation.
    pub fn from_transaction(
        op: WriteOp,
        entity: &'static str,
        err: TransactionError<WriteFailure>,
    ) -> Self {
        let failure = match err {
            TransactionError::Connection(db_err) => WriteFailure::Database(db_err),
            TransactionError::Transaction(failure) => failure,
        };
        Self::new(op, entity, failure)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.failure, WriteFailure::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_operation_and_entity() {
        let err = WriteError::new(
            WriteOp::Delete,
            "venue",
            WriteFailure::NotFound {
                entity: "venue",
                id: 7,
            },
        );

        assert_eq!(err.to_string(), "delete venue failed: venue 7 does not exist");
        assert!(err.is_not_found());
    }

    #[test]
    fn transaction_connection_errors_become_database_failures() {
        let err = WriteError::from_transaction(
            WriteOp::Create,
            "show",
            TransactionError::Connection(DbErr::Custom("pool closed".into())),
        );

        assert_eq!(err.op, WriteOp::Create);
        assert!(matches!(err.failure, WriteFailure::Database(_)));
    }
}
