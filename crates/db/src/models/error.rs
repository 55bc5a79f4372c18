use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("invalid parent {parent}: {id}")]
    InvalidParent { parent: &'static str, id: String },
    #[error("invalid {field}: {reason}")]
    ValidationFailed { field: &'static str, reason: String },
    #[error("{entity} {id} belongs to another workspace")]
    Forbidden { entity: &'static str, id: String },
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_parent(parent: &'static str, id: impl ToString) -> Self {
        Self::InvalidParent {
            parent,
            id: id.to_string(),
        }
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field,
            reason: reason.into(),
        }
    }
}
