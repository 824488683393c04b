use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error as ThisError;

/// Everything the service can reject or fail on. Validation variants are
/// raised at the API boundary before the core runs; `ResidualImbalance`
/// is the one internal invariant violation and must never be swallowed.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Error {
    #[error("expense amount {amount} is not a valid monetary value")]
    InvalidAmount { amount: f64 },

    #[error("expense payer must not be empty")]
    EmptyPayer,

    #[error("member uid must not be empty")]
    EmptyMemberUid,

    #[error("member {uid} is already part of the project")]
    DuplicateMember { uid: String },

    #[error("member {uid} is not part of project {project}")]
    UnknownMember { uid: String, project: String },

    #[error("project {id} not found")]
    ProjectNotFound { id: String },

    #[error("project {id} already exists")]
    ProjectExists { id: String },

    #[error("settlement left a residual imbalance of {residual} currency units")]
    ResidualImbalance { residual: f64 },
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::ProjectNotFound { .. } => StatusCode::NOT_FOUND,
            Error::ProjectExists { .. } => StatusCode::CONFLICT,
            Error::ResidualImbalance { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Error::ResidualImbalance { residual } = self {
            tracing::error!(residual, "settlement invariant violated");
        }
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}
