use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Failure kinds shared by the stores, the generator and the rotation engine.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[display(fmt = "{} {} not found", entity, id)]
    NotFound { entity: &'static str, id: String },

    #[display(fmt = "storage failure: {}", _0)]
    StorageFailure(String),

    #[display(fmt = "validation failure: {}", _0)]
    ValidationFailure(String),
}

impl std::error::Error for ScheduleError {}

impl ScheduleError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ScheduleError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ScheduleError::ValidationFailure(message.into())
    }
}

impl From<sqlx::Error> for ScheduleError {
    fn from(e: sqlx::Error) -> Self {
        ScheduleError::StorageFailure(e.to_string())
    }
}

impl ResponseError for ScheduleError {
    fn status_code(&self) -> StatusCode {
        match self {
            ScheduleError::NotFound { .. } => StatusCode::NOT_FOUND,
            ScheduleError::ValidationFailure(_) => StatusCode::BAD_REQUEST,
            ScheduleError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // storage details stay in the log
        let message = match self {
            ScheduleError::StorageFailure(_) => "Something went wrong, Contact with system admin".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
