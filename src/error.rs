use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::domain::item::ItemError;
use crate::domain::member::MemberError;
use crate::domain::order::OrderError;
use crate::persistence::{InvalidPage, NotLoaded};

// ============================================================================
// Application Errors
// ============================================================================
//
// Domain rule violations map to 4xx; storage failures and strategies that
// skipped an association they needed map to 500 with a generic body.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Member(#[from] MemberError),

    #[error(transparent)]
    Item(#[from] ItemError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Unknown query version: {0}")]
    UnknownStrategy(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    NotLoaded(#[from] NotLoaded),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<InvalidPage> for AppError {
    fn from(err: InvalidPage) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl AppError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        AppError::NotFound { entity, id }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Member(MemberError::DuplicateName(_)) => StatusCode::CONFLICT,
            AppError::Member(MemberError::EmptyName) => StatusCode::BAD_REQUEST,

            AppError::Item(ItemError::NotEnoughStock { .. }) => StatusCode::CONFLICT,
            AppError::Item(_) => StatusCode::BAD_REQUEST,

            AppError::Order(OrderError::AlreadyCancelled | OrderError::AlreadyDelivered) => StatusCode::CONFLICT,
            AppError::Order(OrderError::EmptyLines | OrderError::InvalidCount(_)) => StatusCode::BAD_REQUEST,
            AppError::Order(OrderError::Association(_)) => StatusCode::INTERNAL_SERVER_ERROR,

            AppError::NotFound { .. } | AppError::UnknownStrategy(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotLoaded(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "❌ Request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
            self.to_string()
        };

        HttpResponse::build(status).json(serde_json::json!({ "error": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::from(MemberError::DuplicateName("kim".into())), 409),
            (
                AppError::from(ItemError::NotEnoughStock { item_id: 1, requested: 5, available: 2 }),
                409,
            ),
            (AppError::from(OrderError::AlreadyDelivered), 409),
            (AppError::from(OrderError::AlreadyCancelled), 409),
            (AppError::from(OrderError::EmptyLines), 400),
            (AppError::not_found("member", 7), 404),
            (AppError::UnknownStrategy("v9".into()), 404),
            (AppError::from(InvalidPage::NegativeOffset(-1)), 400),
            (AppError::from(NotLoaded("member")), 500),
            (AppError::from(sqlx::Error::RowNotFound), 500),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{}", err);
        }
    }

    #[test]
    fn test_client_errors_carry_message() {
        let response = AppError::not_found("item", 3).error_response();
        let body = response.into_body().try_into_bytes().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "item 3 not found");
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let response = AppError::from(NotLoaded("orderItems")).error_response();
        let body = response.into_body().try_into_bytes().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "Internal server error");
    }
}
