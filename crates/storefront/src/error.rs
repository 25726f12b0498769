//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Every error body is JSON: `{ "error": "<message>" }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sable_core::CheckoutError;
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::catalog::CatalogError;
use crate::services::orders::OrderError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Catalog read failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Checkout wizard refused a transition.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Server-side order write failed.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Input parsed but failed validation.
    #[error("{0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Catalog(_) => StatusCode::BAD_GATEWAY,
            Self::Checkout(err) => match err {
                CheckoutError::MissingShippingFields(_) | CheckoutError::EmptyCart => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                CheckoutError::PaymentInProgress
                | CheckoutError::AlreadyAtReview
                | CheckoutError::NoPreviousStep
                | CheckoutError::NotAtReview => StatusCode::CONFLICT,
            },
            Self::Order(err) => match err {
                OrderError::InvalidEmail(_) | OrderError::NoItems | OrderError::InvalidQuantity(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                OrderError::UnknownProduct(_) => StatusCode::NOT_FOUND,
                OrderError::InsufficientStock { .. } => StatusCode::CONFLICT,
                OrderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Catalog(_) | Self::Order(OrderError::Repository(_))
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Order(OrderError::Repository(_)) => {
                "Internal server error".to_string()
            }
            Self::Catalog(_) => "Catalog unavailable".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of shopper
/// actions leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "p1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
