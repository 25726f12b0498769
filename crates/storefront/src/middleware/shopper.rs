//! Shopper extractor.
//!
//! Resolves the shopper id stored in the session (minting one on first
//! visit) and hands the handler that shopper's state.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;
use tracing::Span;

use crate::error::AppError;
use crate::models::session::{ShopperId, keys};
use crate::services::ShopperSession;
use crate::state::AppState;

/// The current request's shopper.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentShopper(shopper): CurrentShopper) -> impl IntoResponse {
///     let count = shopper.lock().await.cart.item_count();
///     format!("{count} items")
/// }
/// ```
pub struct CurrentShopper(pub Arc<ShopperSession>);

impl FromRequestParts<AppState> for CurrentShopper {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let id = shopper_id(session, true)
            .await?
            .ok_or_else(|| AppError::Internal("shopper id not assigned".to_string()))?;

        Span::current().record("shopper_id", tracing::field::display(id));

        Ok(Self(state.shoppers().get_or_create(id).await))
    }
}

/// Read the shopper id from the session, assigning a new one if `create`.
///
/// # Errors
///
/// Returns `AppError::Internal` if the session store fails.
pub async fn shopper_id(session: &Session, create: bool) -> Result<Option<ShopperId>, AppError> {
    let existing = session
        .get::<ShopperId>(keys::SHOPPER_ID)
        .await
        .map_err(|e| AppError::Internal(format!("session read failed: {e}")))?;

    match existing {
        Some(id) => Ok(Some(id)),
        None if create => {
            let id = ShopperId::generate();
            session
                .insert(keys::SHOPPER_ID, id)
                .await
                .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
            Ok(Some(id))
        }
        None => Ok(None),
    }
}

/// End the shopper session: drop shopper state and clear the cookie session.
///
/// Returns whether there was shopper state to drop.
///
/// # Errors
///
/// Returns `AppError::Internal` if the session store fails.
pub async fn end_shopper_session(session: &Session, state: &AppState) -> Result<bool, AppError> {
    let ended = match shopper_id(session, false).await? {
        Some(id) => state.shoppers().end(id).await,
        None => false,
    };

    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("session flush failed: {e}")))?;

    Ok(ended)
}
