//! Session middleware configuration.
//!
//! Sessions use the in-memory `tower-sessions` store: they only carry the
//! shopper id, and shopper state is never written to the database.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sable_session";

/// Create the session layer with an in-memory store.
///
/// Sessions expire after the same idle period as shopper state.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    let idle_seconds = i64::try_from(config.session_idle.as_secs()).unwrap_or(i64::MAX);

    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(idle_seconds),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
