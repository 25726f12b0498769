//! Order reporting commands.

use sable_storefront::db::{self, OrderRepository};
use tracing::info;

/// Log the `limit` most recent orders, newest first.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the query fails.
pub async fn list(limit: i64) -> Result<(), Box<dyn std::error::Error>> {
    if limit < 1 {
        return Err("--limit must be at least 1".into());
    }

    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url).await?;

    let orders = OrderRepository::new(&pool).list_recent(limit).await?;
    if orders.is_empty() {
        info!("No orders yet");
        return Ok(());
    }

    info!("Recent orders");
    info!("=============");
    for order in &orders {
        info!(
            "  {} {} {:<9} {:>3} items {:>12}  {}",
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.order_number,
            order.status,
            order.item_count,
            order.total,
            order.email,
        );
    }
    info!("{} orders shown", orders.len());

    Ok(())
}
