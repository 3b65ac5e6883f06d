use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

const MAX_CONNECTIONS: u32 = 20;
const MIN_CONNECTIONS: u32 = 2;

/// Open the connection pool.
///
/// Booking and payment confirmation each hold one connection for the length of a
/// short transaction, so the pool bounds how many can run at once.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(database_url);
    opts.max_connections(MAX_CONNECTIONS)
        .min_connections(MIN_CONNECTIONS)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(false);

    let db = Database::connect(opts).await?;
    Ok(db)
}
