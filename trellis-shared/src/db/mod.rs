/// Database layer
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: database migration runner
///
/// Models are in the `models` module at crate root level.

pub mod migrations;
pub mod pool;

pub use migrations::{ensure_database_exists, run_migrations};
pub use pool::{create_pool, health_check, DatabaseConfig};
