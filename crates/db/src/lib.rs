//! Database layer for GroundTruth
//!
//! Provides SurrealDB integration with schema management and the flight
//! graph repository. The `engine::any` connection type serves in-memory,
//! local RocksDB, and remote WebSocket endpoints alike.

pub mod error;
pub mod repository;
pub mod schema;

pub use error::{DbError, Result};
pub use repository::{FlightRepository, GraphStats, Resolution};

#[cfg(feature = "rocksdb")]
use std::path::Path;

use surrealdb::engine::any::{connect, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;

/// Database connection type
pub type DbConnection = Surreal<Any>;

/// Connect to a remote SurrealDB endpoint (e.g. ws://localhost:8000) with
/// root credentials
pub async fn init_remote(uri: &str, username: &str, password: &str) -> Result<DbConnection> {
    let db = connect(uri)
        .await
        .map_err(|e| DbError::Connection(e.to_string()))?;
    db.signin(Root { username, password })
        .await
        .map_err(|e| DbError::Connection(e.to_string()))?;
    setup_database(&db).await?;
    Ok(db)
}

/// Initialize database with RocksDB (persistent)
#[cfg(feature = "rocksdb")]
pub async fn init_persistent(path: impl AsRef<Path>) -> Result<DbConnection> {
    let db = connect(format!("rocksdb://{}", path.as_ref().display())).await?;
    setup_database(&db).await?;
    Ok(db)
}

/// Initialize database in-memory (for testing)
pub async fn init_memory() -> Result<DbConnection> {
    let db = connect("mem://").await?;
    setup_database(&db).await?;
    Ok(db)
}

/// Setup database namespace, database, and schema
async fn setup_database(db: &DbConnection) -> Result<()> {
    db.use_ns("groundtruth").use_db("flights").await?;
    schema::initialize_schema(db).await?;
    Ok(())
}
