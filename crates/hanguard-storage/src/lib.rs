//! Rights store for the Hanguard door-bus gateway.
//!
//! This crate answers the only question the gateway ever asks: may the chip
//! presented at a door open it? It provides:
//!
//! - [`AccessRepository`] - the lookup trait consumed by the decision engine
//! - [`SqliteAccessRepository`] - SQLite-backed implementation (sqlx)
//! - [`MemoryAccessRepository`] - in-memory implementation for tests and
//!   small fixed deployments
//! - [`Database`] / [`DatabaseConfig`] - connection pool with embedded schema
//! - [`DoorDirectory`] - the immutable door cache built once at startup
//! - [`DecisionEngine`] - the fail-closed grant/deny resolver
//!
//! # Data model
//!
//! Members present chips; the lookup key space is chip -> member, and several
//! chips may resolve to the same member. A grant is a bare relation between a
//! member and a door: presence means authorized, absence means denied.
//!
//! The tables are read at process start and treated as immutable for the
//! run's duration; updating the store requires a gateway restart.
//!
//! # Fail-closed policy
//!
//! Every ambiguous or erroring lookup resolves to "deny access". A broken
//! database connection can never open a door.
//!
//! # Example
//!
//! ```no_run
//! use hanguard_core::{ChipId, DoorId};
//! use hanguard_storage::{
//!     AccessOutcome, AccessRepository, Database, DatabaseConfig, DecisionEngine, DoorDirectory,
//!     SqliteAccessRepository,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("hanguard.db")).await?;
//! let repo = SqliteAccessRepository::new(db.pool().clone());
//!
//! let doors = DoorDirectory::load(&repo).await?;
//! let engine = DecisionEngine::new(repo, doors, 3);
//!
//! let chip = ChipId::new("0490AF22")?;
//! match engine.decide(&chip, DoorId::new(5)?).await {
//!     AccessOutcome::Granted { allow_secs } => println!("open for {allow_secs}s"),
//!     outcome => println!("denied: {outcome:?}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod decision;
pub mod directory;
pub mod error;
pub mod memory;
pub mod models;
pub mod repository;

pub use connection::{Database, DatabaseConfig};
pub use decision::{AccessOutcome, DecisionEngine};
pub use directory::DoorDirectory;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryAccessRepository;
pub use models::{Door, Member};
pub use repository::{AccessRepository, SqliteAccessRepository};
