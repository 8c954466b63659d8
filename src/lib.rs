//! # roster - A Personnel Registry
//!
//! roster keeps personnel records in memory, keyed by an upper-cased identity,
//! and mirrors them to a JSON snapshot after every change. On top of the store
//! it offers alphabetical ordering by identity and k-nearest-neighbor search
//! over absenteeism, performance score and compensation.
//!
//! ## Example
//!
//! ```
//! use roster::{NewRecord, Store};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut store = Store::load(dir.path().join("roster.json")).unwrap();
//!
//! for (name, pay, absent, score) in [
//!     ("ana", 1000.0, 2.0, 90.0),
//!     ("bea", 1100.0, 3.0, 85.0),
//!     ("cia", 5000.0, 10.0, 40.0),
//! ] {
//!     store.add(NewRecord {
//!         identity: name.to_string(),
//!         compensation: pay,
//!         absenteeism_rate: absent,
//!         performance_score: score,
//!         ..NewRecord::default()
//!     }).unwrap();
//! }
//!
//! // Closest record to ANA
//! let neighbors = store.find_nearest("ana", 1).unwrap();
//! assert_eq!(neighbors[0].record.identity(), "BEA");
//!
//! let names: Vec<&str> = store.sorted_by_identity().iter().map(|r| r.identity()).collect();
//! assert_eq!(names, ["ANA", "BEA", "CIA"]);
//! ```

pub mod config;
pub mod error;
pub mod knn;
pub mod logging;
pub mod record;
pub mod server;
pub mod sort;
mod store;

// Re-export the primary public API
pub use error::{PersistenceError, Result, RosterError, ValidationError};
pub use knn::Neighbor;
pub use record::{NewRecord, Record};
pub use store::Store;
