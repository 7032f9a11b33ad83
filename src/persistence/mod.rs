//! Snapshot export/import
//!
//! Features:
//! - Versioned flat `Snapshot` (serde), no engine-internal identities
//! - Kind tags as strings so saves survive enum reordering
//! - Validation on restore with a typed `LoadError`
//!
//! Writing snapshots to disk is left to the host.

mod error;
mod snapshot;

pub use error::LoadError;
pub use snapshot::{
    EnemyRecord, FruitRecord, LayoutRecord, MapRecord, PlayerRecord, SNAPSHOT_VERSION, Snapshot,
};
