//! Lineage graph persistence and the read API consumed by the lineage UI
//! and impact-analysis features.

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryGraphStore;
pub use postgres::PostgresGraphStore;
pub use store::GraphStore;
