//! Interfaces of the external collaborators a worker consumes.
mod graph;
mod phase;
mod store;
pub use graph::GraphManager;
pub use phase::{PhaseContext, RunPhase};
pub use store::DataStore;
