//! Data store.
use anyhow::Result;

/// Remote synchronization of checkpoint artifacts.
///
/// The transport (filesystem, object store, ...) is the implementor's
/// concern. The worker calls [`load_from_store`](Self::load_from_store) to
/// refresh its local view of the ledger and checkpoint payloads, and
/// [`save_finished_to_store`](Self::save_finished_to_store) exactly once when
/// evaluation reports completion.
pub trait DataStore {
    /// Pulls remote ledger and checkpoint artifacts into the local view.
    fn load_from_store(&mut self) -> Result<()>;

    /// Publishes a completion marker to the store.
    fn save_finished_to_store(&mut self) -> Result<()>;
}
