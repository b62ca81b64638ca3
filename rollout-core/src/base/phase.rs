//! Run phases and the scoped phase context.
use super::graph::GraphManager;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Phase a graph manager runs in.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum RunPhase {
    /// No phase is active.
    Undefined,

    /// Initial exploration before training.
    Heatup,

    /// Training.
    Train,

    /// Evaluation of a trained model.
    Test,
}

/// Scoped acquisition of a run phase.
///
/// Sets the phase on entry and resets it to [`RunPhase::Undefined`] when
/// dropped, so the phase is restored on every exit path, early returns and
/// `?`-propagated errors included. The graph manager stays usable through
/// the guard via deref.
pub struct PhaseContext<'a, G: GraphManager + ?Sized> {
    graph_manager: &'a mut G,
}

impl<'a, G: GraphManager + ?Sized> PhaseContext<'a, G> {
    /// Enters `phase` on the given graph manager.
    pub fn enter(graph_manager: &'a mut G, phase: RunPhase) -> Self {
        graph_manager.set_phase(phase);
        Self { graph_manager }
    }
}

impl<'a, G: GraphManager + ?Sized> Deref for PhaseContext<'a, G> {
    type Target = G;

    fn deref(&self) -> &Self::Target {
        self.graph_manager
    }
}

impl<'a, G: GraphManager + ?Sized> DerefMut for PhaseContext<'a, G> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.graph_manager
    }
}

impl<'a, G: GraphManager + ?Sized> Drop for PhaseContext<'a, G> {
    fn drop(&mut self) {
        self.graph_manager.set_phase(RunPhase::Undefined);
    }
}
