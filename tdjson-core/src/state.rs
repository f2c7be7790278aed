//! Lifecycle automaton for a native client handle.
//!
//! `Uninitialized -> Created -> (execute)* -> Destroyed`. `Destroyed` is
//! terminal.

/// Client handle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// No native handle yet.
    Uninitialized,
    /// Native handle is live and usable.
    Created,
    /// Native handle was released.
    Destroyed,
}

impl ClientState {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Destroyed)
    }

    /// Get valid transitions from current state.
    pub fn valid_transitions(&self) -> &'static [ClientState] {
        match self {
            Self::Uninitialized => &[Self::Created],
            Self::Created => &[Self::Created, Self::Destroyed],
            Self::Destroyed => &[],
        }
    }

    /// Check if transition to target state is valid.
    pub fn can_transition_to(&self, target: ClientState) -> bool {
        self.valid_transitions().contains(&target)
    }
}

/// Events that drive client state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEvent {
    /// Create entry point returned a non-null handle.
    Created,
    /// A request is about to cross the native boundary.
    RequestIssued,
    /// Destroy entry point is about to be called.
    DestroyRequested,
}
