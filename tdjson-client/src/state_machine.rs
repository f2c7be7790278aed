//! Lifecycle tracking for a native client handle.

use tdjson_core::{ClientEvent, ClientState, TdError, TdResult};

/// State machine guarding a single client handle.
#[derive(Debug)]
pub struct ClientStateMachine {
    state: ClientState,
    requests: u64,
}

impl ClientStateMachine {
    /// Create a new client state machine.
    pub fn new() -> Self {
        Self {
            state: ClientState::Uninitialized,
            requests: 0,
        }
    }

    /// Get current state.
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Number of requests issued through the handle.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Native create returned a handle.
    pub fn on_created(&mut self) -> TdResult<()> {
        self.transition(ClientEvent::Created)
    }

    /// A request is about to be issued.
    pub fn on_request(&mut self) -> TdResult<()> {
        self.transition(ClientEvent::RequestIssued)?;
        self.requests += 1;
        Ok(())
    }

    /// The handle is about to be destroyed.
    pub fn on_destroy(&mut self) -> TdResult<()> {
        self.transition(ClientEvent::DestroyRequested)
    }

    /// Transition to new state.
    fn transition(&mut self, event: ClientEvent) -> TdResult<()> {
        let new_state = match (self.state, event) {
            (ClientState::Uninitialized, ClientEvent::Created) => ClientState::Created,
            (ClientState::Created, ClientEvent::RequestIssued) => ClientState::Created,
            (ClientState::Created, ClientEvent::DestroyRequested) => ClientState::Destroyed,
            (ClientState::Destroyed, _) => return Err(TdError::ClientDestroyed),
            _ => {
                return Err(TdError::Lifecycle(format!(
                    "Invalid transition from {:?} on {:?}",
                    self.state, event
                )));
            }
        };

        if self.state.can_transition_to(new_state) {
            tracing::debug!("Client state: {:?} -> {:?}", self.state, new_state);
            self.state = new_state;
            Ok(())
        } else {
            Err(TdError::Lifecycle(format!(
                "Invalid state transition: {:?} -> {:?}",
                self.state, new_state
            )))
        }
    }
}

impl Default for ClientStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_lifecycle() {
        let mut sm = ClientStateMachine::new();
        assert_eq!(sm.state(), ClientState::Uninitialized);

        sm.on_created().unwrap();
        assert_eq!(sm.state(), ClientState::Created);

        sm.on_request().unwrap();
        sm.on_request().unwrap();
        assert_eq!(sm.state(), ClientState::Created);
        assert_eq!(sm.requests(), 2);

        sm.on_destroy().unwrap();
        assert_eq!(sm.state(), ClientState::Destroyed);
    }

    #[test]
    fn nothing_leaves_destroyed() {
        let mut sm = ClientStateMachine::new();
        sm.on_created().unwrap();
        sm.on_destroy().unwrap();

        assert!(matches!(sm.on_request(), Err(TdError::ClientDestroyed)));
        assert!(matches!(sm.on_destroy(), Err(TdError::ClientDestroyed)));
        assert!(matches!(sm.on_created(), Err(TdError::ClientDestroyed)));
        assert_eq!(sm.requests(), 0);
    }

    #[test]
    fn requests_need_a_handle() {
        let mut sm = ClientStateMachine::new();
        assert!(matches!(sm.on_request(), Err(TdError::Lifecycle(_))));
        assert!(matches!(sm.on_destroy(), Err(TdError::Lifecycle(_))));

        sm.on_created().unwrap();
        assert!(matches!(sm.on_created(), Err(TdError::Lifecycle(_))));
    }
}
