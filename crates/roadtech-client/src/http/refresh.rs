//! Single-flight coordination for token refresh.

use tokio::sync::{Mutex, oneshot};

use roadtech_core::ApiError;

/// What a parked request receives when the in-flight refresh settles: the
/// fresh access token, or the error that ended the cycle.
pub type RefreshOutcome = Result<String, ApiError>;

struct GateState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// At most one token refresh may run at a time. The first request to hit an
/// authentication failure becomes the lead and performs the refresh; every
/// request that fails while it runs parks here and shares the lead's outcome.
pub struct RefreshGate {
    state: Mutex<GateState>,
}

/// Result of [`RefreshGate::acquire_or_enqueue`].
pub enum GateTicket {
    /// Caller owns the refresh. It must finish with
    /// [`RefreshGate::complete_all`] on every exit path.
    Lead,
    /// A refresh is already in flight; await the shared outcome.
    Wait(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshGate {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                in_flight: false,
                waiters: Vec::new(),
            }),
        }
    }

    /// Become the lead, or park behind the refresh already running.
    pub async fn acquire_or_enqueue(&self) -> GateTicket {
        let mut state = self.state.lock().await;
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            GateTicket::Wait(rx)
        } else {
            state.in_flight = true;
            GateTicket::Lead
        }
    }

    /// Publish the outcome to every parked waiter and reopen the gate.
    pub async fn complete_all(&self, outcome: RefreshOutcome) {
        let mut state = self.state.lock().await;
        state.in_flight = false;
        for waiter in state.waiters.drain(..) {
            // A waiter that gave up is not an error.
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Default for RefreshGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_caller_leads_rest_wait() {
        let gate = RefreshGate::new();

        assert!(matches!(gate.acquire_or_enqueue().await, GateTicket::Lead));
        assert!(matches!(
            gate.acquire_or_enqueue().await,
            GateTicket::Wait(_)
        ));
        assert!(matches!(
            gate.acquire_or_enqueue().await,
            GateTicket::Wait(_)
        ));
    }

    #[tokio::test]
    async fn test_complete_all_wakes_waiters_with_shared_outcome() {
        let gate = RefreshGate::new();

        let GateTicket::Lead = gate.acquire_or_enqueue().await else {
            panic!("expected lead");
        };
        let GateTicket::Wait(rx1) = gate.acquire_or_enqueue().await else {
            panic!("expected wait");
        };
        let GateTicket::Wait(rx2) = gate.acquire_or_enqueue().await else {
            panic!("expected wait");
        };

        gate.complete_all(Ok("fresh-token".to_string())).await;

        assert_eq!(rx1.await.unwrap().unwrap(), "fresh-token");
        assert_eq!(rx2.await.unwrap().unwrap(), "fresh-token");
    }

    #[tokio::test]
    async fn test_gate_reopens_after_completion() {
        let gate = RefreshGate::new();

        let GateTicket::Lead = gate.acquire_or_enqueue().await else {
            panic!("expected lead");
        };
        gate.complete_all(Err(ApiError::Unauthenticated)).await;

        // A fresh cycle may start once the previous one settled.
        assert!(matches!(gate.acquire_or_enqueue().await, GateTicket::Lead));
    }
}
