//! Bounded-time confirmation for conflicting grants.
//!
//! A [`DecisionHandle`] is created when a grant would strip a conflicting
//! role hierarchy. The adapter shows the choices, forwards the first click
//! through [`DecisionHandle::choose`], and the engine waits on
//! [`DecisionHandle::resolved`]. Whichever happens first, a choice or the
//! deadline, settles the decision for good.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{Instant, timeout_at};
use uuid::Uuid;

/// What the requester can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictChoice {
    /// Remove the conflicting hierarchy, then add the requested roles.
    Transfer,
    /// Add the requested roles and keep the conflicting ones.
    AddOnly,
    Cancel,
}

impl ConflictChoice {
    pub const ALL: [ConflictChoice; 3] = [Self::Transfer, Self::AddOnly, Self::Cancel];

    pub fn label(self) -> &'static str {
        match self {
            Self::Transfer => "Transfer",
            Self::AddOnly => "Add Only",
            Self::Cancel => "Cancel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionState {
    AwaitingChoice,
    Resolved(ConflictChoice),
    Expired,
}

impl DecisionState {
    pub fn is_pending(self) -> bool {
        matches!(self, Self::AwaitingChoice)
    }
}

/// A choice arrived after the decision was already settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("decision already closed: {0:?}")]
pub struct DecisionClosed(pub DecisionState);

struct Inner {
    id: Uuid,
    deadline: Instant,
    state: watch::Sender<DecisionState>,
}

/// Shared handle to one pending decision. Clones observe the same state.
#[derive(Clone)]
pub struct DecisionHandle {
    inner: Arc<Inner>,
}

impl DecisionHandle {
    pub fn new(timeout: Duration) -> Self {
        let (state, _) = watch::channel(DecisionState::AwaitingChoice);
        Self {
            inner: Arc::new(Inner {
                id: Uuid::now_v7(),
                deadline: Instant::now() + timeout,
                state,
            }),
        }
    }

    /// Correlates adapter button callbacks with this decision.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn deadline(&self) -> Instant {
        self.inner.deadline
    }

    pub fn state(&self) -> DecisionState {
        *self.inner.state.borrow()
    }

    /// Record the requester's answer. Only the first transition out of
    /// `AwaitingChoice` counts; a choice past the deadline expires the
    /// decision instead.
    pub fn choose(&self, choice: ConflictChoice) -> Result<(), DecisionClosed> {
        if Instant::now() >= self.inner.deadline {
            return Err(DecisionClosed(self.expire()));
        }
        if self.transition(DecisionState::Resolved(choice)) {
            tracing::debug!(decision = %self.inner.id, ?choice, "Decision resolved");
            Ok(())
        } else {
            Err(DecisionClosed(self.state()))
        }
    }

    /// Close the decision without a choice. Returns the final state, which is
    /// the earlier choice if one won the race.
    pub fn expire(&self) -> DecisionState {
        if self.transition(DecisionState::Expired) {
            tracing::debug!(decision = %self.inner.id, "Decision expired");
        }
        self.state()
    }

    /// Wait for a choice, up to the deadline. `None` means the decision
    /// expired.
    pub async fn resolved(&self) -> Option<ConflictChoice> {
        let mut rx = self.inner.state.subscribe();
        let settled = match timeout_at(self.inner.deadline, rx.wait_for(|s| !s.is_pending())).await
        {
            Ok(Ok(state)) => *state,
            // The sender lives in `inner`, so the channel never closes while we wait.
            Ok(Err(_)) | Err(_) => self.expire(),
        };

        match settled {
            DecisionState::Resolved(choice) => Some(choice),
            DecisionState::AwaitingChoice | DecisionState::Expired => None,
        }
    }

    fn transition(&self, next: DecisionState) -> bool {
        self.inner.state.send_if_modified(|state| {
            if state.is_pending() {
                *state = next;
                true
            } else {
                false
            }
        })
    }
}

impl std::fmt::Debug for DecisionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionHandle")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(180);

    #[tokio::test(start_paused = true)]
    async fn first_choice_wins() {
        let handle = DecisionHandle::new(TIMEOUT);
        assert!(handle.state().is_pending());

        handle.choose(ConflictChoice::Transfer).unwrap();
        let err = handle.choose(ConflictChoice::Cancel).unwrap_err();
        assert_eq!(err.0, DecisionState::Resolved(ConflictChoice::Transfer));

        assert_eq!(handle.expire(), DecisionState::Resolved(ConflictChoice::Transfer));
        assert_eq!(handle.resolved().await, Some(ConflictChoice::Transfer));
    }

    #[tokio::test(start_paused = true)]
    async fn waiter_sees_a_choice_made_elsewhere() {
        let handle = DecisionHandle::new(TIMEOUT);
        let clicker = handle.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            clicker.choose(ConflictChoice::AddOnly).unwrap();
        });

        assert_eq!(handle.resolved().await, Some(ConflictChoice::AddOnly));
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_decision_expires_at_the_deadline() {
        let handle = DecisionHandle::new(TIMEOUT);
        let started = Instant::now();

        assert_eq!(handle.resolved().await, None);
        assert!(Instant::now() - started >= TIMEOUT);
        assert_eq!(handle.state(), DecisionState::Expired);

        let err = handle.choose(ConflictChoice::Transfer).unwrap_err();
        assert_eq!(err.0, DecisionState::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn late_choice_is_rejected_even_before_anyone_waits() {
        let handle = DecisionHandle::new(TIMEOUT);
        tokio::time::advance(TIMEOUT + Duration::from_secs(1)).await;

        assert!(handle.choose(ConflictChoice::Transfer).is_err());
        assert_eq!(handle.state(), DecisionState::Expired);
    }
}
