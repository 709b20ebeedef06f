use crate::domain::model::UserId;
use crate::domain::ports::SessionGate;

/// Session with a fixed identity, decided when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticSession {
    identity: Option<UserId>,
}

impl StaticSession {
    pub fn signed_in(user: UserId) -> Self {
        Self {
            identity: Some(user),
        }
    }

    pub fn anonymous() -> Self {
        Self { identity: None }
    }
}

impl SessionGate for StaticSession {
    fn current_identity(&self) -> Option<UserId> {
        self.identity
    }
}
