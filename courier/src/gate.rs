use common::types::role::Role;

use crate::errors::SessionError;

/// Capability check consumed from the auth collaborator. Injected into the
/// feed and session entry points rather than looked up via global state.
#[derive(Debug, Clone)]
pub struct RoleGate {
    role: Role,
}

impl RoleGate {
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    /// The feed and delivery screens are driver-only.
    pub fn require_driver(&self) -> Result<(), SessionError> {
        if self.role == Role::Driver {
            Ok(())
        } else {
            Err(SessionError::AccessDenied)
        }
    }
}
