use serde::{Deserialize, Serialize};

use crate::authorize::AuthzError;
use crate::roles::Role;

/// Who is invoking an operation.
///
/// Built once per invocation from the authenticated identity and passed
/// explicitly to every component; nothing about the caller is kept in
/// process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationContext {
    caller_role: Role,
    caller_id: String,
}

impl InvocationContext {
    pub fn new(caller_role: Role, caller_id: impl Into<String>) -> Self {
        Self {
            caller_role,
            caller_id: caller_id.into(),
        }
    }

    /// Build a context from the caller's MSP id.
    pub fn from_msp_id(msp_id: &str, caller_id: impl Into<String>) -> Result<Self, AuthzError> {
        Ok(Self::new(Role::from_msp_id(msp_id)?, caller_id))
    }

    pub fn caller_role(&self) -> Role {
        self.caller_role
    }

    pub fn caller_id(&self) -> &str {
        &self.caller_id
    }

    /// The caller's organization name, as recorded in progress entries.
    pub fn organization_name(&self) -> &'static str {
        self.caller_role.organization_name()
    }
}
