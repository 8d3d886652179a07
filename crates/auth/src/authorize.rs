use thiserror::Error;

use crate::context::InvocationContext;
use crate::roles::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unexpected organization: {0}")]
    UnknownOrganization(String),

    #[error("forbidden: {role} may not invoke '{command}'")]
    Forbidden { command: String, role: Role },
}

/// Command-side authorization contract, checked before dispatch.
pub trait CommandAuthorization {
    fn command_name(&self) -> &str;

    /// Roles allowed to invoke the command; `None` means any participant.
    fn allowed_roles(&self) -> Option<&'static [Role]>;
}

/// Check the caller's role against a command's allow-list.
///
/// - No IO
/// - No business logic
pub fn authorize<C>(ctx: &InvocationContext, command: &C) -> Result<(), AuthzError>
where
    C: CommandAuthorization + ?Sized,
{
    match command.allowed_roles() {
        None => Ok(()),
        Some(roles) if roles.contains(&ctx.caller_role()) => Ok(()),
        Some(_) => Err(AuthzError::Forbidden {
            command: command.command_name().to_string(),
            role: ctx.caller_role(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OnlyLogistics;

    impl CommandAuthorization for OnlyLogistics {
        fn command_name(&self) -> &str {
            "logistics-accept-and-ship"
        }

        fn allowed_roles(&self) -> Option<&'static [Role]> {
            Some(&[Role::Logistics])
        }
    }

    struct Anyone;

    impl CommandAuthorization for Anyone {
        fn command_name(&self) -> &str {
            "history"
        }

        fn allowed_roles(&self) -> Option<&'static [Role]> {
            None
        }
    }

    #[test]
    fn allowed_role_passes() {
        let ctx = InvocationContext::new(Role::Logistics, "carrier-7");
        assert!(authorize(&ctx, &OnlyLogistics).is_ok());
    }

    #[test]
    fn other_role_is_forbidden() {
        let ctx = InvocationContext::new(Role::Distributor, "dist-1");
        let err = authorize(&ctx, &OnlyLogistics).unwrap_err();
        match &err {
            AuthzError::Forbidden { command, role } => {
                assert_eq!(command, "logistics-accept-and-ship");
                assert_eq!(*role, Role::Distributor);
            }
            _ => panic!("Expected Forbidden error"),
        }
        assert!(err.to_string().contains("Distributor may not invoke"));
    }

    #[test]
    fn unrestricted_command_accepts_everyone() {
        for role in Role::ALL {
            let ctx = InvocationContext::new(role, "x");
            assert!(authorize(&ctx, &Anyone).is_ok());
        }
    }
}
