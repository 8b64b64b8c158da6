// ==========================================
// Foundry QC Tracker - capability checks
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::{Actor, Capability};

/// Fail with PermissionDenied unless the actor's role grants `capability`
pub fn require(actor: &Actor, capability: Capability) -> ApiResult<()> {
    if actor.can(capability) {
        return Ok(());
    }
    tracing::warn!(
        actor = %actor.name,
        role = %actor.role,
        capability = %capability,
        "capability check failed"
    );
    Err(ApiError::PermissionDenied(format!(
        "role '{}' lacks {}",
        actor.role, capability
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Role;

    #[test]
    fn test_require() {
        let operator = Actor::new("op", Role::Operator);
        assert!(require(&operator, Capability::Edit).is_ok());
        assert!(matches!(
            require(&operator, Capability::Approve),
            Err(ApiError::PermissionDenied(_))
        ));
        assert!(require(&Actor::anonymous(), Capability::View).is_ok());
    }
}
