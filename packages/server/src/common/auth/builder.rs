use super::{AdminCapability, AuthError};
use crate::common::entity_ids::MemberId;

/// Entry point for authorization checks
pub struct Actor {
    actor_id: MemberId,
    is_admin: bool,
}

impl Actor {
    /// `is_admin` comes from the verified bearer token.
    pub fn new(actor_id: MemberId, is_admin: bool) -> Self {
        Self { actor_id, is_admin }
    }

    pub fn id(&self) -> MemberId {
        self.actor_id
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: AdminCapability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor_id: self.actor_id,
            is_admin: self.is_admin,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor_id: MemberId,
    is_admin: bool,
    capability: AdminCapability,
}

impl CapabilityBuilder {
    /// Perform the authorization check, returning the actor id on success.
    pub fn check(self) -> Result<MemberId, AuthError> {
        // Every capability on this platform is admin-only.
        if !self.is_admin {
            tracing::warn!(
                actor_id = %self.actor_id,
                capability = self.capability.as_str(),
                "Admin capability denied"
            );
            return Err(AuthError::AdminRequired(self.capability.as_str()));
        }

        Ok(self.actor_id)
    }
}
