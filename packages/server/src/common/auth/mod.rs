/// Authorization checks for controller code.
///
/// The core actions never check *who* is calling; routes do, before calling in:
///
/// ```rust
/// use community_core::common::{Actor, AdminCapability, MemberId};
///
/// let result = Actor::new(MemberId::new(), true)
///     .can(AdminCapability::ModerateSubmissions)
///     .check();
/// assert!(result.is_ok());
/// ```

mod builder;
mod capability;
mod errors;

pub use builder::{Actor, CapabilityBuilder};
pub use capability::AdminCapability;
pub use errors::AuthError;
