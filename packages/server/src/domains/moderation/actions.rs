//! Moderation actions - the submission state machine, written once for every
//! `Moderatable` entity.
//!
//! ```text
//! pending ──approve──► approved   (terminal)
//!    └─────reject────► rejected   (terminal)
//! ```

use serde_json::json;
use tracing::{info, warn};

use crate::common::{CoreError, CoreResult, Id, MemberId};
use crate::domains::moderation::models::{Moderatable, ModerationDecision};
use crate::kernel::{Notification, NotificationKind, ServerDeps};

/// Approve a pending submission.
///
/// Fails with `InvalidTransition` when the submission was already resolved,
/// including by a concurrent request that won the race.
pub async fn approve<T: Moderatable>(
    id: Id<T::Marker>,
    admin_id: MemberId,
    deps: &ServerDeps,
) -> CoreResult<T> {
    info!(entity = T::ENTITY, submission_id = %id, admin_id = %admin_id, "Approving submission");

    resolve(id, admin_id, ModerationDecision::Approve, deps).await
}

/// Reject a pending submission with a reason shown to the submitter.
pub async fn reject<T: Moderatable>(
    id: Id<T::Marker>,
    admin_id: MemberId,
    reason: String,
    deps: &ServerDeps,
) -> CoreResult<T> {
    info!(entity = T::ENTITY, submission_id = %id, admin_id = %admin_id, "Rejecting submission");

    deps.moderation_policy.validate_reason(&reason)?;

    resolve(id, admin_id, ModerationDecision::Reject { reason }, deps).await
}

/// Delete a submission in any state. Not part of the state machine.
pub async fn delete<T: Moderatable>(id: Id<T::Marker>, deps: &ServerDeps) -> CoreResult<()> {
    if !T::delete(id, &deps.db_pool).await? {
        return Err(CoreError::not_found(T::ENTITY, id));
    }

    info!(entity = T::ENTITY, submission_id = %id, "Submission deleted");
    Ok(())
}

/// Submissions waiting for an admin decision
pub async fn pending<T: Moderatable>(deps: &ServerDeps) -> CoreResult<Vec<T>> {
    Ok(T::find_pending(&deps.db_pool).await?)
}

async fn resolve<T: Moderatable>(
    id: Id<T::Marker>,
    admin_id: MemberId,
    decision: ModerationDecision,
    deps: &ServerDeps,
) -> CoreResult<T> {
    let pool = &deps.db_pool;

    let Some(record) = T::resolve_if_pending(id, admin_id, &decision, pool).await? else {
        // Guard did not match: either the row is gone or it is no longer pending.
        return match T::find_by_id(id, pool).await? {
            None => Err(CoreError::not_found(T::ENTITY, id)),
            Some(current) => {
                warn!(
                    entity = T::ENTITY,
                    submission_id = %id,
                    status = %current.moderation().status,
                    attempted = decision.verb(),
                    "Submission already resolved"
                );
                Err(CoreError::invalid_transition(
                    T::ENTITY,
                    id,
                    current.moderation().status,
                    decision.verb(),
                ))
            }
        };
    };

    info!(
        entity = T::ENTITY,
        submission_id = %id,
        status = %record.moderation().status,
        "Submission resolved"
    );

    deps.notifications.dispatch(decision_notification(&record, &decision));

    Ok(record)
}

fn decision_notification<T: Moderatable>(record: &T, decision: &ModerationDecision) -> Notification {
    let kind = match decision {
        ModerationDecision::Approve => NotificationKind::SubmissionApproved,
        ModerationDecision::Reject { .. } => NotificationKind::SubmissionRejected,
    };

    let mut payload = json!({
        "entity": T::ENTITY,
        "submission_id": record.id(),
        "title": record.title(),
    });
    if let Some(reason) = decision.reason() {
        payload["reason"] = json!(reason);
    }

    Notification::new(kind, record.submitted_by(), payload)
}
