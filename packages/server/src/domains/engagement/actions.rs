//! Like toggle actions

use serde::Serialize;
use tracing::{info, warn};

use crate::common::{CoreError, CoreResult, MemberId, TipId};
use crate::domains::moderation::Moderatable;
use crate::domains::tips::{Tip, TipLike, TipLikeOutcome};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeSummary {
    pub like_count: i32,
    pub liked: bool,
}

/// Add the member to the tip's like set
pub async fn like(tip_id: TipId, member_id: MemberId, deps: &ServerDeps) -> CoreResult<LikeSummary> {
    ensure_tip_exists(tip_id, deps).await?;

    let outcome = TipLike::add(tip_id, member_id, &deps.db_pool).await?;
    if !outcome.changed {
        warn!(tip_id = %tip_id, member_id = %member_id, "Tip already liked");
        if deps.engagement_policy.strict_toggle {
            return Err(CoreError::AlreadyLiked);
        }
    } else {
        info!(tip_id = %tip_id, member_id = %member_id, like_count = outcome.like_count, "Tip liked");
    }

    Ok(summary(outcome, true))
}

/// Remove the member from the tip's like set
pub async fn unlike(
    tip_id: TipId,
    member_id: MemberId,
    deps: &ServerDeps,
) -> CoreResult<LikeSummary> {
    ensure_tip_exists(tip_id, deps).await?;

    let outcome = TipLike::remove(tip_id, member_id, &deps.db_pool).await?;
    if !outcome.changed {
        warn!(tip_id = %tip_id, member_id = %member_id, "Tip was not liked");
        if deps.engagement_policy.strict_toggle {
            return Err(CoreError::NotLiked);
        }
    } else {
        info!(tip_id = %tip_id, member_id = %member_id, like_count = outcome.like_count, "Tip unliked");
    }

    Ok(summary(outcome, false))
}

async fn ensure_tip_exists(tip_id: TipId, deps: &ServerDeps) -> CoreResult<()> {
    match Tip::find_by_id(tip_id, &deps.db_pool).await? {
        Some(_) => Ok(()),
        None => Err(CoreError::not_found(Tip::ENTITY, tip_id)),
    }
}

fn summary(outcome: TipLikeOutcome, liked: bool) -> LikeSummary {
    LikeSummary {
        like_count: outcome.like_count,
        liked,
    }
}
