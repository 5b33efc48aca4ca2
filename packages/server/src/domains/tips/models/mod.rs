pub mod tip;
pub mod tip_like;

pub use tip::{NewTip, Tip};
pub use tip_like::{TipLike, TipLikeOutcome};
