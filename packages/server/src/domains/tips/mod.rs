//! Tips domain - community tips (moderated like directory listings) and the
//! like set attached to each tip.

pub mod models;

pub use models::{NewTip, Tip, TipLike, TipLikeOutcome};
