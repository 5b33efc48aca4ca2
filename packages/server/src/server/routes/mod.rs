// HTTP routes
pub mod engagement;
pub mod events;
pub mod health;
pub mod moderation;

pub use engagement::*;
pub use events::*;
pub use health::*;
pub use moderation::*;
