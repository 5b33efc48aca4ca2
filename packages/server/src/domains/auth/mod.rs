//! Auth domain - bearer tokens identifying the acting member.
//!
//! Tokens are issued elsewhere (login is out of scope for this service); the
//! server only verifies them and reads the member id and admin flag.

pub mod jwt;

pub use jwt::{Claims, JwtService};
