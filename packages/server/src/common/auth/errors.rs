use thiserror::Error;

/// Authorization errors raised by the controller layer
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Admin access required for {0}")]
    AdminRequired(&'static str),
}
