use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("provider discovery failed: {0}")]
    Discovery(String),

    #[error("token exchange failed: {0}")]
    Exchange(String),

    #[error("id token verification failed: {0}")]
    Verification(String),

    #[error("token response carried no id token")]
    MissingIdToken,
}
