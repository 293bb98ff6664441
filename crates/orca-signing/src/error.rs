use thiserror::Error;

#[derive(Error, Debug)]
pub enum SigningError {
    #[error("no signing key configured")]
    KeyUnavailable,

    #[error("signing key material invalid: {0}")]
    InvalidKey(String),

    #[error("signature verification failed")]
    VerificationFailed,

    #[error("io error loading key material: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SigningError>;
