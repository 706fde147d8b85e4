use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid bind address: {0}")]
    BindAddress(String),
}

impl CoreError {
    /// Short error code string, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Config(_) => "CONFIG_ERROR",
            CoreError::BindAddress(_) => "BIND_ADDRESS_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
