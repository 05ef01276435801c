use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Non-finite {what} at t={time:.3}s")]
    NonFinite { time: f64, what: &'static str },

    #[error("Unknown scenario: {0}")]
    UnknownScenario(usize),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
