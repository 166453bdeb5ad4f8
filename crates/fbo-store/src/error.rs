//! Store-level failures callers may want to match on.

/// Domain errors raised by FBO store operations.
///
/// Returned inside `anyhow::Error`; use `downcast_ref::<StoreError>()` to inspect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("airport with ICAO {0} not found")]
    AirportNotFound(String),

    #[error("airport {0} already has an FBO")]
    FboAlreadyExists(String),

    #[error("airport {0} does not have an FBO")]
    NoFbo(String),

    #[error("airport {0} does not have latitude or longitude information")]
    MissingCoordinates(String),

    #[error("airport {0} needs a country code")]
    MissingCountryCode(String),
}
