use thiserror::Error;

/// Failure taxonomy shared by every layer of the platform.
///
/// All business-rule failures are detected before any state mutation and
/// reported synchronously to the caller. `Unavailable` is the only kind a
/// client may blindly retry.
#[derive(Debug, Error)]
pub enum TicketingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("An active ticket for this event already exists")]
    DuplicatePurchase,

    #[error("Event is sold out")]
    SoldOut,

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TicketingError {
    /// Machine-readable kind, stable even when messages change.
    pub fn code(&self) -> &'static str {
        match self {
            TicketingError::InvalidInput(_) => "INVALID_INPUT",
            TicketingError::NotFound(_) => "NOT_FOUND",
            TicketingError::DuplicatePurchase => "DUPLICATE_PURCHASE",
            TicketingError::SoldOut => "SOLD_OUT",
            TicketingError::Unavailable(_) => "UNAVAILABLE",
            TicketingError::Internal(_) => "INTERNAL",
        }
    }

    /// True when the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TicketingError::Unavailable(_))
    }
}
