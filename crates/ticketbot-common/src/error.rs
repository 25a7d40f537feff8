//! Application-wide error type using thiserror.

/// Boxed error used as an error source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Common result type for the application.
pub type Result<T> = std::result::Result<T, TicketBotError>;

/// Application-wide error type.
#[derive(thiserror::Error, Debug)]
pub enum TicketBotError {
    /// One or more required environment variables are absent.
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    /// A configuration value is present but unusable.
    #[error("Invalid value for {variable}: {reason}")]
    InvalidConfig {
        /// Name of the offending variable.
        variable: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Gateway (Discord) error.
    #[error("Gateway error: {message}")]
    Gateway {
        /// Human-readable description.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// Logging could not be initialised.
    #[error("Logging error: {0}")]
    Logging(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TicketBotError {
    /// Creates a gateway error without a source.
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a gateway error wrapping the underlying cause.
    pub fn gateway_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Gateway {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this error is a configuration problem.
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::MissingConfig(_) | Self::InvalidConfig { .. })
    }
}
