use thiserror::Error;

/// Error type shared by the catalog, the dispatcher and every report
#[derive(Error, Debug)]
pub enum WorldError {
    #[error("Command discovery error: {0}")]
    Discovery(String),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not acquire database connection: {0}")]
    ResourceAcquisition(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "mysql")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl WorldError {
    /// Create a discovery error
    pub fn discovery<S: Into<String>>(msg: S) -> Self {
        Self::Discovery(msg.into())
    }

    /// Create an execution error
    pub fn execution<S: Into<String>>(msg: S) -> Self {
        Self::Execution(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a resource acquisition error
    pub fn resource_acquisition<S: Into<String>>(msg: S) -> Self {
        Self::ResourceAcquisition(msg.into())
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Only a failure to obtain the shared handle may stop the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ResourceAcquisition(_))
    }

    /// Get user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::CommandNotFound(cmd) => {
                format!(
                    "Unknown command '{}'. Type 'help' to see available commands.",
                    cmd
                )
            }
            Self::InvalidInput(usage) => format!("Invalid input. {}", usage),
            Self::ResourceAcquisition(msg) => {
                format!(
                    "Could not connect to the database: {}. Check the MYSQL_* settings or run with --test-db.",
                    msg
                )
            }
            #[cfg(feature = "mysql")]
            Self::Database(err) => format!("Database query failed: {}", err),
            _ => self.to_string(),
        }
    }
}

/// Convenient result type for the crate
pub type Result<T> = std::result::Result<T, WorldError>;

/// Trait for converting errors to user-friendly messages
pub trait UserFriendlyError {
    fn user_message(&self) -> String;
}

impl UserFriendlyError for WorldError {
    fn user_message(&self) -> String {
        WorldError::user_message(self)
    }
}
