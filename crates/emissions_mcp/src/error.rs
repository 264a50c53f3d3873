//! Boundary errors and the messages shown for them.

use emissions_core::EmissionsError;
use thiserror::Error;

/// MCP server errors.
#[derive(Debug, Error)]
pub enum McpError {
    #[error(transparent)]
    Emissions(#[from] EmissionsError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// Text for the person at the other end of the tool call. Every error
    /// kind maps to a message; none of them abort the server.
    pub fn user_message(&self) -> String {
        match self {
            McpError::Emissions(e) => match e {
                EmissionsError::Validation(v) => v.message(),
                EmissionsError::NotFound { .. } => "Company ID not found.".to_string(),
                EmissionsError::Parse { .. } => {
                    "Invalid company ID. Please enter a valid integer.".to_string()
                }
                EmissionsError::NoData => "No data available.".to_string(),
                other => format!("Error occurred: {other}"),
            },
            other => format!("Error occurred: {other}"),
        }
    }
}

impl From<String> for McpError {
    fn from(err: String) -> Self {
        McpError::Internal(err)
    }
}

impl From<McpError> for String {
    fn from(err: McpError) -> Self {
        err.user_message()
    }
}

/// Result type alias for MCP operations.
pub type McpResult<T> = Result<T, McpError>;
