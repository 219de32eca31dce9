use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Success envelope shared by every `/api` endpoint.
#[derive(Serialize, Debug)]
pub struct ApiResponse<T, M = ()> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<M>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self { success: true, data, message: None, pagination: None }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self { success: true, data, message: Some(message.into()), pagination: None }
    }
}

impl<T, M> ApiResponse<T, M> {
    pub fn paginated(data: T, pagination: M) -> Self {
        Self { success: true, data, message: None, pagination: Some(pagination) }
    }
}

/// Failure envelope: `{ "success": false, "message": ... }`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}
