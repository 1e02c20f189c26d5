use serde::Serialize;

/// One managed container as shown by the status listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerStatusResponse {
    pub id: String,
    pub name: String,
    pub status: String,
    /// ISO8601, `None` when not accessed since start-up.
    pub last_access: Option<String>,
    pub timeout_minutes: u64,
}

/// API error payload
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
}
