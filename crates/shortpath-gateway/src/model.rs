use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateShortPathRequest {
    #[serde(default)]
    pub short_path: Option<String>,
    pub target_url: String,
}

#[derive(Debug, Serialize)]
pub struct CreateShortPathResponse {
    pub short_path: String,
    pub short_url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
