//! Request/response bodies shared by the HTTP service and [`HttpViewStore`]
//!
//! [`HttpViewStore`]: crate::store::HttpViewStore

use serde::{Deserialize, Serialize};

/// Body of `POST /api/videos/:id/views`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordViewBody {
    pub session_id: String,
    pub watch_duration_seconds: u64,
}

/// Response of `POST /api/videos/:id/views`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordViewResponse {
    /// `true` only if this call newly incremented the counter
    pub counted: bool,
}

/// Response of `GET /api/videos/:id/view_count`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCountResponse {
    pub video_id: String,
    pub view_count: i64,
}

/// Error body returned with every non-2xx status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
