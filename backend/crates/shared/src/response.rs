//! Uniform response envelope
//!
//! Every endpoint answers with `{ "code", "message", "data" }`.
//! `code == 0` means success; any other value is a stable business error code.

use serde::Serialize;

/// Business code for a successful response
pub const SUCCESS_CODE: u32 = 0;

/// Response envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub code: u32,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: "success".to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Successful response without payload
    pub fn ok() -> Self {
        Self {
            code: SUCCESS_CODE,
            message: "success".to_string(),
            data: None,
        }
    }

    /// Error response
    pub fn failure(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(feature = "axum")]
impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["message"], "success");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_failure_envelope() {
        let json = serde_json::to_value(ApiResponse::failure(1003, "User does not exist")).unwrap();
        assert_eq!(json["code"], 1003);
        assert!(json["data"].is_null());
    }
}
