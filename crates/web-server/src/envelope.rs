use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub const SUCCESS_CODE: &str = "0";
pub const SUCCESS_DESC: &str = "SUCCESS";
pub const ERROR_CODE: &str = "1";
pub const ERROR_DESC: &str = "ERROR";

/// The two-field status body returned by every endpoint.
///
/// It never carries data or error detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub response_code: String,
    pub response_desc: String,
}

impl Envelope {
    pub fn success() -> Self {
        Self { response_code: SUCCESS_CODE.to_string(), response_desc: SUCCESS_DESC.to_string() }
    }

    pub fn error() -> Self {
        Self { response_code: ERROR_CODE.to_string(), response_desc: ERROR_DESC.to_string() }
    }

    pub fn is_success(&self) -> bool {
        self.response_code == SUCCESS_CODE
    }

    pub fn status(&self) -> StatusCode {
        if self.is_success() { StatusCode::OK } else { StatusCode::INTERNAL_SERVER_ERROR }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
