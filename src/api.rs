//! Typed wire layer for the storefront API: endpoint builders over the base
//! URL, request/response records per endpoint, and the uniform decoding
//! policy (non-2xx carries a server `error` message; a 2xx body that fails
//! its schema is a schema error, never a silent default).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::orders::{OrderHistorySearchParams, OrderLineItem};
use crate::shops::Shop;
use crate::{AppError, ErrorKind};

pub const DEFAULT_API_BASE_URL: &str = "https://buysite.example.com/";

/// Joins a path template onto the configured base URL.
pub fn endpoint(base: &str, path: &str) -> Result<String, AppError> {
    let base = Url::parse(base).map_err(|e| {
        AppError::new(ErrorKind::InvalidState, "API base URL is not configured correctly")
            .with_internal(e.to_string())
    })?;
    let joined = base.join(path).map_err(|e| {
        AppError::new(ErrorKind::InvalidState, "Could not build request URL")
            .with_internal(e.to_string())
            .with_context("path", path)
    })?;
    Ok(joined.into())
}

pub fn login_url(base: &str) -> Result<String, AppError> {
    endpoint(base, "api/login")
}

pub fn shops_url(base: &str, username: &str) -> Result<String, AppError> {
    endpoint(base, &format!("api/{username}/shops"))
}

pub fn active_orders_url(base: &str, ship_to: &str) -> Result<String, AppError> {
    endpoint(base, &format!("api/{ship_to}/activeorders"))
}

pub fn returns_url(base: &str, ship_to: &str) -> Result<String, AppError> {
    endpoint(base, &format!("api/{ship_to}/returns"))
}

pub fn history_url(base: &str, ship_to: &str) -> Result<String, AppError> {
    endpoint(base, &format!("api/{ship_to}/history"))
}

pub fn cancel_order_url(base: &str) -> Result<String, AppError> {
    endpoint(base, "api/cancel-active-order")
}

pub fn security_profile_url(base: &str, username: &str) -> Result<String, AppError> {
    endpoint(base, &format!("api/security/{username}/profile"))
}

pub fn update_password_url(base: &str, username: &str) -> Result<String, AppError> {
    endpoint(base, &format!("api/security/{username}/password"))
}

pub fn update_email_url(base: &str, username: &str) -> Result<String, AppError> {
    endpoint(base, &format!("api/security/{username}/email"))
}

pub fn update_questions_url(base: &str, username: &str) -> Result<String, AppError> {
    endpoint(base, &format!("api/security/{username}/updatequestions"))
}

pub fn all_questions_url(base: &str) -> Result<String, AppError> {
    endpoint(base, "api/security/all_questions")
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopsResponse {
    #[serde(default)]
    pub shops: Vec<Shop>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActiveOrdersResponse {
    #[serde(default)]
    pub orders: Vec<OrderLineItem>,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActiveReturnsResponse {
    #[serde(default)]
    pub returns: Vec<OrderLineItem>,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderHistoryResponse {
    #[serde(default)]
    pub history: Vec<OrderLineItem>,
}

/// Body of `api/cancel-active-order`. The API takes the part description for
/// a single-item cancel and the number −1 for a whole-group cancel, so the
/// field is a raw JSON value.
#[derive(Debug, Clone, Serialize)]
pub struct CancelOrderRequest {
    pub loc_no: String,
    pub shipper_no: String,
    pub item_uid_no: i64,
    pub arg_part_no: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelOrderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityQuestion {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub question: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub answer: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityProfileResponse {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub questions: Vec<SecurityQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdatePasswordRequest<'a> {
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateEmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateQuestionsRequest {
    pub answers: Vec<SecurityQuestion>,
}

/// History lookups and searches share one body shape.
pub type HistoryRequest = OrderHistorySearchParams;

/// Status and raw body of a completed HTTP exchange. Kept as plain data so
/// response events are easy to construct in tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

pub type ApiResult = Result<ApiResponse, AppError>;

impl ApiResponse {
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self { status: 200, body: body.into() }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// For endpoints whose 2xx body is an acknowledgement we never read.
    pub fn ack(&self) -> Result<(), AppError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(AppError::from_http_status(self.status, Some(self.body.as_bytes())))
        }
    }

    /// Decodes the body against the endpoint's schema. Non-2xx responses
    /// become the server's error; malformed 2xx bodies become schema errors.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        if !self.is_success() {
            return Err(AppError::from_http_status(self.status, Some(self.body.as_bytes())));
        }
        serde_json::from_str(&self.body).map_err(|e| {
            AppError::new(ErrorKind::Schema, "The server returned data the app did not expect")
                .with_internal(e.to_string())
                .with_context("http_status", self.status.to_string())
        })
    }
}

/// Flattens a transport result into [`ApiResult`]. Transport failures (DNS,
/// refused connection, cancelled load) become network errors here; status
/// handling waits for [`ApiResponse::decode`].
pub fn into_api_result(result: crux_http::Result<crux_http::Response<Vec<u8>>>) -> ApiResult {
    match result {
        Ok(mut response) => {
            let status: u16 = response.status().into();
            let body = response
                .take_body()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default();
            Ok(ApiResponse { status, body })
        }
        Err(e) => Err(AppError::new(
            ErrorKind::Network,
            "Unable to reach the server. Please check your connection and try again.",
        )
        .with_internal(e.to_string())),
    }
}
