#![allow(async_fn_in_trait)]

use serde::de::DeserializeOwned;

use crate::error::{ApiError, Result};
use crate::model::{Activity, Credentials, ErrorBody, LoginReply, MessageReply, SessionStatus};

pub const ACTIVITIES_PATH: &str = "/activities";
pub const LOGIN_PATH: &str = "/admin/login";
pub const STATUS_PATH: &str = "/auth/status";

/// The four calls the signup page makes, plus the optional session check.
pub trait ActivityApi {
    /// `GET /activities`, in server order.
    async fn list_activities(&self) -> Result<Vec<Activity>>;

    /// `POST /admin/login`.
    async fn login(&self, credentials: &Credentials) -> Result<LoginReply>;

    /// `POST /activities/{name}/signup?email=...`, with a bearer token when one is held.
    async fn signup(&self, activity: &str, email: &str, token: Option<&str>) -> Result<MessageReply>;

    /// `DELETE /activities/{name}/unregister?email=...`.
    async fn unregister(&self, activity: &str, email: &str, token: &str) -> Result<MessageReply>;

    /// `GET /auth/status`.
    async fn session_status(&self, token: &str) -> Result<SessionStatus>;
}

pub fn signup_path(activity: &str, email: &str) -> String {
    format!(
        "/activities/{}/signup?email={}",
        urlencoding::encode(activity),
        urlencoding::encode(email)
    )
}

pub fn unregister_path(activity: &str, email: &str) -> String {
    format!(
        "/activities/{}/unregister?email={}",
        urlencoding::encode(activity),
        urlencoding::encode(email)
    )
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Turns a status code and raw body into a typed reply or an `ApiError`.
pub fn interpret<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    if (200..300).contains(&status) {
        return serde_json::from_str(body).map_err(ApiError::from);
    }
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail_text());
    Err(ApiError::Status { status, detail })
}
