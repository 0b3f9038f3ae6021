use crate::storage;
use diary_client::media::resolve_media_url;
use diary_client::models::*;
use diary_client::moderation::{ModerationCall, StatusFilter};
use diary_client::session::SessionSlot;
use diary_client::validation::ValidationError;
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use web_sys::FormData;

const API_BASE: &str = match option_env!("DIARY_API_URL") {
    Some(url) => url,
    None => "http://localhost:5000",
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Not logged in, please log in first")]
    NotLoggedIn,
}

impl ApiError {
    /// 401/403, or no token at all: the page should go back to login.
    pub fn is_session_expired(&self) -> bool {
        matches!(
            self,
            ApiError::Status {
                status: 401 | 403,
                ..
            } | ApiError::NotLoggedIn
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    fn network(e: gloo_net::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

/// REST client bound to one session slot. The token is read from
/// `localStorage` on every call and the slot is cleared on 401/403.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiClient {
    base_url: String,
    slot: SessionSlot,
}

impl ApiClient {
    pub fn user() -> Self {
        Self {
            base_url: API_BASE.to_string(),
            slot: SessionSlot::User,
        }
    }

    pub fn admin() -> Self {
        Self {
            base_url: API_BASE.to_string(),
            slot: SessionSlot::Admin,
        }
    }

    pub fn slot(&self) -> SessionSlot {
        self.slot
    }

    pub fn media_url(&self, src: &str) -> String {
        resolve_media_url(&self.base_url, src)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        match storage::token(self.slot) {
            Some(token) => Ok(builder.header("Authorization", &format!("Bearer {}", token))),
            None => Err(ApiError::NotLoggedIn),
        }
    }

    fn maybe_authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match storage::token(self.slot) {
            Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn read<T: DeserializeOwned>(
        &self,
        response: Response,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let text = self.checked_text(response, fallback).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn checked_text(&self, response: Response, fallback: &str) -> Result<String, ApiError> {
        let status = response.status();
        let ok = response.ok();
        let text = response.text().await.map_err(ApiError::network)?;

        if ok {
            return Ok(text);
        }

        let message = ApiErrorBody::message_from(&text).unwrap_or_else(|| fallback.to_string());
        let err = ApiError::Status { status, message };
        if err.is_session_expired() {
            log::warn!("Request rejected with {}, clearing {:?} session", status, self.slot);
            storage::clear_session(self.slot);
        }
        Err(err)
    }

    // ==================== Авторизация ====================

    /// Logs in against the endpoint of this client's slot.
    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let path = match self.slot {
            SessionSlot::User => "/api/auth/login",
            SessionSlot::Admin => "/api/admin/auth/login",
        };

        let response = Request::post(&self.url(path))
            .json(req)
            .map_err(ApiError::network)?
            .send()
            .await
            .map_err(ApiError::network)?;

        let text = response.text().await.map_err(ApiError::network)?;
        if !response.ok() {
            // 401 here is a bad password, not an expired session
            return Err(ApiError::Status {
                status: response.status(),
                message: ApiErrorBody::message_from(&text)
                    .unwrap_or_else(|| "Login failed, please check your credentials".into()),
            });
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<MessageResponse, ApiError> {
        let response = Request::post(&self.url("/api/auth/register"))
            .json(req)
            .map_err(ApiError::network)?
            .send()
            .await
            .map_err(ApiError::network)?;

        let text = self
            .checked_text(response, "Registration failed, please check your details")
            .await?;
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }

    // ==================== Дневники ====================

    pub async fn list_diaries(&self, query: &ListQuery) -> Result<DiaryPage, ApiError> {
        let response = Request::get(&self.url("/api/diaries"))
            .query(query.to_pairs())
            .send()
            .await
            .map_err(ApiError::network)?;

        self.read(response, "Failed to load diaries").await
    }

    pub async fn get_diary(&self, id: &str) -> Result<Diary, ApiError> {
        let response = self
            .maybe_authorized(Request::get(&self.url(&format!("/api/diaries/{}", id))))
            .send()
            .await
            .map_err(ApiError::network)?;

        self.read(response, "Failed to load diary").await
    }

    pub async fn my_diaries(&self) -> Result<Vec<Diary>, ApiError> {
        let response = self
            .authorized(Request::get(&self.url("/api/diaries/my")))?
            .send()
            .await
            .map_err(ApiError::network)?;

        self.read(response, "Failed to load your diaries").await
    }

    /// `form` carries `title`, `content`, `images` (repeated) and `video`.
    pub async fn publish_diary(&self, form: FormData) -> Result<Diary, ApiError> {
        let response = self
            .authorized(Request::post(&self.url("/api/diaries")))?
            .body(form)
            .map_err(ApiError::network)?
            .send()
            .await
            .map_err(ApiError::network)?;

        self.read(response, "Publishing failed, please try again later")
            .await
    }

    pub async fn update_diary(&self, id: &str, req: &UpdateDiaryRequest) -> Result<Diary, ApiError> {
        let response = self
            .authorized(Request::put(&self.url(&format!("/api/diaries/{}", id))))?
            .json(req)
            .map_err(ApiError::network)?
            .send()
            .await
            .map_err(ApiError::network)?;

        self.read(response, "Failed to update diary").await
    }

    pub async fn delete_diary(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .authorized(Request::delete(&self.url(&format!("/api/diaries/{}", id))))?
            .send()
            .await
            .map_err(ApiError::network)?;

        self.checked_text(response, "Failed to delete diary").await?;
        Ok(())
    }

    // ==================== Профиль ====================

    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        let response = self
            .authorized(Request::get(&self.url("/api/users/me")))?
            .send()
            .await
            .map_err(ApiError::network)?;

        self.read(response, "Failed to load user profile").await
    }

    pub async fn update_nickname(&self, nickname: String) -> Result<ProfilePatch, ApiError> {
        let response = self
            .authorized(Request::put(&self.url("/api/users/me")))?
            .json(&UpdateProfileRequest { nickname })
            .map_err(ApiError::network)?
            .send()
            .await
            .map_err(ApiError::network)?;

        self.read(response, "Failed to update nickname").await
    }

    pub async fn upload_avatar(&self, form: FormData) -> Result<AvatarResponse, ApiError> {
        let response = self
            .authorized(Request::put(&self.url("/api/users/me/avatar")))?
            .body(form)
            .map_err(ApiError::network)?
            .send()
            .await
            .map_err(ApiError::network)?;

        self.read(response, "Failed to upload avatar").await
    }

    // ==================== Модерация ====================

    pub async fn admin_list_diaries(&self, filter: StatusFilter) -> Result<Vec<Diary>, ApiError> {
        let mut builder = Request::get(&self.url("/api/admin/diaries"));
        if let Some(status) = filter.query_value() {
            builder = builder.query([("status", status)]);
        }

        let response = self
            .authorized(builder)?
            .send()
            .await
            .map_err(ApiError::network)?;

        let list: AdminDiaryList = self.read(response, "Failed to load diaries").await?;
        Ok(list.diaries)
    }

    pub async fn moderate(&self, id: &str, call: &ModerationCall) -> Result<(), ApiError> {
        let url = self.url(&format!(
            "/api/admin/diaries/{}/{}",
            id,
            call.path_segment()
        ));

        let request = match call {
            ModerationCall::Approve => self.authorized(Request::put(&url))?.build(),
            ModerationCall::Reject { reason } => {
                self.authorized(Request::put(&url))?.json(&RejectRequest {
                    reject_reason: reason.clone(),
                })
            }
            ModerationCall::Delete => self.authorized(Request::delete(&url))?.build(),
        }
        .map_err(ApiError::network)?;

        let response = request.send().await.map_err(ApiError::network)?;
        self.checked_text(response, &format!("Failed to {} diary", call.path_segment()))
            .await?;
        Ok(())
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::user()
    }
}
