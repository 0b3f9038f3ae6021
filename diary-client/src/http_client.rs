use crate::config::ClientConfig;
use crate::error::DiaryClientError;
use crate::media::MediaFile;
use crate::moderation::{ModerationCall, StatusFilter};
use crate::models::*;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;

/// A file read into memory for a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DiaryClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = crate::media::content_type_for(&file_name)
            .unwrap_or("application/octet-stream")
            .to_string();

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn meta(&self) -> MediaFile {
        MediaFile::new(&self.file_name, self.bytes.len() as u64)
            .with_content_type(&self.content_type)
    }

    fn into_part(self) -> Result<Part, DiaryClientError> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)?)
    }
}

/// Raw wire access to the diary API. Performs no form validation.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    upload_timeout: Duration,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(&ClientConfig::new(base_url))
    }

    pub fn with_config(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.base_url.clone(),
            token: None,
            upload_timeout: config.upload_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn get_token(&self) -> Option<&String> {
        self.token.as_ref()
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn add_auth_header(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    fn require_token(&self) -> Result<(), DiaryClientError> {
        match &self.token {
            Some(_) => Ok(()),
            None => Err(DiaryClientError::NotLoggedIn),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    // ==================== Авторизация ====================

    pub async fn login(&mut self, req: LoginRequest) -> Result<LoginResponse, DiaryClientError> {
        self.login_at("/api/auth/login", req).await
    }

    pub async fn admin_login(
        &mut self,
        req: LoginRequest,
    ) -> Result<LoginResponse, DiaryClientError> {
        self.login_at("/api/admin/auth/login", req).await
    }

    async fn login_at(
        &mut self,
        path: &str,
        req: LoginRequest,
    ) -> Result<LoginResponse, DiaryClientError> {
        let url = self.url(path);
        tracing::debug!(%url, username = %req.username, "logging in");

        let response = self.client.post(&url).json(&req).send().await?;
        let auth = handle_response::<LoginResponse>(
            response,
            "Login failed, please check your credentials",
        )
        .await?;

        self.set_token(auth.token.clone());
        Ok(auth)
    }

    /// Registration does not log in; the caller is sent to the login form.
    pub async fn register(
        &self,
        req: RegisterRequest,
    ) -> Result<MessageResponse, DiaryClientError> {
        let url = self.url("/api/auth/register");
        tracing::debug!(%url, username = %req.username, "registering");

        let response = self.client.post(&url).json(&req).send().await?;
        let text = checked_text(response, "Registration failed, please check your details").await?;

        Ok(serde_json::from_str(&text).unwrap_or_default())
    }

    // ==================== Дневники ====================

    pub async fn list_diaries(&self, query: &ListQuery) -> Result<DiaryPage, DiaryClientError> {
        let url = self.url("/api/diaries");
        tracing::debug!(%url, page = query.page_number, "listing diaries");

        let response = self.client.get(&url).query(&query.to_pairs()).send().await?;
        handle_response(response, "Failed to load diaries").await
    }

    /// Sends the token when present so owners can see their own
    /// unapproved diaries.
    pub async fn get_diary(&self, id: &str) -> Result<Diary, DiaryClientError> {
        let url = self.url(&format!("/api/diaries/{}", id));
        let response = self.add_auth_header(self.client.get(&url)).send().await?;
        handle_response(response, "Failed to load diary").await
    }

    pub async fn my_diaries(&self) -> Result<Vec<Diary>, DiaryClientError> {
        self.require_token()?;
        let url = self.url("/api/diaries/my");
        let response = self.add_auth_header(self.client.get(&url)).send().await?;
        handle_response(response, "Failed to load your diaries").await
    }

    pub async fn publish_diary(
        &self,
        title: String,
        content: String,
        images: Vec<UploadFile>,
        video: Option<UploadFile>,
    ) -> Result<Diary, DiaryClientError> {
        self.require_token()?;
        let url = self.url("/api/diaries");

        let mut form = Form::new().text("title", title).text("content", content);
        for image in images {
            form = form.part("images", image.into_part()?);
        }
        if let Some(video) = video {
            form = form.part("video", video.into_part()?);
        }

        tracing::debug!(%url, "publishing diary");
        let response = self
            .add_auth_header(self.client.post(&url))
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await?;

        handle_response(response, "Publishing failed, please try again later").await
    }

    pub async fn update_diary(
        &self,
        id: &str,
        req: &UpdateDiaryRequest,
    ) -> Result<Diary, DiaryClientError> {
        self.require_token()?;
        let url = self.url(&format!("/api/diaries/{}", id));
        let response = self
            .add_auth_header(self.client.put(&url))
            .json(req)
            .send()
            .await?;

        handle_response(response, "Failed to update diary").await
    }

    pub async fn delete_diary(&self, id: &str) -> Result<(), DiaryClientError> {
        self.require_token()?;
        let url = self.url(&format!("/api/diaries/{}", id));
        let response = self.add_auth_header(self.client.delete(&url)).send().await?;

        checked_text(response, "Failed to delete diary").await?;
        Ok(())
    }

    // ==================== Профиль ====================

    pub async fn current_user(&self) -> Result<UserProfile, DiaryClientError> {
        self.require_token()?;
        let url = self.url("/api/users/me");
        let response = self.add_auth_header(self.client.get(&url)).send().await?;
        handle_response(response, "Failed to load user profile").await
    }

    pub async fn update_nickname(&self, nickname: String) -> Result<ProfilePatch, DiaryClientError> {
        self.require_token()?;
        let url = self.url("/api/users/me");
        let response = self
            .add_auth_header(self.client.put(&url))
            .json(&UpdateProfileRequest { nickname })
            .send()
            .await?;

        handle_response(response, "Failed to update nickname").await
    }

    pub async fn upload_avatar(&self, avatar: UploadFile) -> Result<AvatarResponse, DiaryClientError> {
        self.require_token()?;
        let url = self.url("/api/users/me/avatar");
        let form = Form::new().part("avatar", avatar.into_part()?);

        let response = self
            .add_auth_header(self.client.put(&url))
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await?;

        handle_response(response, "Failed to upload avatar").await
    }

    // ==================== Модерация ====================

    pub async fn admin_list_diaries(
        &self,
        filter: StatusFilter,
    ) -> Result<Vec<Diary>, DiaryClientError> {
        self.require_token()?;
        let url = self.url("/api/admin/diaries");

        let mut request = self.client.get(&url);
        if let Some(status) = filter.query_value() {
            request = request.query(&[("status", status)]);
        }

        let response = self.add_auth_header(request).send().await?;
        let list: AdminDiaryList = handle_response(response, "Failed to load diaries").await?;
        Ok(list.diaries)
    }

    pub async fn moderate(&self, id: &str, call: &ModerationCall) -> Result<(), DiaryClientError> {
        self.require_token()?;
        let url = self.url(&format!(
            "/api/admin/diaries/{}/{}",
            id,
            call.path_segment()
        ));

        let request = match call {
            ModerationCall::Approve => self.client.put(&url),
            ModerationCall::Reject { reason } => self.client.put(&url).json(&RejectRequest {
                reject_reason: reason.clone(),
            }),
            ModerationCall::Delete => self.client.delete(&url),
        };

        tracing::debug!(%url, "moderating diary");
        let response = self.add_auth_header(request).send().await?;
        checked_text(response, &format!("Failed to {} diary", call.path_segment())).await?;
        Ok(())
    }
}

/// Decodes a 2xx JSON body, or turns anything else into an error.
async fn handle_response<T: DeserializeOwned>(
    response: Response,
    fallback: &str,
) -> Result<T, DiaryClientError> {
    let status = response.status();

    if status.is_success() {
        Ok(response.json::<T>().await?)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status.as_u16(), &body, fallback))
    }
}

/// For endpoints whose success body is not needed.
async fn checked_text(response: Response, fallback: &str) -> Result<String, DiaryClientError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        Ok(body)
    } else {
        Err(status_error(status.as_u16(), &body, fallback))
    }
}

fn status_error(status: u16, body: &str, fallback: &str) -> DiaryClientError {
    let err = DiaryClientError::from_status(status, body, fallback);
    if err.is_session_expired() {
        tracing::warn!(status, "request rejected, session no longer valid");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_with_single_slash() {
        let client = HttpClient::new("http://localhost:5000/");
        assert_eq!(
            client.url("/api/diaries"),
            "http://localhost:5000/api/diaries"
        );
    }

    #[tokio::test]
    async fn authenticated_calls_need_a_token() {
        let client = HttpClient::new("http://127.0.0.1:9");
        let err = client.my_diaries().await.unwrap_err();
        assert!(matches!(err, DiaryClientError::NotLoggedIn));
    }
}
