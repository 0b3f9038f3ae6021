pub mod carousel;
pub mod error;
pub mod feed;
pub mod media;
pub mod models;
pub mod moderation;
pub mod session;
pub mod validation;

#[cfg(feature = "http")]
pub mod config;
#[cfg(feature = "http")]
pub mod http_client;

pub use error::DiaryClientError;

#[cfg(feature = "http")]
pub use client::{DiaryClient, DiaryDraft, DiaryEdit, ProfileChanges};

#[cfg(feature = "http")]
mod client {
    use crate::config::ClientConfig;
    use crate::error::DiaryClientError;
    use crate::http_client::{self, UploadFile};
    use crate::models::*;
    use crate::moderation::{ModerationAction, StatusFilter};
    use crate::validation::{self, RegistrationForm};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// A diary about to be published, with its files already read.
    #[derive(Debug, Clone)]
    pub struct DiaryDraft {
        pub title: String,
        pub content: String,
        pub images: Vec<UploadFile>,
        pub video: Option<UploadFile>,
    }

    /// Replacement text for an existing diary. Images cannot be changed.
    #[derive(Debug, Clone, Default)]
    pub struct DiaryEdit {
        pub title: String,
        pub content: String,
        pub video_url: Option<String>,
    }

    /// Result of a profile save; both fields `None` means nothing changed.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct ProfileChanges {
        pub nickname: Option<String>,
        pub avatar_url: Option<String>,
    }

    impl ProfileChanges {
        pub fn is_unchanged(&self) -> bool {
            self.nickname.is_none() && self.avatar_url.is_none()
        }
    }

    /// Diary API client that applies the form gates before each call and
    /// drops its token once the server rejects it.
    #[derive(Debug, Clone)]
    pub struct DiaryClient {
        http_client: Arc<Mutex<http_client::HttpClient>>,
        base_url: String,
    }

    impl DiaryClient {
        pub fn new(config: ClientConfig) -> Self {
            let http = http_client::HttpClient::with_config(&config);
            Self {
                http_client: Arc::new(Mutex::new(http)),
                base_url: config.base_url,
            }
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        /// Set the bearer token for authenticated requests
        pub async fn set_token(&self, token: String) {
            self.http_client.lock().await.set_token(token);
        }

        pub async fn get_token(&self) -> Option<String> {
            self.http_client.lock().await.get_token().cloned()
        }

        /// Clear the current token (logout)
        pub async fn clear_token(&self) {
            self.http_client.lock().await.clear_token();
        }

        async fn track<T>(
            &self,
            result: Result<T, DiaryClientError>,
        ) -> Result<T, DiaryClientError> {
            if let Err(e) = &result {
                if e.is_session_expired() {
                    tracing::debug!("dropping rejected token");
                    self.clear_token().await;
                }
            }
            result
        }

        // ==================== Авторизация ====================

        pub async fn login(
            &self,
            username: impl Into<String>,
            password: impl Into<String>,
        ) -> Result<LoginResponse, DiaryClientError> {
            let req = login_request(username.into(), password.into())?;
            tracing::debug!("Login called for username: {}", req.username);
            self.http_client.lock().await.login(req).await
        }

        pub async fn admin_login(
            &self,
            username: impl Into<String>,
            password: impl Into<String>,
        ) -> Result<LoginResponse, DiaryClientError> {
            let req = login_request(username.into(), password.into())?;
            tracing::debug!("Admin login called for username: {}", req.username);
            self.http_client.lock().await.admin_login(req).await
        }

        pub async fn register(
            &self,
            form: &RegistrationForm,
        ) -> Result<MessageResponse, DiaryClientError> {
            validation::validate_registration(form)?;

            let req = RegisterRequest {
                username: form.username.trim().to_string(),
                nickname: form.nickname.trim().to_string(),
                password: form.password.clone(),
            };
            self.http_client.lock().await.register(req).await
        }

        // ==================== Дневники ====================

        pub async fn list_diaries(&self, query: &ListQuery) -> Result<DiaryPage, DiaryClientError> {
            let result = self.http_client.lock().await.list_diaries(query).await;
            self.track(result).await
        }

        pub async fn get_diary(&self, id: &str) -> Result<Diary, DiaryClientError> {
            let result = self.http_client.lock().await.get_diary(id).await;
            self.track(result).await
        }

        pub async fn my_diaries(&self) -> Result<Vec<Diary>, DiaryClientError> {
            let result = self.http_client.lock().await.my_diaries().await;
            self.track(result).await
        }

        pub async fn publish_diary(&self, draft: DiaryDraft) -> Result<Diary, DiaryClientError> {
            let images: Vec<_> = draft.images.iter().map(UploadFile::meta).collect();
            let video = draft.video.as_ref().map(UploadFile::meta);
            let text = validation::validate_publish(
                &draft.title,
                &draft.content,
                &images,
                video.as_ref(),
            )?;

            let result = self
                .http_client
                .lock()
                .await
                .publish_diary(text.title, text.content, draft.images, draft.video)
                .await;
            self.track(result).await
        }

        /// Loads the diary first so an approved one is refused locally.
        pub async fn edit_diary(&self, id: &str, edit: DiaryEdit) -> Result<Diary, DiaryClientError> {
            let current = self.get_diary(id).await?;
            let text = validation::validate_edit(&edit.title, &edit.content, current.status)?;

            let req = UpdateDiaryRequest {
                title: text.title,
                content: text.content,
                video_url: edit
                    .video_url
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty()),
            };

            let result = self.http_client.lock().await.update_diary(id, &req).await;
            self.track(result).await
        }

        pub async fn delete_diary(&self, id: &str) -> Result<(), DiaryClientError> {
            let result = self.http_client.lock().await.delete_diary(id).await;
            self.track(result).await
        }

        // ==================== Профиль ====================

        pub async fn current_user(&self) -> Result<UserProfile, DiaryClientError> {
            let result = self.http_client.lock().await.current_user().await;
            self.track(result).await
        }

        /// Nickname first, then avatar. A nickname equal to the current one,
        /// or blank, is not sent.
        ///
        /// `on_applied` receives each step the server accepted, before the
        /// next call is made, so a cached user stays in step with the server
        /// even when a later step fails.
        pub async fn update_profile(
            &self,
            current: &UserProfile,
            nickname: &str,
            avatar: Option<UploadFile>,
            mut on_applied: impl FnMut(&ProfilePatch),
        ) -> Result<ProfileChanges, DiaryClientError> {
            if let Some(avatar) = &avatar {
                validation::validate_avatar(&avatar.meta())?;
            }

            let mut changes = ProfileChanges::default();

            let nickname = nickname.trim();
            if !nickname.is_empty() && nickname != current.nickname {
                let result = self
                    .http_client
                    .lock()
                    .await
                    .update_nickname(nickname.to_string())
                    .await;
                let patch = self.track(result).await?;
                let accepted = patch.nickname.unwrap_or_else(|| nickname.to_string());
                on_applied(&ProfilePatch {
                    nickname: Some(accepted.clone()),
                    avatar_url: None,
                });
                changes.nickname = Some(accepted);
            }

            if let Some(avatar) = avatar {
                let result = self.http_client.lock().await.upload_avatar(avatar).await;
                let uploaded = self.track(result).await?;
                on_applied(&ProfilePatch {
                    nickname: None,
                    avatar_url: Some(uploaded.avatar_url.clone()),
                });
                changes.avatar_url = Some(uploaded.avatar_url);
            }

            Ok(changes)
        }

        // ==================== Модерация ====================

        pub async fn admin_list_diaries(
            &self,
            filter: StatusFilter,
        ) -> Result<Vec<Diary>, DiaryClientError> {
            let result = self.http_client.lock().await.admin_list_diaries(filter).await;
            self.track(result).await
        }

        /// Runs `action` on a diary whose current status is `status`, then
        /// re-fetches the list under `filter`.
        pub async fn moderate(
            &self,
            diary_id: &str,
            status: DiaryStatus,
            action: ModerationAction,
            reason: Option<&str>,
            filter: StatusFilter,
        ) -> Result<Vec<Diary>, DiaryClientError> {
            let call = action.prepare(status, reason)?;
            tracing::info!(diary_id, action = %action, "moderating diary");

            let result = self.http_client.lock().await.moderate(diary_id, &call).await;
            self.track(result).await?;

            self.admin_list_diaries(filter).await
        }
    }

    fn login_request(username: String, password: String) -> Result<LoginRequest, DiaryClientError> {
        validation::validate_login(&username, &password)?;
        Ok(LoginRequest {
            username: username.trim().to_string(),
            password,
        })
    }
}
