//! Form gates applied before any request leaves the client.
//!
//! These mirror the checks the backend performs; passing them does not mean
//! the server will accept the submission.

use crate::media::{MediaFile, MediaKind, MB};
use crate::models::DiaryStatus;
use thiserror::Error;

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_CONTENT_CHARS: usize = 5000;
pub const MIN_IMAGES: usize = 1;
pub const MAX_IMAGES: usize = 10;
pub const MAX_IMAGE_MB: u64 = 5;
pub const MAX_VIDEO_MB: u64 = 50;
pub const MAX_AVATAR_MB: u64 = 2;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Username and password are required")]
    MissingCredentials,

    #[error("All fields are required")]
    MissingFields,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Title must not exceed {max} characters")]
    TitleTooLong { max: usize },

    #[error("Content must not be empty")]
    EmptyContent,

    #[error("Content must not exceed {max} characters")]
    ContentTooLong { max: usize },

    #[error("At least one image is required")]
    NoImages,

    #[error("At most {max} images can be uploaded")]
    TooManyImages { max: usize },

    #[error("Image {name} exceeds the {limit_mb}MB limit")]
    ImageTooLarge { name: String, limit_mb: u64 },

    #[error("Video file exceeds the {limit_mb}MB limit")]
    VideoTooLarge { limit_mb: u64 },

    #[error("Unsupported file type: {name}")]
    UnsupportedMedia { name: String },

    #[error("Approved diaries can no longer be edited")]
    EditLocked,

    #[error("Nickname must not be empty")]
    EmptyNickname,

    #[error("Avatar file must not exceed {limit_mb}MB")]
    AvatarTooLarge { limit_mb: u64 },

    #[error("A reason is required to reject a pending diary")]
    MissingRejectReason,

    #[error("This action is not available for a {status} diary")]
    ActionUnavailable { status: DiaryStatus },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub nickname: String,
    pub password: String,
    pub confirm_password: String,
}

/// Title and content after trimming, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiaryText {
    pub title: String,
    pub content: String,
}

pub fn validate_login(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}

/// Required fields, then confirmation, then length.
pub fn validate_registration(form: &RegistrationForm) -> Result<(), ValidationError> {
    if form.username.trim().is_empty()
        || form.nickname.trim().is_empty()
        || form.password.is_empty()
        || form.confirm_password.is_empty()
    {
        return Err(ValidationError::MissingFields);
    }

    if form.password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }

    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong {
            max: MAX_TITLE_CHARS,
        });
    }
    Ok(title.to_string())
}

pub fn validate_content(content: &str) -> Result<String, ValidationError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(ValidationError::ContentTooLong {
            max: MAX_CONTENT_CHARS,
        });
    }
    Ok(content.to_string())
}

/// Checked when images are picked and again on submit.
pub fn validate_images(images: &[MediaFile]) -> Result<(), ValidationError> {
    if images.len() < MIN_IMAGES {
        return Err(ValidationError::NoImages);
    }
    if images.len() > MAX_IMAGES {
        return Err(ValidationError::TooManyImages { max: MAX_IMAGES });
    }

    for image in images {
        if image.kind() != Some(MediaKind::Image) {
            return Err(ValidationError::UnsupportedMedia {
                name: image.name.clone(),
            });
        }
        if image.size > MAX_IMAGE_MB * MB {
            return Err(ValidationError::ImageTooLarge {
                name: image.name.clone(),
                limit_mb: MAX_IMAGE_MB,
            });
        }
    }

    Ok(())
}

pub fn validate_video(video: &MediaFile) -> Result<(), ValidationError> {
    if video.kind() != Some(MediaKind::Video) {
        return Err(ValidationError::UnsupportedMedia {
            name: video.name.clone(),
        });
    }
    if video.size > MAX_VIDEO_MB * MB {
        return Err(ValidationError::VideoTooLarge {
            limit_mb: MAX_VIDEO_MB,
        });
    }
    Ok(())
}

/// Full publish gate, in the order the form reports problems.
pub fn validate_publish(
    title: &str,
    content: &str,
    images: &[MediaFile],
    video: Option<&MediaFile>,
) -> Result<DiaryText, ValidationError> {
    let title = validate_title(title)?;
    let content = validate_content(content)?;
    validate_images(images)?;
    if let Some(video) = video {
        validate_video(video)?;
    }

    Ok(DiaryText { title, content })
}

/// Edit gate. The lock check comes first so an approved diary never
/// reports field errors.
pub fn validate_edit(
    title: &str,
    content: &str,
    status: DiaryStatus,
) -> Result<DiaryText, ValidationError> {
    if !status.is_editable() {
        return Err(ValidationError::EditLocked);
    }

    Ok(DiaryText {
        title: validate_title(title)?,
        content: validate_content(content)?,
    })
}

pub fn validate_nickname(nickname: &str) -> Result<String, ValidationError> {
    let nickname = nickname.trim();
    if nickname.is_empty() {
        return Err(ValidationError::EmptyNickname);
    }
    Ok(nickname.to_string())
}

pub fn validate_avatar(avatar: &MediaFile) -> Result<(), ValidationError> {
    if avatar.kind() != Some(MediaKind::Image) {
        return Err(ValidationError::UnsupportedMedia {
            name: avatar.name.clone(),
        });
    }
    if avatar.size > MAX_AVATAR_MB * MB {
        return Err(ValidationError::AvatarTooLarge {
            limit_mb: MAX_AVATAR_MB,
        });
    }
    Ok(())
}
