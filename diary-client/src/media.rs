/// Bytes in one mebibyte; all upload caps are expressed in MB.
pub const MB: u64 = 1024 * 1024;

pub const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];
pub const VIDEO_TYPES: &[&str] = &["video/mp4", "video/webm", "video/ogg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// What the form gates need to know about a selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    pub size: u64,
    pub content_type: Option<String>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        let content_type = content_type_for(&name).map(str::to_string);
        Self {
            name,
            size,
            content_type,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        if !content_type.is_empty() {
            self.content_type = Some(content_type);
        }
        self
    }

    pub fn kind(&self) -> Option<MediaKind> {
        match self.content_type.as_deref() {
            Some(ct) if IMAGE_TYPES.contains(&ct) => Some(MediaKind::Image),
            Some(ct) if VIDEO_TYPES.contains(&ct) => Some(MediaKind::Video),
            _ => None,
        }
    }
}

/// Content type for the accepted upload extensions.
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    let ct = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" | "ogv" => "video/ogg",
        _ => return None,
    };
    Some(ct)
}

/// Resolves a media path from the API against its origin.
///
/// Absolute URLs (and browser `blob:` previews) pass through untouched;
/// relative paths such as `uploads/a.jpg` or `/uploads/a.jpg` are joined
/// to `base_url` with exactly one slash.
pub fn resolve_media_url(base_url: &str, src: &str) -> String {
    if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("blob:") {
        return src.to_string();
    }

    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        src.trim_start_matches('/')
    )
}
