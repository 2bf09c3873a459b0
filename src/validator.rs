use std::path::PathBuf;

use thiserror::Error;

/// Clips must stay below this to fit inline in a single Gemini request.
pub const MAX_VIDEO_BYTES: u64 = 20 * 1024 * 1024;

/// A video file picked by the user, as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedVideo {
    pub path: PathBuf,
    /// Name shown in the UI (usually the file name)
    pub display_name: String,
    /// Declared media type, e.g. "video/mp4"
    pub mime_type: String,
    pub size: u64,
}

impl UploadedVideo {
    pub fn new(
        path: impl Into<PathBuf>,
        display_name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            path: path.into(),
            display_name: display_name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }

    /// Size in MiB, for display.
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1_048_576.0
    }
}

/// Why a candidate file was turned away before any analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("not a video file")]
    NotVideo,
    #[error("file too large, must be under 20MB")]
    TooLarge,
}

/// Check a candidate file. Media type is checked before size.
pub fn validate(video: &UploadedVideo) -> Result<(), ValidationError> {
    if !video.mime_type.starts_with("video/") {
        return Err(ValidationError::NotVideo);
    }
    if video.size >= MAX_VIDEO_BYTES {
        return Err(ValidationError::TooLarge);
    }
    Ok(())
}
