use gtk4::prelude::*;

use crate::validator::UploadedVideo;
use crate::workflow::PreviewHost;

/// Plays the selected clip in the preview pane.
///
/// Each acquired `MediaFile` is attached to the `gtk4::Video` widget and, on
/// release, stopped, cleared and detached so GStreamer lets go of the file.
pub struct VideoPreview {
    video: gtk4::Video,
}

impl VideoPreview {
    pub fn new(video: gtk4::Video) -> Self {
        Self { video }
    }
}

impl PreviewHost for VideoPreview {
    type Handle = gtk4::MediaFile;

    fn acquire(&mut self, video: &UploadedVideo) -> gtk4::MediaFile {
        let media = gtk4::MediaFile::for_filename(&video.path);
        self.video.set_media_stream(Some(&media));
        log::debug!("Preview opened for {}", video.path.display());
        media
    }

    fn release(&mut self, media: gtk4::MediaFile) {
        media.set_playing(false);
        media.clear();
        self.video.set_media_stream(None::<&gtk4::MediaStream>);
        log::debug!("Preview released");
    }
}
