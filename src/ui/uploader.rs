use gtk4::gio;
use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::app::BackendEvent;
use crate::validator::UploadedVideo;

const FILE_ATTRIBUTES: &str = "standard::content-type,standard::size,standard::display-name";

/// Handles returned from building the upload page.
pub struct UploaderWidgets {
    pub page: gtk4::Box,
    pub choose_button: gtk4::Button,
    pub api_key_row: libadwaita::PasswordEntryRow,
}

/// Read path, media type and size of a picked file.
pub fn inspect_file(file: &gio::File) -> Result<UploadedVideo, String> {
    let path = file
        .path()
        .ok_or_else(|| "only local files can be analyzed".to_string())?;
    let info = file
        .query_info(
            FILE_ATTRIBUTES,
            gio::FileQueryInfoFlags::NONE,
            None::<&gio::Cancellable>,
        )
        .map_err(|e| format!("could not read file: {e}"))?;

    let mime_type = info
        .content_type()
        .and_then(|ct| gio::content_type_get_mime_type(&ct))
        .map(|m| m.to_string())
        .unwrap_or_default();
    let size = u64::try_from(info.size()).unwrap_or(0);

    Ok(UploadedVideo::new(
        path,
        info.display_name().to_string(),
        mime_type,
        size,
    ))
}

/// Inspect `file` and forward it to the backend as a selection event.
pub fn send_file(sender: &async_channel::Sender<BackendEvent>, file: &gio::File) {
    let event = match inspect_file(file) {
        Ok(video) => BackendEvent::FileChosen(video),
        Err(reason) => BackendEvent::FileUnreadable(reason),
    };
    let _ = sender.try_send(event);
}

/// Open the native file chooser, filtered to video files.
pub fn open_file_dialog(
    parent: &impl IsA<gtk4::Window>,
    sender: async_channel::Sender<BackendEvent>,
) {
    let filter = gtk4::FileFilter::new();
    filter.set_name(Some("Videos"));
    filter.add_mime_type("video/*");
    let filters = gio::ListStore::new::<gtk4::FileFilter>();
    filters.append(&filter);

    let dialog = gtk4::FileDialog::builder()
        .title("Choose an exercise video")
        .modal(true)
        .filters(&filters)
        .default_filter(&filter)
        .build();

    dialog.open(Some(parent), None::<&gio::Cancellable>, move |result| {
        match result {
            Ok(file) => send_file(&sender, &file),
            Err(e) => log::debug!("File dialog closed without a file: {e}"),
        }
    });
}

/// Accept a single dropped file anywhere on `widget`.
pub fn attach_drop_target(
    widget: &impl IsA<gtk4::Widget>,
    sender: async_channel::Sender<BackendEvent>,
) {
    let target = gtk4::DropTarget::new(gio::File::static_type(), gtk4::gdk::DragAction::COPY);
    target.connect_drop(move |_, value, _, _| match value.get::<gio::File>() {
        Ok(file) => {
            send_file(&sender, &file);
            true
        }
        Err(e) => {
            log::warn!("Unsupported drop: {e}");
            false
        }
    });
    widget.add_controller(target);
}

/// Build the upload page: intro, pick button, and the API key field.
pub fn build_uploader(initial_api_key: &str) -> UploaderWidgets {
    let page = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    page.set_margin_start(16);
    page.set_margin_end(16);
    page.set_margin_top(12);
    page.set_margin_bottom(12);

    let status = libadwaita::StatusPage::builder()
        .icon_name("camera-video-symbolic")
        .title("Check Your Form")
        .description(
            "Drop a short exercise clip here or pick one below.\n\
             MP4, MOV or WebM, under 20 MB. 5 to 15 seconds works best.",
        )
        .vexpand(true)
        .build();

    let choose_button = gtk4::Button::builder()
        .label("Choose Video\u{2026}")
        .halign(gtk4::Align::Center)
        .build();
    choose_button.add_css_class("pill");
    choose_button.add_css_class("suggested-action");
    status.set_child(Some(&choose_button));
    page.append(&status);

    // --- API Key group ---
    let api_group = libadwaita::PreferencesGroup::new();
    api_group.set_title("Gemini API");
    api_group.set_description(Some("Used for this session only; set GEMINI_API_KEY to skip this."));
    api_group.set_margin_top(12);

    let api_key_row = libadwaita::PasswordEntryRow::builder()
        .title("API Key")
        .text(initial_api_key)
        .build();
    api_group.add(&api_key_row);
    page.append(&api_group);

    UploaderWidgets {
        page,
        choose_button,
        api_key_row,
    }
}
