use gtk4::prelude::*;
use libadwaita::prelude::*;

use super::result_view::show_result;
use super::uploader::{build_uploader, UploaderWidgets};
use crate::workflow::{PreviewHost, WorkflowController, WorkflowStatus};

const PAGE_UPLOAD: &str = "upload";
const PAGE_PREVIEW: &str = "preview";
const PAGE_RESULT: &str = "result";

/// Handles returned from building the main window.
pub struct WindowWidgets {
    pub window: libadwaita::ApplicationWindow,
    pub stack: gtk4::Stack,
    /// Inline validation message, shown above every page
    pub banner: libadwaita::Banner,
    pub uploader: UploaderWidgets,

    // Preview page
    pub video: gtk4::Video,
    pub file_label: gtk4::Label,
    pub error_label: gtk4::Label,
    pub spinner: gtk4::Spinner,
    pub analyze_button: gtk4::Button,
    pub choose_other_button: gtk4::Button,

    // Result page
    pub result_box: gtk4::Box,
    pub new_analysis_button: gtk4::Button,
}

/// Build the main window with its upload, preview and result pages.
pub fn build_window(app: &libadwaita::Application, initial_api_key: &str) -> WindowWidgets {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("Form Coach")
        .default_width(720)
        .default_height(640)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();

    let menu_button = gtk4::MenuButton::new();
    menu_button.set_icon_name("open-menu-symbolic");
    let menu = gtk4::gio::Menu::new();
    menu.append(Some("About Form Coach"), Some("app.about"));
    menu.append(Some("Quit"), Some("app.quit"));
    menu_button.set_menu_model(Some(&menu));
    header.pack_end(&menu_button);

    toolbar_view.add_top_bar(&header);

    let banner = libadwaita::Banner::new("");
    banner.set_revealed(false);
    toolbar_view.add_top_bar(&banner);

    super::result_view::install_css();
    let uploader = build_uploader(initial_api_key);

    // --- Preview page ---
    let preview_page = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    preview_page.set_margin_start(16);
    preview_page.set_margin_end(16);
    preview_page.set_margin_top(12);
    preview_page.set_margin_bottom(12);

    let video = gtk4::Video::new();
    video.set_vexpand(true);
    video.set_autoplay(false);
    preview_page.append(&video);

    let file_label = gtk4::Label::new(None);
    file_label.add_css_class("dim-label");
    file_label.set_ellipsize(gtk4::pango::EllipsizeMode::Middle);
    preview_page.append(&file_label);

    let error_label = gtk4::Label::new(None);
    error_label.add_css_class("error");
    error_label.set_wrap(true);
    error_label.set_visible(false);
    preview_page.append(&error_label);

    let actions = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);
    actions.set_halign(gtk4::Align::Center);
    let choose_other_button = gtk4::Button::with_label("Choose Another Video");
    choose_other_button.add_css_class("pill");
    let spinner = gtk4::Spinner::new();
    let analyze_button = gtk4::Button::with_label("Start Analysis");
    analyze_button.add_css_class("pill");
    analyze_button.add_css_class("suggested-action");
    actions.append(&choose_other_button);
    actions.append(&spinner);
    actions.append(&analyze_button);
    preview_page.append(&actions);

    // --- Result page ---
    let result_page = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    result_page.set_margin_start(16);
    result_page.set_margin_end(16);
    result_page.set_margin_top(12);
    result_page.set_margin_bottom(12);

    let new_analysis_button = gtk4::Button::builder()
        .label("New Analysis")
        .halign(gtk4::Align::Start)
        .build();
    new_analysis_button.add_css_class("flat");
    result_page.append(&new_analysis_button);

    let result_box = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    let result_scroll = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .vexpand(true)
        .child(&result_box)
        .build();
    result_page.append(&result_scroll);

    let disclaimer = gtk4::Label::new(Some(
        "AI feedback can be wrong. Check with a qualified coach before lifting heavy.",
    ));
    disclaimer.add_css_class("caption");
    disclaimer.add_css_class("dim-label");
    disclaimer.set_wrap(true);
    result_page.append(&disclaimer);

    // Assemble
    let stack = gtk4::Stack::new();
    stack.set_transition_type(gtk4::StackTransitionType::Crossfade);
    stack.add_named(&uploader.page, Some(PAGE_UPLOAD));
    stack.add_named(&preview_page, Some(PAGE_PREVIEW));
    stack.add_named(&result_page, Some(PAGE_RESULT));

    toolbar_view.set_content(Some(&stack));
    window.set_content(Some(&toolbar_view));

    WindowWidgets {
        window,
        stack,
        banner,
        uploader,
        video,
        file_label,
        error_label,
        spinner,
        analyze_button,
        choose_other_button,
        result_box,
        new_analysis_button,
    }
}

/// Bring every widget in line with the workflow state.
pub fn render<H: PreviewHost>(widgets: &WindowWidgets, workflow: &WorkflowController<H>) {
    match workflow.validation_message() {
        Some(message) => {
            widgets.banner.set_title(message);
            widgets.banner.set_revealed(true);
        }
        None => widgets.banner.set_revealed(false),
    }

    let status = workflow.status();
    let page = match status {
        WorkflowStatus::Idle => PAGE_UPLOAD,
        WorkflowStatus::VideoSelected | WorkflowStatus::Analyzing | WorkflowStatus::Failed => {
            PAGE_PREVIEW
        }
        WorkflowStatus::Resulted => PAGE_RESULT,
    };
    widgets.stack.set_visible_child_name(page);

    if let Some(video) = workflow.video() {
        widgets.file_label.set_text(&format!(
            "{} \u{2022} {:.1} MB",
            video.display_name,
            video.size_mb()
        ));
    }

    match workflow.error() {
        Some(error) => {
            widgets.error_label.set_text(error);
            widgets.error_label.set_visible(true);
        }
        None => widgets.error_label.set_visible(false),
    }

    let analyzing = workflow.is_analyzing();
    widgets.spinner.set_spinning(analyzing);
    widgets.analyze_button.set_sensitive(workflow.can_start_analysis());
    widgets.analyze_button.set_label(match status {
        WorkflowStatus::Analyzing => "Analyzing\u{2026}",
        WorkflowStatus::Failed => "Try Again",
        _ => "Start Analysis",
    });

    if let Some(result) = workflow.result() {
        show_result(&widgets.result_box, result);
    }
}
