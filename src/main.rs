mod analyzer;
mod app;
mod config;
mod report;
mod ui;
mod validator;
mod workflow;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::gio;
use gtk4::prelude::*;
use libadwaita::prelude::*;

use app::{AppState, BackendEvent};

fn main() -> gtk4::glib::ExitCode {
    env_logger::init();
    log::info!("Form Coach starting");

    let application = libadwaita::Application::builder()
        .application_id("io.github.formcoach.FormCoach")
        .build();

    application.connect_activate(on_activate);
    application.run()
}

fn on_activate(app: &libadwaita::Application) {
    // Widgets and the tokio runtime both talk to the main loop through this channel
    let (backend_tx, backend_rx) = async_channel::unbounded::<BackendEvent>();

    let config = config::Config::load();
    let widgets = ui::window::build_window(app, &config.gemini_api_key);
    let preview = ui::preview::VideoPreview::new(widgets.video.clone());

    let state = match AppState::new(config, backend_tx.clone(), preview) {
        Ok(state) => Rc::new(RefCell::new(state)),
        Err(e) => {
            log::error!("Failed to start async runtime: {e}");
            app.quit();
            return;
        }
    };

    register_actions(app, &widgets.window);

    // Picking and dropping files
    {
        let sender = backend_tx.clone();
        let window = widgets.window.clone();
        widgets.uploader.choose_button.connect_clicked(move |_| {
            ui::uploader::open_file_dialog(&window, sender.clone());
        });
        ui::uploader::attach_drop_target(&widgets.window, backend_tx.clone());
    }

    // Analyze / reset buttons
    {
        let sender = backend_tx.clone();
        widgets.analyze_button.connect_clicked(move |_| {
            let _ = sender.try_send(BackendEvent::AnalyzeClicked);
        });
    }
    for button in [&widgets.choose_other_button, &widgets.new_analysis_button] {
        let sender = backend_tx.clone();
        button.connect_clicked(move |_| {
            let _ = sender.try_send(BackendEvent::ResetClicked);
        });
    }

    // API key edits apply to this session only
    {
        let state_clone = state.clone();
        widgets
            .uploader
            .api_key_row
            .connect_changed(move |row: &libadwaita::PasswordEntryRow| {
                state_clone.borrow_mut().config.gemini_api_key = row.text().to_string();
            });
    }

    // Release the preview on every way out: closing the window, and app.quit,
    // which tears windows down without a close-request
    {
        let state_clone = state.clone();
        widgets.window.connect_close_request(move |_| {
            app::teardown(&state_clone);
            gtk4::glib::Propagation::Proceed
        });
        let state_clone = state.clone();
        app.connect_shutdown(move |_| app::teardown(&state_clone));
    }

    let window = widgets.window.clone();
    state.borrow_mut().window = Some(widgets);
    app::refresh(&state);
    window.present();

    // Attach backend event handler
    {
        let state_clone = state.clone();
        gtk4::glib::spawn_future_local(async move {
            while let Ok(event) = backend_rx.recv().await {
                app::handle_backend_event(&state_clone, event);
            }
        });
    }
}

fn register_actions(app: &libadwaita::Application, window: &libadwaita::ApplicationWindow) {
    let quit = gio::SimpleAction::new("quit", None);
    {
        let app = app.clone();
        quit.connect_activate(move |_, _| app.quit());
    }
    app.add_action(&quit);

    let about = gio::SimpleAction::new("about", None);
    {
        let window = window.clone();
        about.connect_activate(move |_, _| {
            let dialog = libadwaita::AboutDialog::builder()
                .application_name("Form Coach")
                .application_icon("camera-video-symbolic")
                .version(env!("CARGO_PKG_VERSION"))
                .comments("Exercise technique feedback powered by Google Gemini")
                .license_type(gtk4::License::MitX11)
                .build();
            dialog.present(Some(&window));
        });
    }
    app.add_action(&about);
}
