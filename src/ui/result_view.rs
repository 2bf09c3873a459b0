use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::report::{AnalysisResult, ScoreBand};

const SCORE_CSS: &str = r#"
levelbar.score-bar block.filled.success { background-color: @success_color; }
levelbar.score-bar block.filled.warning { background-color: @warning_color; }
levelbar.score-bar block.filled.error { background-color: @error_color; }
"#;

/// Register the colours of the score bar. Call once at startup.
pub fn install_css() {
    let Some(display) = gtk4::gdk::Display::default() else {
        log::warn!("No display; score bar keeps default colours");
        return;
    };
    let css_provider = gtk4::CssProvider::new();
    css_provider.load_from_string(SCORE_CSS);
    gtk4::style_context_add_provider_for_display(
        &display,
        &css_provider,
        gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}

/// Score out of ten as a bar, filled in the colour of its band.
fn score_bar(score: u8) -> gtk4::LevelBar {
    let bar = gtk4::LevelBar::for_interval(0.0, f64::from(AnalysisResult::MAX_SCORE));
    bar.set_mode(gtk4::LevelBarMode::Continuous);
    bar.add_css_class("score-bar");
    for name in ["low", "high", "full"] {
        bar.remove_offset_value(Some(name));
    }
    // Offsets name the filled block after the band it reaches
    for band in ScoreBand::ALL {
        bar.add_offset_value(band.css_class(), f64::from(band.upper_bound()));
    }
    bar.set_value(f64::from(score));
    bar.add_css_class(ScoreBand::for_score(score).css_class());
    bar.set_width_request(120);
    bar
}

/// Replace the contents of `container` with a rendering of `result`.
pub fn show_result(container: &gtk4::Box, result: &AnalysisResult) {
    while let Some(child) = container.first_child() {
        container.remove(&child);
    }

    // --- Header: exercise, muscles, score ---
    let header = gtk4::Box::new(gtk4::Orientation::Horizontal, 16);
    let titles = gtk4::Box::new(gtk4::Orientation::Vertical, 4);
    titles.set_hexpand(true);

    let name = gtk4::Label::new(Some(&result.exercise_name));
    name.add_css_class("title-1");
    name.set_xalign(0.0);
    name.set_wrap(true);
    titles.append(&name);

    let muscles = gtk4::Label::new(Some(&format!(
        "Target muscles: {}",
        result.muscle_summary()
    )));
    muscles.add_css_class("dim-label");
    muscles.set_xalign(0.0);
    muscles.set_wrap(true);
    titles.append(&muscles);
    header.append(&titles);

    let score_box = gtk4::Box::new(gtk4::Orientation::Vertical, 6);
    score_box.set_valign(gtk4::Align::Center);
    let score = gtk4::Label::new(Some(&format!("{}/10", result.score)));
    score.add_css_class("title-1");
    score.add_css_class(result.score_band().css_class());
    score_box.append(&score);
    score_box.append(&score_bar(result.score));
    header.append(&score_box);
    container.append(&header);

    // --- Safety ---
    let safety_group = libadwaita::PreferencesGroup::new();
    safety_group.set_margin_top(12);
    let safety_row = libadwaita::ActionRow::builder()
        .title("Safety")
        .subtitle(result.safety_level.as_str())
        .build();
    let icon = gtk4::Image::from_icon_name(result.safety_level.icon_name());
    icon.add_css_class(result.safety_level.css_class());
    safety_row.add_prefix(&icon);
    safety_group.add(&safety_row);
    container.append(&safety_group);

    container.append(&list_group(
        "What You Did Well",
        "emblem-ok-symbolic",
        &result.good_points,
        "Nothing stood out this time.",
    ));
    container.append(&list_group(
        "Mistakes",
        "dialog-warning-symbolic",
        &result.mistakes,
        "No technique mistakes spotted.",
    ));
    container.append(&list_group(
        "Recommendations",
        "starred-symbolic",
        &result.recommendations,
        "No recommendations.",
    ));
}

fn list_group(
    title: &str,
    icon_name: &str,
    items: &[String],
    empty_text: &str,
) -> libadwaita::PreferencesGroup {
    let group = libadwaita::PreferencesGroup::new();
    group.set_title(title);
    group.set_margin_top(12);

    if items.is_empty() {
        let row = libadwaita::ActionRow::builder().title(empty_text).build();
        row.add_css_class("dim-label");
        group.add(&row);
        return group;
    }

    for item in items {
        let row = libadwaita::ActionRow::builder()
            .title(item.as_str())
            .use_markup(false)
            .title_lines(0)
            .build();
        row.add_prefix(&gtk4::Image::from_icon_name(icon_name));
        group.add(&row);
    }
    group
}
