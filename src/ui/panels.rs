use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::config::infer_year;
use crate::data::filter::{MatchMode, RankFilter};
use crate::data::model::{Metric, MetricRange, Rank};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Copy the bounds out so state can be mutated below.
    let bounds: Vec<(Metric, MetricRange)> = match &state.faculty {
        Some(table) => Metric::ALL.iter().map(|&m| (m, table.range(m))).collect(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Dual sliders per metric ----
            for (metric, full) in bounds {
                ui.strong(format!("Adjust {metric} values"));
                let current = state.slider_range(metric);
                let (mut lo, mut hi) = (current.min, current.max);

                let max_changed = ui
                    .add(Slider::new(&mut hi, full.min..=full.max).text("max").integer())
                    .changed();
                let min_changed = ui
                    .add(Slider::new(&mut lo, full.min..=full.max).text("min").integer())
                    .changed();
                if max_changed || min_changed {
                    state.set_range(metric, MetricRange::new(lo, hi));
                }
                ui.add_space(4.0);
            }
            ui.separator();

            // ---- Rank ----
            ui.strong("Professor rank");
            let mut rank = state.filters.rank;
            ui.radio_value(&mut rank, RankFilter::All, "All");
            for r in Rank::ALL {
                ui.radio_value(&mut rank, RankFilter::Only(r), r.label());
            }
            if rank != state.filters.rank {
                state.set_rank(rank);
            }
            ui.separator();

            university_selector(ui, state);
            ui.separator();

            if ui
                .add_enabled(!state.filters.is_empty(), egui::Button::new("Reset all filters"))
                .clicked()
            {
                state.reset_filters();
            }
        });
}

fn university_selector(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Select universities");

    let mut mode = state.filters.universities.mode;
    ui.horizontal(|ui: &mut Ui| {
        ui.radio_value(&mut mode, MatchMode::Exact, "Exact");
        ui.radio_value(&mut mode, MatchMode::Contains, "Contains");
    });
    if mode != state.filters.universities.mode {
        state.set_match_mode(mode);
    }

    if mode == MatchMode::Contains {
        let mut needle = state.filters.universities.selected.iter().next().cloned().unwrap_or_default();
        let response = ui.add(egui::TextEdit::singleline(&mut needle).hint_text("part of a name"));
        if response.changed() {
            state.filters.universities.selected.clear();
            state.toggle_university(&needle);
        }
        return;
    }

    let options = state.university_options();
    let n_selected = state.filters.universities.selected.len();
    let header_text = format!("Universities  ({n_selected}/{})", options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt("universities")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                state.clear_universities();
            }
            for name in &options {
                let mut checked = state.filters.universities.selected.contains(name);
                if ui.checkbox(&mut checked, name.as_str()).changed() {
                    state.toggle_university(name);
                }
            }
        });

    if !state.filters.universities.is_active() {
        ui.weak("No selection: all universities shown.");
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open faculty data…").clicked() {
                open_faculty_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open ranking snapshot…").clicked() {
                open_ranking_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open university list…").clicked() {
                open_universities_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.faculty {
            ui.label(format!(
                "{} records loaded, {} visible",
                table.len(),
                state.visible_indices.len()
            ));
        }
        if !state.rankings.is_empty() {
            ui.separator();
            ui.label(format!("{} ranking snapshots", state.rankings.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn pick_file(title: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("Delimited text", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}

fn report(state: &mut AppState, result: anyhow::Result<()>) {
    match result {
        Ok(()) => state.status_message = None,
        Err(e) => {
            log::error!("{e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn open_faculty_dialog(state: &mut AppState) {
    if let Some(path) = pick_file("Open faculty citation data") {
        let result = state.open_faculty(&path);
        report(state, result);
    }
}

pub fn open_ranking_dialog(state: &mut AppState) {
    if let Some(path) = pick_file("Open ranking snapshot") {
        let year = infer_year(&path).unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let result = state.open_ranking(&path, &year);
        report(state, result);
    }
}

pub fn open_universities_dialog(state: &mut AppState) {
    if let Some(path) = pick_file("Open university list") {
        let result = state.open_universities(&path);
        report(state, result);
    }
}
