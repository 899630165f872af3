use eframe::egui::{self, ScrollArea, Ui};

use crate::data::aggregate::{
    category_counts, log_metric_correlation, metric_correlation, CategoryColumn, BUBBLE_CHARTS,
};
use crate::data::model::{FacultyRecord, Metric};
use crate::state::{AppState, Tab};
use crate::ui::{panels, plot, rankings, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CitationExplorerApp {
    pub state: AppState,
}

impl CitationExplorerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for CitationExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tables and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.state.tab, Tab::Faculty, "Faculty");
                ui.selectable_value(&mut self.state.tab, Tab::Rankings, "Rankings");
            });
            ui.separator();

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.tab {
                    Tab::Faculty => faculty_view(ui, &self.state),
                    Tab::Rankings => rankings::rankings_view(ui, &mut self.state),
                });
        });
    }
}

fn intro(ui: &mut Ui) {
    ui.heading("Computer Science Department Professors' Citations");
    ui.label(
        "Citation measures for professors in computer science departments, \
         scraped from their Google Scholar pages, collected to study how \
         citation values relate to peer-review ranking scores.",
    );
    ui.add_space(4.0);
    ui.strong("Reading the data");
    ui.label("• t10 is the citation count of a professor's 10th most-cited paper.");
    ui.label(
        "• The h-index is the largest h such that the professor has h papers \
         with at least h citations each.",
    );
    ui.label("• Tables and charts below follow the sidebar filters.");
}

fn faculty_view(ui: &mut Ui, state: &AppState) {
    intro(ui);
    ui.separator();

    let Some(faculty) = &state.faculty else {
        ui.centered_and_justified(|ui| {
            ui.heading("Open a file to explore  (File → Open faculty data…)");
        });
        return;
    };

    if faculty.is_empty() {
        ui.weak("The file has no rows marked as current.");
    }

    let all: Vec<&FacultyRecord> = faculty.records.iter().collect();
    let visible = state.visible_records();

    ui.heading("Raw full data");
    table::faculty_table(ui, "raw_table", &all);

    let anomalies = faculty.anomalies();
    if !anomalies.is_empty() {
        ui.weak(format!(
            "{} records report a t10 larger than their total citations.",
            anomalies.len()
        ));
    }
    ui.add_space(8.0);

    ui.heading("Filtered dataset");
    ui.label(format!("{} of {} records", visible.len(), faculty.len()));
    table::faculty_table(ui, "filtered_table", &visible);
    ui.separator();

    // ---- Bar charts ----
    for (column, colors) in [
        (CategoryColumn::University, None),
        (CategoryColumn::Rank, Some(&state.rank_colors)),
    ] {
        ui.heading(format!("Number of records per {}", column.label()));
        plot::bar_chart(
            ui,
            &format!("{}_counts", column.label()),
            &category_counts(&visible, column),
            colors,
        );
    }

    // ---- Bubble charts ----
    for chart in &BUBBLE_CHARTS {
        ui.add_space(8.0);
        ui.heading(chart.title);
        plot::bubble_chart(ui, chart, &visible);
    }

    // ---- Correlations ----
    ui.add_space(8.0);
    ui.heading("Correlations");
    let fmt = |r: Option<f64>| r.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
    ui.label(format!(
        "h-index and t10: {}",
        fmt(metric_correlation(&visible, Metric::HIndex, Metric::T10))
    ));
    ui.label(format!(
        "log h-index and log t10: {}",
        fmt(log_metric_correlation(&visible, Metric::HIndex, Metric::T10))
    ));
}
