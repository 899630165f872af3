use eframe::egui::{self, Ui};

use crate::data::ranking::RankingField;
use crate::state::AppState;
use crate::ui::table::{comparison_table, raw_table};

/// Year-over-year ranking comparison view.
pub fn rankings_view(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Scholar scores and ranking");
    ui.label(
        "Scholar scores are derived from Google Scholar citation measures \
         (M10, G10, P10, C40, C60, C80) and compared with the published ranking.",
    );

    if state.rankings.is_empty() {
        ui.add_space(8.0);
        ui.label("No ranking snapshots loaded  (File → Open ranking snapshot…)");
        return;
    }

    // ---- Raw snapshots ----
    for snapshot in &state.rankings {
        egui::CollapsingHeader::new(format!("{} ranking data", snapshot.year))
            .id_salt(("raw_ranking", &snapshot.year))
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                raw_table(ui, &format!("raw_{}", snapshot.year), &snapshot.raw);
                match snapshot.size_usn_correlation() {
                    Some(r) => ui.label(format!("Correlation between program size and USN score: {r:.4}")),
                    None => ui.weak("Not enough variation to correlate size and USN score."),
                };
            });
    }
    ui.separator();

    // ---- Year selection ----
    let years: Vec<String> = state.rankings.iter().map(|s| s.year.clone()).collect();
    let mut earlier = state.earlier_year.clone().unwrap_or_default();
    let mut later = state.later_year.clone().unwrap_or_default();
    ui.horizontal(|ui: &mut Ui| {
        year_combo(ui, "earlier_year", "Compare", &mut earlier, &years);
        year_combo(ui, "later_year", "with", &mut later, &years);
    });
    if state.earlier_year.as_deref() != Some(earlier.as_str())
        || state.later_year.as_deref() != Some(later.as_str())
    {
        state.set_comparison_years(earlier.clone(), later.clone());
    }

    if earlier == later {
        ui.weak("Pick two different years to compare.");
        return;
    }

    ui.heading(format!("{earlier} vs {later}"));
    ui.label(format!("{} universities appear in both snapshots.", state.comparison.len()));

    for field in RankingField::ALL {
        ui.add_space(8.0);
        ui.strong(field.label());
        comparison_table(
            ui,
            &format!("compare_{}", field.label()),
            &state.comparison,
            (earlier.as_str(), later.as_str()),
            field,
        );
    }
}

fn year_combo(ui: &mut Ui, id: &str, label: &str, current: &mut String, years: &[String]) {
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.as_str())
        .show_ui(ui, |ui: &mut Ui| {
            for year in years {
                ui.selectable_value(current, year.clone(), year.as_str());
            }
        });
}
