use eframe::egui::{self, Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{FacultyRecord, Metric, RawRows};
use crate::data::ranking::{RankingComparison, RankingField};

const ROW_HEIGHT: f32 = 18.0;
const HEADER_HEIGHT: f32 = 20.0;
const MAX_TABLE_HEIGHT: f32 = 280.0;

fn builder(ui: &mut Ui) -> TableBuilder<'_> {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(true)
        .max_scroll_height(MAX_TABLE_HEIGHT)
        .cell_layout(Layout::left_to_right(Align::Center))
}

/// Faculty records, one per row.
pub fn faculty_table(ui: &mut Ui, id: &str, rows: &[&FacultyRecord]) {
    if rows.is_empty() {
        ui.weak("No rows match the current filters.");
    }

    let headers = [
        "first",
        "last",
        "university",
        Metric::Citations.column(),
        Metric::HIndex.column(),
        Metric::T10.column(),
        "rank",
    ];

    ui.push_id(id, |ui: &mut Ui| {
        builder(ui)
            .column(Column::auto().at_least(70.0))
            .column(Column::auto().at_least(70.0))
            .column(Column::initial(240.0).at_least(120.0))
            .columns(Column::auto().at_least(60.0), 3)
            .column(Column::remainder().at_least(70.0))
            .header(HEADER_HEIGHT, |mut header| {
                for title in headers {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    let r = rows[row.index()];
                    row.col(|ui| {
                        ui.label(&r.first);
                    });
                    row.col(|ui| {
                        ui.label(&r.last);
                    });
                    row.col(|ui| {
                        ui.label(&r.university);
                    });
                    row.col(|ui| {
                        ui.label(format!("{}", r.citations));
                    });
                    row.col(|ui| {
                        ui.label(r.h_index.to_string());
                    });
                    row.col(|ui| {
                        ui.label(r.t10.to_string());
                    });
                    row.col(|ui| {
                        ui.label(r.rank.label());
                    });
                });
            });
    });
}

/// Any untyped table, columns in source order.
pub fn raw_table(ui: &mut Ui, id: &str, raw: &RawRows) {
    if raw.columns.is_empty() {
        ui.weak("Empty table.");
        return;
    }
    if raw.is_empty() {
        ui.weak("No rows.");
    }

    ui.push_id(id, |ui: &mut Ui| {
        builder(ui)
            .columns(Column::auto().at_least(50.0), raw.columns.len())
            .header(HEADER_HEIGHT, |mut header| {
                for title in &raw.columns {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, raw.len(), |mut row| {
                    let cells = &raw.rows[row.index()];
                    for col in &raw.columns {
                        row.col(|ui| {
                            ui.label(cells.get(col).map(|c| c.to_string()).unwrap_or_default());
                        });
                    }
                });
            });
    });
}

/// University | earlier | later | change, for one ranking attribute.
pub fn comparison_table(
    ui: &mut Ui,
    id: &str,
    rows: &[RankingComparison],
    years: (&str, &str),
    field: RankingField,
) {
    if rows.is_empty() {
        ui.weak("No universities appear in both snapshots.");
    }

    let headers = [
        "University".to_string(),
        years.0.to_string(),
        years.1.to_string(),
        "change".to_string(),
    ];

    ui.push_id(id, |ui: &mut Ui| {
        builder(ui)
            .column(Column::initial(240.0).at_least(120.0))
            .columns(Column::auto().at_least(70.0), 3)
            .header(HEADER_HEIGHT, |mut header| {
                for title in &headers {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    let c = &rows[row.index()];
                    let (a, b) = (field.value(&c.earlier), field.value(&c.later));
                    row.col(|ui| {
                        ui.label(&c.university);
                    });
                    row.col(|ui| {
                        ui.label(format_number(a));
                    });
                    row.col(|ui| {
                        ui.label(format_number(b));
                    });
                    row.col(|ui| {
                        let delta = c.delta(field);
                        let text = format!("{}{}", if delta > 0.0 { "+" } else { "" }, format_number(delta));
                        ui.label(egui::RichText::new(text).monospace());
                    });
                });
            });
    });
}

/// Integers without a fraction, everything else to two places.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_drop_empty_fractions() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.346), "2.35");
    }
}
