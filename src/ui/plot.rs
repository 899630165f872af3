use eframe::egui::{Color32, Ui};
use egui_plot::{uniform_grid_spacer, Bar, BarChart, MarkerShape, Plot, PlotPoint, Points};

use crate::color::{ramp, ColorMap};
use crate::data::aggregate::{bubble_series, category_at, Axis, BubbleChart, CategoryCount};
use crate::data::model::FacultyRecord;

const CHART_HEIGHT: f32 = 260.0;
const EMPTY_NOTE: &str = "No rows match the current filters.";

fn category_label(labels: &[String], value: f64) -> String {
    category_at(labels, value).unwrap_or_default().to_string()
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Count-by-category bar chart. Renders an empty frame when `counts` is empty.
pub fn bar_chart(ui: &mut Ui, id: &str, counts: &[CategoryCount], colors: Option<&ColorMap>) {
    if counts.is_empty() {
        ui.weak(EMPTY_NOTE);
    }

    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let bar = Bar::new(i as f64, c.count as f64)
                .name(&c.label)
                .width(0.7);
            match colors {
                Some(cm) => bar.fill(cm.color_for(&c.label)),
                None => bar,
            }
        })
        .collect();
    let labels: Vec<String> = counts.iter().map(|c| c.label.clone()).collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .include_y(0.0)
        .include_x(-0.5)
        .include_x(counts.len().max(1) as f64 - 0.5)
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .y_axis_label("count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE));
        });
}

// ---------------------------------------------------------------------------
// Bubble charts
// ---------------------------------------------------------------------------

/// One bubble panel: a circle per row, sized by the x metric.
pub fn bubble_chart(ui: &mut Ui, chart: &BubbleChart, rows: &[&FacultyRecord]) {
    let series = bubble_series(rows, chart);
    if series.is_empty() {
        ui.weak(EMPTY_NOTE);
    }

    let x_label = chart.x.column();
    let y_label = chart.y.label();
    let categorical = chart.y == Axis::University;
    let categories = series.categories.clone();
    let hover_categories = series.categories.clone();

    let mut plot = Plot::new(chart.title)
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .include_x(0.0)
        .include_y(0.0)
        .label_formatter(move |name, value: &PlotPoint| {
            let y = if categorical {
                category_label(&hover_categories, value.y)
            } else {
                format!("{:.0}", value.y)
            };
            let prefix = if name.is_empty() { String::new() } else { format!("{name}\n") };
            format!("{prefix}{x_label}: {:.0}\n{y_label}: {y}", value.x)
        });

    if categorical {
        plot = plot
            .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
            .y_axis_formatter(move |mark, _range| category_label(&categories, mark.value))
            .include_y(series.categories.len().max(1) as f64 - 1.0);
    }

    plot.show(ui, |plot_ui| {
        for p in &series.points {
            let color = if chart.color_by_x {
                ramp(p.intensity)
            } else {
                Color32::from_rgb(70, 130, 180)
            };
            plot_ui.points(
                Points::new(vec![[p.x, p.y]])
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(p.radius)
                    .color(color.gamma_multiply(0.7))
                    .name(&p.label),
            );
        }
    });
}
