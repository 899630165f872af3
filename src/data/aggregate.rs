use std::collections::{BTreeMap, HashMap};

use super::model::{FacultyRecord, Metric};

// ---------------------------------------------------------------------------
// Category counts (bar charts)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryColumn {
    University,
    Rank,
}

impl CategoryColumn {
    pub fn label(self) -> &'static str {
        match self {
            CategoryColumn::University => "university",
            CategoryColumn::Rank => "rank",
        }
    }

    fn value(self, record: &FacultyRecord) -> String {
        match self {
            CategoryColumn::University => record.university.clone(),
            CategoryColumn::Rank => record.rank.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Frequency of each value, most frequent first; ties keep first-seen order.
pub fn category_counts(rows: &[&FacultyRecord], column: CategoryColumn) -> Vec<CategoryCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for r in rows {
        let value = column.value(r);
        let entry = counts.entry(value.clone()).or_insert(0);
        if *entry == 0 {
            order.push(value);
        }
        *entry += 1;
    }

    let mut out: Vec<CategoryCount> = order
        .into_iter()
        .map(|label| {
            let count = counts[&label];
            CategoryCount { label, count }
        })
        .collect();
    // Stable sort keeps insertion order among equal counts.
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

// ---------------------------------------------------------------------------
// Bubble charts
// ---------------------------------------------------------------------------

/// A chart axis: a numeric metric or the categorical university column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Metric(Metric),
    University,
}

impl Axis {
    pub fn label(self) -> &'static str {
        match self {
            Axis::Metric(m) => m.column(),
            Axis::University => "university",
        }
    }
}

/// Declarative description of one bubble panel. Bubble size, and color
/// when `color_by_x` is set, follow the x metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BubbleChart {
    pub title: &'static str,
    pub x: Metric,
    pub y: Axis,
    pub color_by_x: bool,
}

pub const BUBBLE_CHARTS: [BubbleChart; 5] = [
    BubbleChart {
        title: "t10 to citations",
        x: Metric::T10,
        y: Axis::Metric(Metric::Citations),
        color_by_x: false,
    },
    BubbleChart {
        title: "t10 to h-index",
        x: Metric::T10,
        y: Axis::Metric(Metric::HIndex),
        color_by_x: false,
    },
    BubbleChart {
        title: "t10 to university",
        x: Metric::T10,
        y: Axis::University,
        color_by_x: true,
    },
    BubbleChart {
        title: "citations to university",
        x: Metric::Citations,
        y: Axis::University,
        color_by_x: true,
    },
    BubbleChart {
        title: "h-index to university",
        x: Metric::HIndex,
        y: Axis::University,
        color_by_x: true,
    },
];

pub const MIN_RADIUS: f32 = 2.0;
pub const MAX_RADIUS: f32 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BubblePoint {
    pub x: f64,
    pub y: f64,
    pub radius: f32,
    /// Position of the x value within the series, `0.0..=1.0`.
    pub intensity: f32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BubbleSeries {
    pub points: Vec<BubblePoint>,
    /// Tick labels for a categorical y axis, indexed by position.
    pub categories: Vec<String>,
}

impl BubbleSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Label at an integer axis position of a categorical axis.
pub fn category_at(categories: &[String], position: f64) -> Option<&str> {
    let rounded = position.round();
    if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
        return None;
    }
    categories.get(rounded as usize).map(String::as_str)
}

/// Project the rows onto one bubble panel.
pub fn bubble_series(rows: &[&FacultyRecord], chart: &BubbleChart) -> BubbleSeries {
    let categories: Vec<String> = match chart.y {
        Axis::University => {
            let unique: BTreeMap<&str, ()> =
                rows.iter().map(|r| (r.university.as_str(), ())).collect();
            unique.into_keys().map(str::to_string).collect()
        }
        Axis::Metric(_) => Vec::new(),
    };
    let position: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    let xs: Vec<f64> = rows.iter().map(|r| r.metric(chart.x)).collect();
    let (lo, hi) = xs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = hi - lo;

    let points = rows
        .iter()
        .zip(xs.iter())
        .map(|(r, &x)| {
            let y = match chart.y {
                Axis::Metric(m) => r.metric(m),
                Axis::University => position
                    .get(r.university.as_str())
                    .copied()
                    .unwrap_or_default() as f64,
            };
            let intensity = if span > f64::EPSILON {
                ((x - lo) / span) as f32
            } else {
                0.5
            };
            BubblePoint {
                x,
                y,
                radius: MIN_RADIUS + intensity * (MAX_RADIUS - MIN_RADIUS),
                intensity,
                label: format!("{} {}", r.first, r.last),
            }
        })
        .collect();

    BubbleSeries { points, categories }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation coefficient. `None` for fewer than two pairs or a
/// constant column.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom <= f64::EPSILON {
        return None;
    }
    Some(cov / denom)
}

/// Correlation of two metrics across the rows.
pub fn metric_correlation(rows: &[&FacultyRecord], a: Metric, b: Metric) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = rows.iter().map(|r| (r.metric(a), r.metric(b))).collect();
    pearson(&pairs)
}

/// Correlation of the natural logs of two metrics, over rows where both
/// are positive.
pub fn log_metric_correlation(rows: &[&FacultyRecord], a: Metric, b: Metric) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = rows
        .iter()
        .map(|r| (r.metric(a), r.metric(b)))
        .filter(|(x, y)| *x > 0.0 && *y > 0.0)
        .map(|(x, y)| (x.ln(), y.ln()))
        .collect();
    pearson(&pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{record, Rank};

    #[test]
    fn counts_sorted_descending_with_stable_ties() {
        let rows = vec![
            record("Temple", 1.0, 1, 1, Rank::Full),
            record("Penn", 1.0, 1, 1, Rank::Assistant),
            record("CMU", 1.0, 1, 1, Rank::Full),
            record("CMU", 1.0, 1, 1, Rank::Associate),
        ];
        let refs: Vec<&FacultyRecord> = rows.iter().collect();

        let unis = category_counts(&refs, CategoryColumn::University);
        let labels: Vec<&str> = unis.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["CMU", "Temple", "Penn"]);
        assert_eq!(unis[0].count, 2);

        let ranks = category_counts(&refs, CategoryColumn::Rank);
        assert_eq!(ranks[0], CategoryCount { label: "Full".into(), count: 2 });
        assert_eq!(ranks.len(), 3);
    }

    #[test]
    fn empty_input_gives_empty_outputs() {
        assert!(category_counts(&[], CategoryColumn::Rank).is_empty());
        for chart in &BUBBLE_CHARTS {
            let series = bubble_series(&[], chart);
            assert!(series.is_empty());
            assert!(series.categories.is_empty());
        }
    }

    #[test]
    fn bubble_size_follows_x() {
        let rows = vec![
            record("A", 100.0, 4, 10, Rank::Full),
            record("B", 300.0, 9, 30, Rank::Full),
            record("C", 200.0, 6, 20, Rank::Full),
        ];
        let refs: Vec<&FacultyRecord> = rows.iter().collect();
        let series = bubble_series(&refs, &BUBBLE_CHARTS[0]);

        assert_eq!(series.points[0].radius, MIN_RADIUS);
        assert_eq!(series.points[1].radius, MAX_RADIUS);
        assert_eq!(series.points[2].intensity, 0.5);
        assert_eq!((series.points[1].x, series.points[1].y), (30.0, 300.0));
    }

    #[test]
    fn constant_x_gives_mid_size() {
        let rows = vec![record("A", 1.0, 1, 5, Rank::Full), record("B", 2.0, 1, 5, Rank::Full)];
        let refs: Vec<&FacultyRecord> = rows.iter().collect();
        let series = bubble_series(&refs, &BUBBLE_CHARTS[1]);
        assert!(series.points.iter().all(|p| p.intensity == 0.5));
    }

    #[test]
    fn university_axis_is_categorical() {
        let rows = vec![
            record("Temple", 1.0, 1, 5, Rank::Full),
            record("CMU", 2.0, 1, 7, Rank::Full),
            record("Temple", 3.0, 1, 9, Rank::Full),
        ];
        let refs: Vec<&FacultyRecord> = rows.iter().collect();
        let series = bubble_series(&refs, &BUBBLE_CHARTS[2]);

        assert_eq!(series.categories, vec!["CMU", "Temple"]);
        let ys: Vec<f64> = series.points.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![1.0, 0.0, 1.0]);
        assert_eq!(category_at(&series.categories, 1.0), Some("Temple"));
        assert_eq!(category_at(&series.categories, 0.5), None);
        assert_eq!(category_at(&series.categories, -1.0), None);
        assert_eq!(category_at(&series.categories, 4.0), None);
    }

    #[test]
    fn pearson_detects_linear_relationships() {
        let up = [(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)];
        let down = [(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)];
        assert!((pearson(&up).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&down).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&[(1.0, 1.0)]), None);
        assert_eq!(pearson(&[(1.0, 1.0), (1.0, 2.0)]), None);
    }

    #[test]
    fn log_correlation_skips_non_positive() {
        let rows = vec![
            record("A", 1.0, 0, 4, Rank::Full),
            record("A", 1.0, 2, 4, Rank::Full),
            record("A", 1.0, 4, 16, Rank::Full),
            record("A", 1.0, 8, 64, Rank::Full),
        ];
        let refs: Vec<&FacultyRecord> = rows.iter().collect();
        let r = log_metric_correlation(&refs, Metric::HIndex, Metric::T10).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
        assert!(metric_correlation(&refs, Metric::HIndex, Metric::T10).is_some());
    }
}
