use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell as read from a source file
// ---------------------------------------------------------------------------

/// A dynamically-typed cell. Every loader produces these before the
/// fixed column projection turns them into typed records.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Guess the type of a raw delimited-text field.
    pub fn from_field(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::Text(s.to_string())
    }

    /// True for nulls, NaN and blank text – the cells that get a default.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            CellValue::Text(s) => {
                let t = s.trim();
                t.is_empty() || t.eq_ignore_ascii_case("nan")
            }
            _ => false,
        }
    }

    /// Text content with normalized whitespace; missing cells become "".
    pub fn as_text(&self) -> String {
        if self.is_missing() {
            return String::new();
        }
        normalize_text(&self.to_string())
    }
}

// ---------------------------------------------------------------------------
// RawRows – untyped table straight out of a loader
// ---------------------------------------------------------------------------

/// Header order plus one map per row.
#[derive(Debug, Clone, Default)]
pub struct RawRows {
    pub columns: Vec<String>,
    pub rows: Vec<BTreeMap<String, CellValue>>,
}

impl RawRows {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Text normalization
// ---------------------------------------------------------------------------

/// Trim and collapse internal whitespace runs to a single space.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Matching key for university names: all whitespace removed.
pub fn university_key(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

// ---------------------------------------------------------------------------
// Rank
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Full,
    Associate,
    Assistant,
    Unknown,
}

impl Rank {
    pub const ALL: [Rank; 3] = [Rank::Full, Rank::Associate, Rank::Assistant];

    pub fn parse(s: &str) -> Self {
        match normalize_text(s).to_ascii_lowercase().as_str() {
            "full" => Rank::Full,
            "associate" => Rank::Associate,
            "assistant" => Rank::Assistant,
            _ => Rank::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::Full => "Full",
            Rank::Associate => "Associate",
            Rank::Assistant => "Assistant",
            Rank::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// FacultyRecord – one current row of the source table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FacultyRecord {
    pub first: String,
    pub last: String,
    pub university: String,
    pub citations: f64,
    pub h_index: i64,
    /// Citations of the professor's 10th most-cited paper.
    pub t10: i64,
    pub rank: Rank,
}

/// Data-quality problems that are reported but do not reject the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordIssue {
    T10ExceedsCitations,
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordIssue::T10ExceedsCitations => write!(f, "t10 exceeds total citations"),
        }
    }
}

impl FacultyRecord {
    pub fn university_key(&self) -> String {
        university_key(&self.university)
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Citations => self.citations,
            Metric::T10 => self.t10 as f64,
            Metric::HIndex => self.h_index as f64,
        }
    }

    pub fn issues(&self) -> Vec<RecordIssue> {
        let mut out = Vec::new();
        if self.t10 as f64 > self.citations {
            out.push(RecordIssue::T10ExceedsCitations);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Metric – the three numeric columns the sliders act on
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Citations,
    T10,
    HIndex,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Citations, Metric::T10, Metric::HIndex];

    /// Column name in the source file.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Citations => "citations",
            Metric::T10 => "t10",
            Metric::HIndex => "h-index",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Inclusive `[min, max]` interval over a metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    pub fn new(min: f64, max: f64) -> Self {
        MetricRange { min, max }
    }

    pub fn contains(&self, v: f64) -> bool {
        self.min <= v && v <= self.max
    }
}

// ---------------------------------------------------------------------------
// FacultyTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Current faculty records with pre-computed indices.
#[derive(Debug, Clone, Default)]
pub struct FacultyTable {
    pub records: Vec<FacultyRecord>,
    /// Deduplicated university names, sorted.
    pub universities: BTreeSet<String>,
    /// Slider bounds: floor of the minimum to ceil of the maximum.
    pub ranges: BTreeMap<Metric, MetricRange>,
}

impl FacultyTable {
    pub fn from_records(records: Vec<FacultyRecord>) -> Self {
        let universities = records
            .iter()
            .filter(|r| !r.university.is_empty())
            .map(|r| r.university.clone())
            .collect();

        let mut ranges = BTreeMap::new();
        for metric in Metric::ALL {
            let mut values = records.iter().map(|r| r.metric(metric));
            if let Some(first) = values.next() {
                let (lo, hi) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
                ranges.insert(metric, MetricRange::new(lo.floor(), hi.ceil()));
            }
        }

        FacultyTable {
            records,
            universities,
            ranges,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Slider bounds for a metric, `[0, 0]` on an empty table.
    pub fn range(&self, metric: Metric) -> MetricRange {
        self.ranges
            .get(&metric)
            .copied()
            .unwrap_or(MetricRange::new(0.0, 0.0))
    }

    /// Row indices paired with their validation problems.
    pub fn anomalies(&self) -> Vec<(usize, RecordIssue)> {
        self.records
            .iter()
            .enumerate()
            .flat_map(|(i, r)| r.issues().into_iter().map(move |issue| (i, issue)))
            .collect()
    }

    pub fn select(&self, indices: &[usize]) -> Vec<&FacultyRecord> {
        indices.iter().filter_map(|&i| self.records.get(i)).collect()
    }
}

#[cfg(test)]
pub(crate) fn record(university: &str, citations: f64, h_index: i64, t10: i64, rank: Rank) -> FacultyRecord {
    FacultyRecord {
        first: "Ada".to_string(),
        last: "Lovelace".to_string(),
        university: university.to_string(),
        citations,
        h_index,
        t10,
        rank,
    }
}
