use std::collections::BTreeSet;

use super::model::{university_key, FacultyRecord, FacultyTable, Metric, MetricRange, Rank};

// ---------------------------------------------------------------------------
// Row predicates
// ---------------------------------------------------------------------------

/// A pure test over one record. Inactive predicates pass every row.
pub trait RowPredicate {
    fn is_active(&self) -> bool;
    fn matches(&self, record: &FacultyRecord) -> bool;
}

/// Inclusive bounds on one metric; `None` means no constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeFilter {
    pub metric: Metric,
    pub range: Option<MetricRange>,
}

impl RowPredicate for RangeFilter {
    fn is_active(&self) -> bool {
        self.range.is_some()
    }

    fn matches(&self, record: &FacultyRecord) -> bool {
        self.range
            .map_or(true, |r| r.contains(record.metric(self.metric)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankFilter {
    #[default]
    All,
    Only(Rank),
}

impl RowPredicate for RankFilter {
    fn is_active(&self) -> bool {
        matches!(self, RankFilter::Only(_))
    }

    fn matches(&self, record: &FacultyRecord) -> bool {
        match self {
            RankFilter::All => true,
            RankFilter::Only(rank) => record.rank == *rank,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Whole-name set membership.
    #[default]
    Exact,
    /// Literal substring of the name.
    Contains,
}

/// Selected university names. Comparison happens on whitespace-stripped
/// keys so formatting differences never cause a silent miss.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UniversityFilter {
    pub selected: BTreeSet<String>,
    pub mode: MatchMode,
}

impl UniversityFilter {
    /// Resolve the selection into match keys once, ahead of a row scan.
    pub fn matcher(&self) -> UniversityMatcher {
        UniversityMatcher {
            keys: self
                .selected
                .iter()
                .map(|s| university_key(s))
                .filter(|k| !k.is_empty())
                .collect(),
            mode: self.mode,
        }
    }

    /// False when no selection has a usable key.
    pub fn is_active(&self) -> bool {
        self.selected.iter().any(|s| !university_key(s).is_empty())
    }

    pub fn toggle(&mut self, name: &str) {
        if !self.selected.remove(name) {
            self.selected.insert(name.to_string());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniversityMatcher {
    keys: BTreeSet<String>,
    mode: MatchMode,
}

impl RowPredicate for UniversityMatcher {
    fn is_active(&self) -> bool {
        !self.keys.is_empty()
    }

    fn matches(&self, record: &FacultyRecord) -> bool {
        if self.keys.is_empty() {
            return true;
        }
        let key = record.university_key();
        match self.mode {
            MatchMode::Exact => self.keys.contains(&key),
            MatchMode::Contains => self.keys.iter().any(|k| key.contains(k.as_str())),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSpec – everything the side panel can set
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub citations: RangeFilter,
    pub t10: RangeFilter,
    pub h_index: RangeFilter,
    pub rank: RankFilter,
    pub universities: UniversityFilter,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            citations: RangeFilter {
                metric: Metric::Citations,
                range: None,
            },
            t10: RangeFilter {
                metric: Metric::T10,
                range: None,
            },
            h_index: RangeFilter {
                metric: Metric::HIndex,
                range: None,
            },
            rank: RankFilter::All,
            universities: UniversityFilter::default(),
        }
    }
}

impl FilterSpec {
    pub fn range_mut(&mut self, metric: Metric) -> &mut RangeFilter {
        match metric {
            Metric::Citations => &mut self.citations,
            Metric::T10 => &mut self.t10,
            Metric::HIndex => &mut self.h_index,
        }
    }

    pub fn range(&self, metric: Metric) -> &RangeFilter {
        match metric {
            Metric::Citations => &self.citations,
            Metric::T10 => &self.t10,
            Metric::HIndex => &self.h_index,
        }
    }

    /// Only the predicates that constrain anything.
    pub fn predicates(&self) -> Vec<Box<dyn RowPredicate>> {
        let all: [Box<dyn RowPredicate>; 5] = [
            Box::new(self.citations),
            Box::new(self.t10),
            Box::new(self.h_index),
            Box::new(self.rank),
            Box::new(self.universities.matcher()),
        ];
        all.into_iter().filter(|p| p.is_active()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Indices of rows passing every predicate (logical AND).
pub fn apply_predicates(table: &FacultyTable, predicates: &[Box<dyn RowPredicate>]) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| predicates.iter().all(|p| p.matches(r)))
        .map(|(i, _)| i)
        .collect()
}

/// Return indices of records that pass all active filters.
///
/// * An absent range, `RankFilter::All` or an empty university selection
///   does not constrain anything.
/// * Range bounds are inclusive; a range with `min > max` matches nothing.
pub fn filtered_indices(table: &FacultyTable, spec: &FilterSpec) -> Vec<usize> {
    let indices = apply_predicates(table, &spec.predicates());
    log::debug!("filter kept {} of {} records", indices.len(), table.len());
    indices
}
