use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::config::Args;
use crate::data::error::LoadError;
use crate::data::filter::{filtered_indices, FilterSpec, MatchMode, RankFilter};
use crate::data::loader::{load_faculty, load_universities};
use crate::data::model::{FacultyRecord, FacultyTable, Metric, MetricRange, Rank};
use crate::data::ranking::{compare_snapshots, load_ranking, RankingComparison, RankingSnapshot};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Faculty,
    Rankings,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded faculty table (None until a file is loaded).
    pub faculty: Option<FacultyTable>,

    /// Names from the optional university reference file.
    pub university_reference: Vec<String>,

    /// Current sidebar selections.
    pub filters: FilterSpec,

    /// Indices of records passing the current filters.
    pub visible_indices: Vec<usize>,

    /// Ranking snapshots ordered by year.
    pub rankings: Vec<RankingSnapshot>,

    /// Years selected for the comparison view.
    pub earlier_year: Option<String>,
    pub later_year: Option<String>,

    pub comparison: Vec<RankingComparison>,

    /// Colours for the rank bar chart.
    pub rank_colors: ColorMap,

    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            faculty: None,
            university_reference: Vec::new(),
            filters: FilterSpec::default(),
            visible_indices: Vec::new(),
            rankings: Vec::new(),
            earlier_year: None,
            later_year: None,
            comparison: Vec::new(),
            rank_colors: ColorMap::new(
                Rank::ALL
                    .iter()
                    .chain(std::iter::once(&Rank::Unknown))
                    .map(|r| r.label()),
            ),
            tab: Tab::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Build the initial state from command-line options. Any file that
    /// fails to load here is fatal.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut state = AppState::default();

        if let Some(path) = &args.data {
            state.open_faculty(path)?;
        }
        if let Some(path) = &args.universities {
            state.open_universities(path)?;
        }
        for source in &args.rankings {
            state.open_ranking(&source.path, &source.year)?;
        }
        Ok(state)
    }

    // -- Loading --

    pub fn open_faculty(&mut self, path: &Path) -> Result<()> {
        let table = load_faculty(path)
            .with_context(|| format!("loading faculty data from {}", path.display()))?;
        self.set_dataset(table);
        Ok(())
    }

    pub fn open_universities(&mut self, path: &Path) -> Result<()> {
        self.university_reference = load_universities(path)
            .with_context(|| format!("loading university list from {}", path.display()))?;
        log::info!("{} reference universities loaded", self.university_reference.len());
        Ok(())
    }

    pub fn open_ranking(&mut self, path: &Path, year: &str) -> Result<()> {
        let snapshot = load_ranking(path, year)
            .with_context(|| format!("loading {year} ranking from {}", path.display()))?;
        self.add_ranking(snapshot)?;
        Ok(())
    }

    /// Ingest a newly loaded table and reset the filters to show everything.
    pub fn set_dataset(&mut self, table: FacultyTable) {
        self.filters = FilterSpec::default();
        self.visible_indices = (0..table.len()).collect();
        self.faculty = Some(table);
        self.status_message = None;
    }

    pub fn add_ranking(&mut self, snapshot: RankingSnapshot) -> Result<(), LoadError> {
        if self.rankings.iter().any(|s| s.year == snapshot.year) {
            return Err(LoadError::DuplicateYear(snapshot.year));
        }
        self.rankings.push(snapshot);
        self.rankings.sort_by(|a, b| a.year.cmp(&b.year));

        self.earlier_year = self.rankings.first().map(|s| s.year.clone());
        self.later_year = self.rankings.last().map(|s| s.year.clone());
        self.recompare();
        Ok(())
    }

    // -- Filtering --

    /// Recompute `visible_indices` from the full table.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.faculty {
            self.visible_indices = filtered_indices(table, &self.filters);
        }
    }

    pub fn visible_records(&self) -> Vec<&FacultyRecord> {
        match &self.faculty {
            Some(table) => table.select(&self.visible_indices),
            None => Vec::new(),
        }
    }

    /// Current slider positions: the active range or the full data bounds.
    pub fn slider_range(&self, metric: Metric) -> MetricRange {
        let bounds = self
            .faculty
            .as_ref()
            .map(|t| t.range(metric))
            .unwrap_or(MetricRange::new(0.0, 0.0));
        self.filters.range(metric).range.unwrap_or(bounds)
    }

    pub fn set_range(&mut self, metric: Metric, range: MetricRange) {
        self.filters.range_mut(metric).range = Some(range);
        self.refilter();
    }

    pub fn set_rank(&mut self, rank: RankFilter) {
        self.filters.rank = rank;
        self.refilter();
    }

    pub fn toggle_university(&mut self, name: &str) {
        self.filters.universities.toggle(name);
        self.refilter();
    }

    /// Switching modes drops the selection: a needle is not a name.
    pub fn set_match_mode(&mut self, mode: MatchMode) {
        if self.filters.universities.mode == mode {
            return;
        }
        self.filters.universities.mode = mode;
        self.filters.universities.selected.clear();
        self.refilter();
    }

    pub fn clear_universities(&mut self) {
        self.filters.universities.selected.clear();
        self.refilter();
    }

    pub fn reset_filters(&mut self) {
        self.filters = FilterSpec::default();
        self.refilter();
    }

    /// Selector options: reference names merged with names in the data.
    pub fn university_options(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.university_reference.iter().cloned().collect();
        if let Some(table) = &self.faculty {
            names.extend(table.universities.iter().cloned());
        }
        names.into_iter().collect()
    }

    // -- Rankings --

    pub fn snapshot(&self, year: &str) -> Option<&RankingSnapshot> {
        self.rankings.iter().find(|s| s.year == year)
    }

    pub fn set_comparison_years(&mut self, earlier: String, later: String) {
        self.earlier_year = Some(earlier);
        self.later_year = Some(later);
        self.recompare();
    }

    fn recompare(&mut self) {
        self.comparison = match (&self.earlier_year, &self.later_year) {
            (Some(a), Some(b)) if a != b => match (self.snapshot(a), self.snapshot(b)) {
                (Some(earlier), Some(later)) => compare_snapshots(earlier, later),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{record, RawRows};
    use crate::data::ranking::project_ranking;

    fn state() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(FacultyTable::from_records(vec![
            record("Temple University", 10.0, 2, 1, Rank::Assistant),
            record("Carnegie Mellon University", 200.0, 20, 40, Rank::Full),
            record("Temple University", 75.0, 9, 15, Rank::Full),
        ]));
        state
    }

    fn ranking(year: &str) -> RankingSnapshot {
        project_ranking(
            RawRows {
                columns: ["Rank", "University", "Size", "USN", "Scholar"]
                    .map(String::from)
                    .to_vec(),
                rows: Vec::new(),
            },
            year,
        )
        .unwrap()
    }

    #[test]
    fn new_dataset_shows_everything() {
        let s = state();
        assert_eq!(s.visible_indices, vec![0, 1, 2]);
        assert_eq!(s.slider_range(Metric::Citations), MetricRange::new(10.0, 200.0));
    }

    #[test]
    fn interactions_refilter() {
        let mut s = state();
        s.set_range(Metric::Citations, MetricRange::new(50.0, 250.0));
        assert_eq!(s.visible_indices, vec![1, 2]);
        s.set_rank(RankFilter::Only(Rank::Full));
        s.toggle_university("Temple University");
        assert_eq!(s.visible_indices, vec![2]);
        assert_eq!(s.visible_records()[0].citations, 75.0);

        s.clear_universities();
        assert_eq!(s.visible_indices, vec![1, 2]);
        s.reset_filters();
        assert_eq!(s.visible_indices, vec![0, 1, 2]);
    }

    #[test]
    fn switching_match_mode_clears_the_selection() {
        let mut s = state();
        s.set_match_mode(MatchMode::Contains);
        s.toggle_university("Carnegie");
        assert_eq!(s.visible_indices, vec![1]);

        s.set_match_mode(MatchMode::Exact);
        assert!(s.filters.universities.selected.is_empty());
        assert_eq!(s.visible_indices, vec![0, 1, 2]);

        s.toggle_university("Temple University");
        s.toggle_university("Carnegie Mellon University");
        s.set_match_mode(MatchMode::Exact);
        assert_eq!(s.filters.universities.selected.len(), 2);
        s.set_match_mode(MatchMode::Contains);
        assert!(s.filters.universities.selected.is_empty());
        assert_eq!(s.visible_indices, vec![0, 1, 2]);
    }

    #[test]
    fn failed_menu_load_keeps_previous_data() {
        let mut s = state();
        s.set_rank(RankFilter::Only(Rank::Full));
        assert_eq!(s.visible_indices, vec![1, 2]);

        assert!(s.open_faculty(Path::new("/nonexistent/faculty.csv")).is_err());
        assert_eq!(s.faculty.as_ref().map(FacultyTable::len), Some(3));
        assert_eq!(s.filters.rank, RankFilter::Only(Rank::Full));
        assert_eq!(s.visible_indices, vec![1, 2]);
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let mut s = state();
        s.set_range(Metric::T10, MetricRange::new(100.0, 200.0));
        assert!(s.visible_records().is_empty());
        assert!(s.status_message.is_none());
    }

    #[test]
    fn options_merge_reference_names() {
        let mut s = state();
        s.university_reference = vec!["Drexel University".into(), "Temple University".into()];
        assert_eq!(
            s.university_options(),
            vec!["Carnegie Mellon University", "Drexel University", "Temple University"]
        );
    }

    #[test]
    fn rankings_are_ordered_and_unique() {
        let mut s = AppState::default();
        s.add_ranking(ranking("2018")).unwrap();
        s.add_ranking(ranking("2017")).unwrap();
        assert!(matches!(s.add_ranking(ranking("2017")), Err(LoadError::DuplicateYear(_))));

        let years: Vec<&str> = s.rankings.iter().map(|r| r.year.as_str()).collect();
        assert_eq!(years, vec!["2017", "2018"]);
        assert_eq!(s.earlier_year.as_deref(), Some("2017"));
        assert_eq!(s.later_year.as_deref(), Some("2018"));
    }

    #[test]
    fn fatal_startup_error_for_missing_file() {
        let args = Args {
            data: Some("/nonexistent/faculty.csv".into()),
            ..Args::default()
        };
        let err = AppState::from_args(&args).err().unwrap();
        assert!(format!("{err:#}").contains("loading faculty data"));
    }
}
