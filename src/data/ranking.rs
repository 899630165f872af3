use std::collections::HashMap;
use std::path::Path;

use super::aggregate::pearson;
use super::error::LoadError;
use super::loader::{number, read_rows, require_columns};
use super::model::{university_key, CellValue, RawRows};

pub const RANKING_COLUMNS: [&str; 5] = ["Rank", "University", "Size", "USN", "Scholar"];

/// One department in a ranking snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingRecord {
    pub rank: i64,
    pub university: String,
    /// Program size (faculty count).
    pub size: f64,
    /// Externally published rank score.
    pub usn: f64,
    /// Score derived from the faculty citation measures.
    pub scholar: f64,
}

/// The numeric attributes compared across years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingField {
    Size,
    Rank,
    Scholar,
    Usn,
}

impl RankingField {
    pub const ALL: [RankingField; 4] = [
        RankingField::Size,
        RankingField::Rank,
        RankingField::Scholar,
        RankingField::Usn,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RankingField::Size => "Size",
            RankingField::Rank => "Rank",
            RankingField::Scholar => "Scholar score",
            RankingField::Usn => "USN score",
        }
    }

    pub fn value(self, record: &RankingRecord) -> f64 {
        match self {
            RankingField::Size => record.size,
            RankingField::Rank => record.rank as f64,
            RankingField::Scholar => record.scholar,
            RankingField::Usn => record.usn,
        }
    }
}

/// A yearly ranking table: the raw rows for display plus the projection.
#[derive(Debug, Clone)]
pub struct RankingSnapshot {
    pub year: String,
    pub raw: RawRows,
    pub records: Vec<RankingRecord>,
}

impl RankingSnapshot {
    /// Correlation between program size and the published score.
    pub fn size_usn_correlation(&self) -> Option<f64> {
        let pairs: Vec<(f64, f64)> = self.records.iter().map(|r| (r.size, r.usn)).collect();
        pearson(&pairs)
    }
}

/// Load one ranking snapshot. Missing numeric values become `0`.
pub fn load_ranking(path: &Path, year: &str) -> Result<RankingSnapshot, LoadError> {
    let raw = read_rows(path)?;
    let snapshot = project_ranking(raw, year)?;
    log::info!(
        "Loaded {} ranking rows for {year} from {}",
        snapshot.records.len(),
        path.display()
    );
    Ok(snapshot)
}

pub fn project_ranking(raw: RawRows, year: &str) -> Result<RankingSnapshot, LoadError> {
    require_columns(&raw, &RANKING_COLUMNS)?;

    let records = raw
        .rows
        .iter()
        .enumerate()
        .map(|(row_no, row)| {
            Ok(RankingRecord {
                rank: number(row, row_no, "Rank")?.round() as i64,
                university: row.get("University").map(CellValue::as_text).unwrap_or_default(),
                size: number(row, row_no, "Size")?,
                usn: number(row, row_no, "USN")?,
                scholar: number(row, row_no, "Scholar")?,
            })
        })
        .collect::<Result<Vec<_>, LoadError>>()?;

    Ok(RankingSnapshot {
        year: year.to_string(),
        raw,
        records,
    })
}

// ---------------------------------------------------------------------------
// Year-over-year comparison
// ---------------------------------------------------------------------------

/// One university present in both snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingComparison {
    pub university: String,
    pub earlier: RankingRecord,
    pub later: RankingRecord,
}

impl RankingComparison {
    /// Later minus earlier. For `Rank`, positive means the university
    /// moved down the table.
    pub fn delta(&self, field: RankingField) -> f64 {
        field.value(&self.later) - field.value(&self.earlier)
    }
}

/// Inner join on the whitespace-stripped university name, in the order of
/// the earlier snapshot. A name repeated in either snapshot yields one row
/// per pair.
pub fn compare_snapshots(earlier: &RankingSnapshot, later: &RankingSnapshot) -> Vec<RankingComparison> {
    let mut by_key: HashMap<String, Vec<&RankingRecord>> = HashMap::new();
    for r in &later.records {
        by_key.entry(university_key(&r.university)).or_default().push(r);
    }
    for (key, rows) in &by_key {
        if rows.len() > 1 && !key.is_empty() {
            log::warn!("{} lists {key} {} times", later.year, rows.len());
        }
    }

    let mut joined = Vec::new();
    for e in &earlier.records {
        let key = university_key(&e.university);
        if key.is_empty() {
            continue;
        }
        for l in by_key.get(&key).into_iter().flatten() {
            joined.push(RankingComparison {
                university: e.university.clone(),
                earlier: e.clone(),
                later: (*l).clone(),
            });
        }
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn snapshot(year: &str, csv: &str) -> RankingSnapshot {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(csv.as_bytes()).unwrap();
        load_ranking(file.path(), year).unwrap()
    }

    #[test]
    fn fills_missing_numbers_with_zero() {
        let s = snapshot(
            "2017",
            "Rank,University,Size,USN,Scholar,M10\n1,Carnegie Mellon University,,5.0,NaN,3\n",
        );
        let r = &s.records[0];
        assert_eq!(r.rank, 1);
        assert_eq!((r.size, r.usn, r.scholar), (0.0, 5.0, 0.0));
        assert!(s.raw.has_column("M10"));
    }

    #[test]
    fn missing_column_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"Rank,University,Size,USN\n1,A,2,3\n").unwrap();
        assert!(matches!(
            load_ranking(file.path(), "2017"),
            Err(LoadError::MissingColumn(c)) if c == "Scholar"
        ));
    }

    #[test]
    fn join_keeps_common_universities_in_earlier_order() {
        let a = snapshot(
            "2017",
            "Rank,University,Size,USN,Scholar\n\
             1,Carnegie Mellon University,80,5.0,4.1\n\
             2,Temple University,30,3.0,2.0\n\
             3,Old College,10,2.0,1.0\n",
        );
        let b = snapshot(
            "2018",
            "Rank,University,Size,USN,Scholar\n\
             1, Temple  University,35,3.2,2.5\n\
             4,Carnegie Mellon University,82,5.0,4.0\n\
             5,New Institute,12,2.1,1.1\n",
        );

        let joined = compare_snapshots(&a, &b);
        let names: Vec<&str> = joined.iter().map(|c| c.university.as_str()).collect();
        assert_eq!(names, vec!["Carnegie Mellon University", "Temple University"]);

        assert_eq!(joined[0].delta(RankingField::Rank), 3.0);
        assert_eq!(joined[1].delta(RankingField::Rank), -1.0);
        assert_eq!(joined[1].delta(RankingField::Size), 5.0);
        assert!((joined[1].delta(RankingField::Scholar) - 0.5).abs() < 1e-9);
        assert!((joined[1].delta(RankingField::Usn) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn repeated_names_join_every_pair() {
        let a = snapshot(
            "2017",
            "Rank,University,Size,USN,Scholar\n1,Temple University,30,3.0,2.0\n",
        );
        let b = snapshot(
            "2018",
            "Rank,University,Size,USN,Scholar\n\
             2,Temple University,35,3.2,2.5\n\
             7,TempleUniversity,12,1.0,1.0\n",
        );

        let joined = compare_snapshots(&a, &b);
        let later_ranks: Vec<i64> = joined.iter().map(|c| c.later.rank).collect();
        assert_eq!(later_ranks, vec![2, 7]);
        assert!(joined.iter().all(|c| c.university == "Temple University"));
    }

    #[test]
    fn size_usn_correlation_needs_variation() {
        let s = snapshot(
            "2017",
            "Rank,University,Size,USN,Scholar\n1,A,10,5,1\n2,B,20,4,1\n3,C,30,3,1\n",
        );
        assert!((s.size_usn_correlation().unwrap() + 1.0).abs() < 1e-9);
    }
}
