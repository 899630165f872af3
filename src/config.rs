use std::path::{Path, PathBuf};

use clap::Parser;

/// Startup options. Everything here can also be opened later from the
/// File menu.
#[derive(Parser, Debug, Default)]
#[command(name = "citation-explorer")]
#[command(about = "Explore computer-science faculty citation metrics", long_about = None)]
pub struct Args {
    /// Faculty citation file (.csv, .tsv, .json or .parquet)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Ranking snapshot as YEAR=PATH; repeat to compare years
    #[arg(long = "ranking", value_name = "YEAR=PATH", value_parser = parse_ranking_source)]
    pub rankings: Vec<RankingSource>,

    /// Reference list of university names for the selector
    #[arg(long)]
    pub universities: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingSource {
    pub year: String,
    pub path: PathBuf,
}

fn parse_ranking_source(s: &str) -> Result<RankingSource, String> {
    match s.split_once('=') {
        Some((year, path)) if !year.trim().is_empty() && !path.trim().is_empty() => {
            Ok(RankingSource {
                year: year.trim().to_string(),
                path: PathBuf::from(path.trim()),
            })
        }
        _ => {
            let path = PathBuf::from(s);
            infer_year(&path)
                .map(|year| RankingSource { year, path })
                .ok_or_else(|| format!("expected YEAR=PATH, got '{s}'"))
        }
    }
}

/// Last run of four digits in the file stem, e.g. `..._USN2017.csv` → 2017.
pub fn infer_year(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let bytes = stem.as_bytes();
    let mut found = None;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - start == 4 {
                found = Some(stem[start..i].to_string());
            }
        } else {
            i += 1;
        }
    }
    found
}
