use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Write synthetic faculty and ranking files for trying out the explorer.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Output directory
    #[arg(long, default_value = "sample_data")]
    out: PathBuf,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const UNIVERSITIES: [(&str, f64); 6] = [
    ("Carnegie Mellon University", 1.6),
    ("University of Pennsylvania", 1.3),
    ("Temple University", 0.8),
    ("Drexel University", 0.7),
    ("Stony Brook University", 0.9),
    ("Rutgers University", 1.0),
];

const FIRST_NAMES: [&str; 10] = [
    "Avery", "Jordan", "Riley", "Morgan", "Casey", "Taylor", "Quinn", "Harper", "Rowan", "Emerson",
];
const LAST_NAMES: [&str; 10] = [
    "Nguyen", "Okafor", "Schmidt", "Rossi", "Kowalski", "Tanaka", "Haddad", "Silva", "Moreau", "Lindqvist",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Log-normal draw, a rough shape for citation counts.
    fn log_normal(&mut self, mu: f64, sigma: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        (mu + sigma * z).exp()
    }
}

#[derive(Serialize)]
struct FacultyRow {
    first: String,
    last: String,
    university: String,
    citations: Option<f64>,
    #[serde(rename = "h-index")]
    h_index: i64,
    t10: i64,
    rank: String,
    trim: String,
}

#[derive(Serialize)]
struct RankingRow {
    #[serde(rename = "Rank")]
    rank: usize,
    #[serde(rename = "University")]
    university: String,
    #[serde(rename = "Size")]
    size: i64,
    #[serde(rename = "USN")]
    usn: f64,
    #[serde(rename = "Scholar")]
    scholar: f64,
    #[serde(rename = "M10")]
    m10: f64,
}

fn faculty_rows(rng: &mut SimpleRng) -> Vec<FacultyRow> {
    let ranks = ["Full", "Associate", "Assistant"];
    let mut rows = Vec::new();

    for (uni, strength) in UNIVERSITIES {
        let size = 8 + (rng.next_u64() % 10) as usize;
        for _ in 0..size {
            let rank = *rng.pick(&ranks);
            let seniority = match rank {
                "Full" => 1.0,
                "Associate" => 0.6,
                _ => 0.3,
            };
            let citations = rng.log_normal(7.0 + strength * seniority, 0.9).round();
            let h_index = (citations.sqrt() * 0.9).round() as i64;
            let t10 = (citations * (0.02 + 0.03 * rng.next_f64())).round() as i64;

            let first = rng.pick(&FIRST_NAMES).to_string();
            let last = rng.pick(&LAST_NAMES).to_string();

            // An outdated snapshot of the same professor.
            if rng.next_f64() < 0.3 {
                rows.push(FacultyRow {
                    first: first.clone(),
                    last: last.clone(),
                    university: uni.to_string(),
                    citations: Some((citations * 0.7).round()),
                    h_index: (h_index as f64 * 0.9) as i64,
                    t10: (t10 as f64 * 0.8) as i64,
                    rank: rank.to_string(),
                    trim: String::new(),
                });
            }

            // Sloppy spacing and the odd blank, as in scraped data.
            let university = if rng.next_f64() < 0.1 {
                format!(" {uni} ")
            } else {
                uni.to_string()
            };
            rows.push(FacultyRow {
                first,
                last,
                university,
                citations: if rng.next_f64() < 0.03 { None } else { Some(citations) },
                h_index,
                t10,
                rank: rank.to_string(),
                trim: "*".to_string(),
            });
        }
    }
    rows
}

fn ranking_rows(rng: &mut SimpleRng, drop: &str) -> Vec<RankingRow> {
    let mut scored: Vec<(&str, f64)> = UNIVERSITIES
        .iter()
        .filter(|(uni, _)| *uni != drop)
        .map(|&(uni, strength)| (uni, strength * 3.0 + rng.next_f64()))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (uni, score))| RankingRow {
            rank: i + 1,
            university: uni.to_string(),
            size: 20 + (rng.next_u64() % 60) as i64,
            usn: (score.min(5.0) * 100.0).round() / 100.0,
            scholar: ((score + rng.next_f64() * 0.5) * 100.0).round() / 100.0,
            m10: (rng.next_f64() * 100.0).round(),
        })
        .collect()
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn text_column(rows: &[FacultyRow], f: impl Fn(&FacultyRow) -> &str) -> StringArray {
    StringArray::from(rows.iter().map(f).collect::<Vec<_>>())
}

fn write_parquet(path: &Path, rows: &[FacultyRow]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("first", DataType::Utf8, false),
        Field::new("last", DataType::Utf8, false),
        Field::new("university", DataType::Utf8, false),
        Field::new("citations", DataType::Float64, true),
        Field::new("h-index", DataType::Int64, false),
        Field::new("t10", DataType::Int64, false),
        Field::new("rank", DataType::Utf8, false),
        Field::new("trim", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text_column(rows, |r| r.first.as_str())),
            Arc::new(text_column(rows, |r| r.last.as_str())),
            Arc::new(text_column(rows, |r| r.university.as_str())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.citations).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.h_index).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.t10).collect::<Vec<_>>())),
            Arc::new(text_column(rows, |r| r.rank.as_str())),
            Arc::new(text_column(rows, |r| r.trim.as_str())),
        ],
    )?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    std::fs::create_dir_all(&args.out).with_context(|| format!("creating {}", args.out.display()))?;

    let faculty = faculty_rows(&mut rng);
    write_csv(&args.out.join("faculty.csv"), &faculty)?;
    write_parquet(&args.out.join("faculty.parquet"), &faculty)?;

    write_csv(&args.out.join("scholar_ranking_data_USN2017.csv"), &ranking_rows(&mut rng, "Drexel University"))?;
    write_csv(&args.out.join("scholar_ranking_data_USN2018.csv"), &ranking_rows(&mut rng, "Rutgers University"))?;

    let mut unis: Vec<&str> = UNIVERSITIES.iter().map(|(u, _)| *u).collect();
    unis.push("Villanova University");
    let mut writer = csv::Writer::from_path(args.out.join("universities.csv"))?;
    writer.write_record(["university"])?;
    for uni in unis {
        writer.write_record([uni])?;
    }
    writer.flush()?;

    let current = faculty.iter().filter(|r| r.trim == "*").count();
    println!(
        "Wrote {} faculty rows ({current} current) and two ranking snapshots to {}",
        faculty.len(),
        args.out.display()
    );
    Ok(())
}
