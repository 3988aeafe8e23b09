use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use gridcore::kinds::parse_numeric;
use gridcore::{Cell, CellData, Column, GridData, GridError, Result};

/// Detected file format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Csv,
    Tsv,
}

impl FileFormat {
    /// Detect format from file extension
    fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(FileFormat::Csv),
            "tsv" => Some(FileFormat::Tsv),
            _ => None,
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            FileFormat::Csv => b',',
            FileFormat::Tsv => b'\t',
        }
    }
}

/// Result of loading a file, including any warnings
pub struct LoadResult {
    pub data: GridData,
    pub warnings: Vec<String>,
}

/// What a column's values look like once the header row is stripped
#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Text,
    Number,
    Boolean,
}

/// Load a CSV/TSV file. The first record holds the column titles; columns whose values
/// all parse as numbers or booleans get those kinds.
pub fn load_file(path: &Path) -> Result<LoadResult> {
    if !path.exists() {
        return Ok(LoadResult {
            data: blank(5, 10)?,
            warnings: vec![format!("New file: {}", path.display())],
        });
    }

    let delim = FileFormat::from_extension(path).unwrap_or(FileFormat::Csv).delimiter();
    let file = File::open(path).map_err(|e| GridError::io(path, e))?;
    let reader = BufReader::with_capacity(1 << 20, file); // 1 MB

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let mut records: Vec<Vec<String>> = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| GridError::io(path, io::Error::new(io::ErrorKind::InvalidData, e)))?;
        records.push(record.iter().map(|s| s.to_string()).collect());
    }

    let result = from_records(records)?;
    info!(
        path = %path.display(),
        rows = result.data.row_count(),
        columns = result.data.col_count(),
        "loaded file"
    );
    Ok(result)
}

/// Build grid data from raw records, the first being the header row.
fn from_records(mut records: Vec<Vec<String>>) -> Result<LoadResult> {
    let width = records.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return Ok(LoadResult {
            data: blank(1, 1)?,
            warnings: vec!["Empty file".to_string()],
        });
    }

    let mut warnings = Vec::new();
    if records.iter().any(|r| r.len() < width) {
        warnings.push(format!("Padded rows with empty cells (max width: {} columns)", width));
        for row in records.iter_mut() {
            row.resize(width, String::new());
        }
    }

    let header = records.remove(0);
    let columns = column_defs(&header);
    let kinds: Vec<ColumnKind> = (0..width).map(|c| detect_kind(records.iter().map(|r| r[c].as_str()))).collect();
    debug!(?kinds, "detected column kinds");

    let rows = records
        .into_iter()
        .map(|row| row.into_iter().zip(&kinds).map(|(value, kind)| make_cell(value, *kind)).collect())
        .collect();
    Ok(LoadResult {
        data: GridData::new(columns, rows)?,
        warnings,
    })
}

/// Columns titled by the header row. Ids fall back to `colN` when a title is blank or
/// repeats.
fn column_defs(header: &[String]) -> Vec<Column> {
    let mut seen = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let id = if title.is_empty() || !seen.insert(title.clone()) {
                format!("col{}", i + 1)
            } else {
                title.clone()
            };
            Column::new(id).titled(title.clone())
        })
        .collect()
}

fn detect_kind<'a>(values: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut kind = None;
    for value in values.filter(|v| !v.is_empty()) {
        let this = if parse_bool(value).is_some() {
            ColumnKind::Boolean
        } else if parse_numeric(value).is_some() {
            ColumnKind::Number
        } else {
            return ColumnKind::Text;
        };
        match kind {
            Some(k) if k != this => return ColumnKind::Text,
            _ => kind = Some(this),
        }
    }
    kind.unwrap_or(ColumnKind::Text)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn make_cell(value: String, kind: ColumnKind) -> Cell {
    match kind {
        ColumnKind::Text => Cell::text(value),
        ColumnKind::Boolean => Cell::new(CellData::Boolean(parse_bool(&value))),
        ColumnKind::Number => match parse_numeric(&value) {
            // Keep the file's formatting ("$1,200") for display
            Some(n) if n.to_string() != value => Cell::number(n).with_display(value),
            Some(n) => Cell::number(n),
            None => Cell::new(CellData::Number(None)),
        },
    }
}

fn blank(cols: usize, rows: usize) -> Result<GridData> {
    let columns = (1..=cols).map(|c| Column::new(format!("col{c}"))).collect();
    GridData::new(columns, vec![vec![Cell::text(""); cols]; rows])
}

/// Parse a `ROWSxCOLS` size.
pub fn parse_size(s: &str) -> Option<(usize, usize)> {
    let lower = s.to_lowercase();
    let (rows, cols) = lower.split_once('x')?;
    match (rows.trim().parse(), cols.trim().parse()) {
        (Ok(rows), Ok(cols)) if rows > 0 && cols > 0 => Some((rows, cols)),
        _ => None,
    }
}

const WORDS: [&str; 12] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet", "kilo", "lima",
];
const STATUSES: [&str; 4] = ["open", "blocked", "review", "done"];

/// Random data with a different cell kind per column, cycling text, number, boolean,
/// rating, date and status dropdown.
pub fn generate(rows: usize, cols: usize, seed: Option<u64>) -> Result<GridData> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let columns = (0..cols)
        .map(|c| {
            let title = match c % 6 {
                0 => "name",
                1 => "amount",
                2 => "active",
                3 => "rating",
                4 => "due",
                _ => "status",
            };
            Column::new(format!("{title}{}", c + 1)).titled(title)
        })
        .collect();

    let epoch = NaiveDate::from_ymd_opt(2024, 1, 1);
    let data = (0..rows)
        .map(|_| {
            (0..cols)
                .map(|c| match c % 6 {
                    0 => Cell::text(format!(
                        "{} {}",
                        WORDS[rng.gen_range(0..WORDS.len())],
                        WORDS[rng.gen_range(0..WORDS.len())]
                    )),
                    1 => Cell::number((rng.gen_range(-10_000.0..10_000.0_f64) * 100.0).round() / 100.0),
                    2 => Cell::boolean(rng.gen_bool(0.5)),
                    3 => Cell::new(CellData::Star {
                        rating: rng.gen_range(0..=5),
                        max: 5,
                    }),
                    4 => Cell::new(CellData::DatePicker {
                        date: epoch.and_then(|d| d.checked_add_days(chrono::Days::new(rng.gen_range(0..730)))),
                        min: None,
                        max: None,
                    }),
                    _ => Cell::new(CellData::Dropdown {
                        value: Some(STATUSES[rng.gen_range(0..STATUSES.len())].to_string()),
                        allowed_values: STATUSES.iter().map(|s| s.to_string()).collect(),
                        allow_creation: false,
                    }),
                })
                .collect()
        })
        .collect();
    info!(rows, cols, "generated data");
    GridData::new(columns, data)
}

/// Resolve the `--config` path, defaulting to `gridcore.toml` in the working directory.
pub fn config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        let default = PathBuf::from("gridcore.toml");
        default.exists().then_some(default)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension(Path::new("test.csv")), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_extension(Path::new("test.TSV")), Some(FileFormat::Tsv));
        assert_eq!(FileFormat::from_extension(Path::new("test.txt")), None);
    }

    #[test]
    fn test_load_detects_kinds_and_pads() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "name,amount,paid").unwrap();
        writeln!(file, "ann,\"$1,200\",true").unwrap();
        writeln!(file, "bob,3").unwrap();

        let result = load_file(file.path()).unwrap();
        let data = &result.data;
        assert_eq!(data.col_count(), 3);
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.columns()[1].title, "amount");
        assert!(result.warnings[0].contains("Padded"));

        let amount = data.get_cell(1, 0).unwrap();
        assert_eq!(amount.data, CellData::Number(Some(1200.0)));
        assert_eq!(amount.display_data.as_deref(), Some("$1,200"));
        assert_eq!(data.get_cell(1, 1), Some(&Cell::number(3.0)));
        assert_eq!(data.get_cell(2, 0), Some(&Cell::boolean(true)));
        assert_eq!(data.get_cell(2, 1).unwrap().data, CellData::Boolean(None));
        assert_eq!(data.get_cell(0, 1), Some(&Cell::text("bob")));
    }

    #[test]
    fn test_missing_file_starts_blank() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_file(&dir.path().join("new.csv")).unwrap();
        assert_eq!(result.data.col_count(), 5);
        assert!(result.warnings[0].starts_with("New file"));
    }

    #[test]
    fn test_duplicate_titles_get_unique_ids() {
        let columns = column_defs(&["a".into(), "a".into(), String::new()]);
        let ids: Vec<&str> = columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "col2", "col3"]);
    }

    #[test]
    fn test_mixed_column_stays_text() {
        assert_eq!(detect_kind(["1", "x"].into_iter()), ColumnKind::Text);
        assert_eq!(detect_kind(["1", "", "2.5"].into_iter()), ColumnKind::Number);
        assert_eq!(detect_kind(["TRUE", "false"].into_iter()), ColumnKind::Boolean);
        assert_eq!(detect_kind(std::iter::empty()), ColumnKind::Text);
    }

    #[test]
    fn test_generate_shapes() {
        let data = generate(20, 7, Some(7)).unwrap();
        assert_eq!(data.row_count(), 20);
        assert_eq!(data.col_count(), 7);
        assert!(matches!(data.get_cell(3, 0).unwrap().data, CellData::Star { max: 5, .. }));
        assert_eq!(parse_size("100x8"), Some((100, 8)));
        assert_eq!(parse_size("0x8"), None);
        assert_eq!(parse_size("abc"), None);
    }
}
