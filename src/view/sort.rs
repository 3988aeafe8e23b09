//! Row ordering by sort keys

use std::cmp::Ordering;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::kinds::CellRegistry;
use crate::model::data::GridData;

/// Threshold for using parallel processing
pub const PARALLEL_THRESHOLD: usize = 10_000;

/// Maximum cells to sample when deciding whether a column can be sorted
const SORTABLE_PROBE_SAMPLE_SIZE: usize = 20;

/// Sorting direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortColumn {
    pub column: usize,
    pub direction: SortDirection,
}

impl SortColumn {
    pub fn new(column: usize, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}

/// Sort keys in priority order. Later entries only break ties of earlier ones.
pub type SortSpec = Vec<SortColumn>;

/// Ordering key extracted from a cell's raw data.
///
/// Keys of different types compare by type rank: booleans, then numbers, then dates, then
/// text. `Empty` and `Unsortable` keys sort after everything else in both directions.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Unsortable,
    Empty,
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl SortKey {
    /// Case-insensitive text key; blank text is `Empty`.
    pub fn text(s: &str) -> SortKey {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            SortKey::Empty
        } else {
            SortKey::Text(trimmed.to_lowercase())
        }
    }

    pub fn is_sortable(&self) -> bool {
        !matches!(self, SortKey::Unsortable)
    }

    fn is_blank(&self) -> bool {
        match self {
            SortKey::Unsortable | SortKey::Empty => true,
            SortKey::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Bool(_) => 0,
            SortKey::Number(_) => 1,
            SortKey::Date(_) => 2,
            SortKey::Text(_) => 3,
            SortKey::Empty | SortKey::Unsortable => 4,
        }
    }

    /// Total order under `direction`. Blank keys stay last either way.
    pub fn compare(&self, other: &SortKey, direction: SortDirection) -> Ordering {
        match (self.is_blank(), other.is_blank()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }

        let base = match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        };

        match direction {
            SortDirection::Ascending => base,
            SortDirection::Descending => base.reverse(),
        }
    }
}

/// Whether `col` can be sorted: the column allows it and its cells produce ordering keys.
pub fn column_is_sortable(data: &GridData, registry: &CellRegistry, col: usize) -> bool {
    let Some(column) = data.column(col) else {
        return false;
    };
    if !column.sortable {
        return false;
    }
    if data.row_count() == 0 {
        return true;
    }

    let mut probed = 0;
    for row in 0..data.row_count() {
        if probed >= SORTABLE_PROBE_SAMPLE_SIZE {
            break;
        }
        let Some(cell) = data.get_cell(col, row) else {
            continue;
        };
        probed += 1;
        if registry.sort_key(cell).is_sortable() {
            return true;
        }
    }
    false
}

/// Order `rows` (logical indices) by `spec`, breaking ties by logical index.
/// Uses parallel processing for large grids.
pub fn sort_rows(data: &GridData, registry: &CellRegistry, spec: &[SortColumn], rows: Vec<usize>) -> Vec<usize> {
    let spec: Vec<SortColumn> = spec
        .iter()
        .copied()
        .filter(|s| column_is_sortable(data, registry, s.column))
        .collect();
    if spec.is_empty() {
        return rows;
    }

    let use_parallel = rows.len() >= PARALLEL_THRESHOLD;
    let key_of = |row: usize| -> (usize, Vec<SortKey>) {
        let keys = spec
            .iter()
            .map(|s| {
                data.get_cell(s.column, row)
                    .map(|cell| registry.sort_key(cell))
                    .unwrap_or(SortKey::Empty)
            })
            .collect();
        (row, keys)
    };

    let mut keyed: Vec<(usize, Vec<SortKey>)> = if use_parallel {
        rows.into_par_iter().map(key_of).collect()
    } else {
        rows.into_iter().map(key_of).collect()
    };

    let cmp_fn = |(idx_a, keys_a): &(usize, Vec<SortKey>), (idx_b, keys_b): &(usize, Vec<SortKey>)| -> Ordering {
        spec.iter()
            .zip(keys_a.iter().zip(keys_b.iter()))
            .map(|(s, (a, b))| a.compare(b, s.direction))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
            .then(idx_a.cmp(idx_b))
    };

    if use_parallel {
        keyed.par_sort_unstable_by(cmp_fn);
    } else {
        keyed.sort_unstable_by(cmp_fn);
    }

    keyed.into_iter().map(|(row, _)| row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_keys_sort_last_both_ways() {
        let n = SortKey::Number(1.0);
        for dir in [SortDirection::Ascending, SortDirection::Descending] {
            assert_eq!(SortKey::Empty.compare(&n, dir), Ordering::Greater);
            assert_eq!(n.compare(&SortKey::Unsortable, dir), Ordering::Less);
            assert_eq!(SortKey::Number(f64::NAN).compare(&n, dir), Ordering::Greater);
        }
    }

    #[test]
    fn test_mixed_types_order_by_rank() {
        let asc = SortDirection::Ascending;
        assert_eq!(SortKey::Bool(true).compare(&SortKey::Number(-5.0), asc), Ordering::Less);
        assert_eq!(SortKey::Number(1e9).compare(&SortKey::text("a"), asc), Ordering::Less);
        let date = SortKey::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(date.compare(&SortKey::Number(3.0), asc), Ordering::Greater);
    }

    #[test]
    fn test_text_key_ignores_case_and_padding() {
        assert_eq!(SortKey::text("  Apple "), SortKey::text("apple"));
        assert_eq!(SortKey::text("   "), SortKey::Empty);
    }
}
