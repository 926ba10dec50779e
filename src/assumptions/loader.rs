//! Reference table loader
//!
//! Loads the plan's reference tables from CSV files or spreadsheet workbooks
//! (xlsx, xls, ods; first sheet, header in the first row). Column names are
//! trimmed and lowercased, so `Combined_Factor` and `combined_factor` resolve
//! to the same column.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{
    DeferredFactorTable, MortalityFactorSeries, MortalityImprovementTable, SalaryIncreaseRates,
};
use crate::error::{PensionError, Result};

/// Default path to the reference data directory
pub const DEFAULT_DATA_PATH: &str = "data";

/// File name of the deferral discount factor table
pub const DEFERRED_FACTORS_FILE: &str = "deferred_factors.csv";

/// File name of the salary increase rate table
pub const SALARY_INCREASE_RATE_FILE: &str = "salary_increase_rate.csv";

/// Index column of the deferred factor table
pub const AGE_COLUMN: &str = "age";

/// Value column of the deferred factor table
pub const COMBINED_FACTOR_COLUMN: &str = "combined_factor";

/// Value column of the salary increase rate table
pub const INCREASE_COLUMN: &str = "increase";

/// Value column of a mortality factor series
pub const QX_COLUMN: &str = "qx";

/// Locations of the two reference tables the calculator needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub deferred_factors: PathBuf,
    pub salary_increase_rate: PathBuf,
}

impl DataPaths {
    /// Resolve the standard file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            deferred_factors: dir.join(DEFERRED_FACTORS_FILE),
            salary_increase_rate: dir.join(SALARY_INCREASE_RATE_FILE),
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::in_dir(DEFAULT_DATA_PATH)
    }
}

/// A table as read from disk: normalized headers and raw cell text
///
/// Cells are parsed lazily when a column is requested so that unrelated
/// text columns (notes, labels) never cause a load failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    source: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Canonical form of a column name
pub fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase()
}

impl ReferenceTable {
    /// Load a table, choosing the parser from the file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PensionError::data_load(path, "file not found"));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let table = match extension.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Self::from_workbook(path)?,
            _ => {
                let file = File::open(path).map_err(|e| PensionError::data_load(path, e))?;
                Self::from_csv_reader(file, path)?
            }
        };

        info!(
            "Loaded {} rows ({} columns) from {}",
            table.len(),
            table.headers.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse CSV from any reader; `source` is only used in error messages
    pub fn from_csv_reader<R: Read>(reader: R, source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| PensionError::data_load(&source, e))?
            .iter()
            .map(normalize_header)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result.map_err(|e| PensionError::data_load(&source, e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::new(source, headers, rows)
    }

    fn from_workbook(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path).map_err(|e| PensionError::data_load(path, e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| PensionError::data_load(path, "workbook has no sheets"))?
            .map_err(|e| PensionError::data_load(path, e))?;

        let mut sheet_rows = range.rows();
        let headers = match sheet_rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(cell_text)
                .take_while(|h| !h.trim().is_empty())
                .map(|h| normalize_header(&h))
                .collect::<Vec<_>>(),
            None => return Err(PensionError::data_load(path, "sheet is empty")),
        };

        let rows = sheet_rows
            .map(|row| {
                (0..headers.len())
                    .map(|col| row.get(col).map(cell_text).unwrap_or_default())
                    .collect::<Vec<_>>()
            })
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .collect();

        Self::new(path.to_path_buf(), headers, rows)
    }

    fn new(source: PathBuf, headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if headers.is_empty() {
            return Err(PensionError::data_load(&source, "no header row"));
        }
        if let Some(dup) = headers
            .iter()
            .enumerate()
            .find(|(i, h)| headers[..*i].contains(*h))
            .map(|(_, h)| h)
        {
            return Err(PensionError::data_load(
                &source,
                format!("duplicate column '{dup}'"),
            ));
        }
        Ok(Self {
            source,
            headers,
            rows,
        })
    }

    /// Where this table was read from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Normalized column names, in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        let wanted = normalize_header(name);
        self.headers
            .iter()
            .position(|h| *h == wanted)
            .ok_or_else(|| {
                PensionError::data_load(&self.source, format!("missing required column '{wanted}'"))
            })
    }

    /// Parse a named column as numbers; empty or non-numeric cells are errors
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        self.parse_column(idx)
    }

    fn parse_column(&self, idx: usize) -> Result<Vec<f64>> {
        let name = &self.headers[idx];
        self.rows
            .iter()
            .enumerate()
            .map(|(row_num, row)| {
                let raw = row.get(idx).map(String::as_str).unwrap_or("").trim();
                raw.parse::<f64>().map_err(|_| {
                    PensionError::data_load(
                        &self.source,
                        format!("cannot parse {name} '{raw}' at row {} as number", row_num + 2),
                    )
                })
            })
            .collect()
    }

    /// Parse a named column as whole, non-negative ages
    pub fn age_column(&self, name: &str) -> Result<Vec<u32>> {
        let values = self.column(name)?;
        values
            .into_iter()
            .enumerate()
            .map(|(row_num, v)| {
                if v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
                    Err(PensionError::data_load(
                        &self.source,
                        format!("invalid age {v} at row {}", row_num + 2),
                    ))
                } else {
                    Ok(v as u32)
                }
            })
            .collect()
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Build the deferral discount table from a loaded `Age, Combined_Factor` table
pub fn deferred_factors_from_table(table: &ReferenceTable) -> Result<DeferredFactorTable> {
    let ages = table.age_column(AGE_COLUMN)?;
    let factors = table.column(COMBINED_FACTOR_COLUMN)?;

    let mut map = BTreeMap::new();
    for (age, factor) in ages.into_iter().zip(factors) {
        if factor < 0.0 || !factor.is_finite() {
            return Err(PensionError::data_load(
                table.source(),
                format!("discount factor {factor} for age {age} must be non-negative"),
            ));
        }
        if map.insert(age, factor).is_some() {
            return Err(PensionError::data_load(
                table.source(),
                format!("duplicate age {age}"),
            ));
        }
    }

    Ok(DeferredFactorTable::from_map(map))
}

/// Build the salary increase rates from a loaded table with an `increase` column
pub fn increase_rates_from_table(table: &ReferenceTable) -> Result<SalaryIncreaseRates> {
    Ok(SalaryIncreaseRates::new(table.column(INCREASE_COLUMN)?))
}

/// Build a mortality factor series from an `age, qx` table
///
/// Ages must be contiguous and ascending.
pub fn mortality_factors_from_table(table: &ReferenceTable) -> Result<MortalityFactorSeries> {
    let ages = table.age_column(AGE_COLUMN)?;
    let rates = table.column(QX_COLUMN)?;

    let min_age = *ages
        .first()
        .ok_or_else(|| PensionError::data_load(table.source(), "mortality table has no rows"))?;
    check_contiguous(table.source(), &ages)?;

    Ok(MortalityFactorSeries::new(min_age, rates))
}

/// Build a mortality improvement grid from an `age, <year>, <year>, ...` table
///
/// Projection-year columns are the headers that read as whole numbers; any
/// other column (notes, labels) is ignored.
pub fn mortality_improvement_from_table(
    table: &ReferenceTable,
) -> Result<MortalityImprovementTable> {
    let ages = table.age_column(AGE_COLUMN)?;
    let age_idx = table.column_index(AGE_COLUMN)?;

    let year_columns: Vec<usize> = table
        .headers()
        .iter()
        .enumerate()
        .filter(|(i, h)| *i != age_idx && h.parse::<i32>().is_ok())
        .map(|(i, _)| i)
        .collect();
    if year_columns.is_empty() {
        return Err(PensionError::data_load(
            table.source(),
            "improvement table has no projection-year columns",
        ));
    }
    let min_age = *ages
        .first()
        .ok_or_else(|| PensionError::data_load(table.source(), "improvement table has no rows"))?;
    check_contiguous(table.source(), &ages)?;

    let mut columns = Vec::with_capacity(year_columns.len());
    for &idx in &year_columns {
        columns.push(table.parse_column(idx)?);
    }
    let rows = (0..ages.len())
        .map(|r| columns.iter().map(|col| col[r]).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    let years = year_columns
        .iter()
        .map(|&i| table.headers()[i].clone())
        .collect();

    MortalityImprovementTable::new(min_age, years, rows)
        .map_err(|e| PensionError::data_load(table.source(), e))
}

fn check_contiguous(source: &Path, ages: &[u32]) -> Result<()> {
    if let Some(pair) = ages.windows(2).find(|w| w[0].checked_add(1) != Some(w[1])) {
        return Err(PensionError::data_load(
            source,
            format!("ages must be contiguous ascending, found {} then {}", pair[0], pair[1]),
        ));
    }
    Ok(())
}

/// Load the deferral discount factor table from a file
pub fn load_deferred_factors(path: impl AsRef<Path>) -> Result<DeferredFactorTable> {
    let table = deferred_factors_from_table(&ReferenceTable::load(path)?)?;
    debug!("Deferred factors cover ages {:?}", table.age_range());
    Ok(table)
}

/// Load the salary increase rate table from a file
pub fn load_salary_increase_rates(path: impl AsRef<Path>) -> Result<SalaryIncreaseRates> {
    increase_rates_from_table(&ReferenceTable::load(path)?)
}

/// Load a mortality factor series from a file
pub fn load_mortality_factors(path: impl AsRef<Path>) -> Result<MortalityFactorSeries> {
    mortality_factors_from_table(&ReferenceTable::load(path)?)
}

/// Load a mortality improvement table from a file
pub fn load_mortality_improvement(path: impl AsRef<Path>) -> Result<MortalityImprovementTable> {
    mortality_improvement_from_table(&ReferenceTable::load(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_table(text: &str) -> Result<ReferenceTable> {
        ReferenceTable::from_csv_reader(text.as_bytes(), "inline.csv")
    }

    #[test]
    fn test_headers_are_normalized() {
        let table = csv_table(" Age ,Combined_Factor\n40,0.5\n").unwrap();
        assert_eq!(table.headers(), ["age", "combined_factor"]);
        assert_eq!(table.column("COMBINED_FACTOR").unwrap(), vec![0.5]);
    }

    #[test]
    fn test_missing_column_is_data_load_error() {
        let table = csv_table("Age,Factor\n40,0.5\n").unwrap();
        let err = deferred_factors_from_table(&table).unwrap_err();
        assert!(matches!(err, PensionError::DataLoad { .. }));
        assert!(err.to_string().contains("combined_factor"));
    }

    #[test]
    fn test_malformed_cell_is_data_load_error() {
        let table = csv_table("Year,Increase\n1,0.05\n2,abc\n").unwrap();
        let err = increase_rates_from_table(&table).unwrap_err();
        assert!(err.to_string().contains("row 3"), "{err}");
    }

    #[test]
    fn test_unrelated_text_columns_are_ignored() {
        let table = csv_table("Year,Increase,Note\n1,0.05,entry\n2,0.04,\n").unwrap();
        let rates = increase_rates_from_table(&table).unwrap();
        assert_eq!(rates.as_slice(), &[0.05, 0.04]);
    }

    #[test]
    fn test_missing_file() {
        let err = ReferenceTable::load("data/does_not_exist.csv").unwrap_err();
        assert!(matches!(err, PensionError::DataLoad { .. }));
    }

    #[test]
    fn test_duplicate_and_negative_deferred_factors_rejected() {
        let dup = csv_table("Age,Combined_Factor\n40,0.5\n40,0.6\n").unwrap();
        assert!(deferred_factors_from_table(&dup).is_err());

        let neg = csv_table("Age,Combined_Factor\n40,-0.5\n").unwrap();
        assert!(deferred_factors_from_table(&neg).is_err());

        let frac = csv_table("Age,Combined_Factor\n40.5,0.5\n").unwrap();
        assert!(deferred_factors_from_table(&frac).is_err());
    }

    #[test]
    fn test_mortality_ages_must_be_contiguous() {
        let table = csv_table("Age,qx\n60,0.01\n62,0.02\n").unwrap();
        assert!(mortality_factors_from_table(&table).is_err());

        let table = csv_table("Age,qx\n60,0.01\n61,0.02\n").unwrap();
        let series = mortality_factors_from_table(&table).unwrap();
        assert_eq!(series.min_age(), 60);
        assert_eq!(series.max_age(), 61);
    }

    #[test]
    fn test_contiguity_check_at_top_of_age_range() {
        let table = csv_table("Age,qx\n4294967295,0.01\n4294967295,0.02\n").unwrap();
        let err = mortality_factors_from_table(&table).unwrap_err();
        assert!(matches!(err, PensionError::DataLoad { .. }));

        let table = csv_table("Age,qx\n4294967294,0.01\n4294967295,0.02\n").unwrap();
        let series = mortality_factors_from_table(&table).unwrap();
        assert_eq!(series.max_age(), u32::MAX);
    }

    #[test]
    fn test_improvement_grid_ignores_non_year_columns() {
        let table = csv_table("Age,2024,Note,2025\n60,1.0,base,0.99\n61,1.0,,0.98\n").unwrap();
        let grid = mortality_improvement_from_table(&table).unwrap();
        assert_eq!(grid.years(), ["2024", "2025"]);
        assert_eq!(grid.row(60).unwrap(), &[1.0, 0.99]);

        let no_years = csv_table("Age,Note\n60,base\n").unwrap();
        assert!(mortality_improvement_from_table(&no_years).is_err());
    }

    #[test]
    fn test_load_deferred_factors_from_workbook() {
        // Header stops at the first blank cell; row 3 is blank
        let table = ReferenceTable::load("tests/fixtures/deferred_factors.xlsx").unwrap();
        assert_eq!(table.headers(), ["age", "combined_factor"]);
        assert_eq!(table.len(), 3);

        let factors = load_deferred_factors("tests/fixtures/deferred_factors.xlsx").unwrap();
        assert_eq!(factors.len(), 3);
        assert_eq!(factors.age_range(), Some((40, 42)));
        assert_eq!(factors.discount_factor(40), 0.25);
        assert_eq!(factors.discount_factor(41), 0.27);
        assert_eq!(factors.discount_factor(43), 1.0);
    }

    #[test]
    fn test_load_increase_rates_from_workbook() {
        let rates = load_salary_increase_rates("tests/fixtures/salary_increase_rate.xlsx").unwrap();
        assert_eq!(rates.as_slice(), &[0.05, 0.045, 0.04]);
    }

    #[test]
    fn test_workbook_text_in_numeric_column_rejected() {
        let err = load_deferred_factors("tests/fixtures/bad_deferred_factors.xlsx").unwrap_err();
        assert!(matches!(err, PensionError::DataLoad { .. }));
        assert!(err.to_string().contains("n/a"), "{err}");
    }

    #[test]
    fn test_improvement_grid_layout() {
        let table = csv_table("Age,2024,2025\n60,1.0,0.99\n61,1.0,0.98\n").unwrap();
        let grid = mortality_improvement_from_table(&table).unwrap();
        assert_eq!(grid.column_count(), 2);
        assert_eq!(grid.years(), ["2024", "2025"]);
        assert_eq!(grid.row(61).unwrap(), &[1.0, 0.98]);
    }

    #[test]
    fn test_load_default_data() {
        let paths = DataPaths::default();
        let factors = load_deferred_factors(&paths.deferred_factors).unwrap();
        assert!(!factors.is_empty());

        let rates = load_salary_increase_rates(&paths.salary_increase_rate).unwrap();
        assert_eq!(rates.len(), 70);
    }
}
