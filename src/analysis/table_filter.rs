use polars::prelude::*;
use thiserror::Error;
use log::{debug, warn};
use crate::error::{CodepNetError, Result};

/// A single cell value used as a filter criterion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    fn kind(&self) -> ValueKind {
        match self {
            Value::Str(_) => ValueKind::Str,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Str(value.clone())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

/// Equality against one value, or membership in a set of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Scalar(Value),
    Set(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: String,
    pub criterion: Criterion,
}

impl ColumnFilter {
    pub fn new(column: impl Into<String>, criterion: Criterion) -> Self {
        ColumnFilter { column: column.into(), criterion }
    }

    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        ColumnFilter::new(column, Criterion::Scalar(value.into()))
    }

    pub fn one_of<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        ColumnFilter::new(column, Criterion::Set(values.into_iter().map(Into::into).collect()))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterWarning {
    #[error("Both inclusive and exclusive filters are empty, returning unfiltered input")]
    NoFilters,
    #[error("Column '{0}' is not within the input column space, skipping filter")]
    MissingColumn(String),
}

#[derive(Debug, Clone)]
pub struct FilteredTable {
    pub table: DataFrame,
    pub warnings: Vec<FilterWarning>,
}

impl FilteredTable {
    pub fn into_table(self) -> DataFrame {
        self.table
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterMode {
    Inclusive,
    Exclusive,
}

/// Applies inclusive then exclusive filters in sequence and returns a new table.
///
/// Filters naming a column the table lacks are skipped with a warning. Null
/// cells never match a criterion, so exclusive filters keep them.
pub fn filter_table(
    table: &DataFrame,
    inclusive: &[ColumnFilter],
    exclusive: &[ColumnFilter],
) -> Result<FilteredTable> {
    let mut warnings = Vec::new();

    if inclusive.is_empty() && exclusive.is_empty() {
        let warning = FilterWarning::NoFilters;
        warn!("{}", warning);
        warnings.push(warning);
        return Ok(FilteredTable { table: table.clone(), warnings });
    }

    let mut output = table.clone();
    let passes = inclusive
        .iter()
        .map(|filter| (filter, FilterMode::Inclusive))
        .chain(exclusive.iter().map(|filter| (filter, FilterMode::Exclusive)));

    for (filter, mode) in passes {
        if output.get_column_index(&filter.column).is_none() {
            let warning = FilterWarning::MissingColumn(filter.column.clone());
            warn!("{}", warning);
            warnings.push(warning);
            continue;
        }
        output = apply_filter(output, filter, mode)?;
    }

    Ok(FilteredTable { table: output, warnings })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Str,
    Int,
    Float,
    Bool,
}

fn column_kind(dtype: &DataType) -> Option<ValueKind> {
    match dtype {
        DataType::String => Some(ValueKind::Str),
        DataType::Boolean => Some(ValueKind::Bool),
        dtype if dtype.is_integer() => Some(ValueKind::Int),
        dtype if dtype.is_float() => Some(ValueKind::Float),
        _ => None,
    }
}

/// Type both sides are widened to before comparing. Integers only meet
/// floats as `Float64`; every other mixed pairing has no common type.
fn comparison_type(column: ValueKind, criterion: ValueKind) -> Option<DataType> {
    match (column, criterion) {
        (ValueKind::Str, ValueKind::Str) => Some(DataType::String),
        (ValueKind::Bool, ValueKind::Bool) => Some(DataType::Boolean),
        (ValueKind::Int, ValueKind::Int) => Some(DataType::Int64),
        (ValueKind::Int | ValueKind::Float, ValueKind::Int | ValueKind::Float) => Some(DataType::Float64),
        _ => None,
    }
}

fn apply_filter(table: DataFrame, filter: &ColumnFilter, mode: FilterMode) -> Result<DataFrame> {
    let no_match = |table: DataFrame| match mode {
        FilterMode::Inclusive => table.clear(),
        FilterMode::Exclusive => table,
    };

    let values = match &filter.criterion {
        Criterion::Scalar(value) => std::slice::from_ref(value),
        Criterion::Set(values) if values.is_empty() => return Ok(no_match(table)),
        Criterion::Set(values) => values.as_slice(),
    };
    let (members, criterion_kind) = criterion_series(&filter.column, values)?;

    let dtype = table.column(&filter.column)?.dtype().clone();
    let common = match column_kind(&dtype).and_then(|kind| comparison_type(kind, criterion_kind)) {
        Some(common) => common,
        None => {
            debug!(
                "Column '{}' of type {} cannot hold {:?} values, nothing matches",
                filter.column, dtype, criterion_kind
            );
            return Ok(no_match(table));
        }
    };

    let members = members.cast(&common)?;
    let matches = col(filter.column.as_str())
        .cast(common)
        .is_in(lit(members))
        .fill_null(lit(false));

    let predicate = match mode {
        FilterMode::Inclusive => matches,
        FilterMode::Exclusive => matches.not(),
    };

    Ok(table.lazy().filter(predicate).collect()?)
}

fn criterion_series(column: &str, values: &[Value]) -> Result<(Series, ValueKind)> {
    let name: PlSmallStr = column.into();
    let mixed = || CodepNetError::MixedCriterion(column.to_string());

    match values.first().map(Value::kind) {
        Some(ValueKind::Str) => {
            let strings = values
                .iter()
                .map(|value| match value {
                    Value::Str(s) => Ok(s.as_str()),
                    _ => Err(mixed()),
                })
                .collect::<Result<Vec<&str>>>()?;
            Ok((Series::new(name, strings), ValueKind::Str))
        }
        Some(ValueKind::Bool) => {
            let flags = values
                .iter()
                .map(|value| match value {
                    Value::Bool(b) => Ok(*b),
                    _ => Err(mixed()),
                })
                .collect::<Result<Vec<bool>>>()?;
            Ok((Series::new(name, flags), ValueKind::Bool))
        }
        _ if values.iter().all(|value| value.kind() == ValueKind::Int) => {
            let ints: Vec<i64> = values
                .iter()
                .filter_map(|value| match value {
                    Value::Int(i) => Some(*i),
                    _ => None,
                })
                .collect();
            Ok((Series::new(name, ints), ValueKind::Int))
        }
        _ => {
            let floats = values
                .iter()
                .map(|value| match value {
                    Value::Int(i) => Ok(*i as f64),
                    Value::Float(f) => Ok(*f),
                    _ => Err(mixed()),
                })
                .collect::<Result<Vec<f64>>>()?;
            Ok((Series::new(name, floats), ValueKind::Float))
        }
    }
}

/// Reads a column as optional strings, casting non-string columns.
pub fn column_strings(table: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = table.column(name)?.cast(&DataType::String)?;
    let values = column
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect();
    Ok(values)
}

/// Reads a column as optional floats; unparseable and NaN cells become nulls.
pub fn column_f64(table: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = table.column(name)?.cast(&DataType::Float64)?;
    let values = column
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|value| value.filter(|v| !v.is_nan()))
        .collect();
    Ok(values)
}

pub fn column_i64(table: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let column = table.column(name)?.cast(&DataType::Int64)?;
    let values = column.as_materialized_series().i64()?.into_iter().collect();
    Ok(values)
}

/// Like [`column_strings`] but a null cell is an error.
pub fn required_strings(table: &DataFrame, name: &str) -> Result<Vec<String>> {
    column_strings(table, name)?
        .into_iter()
        .map(|value| value.ok_or_else(|| CodepNetError::UnexpectedNull(name.to_string())))
        .collect()
}
