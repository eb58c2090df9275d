//! Response assembly.
//!
//! Every endpoint emits ordered JSON objects. Listing rows are the
//! serialized view with an optional column projection; aggregate rows are
//! the grouping keys, `total_actual_count`, then any additional measures.

use std::str::FromStr;

use crime_data_query_models::views::{
    AgencyField, ApiAgency, ApiIncident, ApiOffenseType, IncidentField, OffenseTypeField,
};
use crime_data_query_models::{AggregateRow, FieldName, GroupValue};
use serde::Serialize;
use serde_json::{Map, Value};
use strum::VariantNames;

use crate::QueryError;
use crate::params::{parse_list, present};

/// One emitted record, keyed by column name in emission order.
pub type Row = Map<String, Value>;

/// A serializable record whose top-level columns can be projected.
pub trait View: Serialize {
    /// Column vocabulary of the view.
    type Field: FromStr + VariantNames + AsRef<str> + Copy + PartialEq;

    /// Identifying column, retained by every projection.
    const KEY: Self::Field;
}

impl View for ApiAgency {
    type Field = AgencyField;
    const KEY: AgencyField = AgencyField::Ori;
}

impl View for ApiIncident {
    type Field = IncidentField;
    const KEY: IncidentField = IncidentField::IncidentNumber;
}

impl View for ApiOffenseType {
    type Field = OffenseTypeField;
    const KEY: OffenseTypeField = OffenseTypeField::OffenseCode;
}

/// Columns to emit for a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection<F> {
    columns: Option<Vec<F>>,
}

impl<F> Default for Projection<F> {
    fn default() -> Self {
        Self { columns: None }
    }
}

impl<F> Projection<F>
where
    F: FromStr + VariantNames + AsRef<str> + Copy + PartialEq,
{
    /// Resolves the raw `fields` parameter.
    ///
    /// Absent or blank means every column. Otherwise `key` comes first,
    /// followed by the requested columns in request order.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidParameter`] naming the first unknown
    /// column.
    pub fn parse(raw: Option<&str>, key: F) -> Result<Self, QueryError> {
        let Some(raw) = present(raw) else {
            return Ok(Self::default());
        };

        let mut columns: Vec<F> = parse_list("fields", raw)?;
        columns.retain(|c| *c != key);
        columns.insert(0, key);

        Ok(Self {
            columns: Some(columns),
        })
    }

    /// The selected columns, or `None` for all of them.
    #[must_use]
    pub fn columns(&self) -> Option<&[F]> {
        self.columns.as_deref()
    }
}

/// Serializes `view` and keeps only the projected columns.
///
/// # Errors
///
/// Returns [`QueryError::Serialization`] if the view does not serialize to
/// a JSON object.
pub fn project<V: View>(view: &V, projection: &Projection<V::Field>) -> Result<Row, QueryError> {
    let mut full: Row = serde_json::from_value(serde_json::to_value(view)?)?;

    let Some(columns) = projection.columns() else {
        return Ok(full);
    };

    Ok(columns
        .iter()
        .map(|column| {
            let name = column.as_ref();
            let value = full.remove(name).unwrap_or(Value::Null);
            (name.to_string(), value)
        })
        .collect())
}

/// Emits the grouping keys of `row`, then `total_actual_count`, then the
/// remaining `fields` in order.
#[must_use]
pub fn assemble_aggregate(row: &AggregateRow, fields: &[FieldName]) -> Row {
    let mut out = Row::new();

    for (dimension, value) in &row.keys {
        let value = match value {
            GroupValue::Int(n) => Value::from(*n),
            GroupValue::Text(s) => Value::from(s.as_str()),
        };
        out.insert(dimension.as_ref().to_string(), value);
    }

    let total = FieldName::TotalActualCount;
    out.insert(total.as_ref().to_string(), Value::from(row.measure(total)));

    for field in fields.iter().filter(|f| **f != total) {
        out.insert(field.as_ref().to_string(), Value::from(row.measure(*field)));
    }

    out
}
