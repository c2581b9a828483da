//! Programmatic row editing for examples blocks
//!
//! Rows can be given positionally or keyed by parameter name. Keyed rows are
//! laid out in parameter order no matter how the keys were ordered.

use super::{ElementKind, NodeId, Row, Slot, Tree};
use crate::error::{ModelError, ModelResult};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Cell values for a row addition or removal.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    Positional(Vec<String>),
    Keyed(Vec<(String, String)>),
}

impl RowValues {
    pub fn keyed<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        RowValues::Keyed(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Lays the values out in parameter order, trimmed the way parsed cells are.
    pub(crate) fn resolve(self, parameters: &[String]) -> ModelResult<Vec<String>> {
        match self {
            RowValues::Positional(values) => {
                if values.len() != parameters.len() {
                    return Err(ModelError::argument(format!(
                        "Expected {} values to match the parameters but received {}",
                        parameters.len(),
                        values.len()
                    )));
                }
                Ok(values.iter().map(|value| value.trim().to_string()).collect())
            }
            RowValues::Keyed(pairs) => parameters
                .iter()
                .map(|parameter| {
                    pairs
                        .iter()
                        .find(|(key, _)| key.trim() == parameter)
                        .map(|(_, value)| value.trim().to_string())
                        .ok_or_else(|| {
                            ModelError::argument(format!(
                                "No value given for parameter '{}'",
                                parameter
                            ))
                        })
                })
                .collect(),
        }
    }
}

impl<S: Into<String>> From<Vec<S>> for RowValues {
    fn from(values: Vec<S>) -> Self {
        RowValues::Positional(values.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for RowValues {
    fn from(values: [S; N]) -> Self {
        RowValues::Positional(values.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<String>> From<HashMap<K, V>> for RowValues {
    fn from(values: HashMap<K, V>) -> Self {
        RowValues::keyed(values)
    }
}

impl<K: Into<String>, V: Into<String>> From<BTreeMap<K, V>> for RowValues {
    fn from(values: BTreeMap<K, V>) -> Self {
        RowValues::keyed(values)
    }
}

impl TryFrom<&Value> for RowValues {
    type Error = ModelError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => Ok(RowValues::Positional(
                items.iter().map(scalar_text).collect::<ModelResult<_>>()?,
            )),
            Value::Object(map) => Ok(RowValues::Keyed(
                map.iter()
                    .map(|(key, value)| Ok((key.clone(), scalar_text(value)?)))
                    .collect::<ModelResult<_>>()?,
            )),
            other => Err(ModelError::argument(format!(
                "Can only add or remove a row from a mapping or a list but received {}",
                json_type(other)
            ))),
        }
    }
}

fn scalar_text(value: &Value) -> ModelResult<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(ModelError::argument(format!(
            "Row values must be scalars but received {}",
            json_type(other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

impl Tree {
    /// Cell values of the example's parameter row.
    pub fn parameters(&self, example: NodeId) -> Vec<&str> {
        self.parameter_row(example)
            .map(|row| self.row_values(row).iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Appends an argument row to an examples block.
    pub fn add_row(&mut self, example: NodeId, values: impl Into<RowValues>) -> ModelResult<NodeId> {
        self.expect_kind(example, ElementKind::Example)?;
        let parameters: Vec<String> = match self.parameter_row(example) {
            Some(row) => self.row_values(row).to_vec(),
            None => {
                return Err(ModelError::argument(
                    "Cannot add a row. No parameters have been set.",
                ))
            }
        };

        let values = values.into().resolve(&parameters)?;
        let row = self.add(Row::new(values));
        self.push_child(example, Slot::Rows, row)?;
        Ok(row)
    }

    /// Removes the first argument row holding exactly `values`.
    ///
    /// The parameter row is never a candidate, so asking to remove it is a no-op.
    pub fn remove_row(
        &mut self,
        example: NodeId,
        values: impl Into<RowValues>,
    ) -> ModelResult<Option<NodeId>> {
        self.expect_kind(example, ElementKind::Example)?;
        if self.argument_rows(example).is_empty() {
            return Ok(None);
        }

        let parameters: Vec<String> = self.parameters(example).into_iter().map(String::from).collect();
        let values = values.into().resolve(&parameters)?;
        let found = self
            .argument_rows(example)
            .iter()
            .copied()
            .find(|row| self.row_values(*row) == values.as_slice());

        if let Some(row) = found {
            self.detach(row);
        }
        Ok(found)
    }
}
