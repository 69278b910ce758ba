use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Requested representation of a named scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Int,
    Float,
    Double,
}

/// Provider of named simulator telemetry.
///
/// Implementations return `None` for names the simulator does not publish;
/// the `read_*` helpers apply the caller's declared default instead.
pub trait SimDataSource {
    /// Look up a named scalar.
    fn scalar(&self, name: &str, kind: ScalarKind) -> Option<f64>;

    /// Look up up to `count` leading elements of a named array.
    fn array(&self, name: &str, count: usize) -> Option<Vec<f64>>;

    /// Scalar value, or `default` when unavailable.
    fn read_scalar(&self, name: &str, kind: ScalarKind, default: f64) -> f64 {
        self.scalar(name, kind).unwrap_or(default)
    }

    /// Exactly `count` elements, zero-padded when unavailable or short.
    fn read_array(&self, name: &str, count: usize) -> Vec<f64> {
        let mut values = self.array(name, count).unwrap_or_default();
        values.resize(count, 0.0);
        values
    }

    /// Value of the first published name in `names`, or `default`.
    fn read_first(&self, names: &[&str], kind: ScalarKind, default: f64) -> f64 {
        names
            .iter()
            .find_map(|name| self.scalar(name, kind))
            .unwrap_or(default)
    }
}

impl<T: SimDataSource + ?Sized> SimDataSource for Box<T> {
    fn scalar(&self, name: &str, kind: ScalarKind) -> Option<f64> {
        (**self).scalar(name, kind)
    }

    fn array(&self, name: &str, count: usize) -> Option<Vec<f64>> {
        (**self).array(name, count)
    }
}

/// One value of a [`StaticSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StaticValue {
    Scalar(f64),
    Array(Vec<f64>),
}

/// In-memory telemetry source with fixed values.
///
/// Used by the standalone server (loaded from a JSON object mapping names to
/// numbers or arrays) and by tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticSource {
    values: HashMap<String, StaticValue>,
}

impl StaticSource {
    /// Create an empty source; every lookup falls back to its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object such as `{"sim/time/paused": 1, "sim/x": [1, 2]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON snapshot file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Set a scalar value.
    pub fn set(&mut self, name: impl Into<String>, value: f64) -> &mut Self {
        self.values.insert(name.into(), StaticValue::Scalar(value));
        self
    }

    /// Set an array value.
    pub fn set_array(&mut self, name: impl Into<String>, values: Vec<f64>) -> &mut Self {
        self.values.insert(name.into(), StaticValue::Array(values));
        self
    }

    /// Remove a value so lookups report it as unpublished.
    pub fn unset(&mut self, name: &str) -> &mut Self {
        self.values.remove(name);
        self
    }

    /// Number of published names.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SimDataSource for StaticSource {
    fn scalar(&self, name: &str, kind: ScalarKind) -> Option<f64> {
        match self.values.get(name)? {
            StaticValue::Scalar(value) if kind == ScalarKind::Int => Some(value.trunc()),
            StaticValue::Scalar(value) => Some(*value),
            StaticValue::Array(_) => None,
        }
    }

    fn array(&self, name: &str, count: usize) -> Option<Vec<f64>> {
        match self.values.get(name)? {
            StaticValue::Array(values) => Some(values.iter().copied().take(count).collect()),
            StaticValue::Scalar(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_names_use_defaults() {
        let source = StaticSource::new();
        assert_eq!(source.scalar("sim/nope", ScalarKind::Float), None);
        assert_eq!(source.read_scalar("sim/nope", ScalarKind::Float, 29.92), 29.92);
        assert_eq!(source.read_array("sim/nope", 3), vec![0.0; 3]);
    }

    #[test]
    fn arrays_are_padded_and_truncated() {
        let mut source = StaticSource::new();
        source.set_array("sim/a", vec![1.0, 2.0]);
        assert_eq!(source.read_array("sim/a", 4), vec![1.0, 2.0, 0.0, 0.0]);
        assert_eq!(source.read_array("sim/a", 1), vec![1.0]);
    }

    #[test]
    fn int_kind_truncates() {
        let mut source = StaticSource::new();
        source.set("sim/i", 3.9);
        assert_eq!(source.scalar("sim/i", ScalarKind::Int), Some(3.0));
        assert_eq!(source.scalar("sim/i", ScalarKind::Double), Some(3.9));
    }

    #[test]
    fn read_first_takes_first_published_name() {
        let mut source = StaticSource::new();
        source.set("sim/second", 0.0).set("sim/third", 5.0);
        let value = source.read_first(
            &["sim/first", "sim/second", "sim/third"],
            ScalarKind::Float,
            7.0,
        );
        assert_eq!(value, 0.0);
    }

    #[test]
    fn parses_json_snapshot() {
        let source = StaticSource::from_json(
            r#"{"sim/time/paused": 1, "sim/flightmodel/engine/ENGN_N1_": [20.5, 21.0]}"#,
        )
        .expect("snapshot should parse");
        assert_eq!(source.len(), 2);
        assert_eq!(source.scalar("sim/time/paused", ScalarKind::Int), Some(1.0));
        assert_eq!(
            source.read_array("sim/flightmodel/engine/ENGN_N1_", 2),
            vec![20.5, 21.0]
        );
    }

    #[test]
    fn rejects_non_numeric_snapshot() {
        assert!(StaticSource::from_json(r#"{"sim/x": "high"}"#).is_err());
    }
}
