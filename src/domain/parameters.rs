//! Strategy parameters and their search domains.
//!
//! A `ParameterSet` is one concrete instantiation of a strategy's tunable
//! constants. A `ParameterSpace` is the Cartesian product of per-name value
//! lists plus feasibility constraints. Candidates are numbered in mixed
//! radix with the last declared axis varying fastest; that number is the
//! enumeration order used for tie-breaking.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    #[error("missing parameter '{name}'")]
    Missing { name: String },

    #[error("parameter '{name}' must be a positive integer length, got {value}")]
    NotAPeriod { name: String, value: String },

    #[error("malformed parameter assignment '{assignment}' (expected name=value)")]
    Malformed { assignment: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            ParamValue::Int(v) => *v as f64,
            ParamValue::Float(v) => *v,
        }
    }

    /// Integers parse as `Int`; anything else numeric as `Float`.
    pub fn parse(raw: &str) -> Option<ParamValue> {
        let raw = raw.trim();
        if let Ok(v) = raw.parse::<i64>() {
            return Some(ParamValue::Int(v));
        }
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(ParamValue::Float)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{:?}", v),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet(BTreeMap<String, ParamValue>);

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, name: &str, value: ParamValue) {
        self.0.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// A lookback length: a strictly positive integer.
    pub fn period(&self, name: &str) -> Result<usize, ParameterError> {
        match self.get(name) {
            Some(ParamValue::Int(v)) if v >= 1 => Ok(v as usize),
            Some(other) => Err(ParameterError::NotAPeriod {
                name: name.to_string(),
                value: other.to_string(),
            }),
            None => Err(ParameterError::Missing {
                name: name.to_string(),
            }),
        }
    }

    /// A coefficient or threshold. Integers are widened.
    pub fn float(&self, name: &str) -> Result<f64, ParameterError> {
        self.get(name)
            .map(|v| v.as_f64())
            .ok_or_else(|| ParameterError::Missing {
                name: name.to_string(),
            })
    }

    /// Parses `name=value` as given on the command line.
    pub fn parse_assignment(assignment: &str) -> Result<(String, ParamValue), ParameterError> {
        let malformed = || ParameterError::Malformed {
            assignment: assignment.to_string(),
        };
        let (name, raw) = assignment.split_once('=').ok_or_else(malformed)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(malformed());
        }
        let value = ParamValue::parse(raw).ok_or_else(malformed)?;
        Ok((name.to_string(), value))
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{}", rendered.join(", "))
    }
}

type Predicate = dyn Fn(&ParameterSet) -> bool + Send + Sync;

/// A named feasibility predicate over a ParameterSet.
#[derive(Clone)]
pub struct Constraint {
    name: String,
    predicate: Arc<Predicate>,
}

impl Constraint {
    pub fn new(
        name: impl Into<String>,
        predicate: impl Fn(&ParameterSet) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allows(&self, params: &ParameterSet) -> bool {
        (self.predicate)(params)
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParameterSpace {
    axes: Vec<(String, Vec<ParamValue>)>,
    constraints: Vec<Constraint>,
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis<V: Into<ParamValue>>(mut self, name: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.axes.push((name.to_string(), values));
        self
    }

    /// Integer axis `start, start+step, ...` strictly below `end`.
    pub fn range(self, name: &str, start: i64, end: i64, step: usize) -> Self {
        self.axis(name, (start..end).step_by(step.max(1)))
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn axes(&self) -> impl Iterator<Item = (&str, &[ParamValue])> {
        self.axes.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Number of candidates in the unconstrained product.
    pub fn size(&self) -> usize {
        self.axes.iter().map(|(_, v)| v.len()).product()
    }

    /// Decodes enumeration index `index`; `None` past the end.
    pub fn candidate(&self, index: usize) -> Option<ParameterSet> {
        if index >= self.size() {
            return None;
        }
        let mut remainder = index;
        let mut params = ParameterSet::new();
        for (name, values) in self.axes.iter().rev() {
            params.insert(name, values[remainder % values.len()]);
            remainder /= values.len();
        }
        Some(params)
    }

    pub fn is_feasible(&self, params: &ParameterSet, extra: Option<&Constraint>) -> bool {
        self.constraints.iter().chain(extra).all(|c| c.allows(params))
    }

    /// Enumeration indices of every candidate passing all constraints,
    /// ascending.
    pub fn feasible_indices(&self, extra: Option<&Constraint>) -> Vec<usize> {
        (0..self.size())
            .filter(|&i| {
                self.candidate(i)
                    .is_some_and(|params| self.is_feasible(&params, extra))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_space() -> ParameterSpace {
        ParameterSpace::new()
            .axis("n1", [1i64, 2])
            .axis("n2", [10i64, 20, 30])
    }

    #[test]
    fn size_is_product() {
        assert_eq!(small_space().size(), 6);
        assert_eq!(ParameterSpace::new().size(), 1);
        assert_eq!(ParameterSpace::new().axis::<i64>("n1", []).size(), 0);
    }

    #[test]
    fn last_axis_varies_fastest() {
        let space = small_space();
        let first = space.candidate(0).unwrap();
        let second = space.candidate(1).unwrap();
        let fourth = space.candidate(3).unwrap();

        assert_eq!(first.to_string(), "n1=1, n2=10");
        assert_eq!(second.to_string(), "n1=1, n2=20");
        assert_eq!(fourth.to_string(), "n1=2, n2=10");
        assert!(space.candidate(6).is_none());
    }

    #[test]
    fn range_matches_half_open_steps() {
        let space = ParameterSpace::new().range("n2", 10, 60, 2);
        assert_eq!(space.size(), 25);
        assert_eq!(space.candidate(24).unwrap().get("n2"), Some(ParamValue::Int(58)));
    }

    #[test]
    fn constraints_prune_before_evaluation() {
        let space = small_space().constraint(Constraint::new("n2 > 15", |p| {
            p.float("n2").is_ok_and(|v| v > 15.0)
        }));
        assert_eq!(space.feasible_indices(None), vec![1, 2, 4, 5]);

        let extra = Constraint::new("n1 == 2", |p| p.period("n1") == Ok(2));
        assert_eq!(space.feasible_indices(Some(&extra)), vec![4, 5]);
    }

    #[test]
    fn period_accessor_rejects_non_lengths() {
        let params = ParameterSet::new()
            .with("n1", 14i64)
            .with("n2", 2.5)
            .with("n3", 0i64);

        assert_eq!(params.period("n1"), Ok(14));
        assert!(matches!(params.period("n2"), Err(ParameterError::NotAPeriod { .. })));
        assert!(matches!(params.period("n3"), Err(ParameterError::NotAPeriod { .. })));
        assert!(matches!(params.period("n9"), Err(ParameterError::Missing { .. })));
        assert_eq!(params.float("n1"), Ok(14.0));
    }

    #[test]
    fn parse_assignment_variants() {
        assert_eq!(
            ParameterSet::parse_assignment("n1=10").unwrap(),
            ("n1".to_string(), ParamValue::Int(10))
        );
        assert_eq!(
            ParameterSet::parse_assignment(" n9 = 0.003").unwrap(),
            ("n9".to_string(), ParamValue::Float(0.003))
        );
        assert!(ParameterSet::parse_assignment("n1").is_err());
        assert!(ParameterSet::parse_assignment("=4").is_err());
        assert!(ParameterSet::parse_assignment("n1=abc").is_err());
    }

    #[test]
    fn display_keeps_float_marker() {
        let params = ParameterSet::new().with("n1", 30i64).with("n2", 2.0);
        assert_eq!(params.to_string(), "n1=30, n2=2.0");
    }

    #[test]
    fn serializes_as_plain_map() {
        let params = ParameterSet::new().with("n1", 30i64).with("n9", 0.0015);
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"n1":30,"n9":0.0015}"#);
    }
}
