//! Curriculum parameter tables.
//!
//! A [`ParameterSet`] is the per-(module, level) configuration record. Its
//! shape is topic-specific, so it stays a validated dynamic map: accessors
//! return `Option` and generators substitute their own defaults when a field
//! is missing or has the wrong shape.

use std::collections::BTreeMap;
use std::io::Read;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::practice_engine::{
    errors::CurriculumError,
    models::{Level, Topic},
};

const BUILTIN_CURRICULUM: &str = include_str!("../../curriculum/default.json");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet(Map<String, Value>);

impl ParameterSet {
    pub fn new(fields: Map<String, Value>) -> Self {
        ParameterSet(fields)
    }

    /// Build from a JSON value; anything other than an object yields an empty set.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => ParameterSet(map),
            _ => ParameterSet::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Enabled operation tags, in table order. Empty when the field is missing.
    pub fn operations(&self) -> Vec<&str> {
        self.strs("operations")
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(as_int)
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Boolean feature flag; missing means `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn strs(&self, key: &str) -> Vec<&str> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn ints(&self, key: &str) -> Vec<i64> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(as_int).collect(),
            _ => Vec::new(),
        }
    }

    /// Integer range given as `[min, max]` or `{"min": .., "max": ..}`.
    /// Reversed bounds are swapped.
    pub fn int_range(&self, key: &str) -> Option<(i64, i64)> {
        let (lo, hi) = self.get(key).and_then(range_of)?;
        let (lo, hi) = (lo.round() as i64, hi.round() as i64);
        Some((lo.min(hi), lo.max(hi)))
    }

    /// Real-valued range, same shapes as [`ParameterSet::int_range`].
    pub fn float_range(&self, key: &str) -> Option<(f64, f64)> {
        let (lo, hi) = self.get(key).and_then(range_of)?;
        Some((lo.min(hi), lo.max(hi)))
    }

    /// Nested record (e.g. `conversions` or `ranges`) as its own parameter set.
    pub fn nested(&self, key: &str) -> Option<ParameterSet> {
        match self.get(key) {
            Some(Value::Object(map)) => Some(ParameterSet(map.clone())),
            _ => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Copy of this set with `key` replaced. Handy for tests and for callers
    /// tweaking a level record in place.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }
}

fn as_int(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|f| f.round() as i64))
}

fn range_of(value: &Value) -> Option<(f64, f64)> {
    match value {
        Value::Array(items) if items.len() == 2 => Some((items[0].as_f64()?, items[1].as_f64()?)),
        Value::Object(map) => Some((map.get("min")?.as_f64()?, map.get("max")?.as_f64()?)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Curriculum
// ---------------------------------------------------------------------------

/// Parameter sets for every known module and level.
#[derive(Debug, Clone, Default)]
pub struct Curriculum {
    modules: BTreeMap<Topic, [Option<ParameterSet>; 4]>,
}

impl Curriculum {
    /// The bundled tables from `curriculum/default.json`.
    pub fn builtin() -> Result<Self, CurriculumError> {
        Curriculum::from_json(BUILTIN_CURRICULUM)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, CurriculumError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Curriculum::from_json(&buf)
    }

    /// Parse and schema-check a curriculum document:
    /// `{ "<module_id>": { "1": {...}, .., "4": {...} } }`.
    ///
    /// Unknown module ids are skipped with a warning. Level records without an
    /// `operations` list are kept (generation falls back to the topic default).
    pub fn from_json(json: &str) -> Result<Self, CurriculumError> {
        let root: Map<String, Value> = serde_json::from_str(json)?;
        let mut modules = BTreeMap::new();

        for (module_id, levels) in root {
            let Value::Object(levels) = levels else {
                return Err(CurriculumError::InvalidRecord { module: module_id });
            };
            let topic = match module_id.parse::<Topic>() {
                Ok(topic) => topic,
                Err(e) => {
                    warn!("curriculum: skipping {e}");
                    continue;
                }
            };

            let mut table: [Option<ParameterSet>; 4] = Default::default();
            for (key, record) in levels {
                let level = key
                    .parse::<u8>()
                    .ok()
                    .and_then(Level::from_number)
                    .ok_or_else(|| CurriculumError::InvalidLevel {
                        module: module_id.clone(),
                        key: key.clone(),
                    })?;
                let Value::Object(fields) = record else {
                    return Err(CurriculumError::InvalidRecord {
                        module: format!("{module_id}/{key}"),
                    });
                };
                let params = ParameterSet::new(fields);
                if params.operations().is_empty() {
                    warn!("curriculum: {module_id} level {key} has no operations list");
                }
                table[level.index()] = Some(params);
            }
            modules.insert(topic, table);
        }

        Ok(Curriculum { modules })
    }

    /// Parameter set for a module/level, if the tables define one.
    pub fn parameters(&self, topic: Topic, level: Level) -> Option<&ParameterSet> {
        self.modules.get(&topic)?[level.index()].as_ref()
    }

    pub fn insert(&mut self, topic: Topic, level: Level, params: ParameterSet) {
        self.modules.entry(topic).or_default()[level.index()] = Some(params);
    }

    pub fn topics(&self) -> impl Iterator<Item = Topic> + '_ {
        self.modules.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> ParameterSet {
        ParameterSet::from_value(value)
    }

    #[test]
    fn ranges_accept_array_and_object_shapes() {
        let p = params(json!({
            "a": [5, 1],
            "b": { "min": 0.5, "max": 20 },
            "c": "nonsense"
        }));
        assert_eq!(p.int_range("a"), Some((1, 5)));
        assert_eq!(p.float_range("b"), Some((0.5, 20.0)));
        assert_eq!(p.int_range("c"), None);
        assert_eq!(p.int_range("missing"), None);
    }

    #[test]
    fn missing_fields_fail_soft() {
        let p = ParameterSet::default();
        assert!(p.operations().is_empty());
        assert!(!p.flag("allow_carry"));
        assert!(p.ints("tables").is_empty());
        assert!(p.nested("ranges").is_none());
    }

    #[test]
    fn builtin_curriculum_covers_every_topic_and_level() {
        let curriculum = Curriculum::builtin().unwrap();
        for topic in Topic::ALL {
            for level in Level::ALL {
                let p = curriculum
                    .parameters(topic, level)
                    .unwrap_or_else(|| panic!("missing {topic:?} {level:?}"));
                assert!(!p.operations().is_empty(), "{topic:?} {level:?} has no operations");
            }
        }
    }

    #[test]
    fn invalid_level_key_is_rejected() {
        let err = Curriculum::from_json(r#"{ "counting": { "7": { "operations": [] } } }"#);
        assert!(matches!(err, Err(CurriculumError::InvalidLevel { .. })));
    }

    #[test]
    fn unknown_modules_are_skipped() {
        let c = Curriculum::from_json(r#"{ "algebra": { "1": {} } }"#).unwrap();
        assert_eq!(c.topics().count(), 0);
    }
}
