use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A normalized call-argument value used for key derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArgValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<ArgValue>),
}

impl ArgValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ArgValue::Int(v) => Some(*v as f64),
            ArgValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn type_tag(&self) -> &'static str {
        match self {
            ArgValue::Null => "null",
            ArgValue::Bool(_) => "bool",
            ArgValue::Int(_) => "int",
            ArgValue::Float(_) => "float",
            ArgValue::Str(_) => "str",
            ArgValue::Seq(_) => "seq",
        }
    }

    /// Canonical value token. Integral floats render like integers so that,
    /// without `typed`, `f(3)` and `f(3.0)` derive the same key.
    fn token(&self) -> String {
        match self {
            ArgValue::Null => "null".to_string(),
            ArgValue::Bool(v) => v.to_string(),
            ArgValue::Int(v) => v.to_string(),
            ArgValue::Float(v) => {
                if v.is_finite()
                    && v.fract() == 0.0
                    && *v >= i64::MIN as f64
                    && *v <= i64::MAX as f64
                {
                    (*v as i64).to_string()
                } else {
                    v.to_string()
                }
            }
            // JSON string literal, so quoting and escaping keep arbitrary
            // text unambiguous within a joined key.
            ArgValue::Str(v) => serde_json::Value::String(v.clone()).to_string(),
            ArgValue::Seq(items) => {
                let inner: Vec<String> = items.iter().map(ArgValue::token).collect();
                format!("[{}]", inner.join(","))
            }
        }
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        ArgValue::Int(v as i64)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}

impl From<Vec<ArgValue>> for ArgValue {
    fn from(v: Vec<ArgValue>) -> Self {
        ArgValue::Seq(v)
    }
}

/// The arguments of a single memoized call: ordered positional values plus
/// keyword values. Keyword arguments are order-normalized by construction,
/// so insertion order never affects the derived key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<ArgValue>,
    keyword: BTreeMap<String, ArgValue>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Positional argument at `index`.
    pub fn at(&self, index: usize) -> Option<&ArgValue> {
        self.positional.get(index)
    }

    /// Keyword argument named `name`.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.keyword.get(name)
    }

    pub fn positional(&self) -> &[ArgValue] {
        &self.positional
    }

    pub fn keyword(&self) -> &BTreeMap<String, ArgValue> {
        &self.keyword
    }
}

/// Arguments excluded from key derivation, by positional index or keyword
/// name. Calls that differ only in ignored arguments collide to the same key.
#[derive(Debug, Clone, Default)]
pub struct Ignore {
    positions: BTreeSet<usize>,
    names: BTreeSet<String>,
}

impl Ignore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, index: usize) -> Self {
        self.positions.insert(index);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.names.is_empty()
    }

    fn skips_position(&self, index: usize) -> bool {
        self.positions.contains(&index)
    }

    fn skips_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Deterministic cache key derived from a call signature.
///
/// An ordered, immutable sequence of parts: base identifier, surviving
/// positional tokens, a marker separating positional from keyword tokens,
/// sorted `name=value` keyword tokens, then one type tag per surviving
/// argument when type-sensitivity is on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    parts: Vec<String>,
}

/// Marker between positional and keyword tokens, so a trailing positional
/// string can never be confused with a keyword pair.
const KWARGS_MARKER: &str = "#";

impl CacheKey {
    pub fn derive(base: &str, args: &CallArgs, typed: bool, ignore: &Ignore) -> Self {
        let kept_args: Vec<&ArgValue> = args
            .positional()
            .iter()
            .enumerate()
            .filter(|(index, _)| !ignore.skips_position(*index))
            .map(|(_, value)| value)
            .collect();
        let kept_kwargs: Vec<(&String, &ArgValue)> = args
            .keyword()
            .iter()
            .filter(|(name, _)| !ignore.skips_name(name))
            .collect();

        let mut parts = Vec::with_capacity(2 + kept_args.len() + kept_kwargs.len());
        parts.push(base.to_string());
        parts.extend(kept_args.iter().map(|value| value.token()));
        parts.push(KWARGS_MARKER.to_string());
        parts.extend(
            kept_kwargs
                .iter()
                .map(|(name, value)| format!("{}={}", name, value.token())),
        );

        if typed {
            parts.extend(kept_args.iter().map(|value| value.type_tag().to_string()));
            parts.extend(
                kept_kwargs
                    .iter()
                    .map(|(_, value)| value.type_tag().to_string()),
            );
        }

        CacheKey { parts }
    }

    /// Flat key understood by the store. Parts are joined on a unit
    /// separator, which cannot appear unescaped in any token.
    pub fn store_key(&self) -> crate::store::StoreKey {
        self.parts.join("\u{1f}")
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.parts.join(", "))
    }
}
