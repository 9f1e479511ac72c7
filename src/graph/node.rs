use std::collections::BTreeMap;

use crate::expression::ast::Expr;
use crate::foundation::format::VideoFormat;

/// Index of a node inside its [`crate::Core`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(pub u32);

/// Argument value passed to a host plugin function.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Arg {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Strs(Vec<String>),
}

/// Keyword arguments of a plugin call, sorted by name.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Args(pub BTreeMap<String, Arg>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: Arg) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    pub fn int(self, key: &str, v: i64) -> Self {
        self.set(key, Arg::Int(v))
    }

    pub fn float(self, key: &str, v: f64) -> Self {
        self.set(key, Arg::Float(v))
    }

    pub fn bool(self, key: &str, v: bool) -> Self {
        self.set(key, Arg::Bool(v))
    }

    pub fn str(self, key: &str, v: impl Into<String>) -> Self {
        self.set(key, Arg::Str(v.into()))
    }

    pub fn ints(self, key: &str, v: impl IntoIterator<Item = i64>) -> Self {
        self.set(key, Arg::Ints(v.into_iter().collect()))
    }

    pub fn floats(self, key: &str, v: impl IntoIterator<Item = f64>) -> Self {
        self.set(key, Arg::Floats(v.into_iter().collect()))
    }

    /// Expressions are serialized to the host grammar when the argument is recorded.
    pub fn exprs<'a>(self, key: &str, v: impl IntoIterator<Item = &'a Expr>) -> Self {
        let texts = v.into_iter().map(Expr::to_postfix).collect();
        self.set(key, Arg::Strs(texts))
    }

    /// Set `key` only when `v` is `Some`.
    pub fn opt_int(self, key: &str, v: Option<i64>) -> Self {
        match v {
            Some(v) => self.int(key, v),
            None => self,
        }
    }

    pub fn opt_bool(self, key: &str, v: Option<bool>) -> Self {
        match v {
            Some(v) => self.bool(key, v),
            None => self,
        }
    }

    pub fn opt_float(self, key: &str, v: Option<f64>) -> Self {
        match v {
            Some(v) => self.float(key, v),
            None => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Arg> {
        self.0.get(key)
    }
}

/// One recorded host call: `plugin.function(inputs..., **args)` producing a clip of `format`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub plugin: String,
    pub function: String,
    pub inputs: Vec<NodeId>,
    pub args: Args,
    pub format: VideoFormat,
    pub fingerprint: u64,
}

impl Node {
    /// `plugin.Function`, as the host names it.
    pub fn call_name(&self) -> String {
        format!("{}.{}", self.plugin, self.function)
    }
}
