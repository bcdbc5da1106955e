//! Fact structures extracted from Python function definitions.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How a parameter binds arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Declared before a `/` separator.
    PositionalOnly,
    /// Ordinary positional-or-keyword parameter.
    Positional,
    /// Declared after `*` or `*args`.
    KeywordOnly,
    /// `*args`
    VarPositional,
    /// `**kwargs`
    VarKeyword,
    /// Syntax the classifier could not interpret (e.g. tuple unpacking).
    Unrecognized,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::PositionalOnly => "positional-only",
            ParamKind::Positional => "positional",
            ParamKind::KeywordOnly => "keyword-only",
            ParamKind::VarPositional => "var-positional",
            ParamKind::VarKeyword => "var-keyword",
            ParamKind::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a literal expression that can be classified without inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralKind {
    None,
    Boolean,
    Integer,
    Float,
    String,
    Bytes,
    List,
    Dict,
    Set,
    Tuple,
}

impl LiteralKind {
    /// Name used in diagnostics, spelled the way Python spells the type.
    pub fn python_name(&self) -> &'static str {
        match self {
            LiteralKind::None => "None",
            LiteralKind::Boolean => "bool",
            LiteralKind::Integer => "int",
            LiteralKind::Float => "float",
            LiteralKind::String => "str",
            LiteralKind::Bytes => "bytes",
            LiteralKind::List => "list",
            LiteralKind::Dict => "dict",
            LiteralKind::Set => "set",
            LiteralKind::Tuple => "tuple",
        }
    }
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.python_name())
    }
}

/// Best-effort description of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Literal(LiteralKind),
    /// Names, calls, comprehensions, operators: anything not a literal.
    Unknown,
}

impl ValueKind {
    pub fn literal(&self) -> Option<LiteralKind> {
        match self {
            ValueKind::Literal(kind) => Some(*kind),
            ValueKind::Unknown => None,
        }
    }

    pub fn is_none_literal(&self) -> bool {
        matches!(self, ValueKind::Literal(LiteralKind::None))
    }
}

/// A type annotation as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Raw annotation text.
    pub text: String,
    /// Line number (1-indexed).
    pub line: usize,
}

/// One parameter of a function signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name without `*`/`**` prefixes.
    pub name: String,
    pub kind: ParamKind,
    /// Line number (1-indexed).
    pub line: usize,
    pub annotation: Option<Annotation>,
    pub default: Option<ValueKind>,
}

impl ParameterInfo {
    /// Name as it appears in a signature, including star prefixes.
    pub fn display_name(&self) -> String {
        match self.kind {
            ParamKind::VarPositional => format!("*{}", self.name),
            ParamKind::VarKeyword => format!("**{}", self.name),
            _ => self.name.clone(),
        }
    }

    pub fn is_annotated(&self) -> bool {
        self.annotation.is_some()
    }
}

/// A direct `return` statement in a function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnSite {
    /// Line number (1-indexed).
    pub line: usize,
    /// `None` for a bare `return`.
    pub value: Option<ValueKind>,
}

/// Everything the rule engine needs to know about one function definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    /// Line of the `def` keyword (1-indexed).
    pub line: usize,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterInfo>,
    pub return_annotation: Option<Annotation>,
    /// Return statements of the function's own body, nested bodies excluded.
    pub returns: Vec<ReturnSite>,
    /// Whether the own body contains `yield`.
    pub yields: bool,
    /// First parameter is `self` or `cls`.
    pub is_implicit_first_param: bool,
    pub is_async: bool,
}

impl FunctionRecord {
    /// Literal kinds statically observable in `return <expr>` statements.
    pub fn returned_literals(&self) -> BTreeSet<LiteralKind> {
        self.returns
            .iter()
            .filter_map(|r| r.value.and_then(|v| v.literal()))
            .collect()
    }

    /// Whether the function ever hands a value back to its caller.
    ///
    /// A bare `return` or falling off the end does not count; a generator
    /// always produces a value.
    pub fn produces_value(&self) -> bool {
        self.yields || self.returns.iter().any(|r| r.value.is_some())
    }

    /// Parameters subject to annotation rules (receiver excluded).
    pub fn checked_parameters(&self) -> impl Iterator<Item = &ParameterInfo> {
        let skip = usize::from(self.is_implicit_first_param);
        self.parameters.iter().skip(skip)
    }
}
