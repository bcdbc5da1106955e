//! Textual heuristics over annotation source text.
//!
//! Annotations are never resolved: `List` is recognized by its spelling,
//! not by following imports. Forward-reference quotes and whitespace are
//! ignored before matching.

use phf::phf_map;
use regex::Regex;

use crate::analysis::LiteralKind;

/// Module prefixes stripped before matching a bare type name.
const QUALIFIERS: &[&str] = &[
    "typing_extensions.",
    "typing.",
    "collections.abc.",
    "collections.",
    "builtins.",
];

/// Bare container names of the sequence, mapping, and set families,
/// mapped to the parameterized form to suggest.
static RAW_CONTAINERS: phf::Map<&'static str, &'static str> = phf_map! {
    // sequences
    "List" => "List[T]",
    "list" => "list[T]",
    "Sequence" => "Sequence[T]",
    "MutableSequence" => "MutableSequence[T]",
    "Tuple" => "Tuple[T, ...]",
    "tuple" => "tuple[T, ...]",
    "Deque" => "Deque[T]",
    "deque" => "deque[T]",
    // mappings
    "Dict" => "Dict[K, V]",
    "dict" => "dict[K, V]",
    "Mapping" => "Mapping[K, V]",
    "MutableMapping" => "MutableMapping[K, V]",
    "DefaultDict" => "DefaultDict[K, V]",
    "defaultdict" => "defaultdict[K, V]",
    "OrderedDict" => "OrderedDict[K, V]",
    "Counter" => "Counter[T]",
    // sets
    "Set" => "Set[T]",
    "set" => "set[T]",
    "FrozenSet" => "FrozenSet[T]",
    "frozenset" => "frozenset[T]",
    "AbstractSet" => "AbstractSet[T]",
    "MutableSet" => "MutableSet[T]",
};

lazy_static::lazy_static! {
    /// `Optional[...]`, optionally module-qualified.
    static ref OPTIONAL_WRAPPER: Regex =
        Regex::new(r"^(?:typing(?:_extensions)?\.)?Optional\[.+\]$").unwrap();

    /// `Union[...]`, capturing its members.
    static ref UNION_WRAPPER: Regex =
        Regex::new(r"^(?:typing(?:_extensions)?\.)?Union\[(.+)\]$").unwrap();
}

/// Concrete scalar types the literal mismatch rule can reason about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Int,
    Float,
    Bool,
    Str,
    Bytes,
    None,
}

impl ScalarType {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Bool => "bool",
            ScalarType::Str => "str",
            ScalarType::Bytes => "bytes",
            ScalarType::None => "None",
        }
    }

    /// Whether a literal of `kind` is a valid value of this type.
    ///
    /// `bool` is a subtype of `int`, and `int` is accepted where `float`
    /// is expected.
    pub fn accepts(&self, kind: LiteralKind) -> bool {
        match self {
            ScalarType::Int => matches!(kind, LiteralKind::Integer | LiteralKind::Boolean),
            ScalarType::Float => matches!(
                kind,
                LiteralKind::Float | LiteralKind::Integer | LiteralKind::Boolean
            ),
            ScalarType::Bool => kind == LiteralKind::Boolean,
            ScalarType::Str => kind == LiteralKind::String,
            ScalarType::Bytes => kind == LiteralKind::Bytes,
            ScalarType::None => kind == LiteralKind::None,
        }
    }
}

/// Strip whitespace and one layer of forward-reference quotes.
///
/// Quotes are only removed when the whole annotation is one string
/// literal, so `'a' | 'b'` keeps both of its literals intact.
pub fn normalize(text: &str) -> String {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    for quote in ['"', '\''] {
        if compact.len() >= 2 && compact.starts_with(quote) && compact.ends_with(quote) {
            let inner = &compact[1..compact.len() - 1];
            if !inner.contains(quote) {
                return inner.to_string();
            }
        }
    }
    compact
}

fn strip_qualifier(name: &str) -> &str {
    QUALIFIERS
        .iter()
        .find_map(|q| name.strip_prefix(q))
        .unwrap_or(name)
}

/// Split on `sep` where it is not nested inside brackets or quotes.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '[' | '(' | '{' => depth += 1,
                ']' | ')' | '}' => depth = depth.saturating_sub(1),
                _ if c == sep && depth == 0 => {
                    parts.push(&text[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }
    parts.push(&text[start..]);
    parts
}

fn is_none_member(member: &str) -> bool {
    matches!(normalize(member).as_str(), "None" | "NoneType" | "types.NoneType")
}

/// Whether an annotation admits `None`.
///
/// Recognized forms: the `Optional[T]` wrapper, `Union[..., None, ...]`,
/// and `T | None` in any member position.
pub fn is_optional(text: &str) -> bool {
    let t = normalize(text);

    if OPTIONAL_WRAPPER.is_match(&t) {
        return true;
    }

    if let Some(caps) = UNION_WRAPPER.captures(&t) {
        if split_top_level(&caps[1], ',').into_iter().any(is_none_member) {
            return true;
        }
    }

    let members = split_top_level(&t, '|');
    members.len() > 1 && members.into_iter().any(is_none_member)
}

/// If the annotation is a bare container name, return the suggested
/// parameterized form.
pub fn raw_generic_suggestion(text: &str) -> Option<&'static str> {
    let t = normalize(text);
    RAW_CONTAINERS.get(strip_qualifier(&t)).copied()
}

/// If the annotation is a concrete scalar type, return it.
pub fn scalar_type(text: &str) -> Option<ScalarType> {
    let t = normalize(text);
    match strip_qualifier(&t) {
        "int" => Some(ScalarType::Int),
        "float" => Some(ScalarType::Float),
        "bool" => Some(ScalarType::Bool),
        "str" => Some(ScalarType::Str),
        "bytes" => Some(ScalarType::Bytes),
        "None" => Some(ScalarType::None),
        _ => None,
    }
}
