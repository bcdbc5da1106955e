//! Python syntax tree provider using tree-sitter.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use crate::analysis::{LanguageAnalyzer, ParsedFile};
use crate::error::AnalysisError;

/// Longest source excerpt quoted in a syntax error message.
const MAX_EXCERPT: usize = 40;

pub struct PythonAnalyzer {
    language: Language,
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> Result<Parser, tree_sitter::LanguageError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }
}

const NON_DEFAULT_AFTER_DEFAULT: &str =
    "parameter without a default follows parameter with a default";
const TUPLE_PARAMETER: &str = "tuple parameter unpacking is not supported";

fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

fn describe_error_node(node: Node, source: &[u8]) -> String {
    let text = node.utf8_text(source).unwrap_or("");
    let first_line = text.lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        "invalid syntax".to_string()
    } else if first_line.chars().count() > MAX_EXCERPT {
        let excerpt: String = first_line.chars().take(MAX_EXCERPT).collect();
        format!("invalid syntax near `{}...`", excerpt)
    } else {
        format!("invalid syntax near `{}`", first_line)
    }
}

/// Whether a string literal carries a `b` prefix.
fn is_bytes_literal(node: Node, source: &[u8]) -> bool {
    node.utf8_text(source)
        .unwrap_or("")
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .any(|c| c == 'b' || c == 'B')
}

/// Implicit concatenation of bytes with str literals.
fn mixes_bytes(node: Node, source: &[u8]) -> bool {
    let mut cursor = node.walk();
    let kinds: Vec<bool> = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "string")
        .map(|c| is_bytes_literal(c, source))
        .collect();
    kinds.iter().any(|b| *b) && kinds.iter().any(|b| !*b)
}

/// Parameter lists tree-sitter accepts but Python 3 rejects: tuple
/// unpacking, and a non-default parameter after a defaulted one before
/// any `*`.
fn parameter_violation(params: Node) -> Option<(usize, String)> {
    let mut seen_default = false;
    let mut after_star = false;

    let mut cursor = params.walk();
    for child in params.named_children(&mut cursor) {
        let line = line_of(child);
        let required = match child.kind() {
            "tuple_pattern" | "list_pattern" => {
                return Some((line, TUPLE_PARAMETER.to_string()));
            }
            "default_parameter" => {
                let name_kind = child.child_by_field_name("name").map(|n| n.kind());
                if name_kind.is_some_and(|k| k != "identifier") {
                    return Some((line, TUPLE_PARAMETER.to_string()));
                }
                seen_default = true;
                false
            }
            "typed_default_parameter" => {
                seen_default = true;
                false
            }
            "identifier" => true,
            "typed_parameter" => {
                let mut inner = child.walk();
                let target = child.named_children(&mut inner).next().map(|t| t.kind());
                match target {
                    Some("list_splat_pattern") => {
                        after_star = true;
                        false
                    }
                    Some("dictionary_splat_pattern") => false,
                    _ => true,
                }
            }
            "list_splat_pattern" | "keyword_separator" => {
                after_star = true;
                false
            }
            _ => false,
        };

        if required && seen_default && !after_star {
            return Some((line, NON_DEFAULT_AFTER_DEFAULT.to_string()));
        }
    }
    None
}

/// Python 2 forms and other constructs the grammar tolerates but the
/// Python 3 compiler rejects.
fn python3_violation(node: Node, source: &[u8]) -> Option<(usize, String)> {
    let message = match node.kind() {
        "print_statement" => "Missing parentheses in call to 'print'",
        "exec_statement" => "Missing parentheses in call to 'exec'",
        "<>" => "invalid comparison operator `<>`; use `!=`",
        "concatenated_string" if mixes_bytes(node, source) => {
            "cannot mix bytes and nonbytes literals"
        }
        "parameters" | "lambda_parameters" => return parameter_violation(node),
        _ => return None,
    };
    Some((line_of(node), message.to_string()))
}

/// Find the first syntax error in document order.
///
/// Reports ERROR and MISSING nodes as well as constructs only Python 2
/// accepts. Returns the 1-indexed line and a short description.
fn first_syntax_error(root: Node, source: &[u8]) -> Option<(usize, String)> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_missing() {
            return Some((line_of(node), format!("expected {:?}", node.kind())));
        }
        if node.is_error() {
            return Some((line_of(node), describe_error_node(node, source)));
        }
        if let Some(found) = python3_violation(node, source) {
            return Some(found);
        }

        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    // has_error() was set but no node claimed it
    root.has_error()
        .then(|| (line_of(root), "invalid syntax".to_string()))
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> Result<ParsedFile, AnalysisError> {
        let path_str = path.to_string_lossy().to_string();

        let mut parser = self.create_parser().map_err(|e| AnalysisError::Grammar {
            path: path_str.clone(),
            message: e.to_string(),
        })?;

        let tree = parser.parse(source, None).ok_or_else(|| AnalysisError::Grammar {
            path: path_str.clone(),
            message: "parser produced no tree".to_string(),
        })?;

        if let Some((line, message)) = first_syntax_error(tree.root_node(), source) {
            log::debug!("{}:{}: {}", path_str, line, message);
            return Err(AnalysisError::parse(path_str, line, message));
        }

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path_str,
        })
    }
}
