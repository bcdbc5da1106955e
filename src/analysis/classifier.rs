//! Function classification over a Python syntax tree.
//!
//! Walks the tree in document order and turns every `def` (plain, async,
//! decorated, nested, or inside a class) into a [`FunctionRecord`].
//!
//! Literal classification is a heuristic, not type inference: only literal
//! displays are recognized and everything else is [`ValueKind::Unknown`].

use tree_sitter::Node;

use super::facts::{
    Annotation, FunctionRecord, LiteralKind, ParamKind, ParameterInfo, ReturnSite, ValueKind,
};
use super::ParsedFile;

/// Names that mark the implicit receiver when they lead the parameter list.
const RECEIVER_NAMES: &[&str] = &["self", "cls"];

/// The node kinds the classifier cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyntaxKind {
    FunctionDef,
    ClassDef,
    Return,
    Yield,
    Other,
}

impl SyntaxKind {
    fn of(node: Node) -> Self {
        match node.kind() {
            "function_definition" => SyntaxKind::FunctionDef,
            "class_definition" => SyntaxKind::ClassDef,
            "return_statement" => SyntaxKind::Return,
            "yield" => SyntaxKind::Yield,
            _ => SyntaxKind::Other,
        }
    }
}

fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect()
}

/// Produces function records for one parsed file.
pub struct Classifier<'a> {
    parsed: &'a ParsedFile,
}

impl<'a> Classifier<'a> {
    pub fn new(parsed: &'a ParsedFile) -> Self {
        Self { parsed }
    }

    /// Lazily iterate over every function definition in document order.
    ///
    /// Each call starts a fresh walk from the root.
    pub fn records(&self) -> FunctionRecords<'a> {
        FunctionRecords {
            parsed: self.parsed,
            stack: vec![self.parsed.tree.root_node()],
        }
    }
}

/// Lazy preorder walk yielding one record per function definition.
pub struct FunctionRecords<'a> {
    parsed: &'a ParsedFile,
    stack: Vec<Node<'a>>,
}

impl<'a> Iterator for FunctionRecords<'a> {
    type Item = FunctionRecord;

    fn next(&mut self) -> Option<FunctionRecord> {
        while let Some(node) = self.stack.pop() {
            let children = named_children(node);
            self.stack.extend(children.into_iter().rev());

            match SyntaxKind::of(node) {
                SyntaxKind::FunctionDef => return Some(build_record(self.parsed, node)),
                SyntaxKind::ClassDef
                | SyntaxKind::Return
                | SyntaxKind::Yield
                | SyntaxKind::Other => {}
            }
        }
        None
    }
}

/// Classify every function in a parsed file.
pub fn classify(parsed: &ParsedFile) -> Vec<FunctionRecord> {
    Classifier::new(parsed).records().collect()
}

fn build_record(parsed: &ParsedFile, node: Node) -> FunctionRecord {
    let name = node
        .child_by_field_name("name")
        .map(|n| parsed.node_text(n).to_string())
        .unwrap_or_default();

    let is_async = node.children(&mut node.walk()).any(|c| c.kind() == "async");

    let parameters = node
        .child_by_field_name("parameters")
        .map(|p| extract_parameters(parsed, p))
        .unwrap_or_default();

    let return_annotation = node.child_by_field_name("return_type").map(|t| Annotation {
        text: parsed.node_text(t).to_string(),
        line: line_of(t),
    });

    let mut body = BodyFacts::default();
    if let Some(block) = node.child_by_field_name("body") {
        scan_body(parsed, block, &mut body);
    }

    let is_implicit_first_param = parameters
        .first()
        .map(|p| {
            matches!(p.kind, ParamKind::Positional | ParamKind::PositionalOnly)
                && RECEIVER_NAMES.contains(&p.name.as_str())
        })
        .unwrap_or(false);

    FunctionRecord {
        name,
        line: line_of(node),
        parameters,
        return_annotation,
        returns: body.returns,
        yields: body.yields,
        is_implicit_first_param,
        is_async,
    }
}

fn extract_parameters(parsed: &ParsedFile, params_node: Node) -> Vec<ParameterInfo> {
    let mut params: Vec<ParameterInfo> = Vec::new();
    let mut keyword_only = false;

    for child in named_children(params_node) {
        let positional = if keyword_only {
            ParamKind::KeywordOnly
        } else {
            ParamKind::Positional
        };

        match child.kind() {
            "identifier" => params.push(ParameterInfo {
                name: parsed.node_text(child).to_string(),
                kind: positional,
                line: line_of(child),
                annotation: None,
                default: None,
            }),
            "default_parameter" => {
                let name_node = child.child_by_field_name("name");
                let kind = match name_node {
                    Some(n) if n.kind() == "identifier" => positional,
                    _ => ParamKind::Unrecognized,
                };
                params.push(ParameterInfo {
                    name: name_node
                        .map(|n| parsed.node_text(n).to_string())
                        .unwrap_or_default(),
                    kind,
                    line: line_of(child),
                    annotation: None,
                    default: child
                        .child_by_field_name("value")
                        .map(|v| classify_value(parsed, v)),
                });
            }
            "typed_default_parameter" => params.push(ParameterInfo {
                name: child
                    .child_by_field_name("name")
                    .map(|n| parsed.node_text(n).to_string())
                    .unwrap_or_default(),
                kind: positional,
                line: line_of(child),
                annotation: annotation_of(parsed, child),
                default: child
                    .child_by_field_name("value")
                    .map(|v| classify_value(parsed, v)),
            }),
            "typed_parameter" => {
                // The bound name is the first named child: an identifier or a splat pattern.
                let target = named_children(child).into_iter().next();
                let (name, kind) = match target {
                    Some(t) if t.kind() == "identifier" => {
                        (parsed.node_text(t).to_string(), positional)
                    }
                    Some(t) if t.kind() == "list_splat_pattern" => {
                        keyword_only = true;
                        (splat_name(parsed, t), ParamKind::VarPositional)
                    }
                    Some(t) if t.kind() == "dictionary_splat_pattern" => {
                        (splat_name(parsed, t), ParamKind::VarKeyword)
                    }
                    Some(t) => (parsed.node_text(t).to_string(), ParamKind::Unrecognized),
                    None => (String::new(), ParamKind::Unrecognized),
                };
                params.push(ParameterInfo {
                    name,
                    kind,
                    line: line_of(child),
                    annotation: annotation_of(parsed, child),
                    default: None,
                });
            }
            "list_splat_pattern" => {
                keyword_only = true;
                params.push(ParameterInfo {
                    name: splat_name(parsed, child),
                    kind: ParamKind::VarPositional,
                    line: line_of(child),
                    annotation: None,
                    default: None,
                });
            }
            "dictionary_splat_pattern" => params.push(ParameterInfo {
                name: splat_name(parsed, child),
                kind: ParamKind::VarKeyword,
                line: line_of(child),
                annotation: None,
                default: None,
            }),
            "keyword_separator" => keyword_only = true,
            "positional_separator" => {
                for p in params.iter_mut() {
                    if p.kind == ParamKind::Positional {
                        p.kind = ParamKind::PositionalOnly;
                    }
                }
            }
            _ => {
                log::debug!(
                    "{}:{}: unrecognized parameter syntax {:?}",
                    parsed.path,
                    line_of(child),
                    child.kind()
                );
                params.push(ParameterInfo {
                    name: parsed.node_text(child).to_string(),
                    kind: ParamKind::Unrecognized,
                    line: line_of(child),
                    annotation: None,
                    default: None,
                });
            }
        }
    }

    params
}

fn annotation_of(parsed: &ParsedFile, param: Node) -> Option<Annotation> {
    param.child_by_field_name("type").map(|t| Annotation {
        text: parsed.node_text(t).to_string(),
        line: line_of(t),
    })
}

fn splat_name(parsed: &ParsedFile, splat: Node) -> String {
    named_children(splat)
        .into_iter()
        .next()
        .map(|n| parsed.node_text(n).to_string())
        .unwrap_or_default()
}

#[derive(Default)]
struct BodyFacts {
    returns: Vec<ReturnSite>,
    yields: bool,
}

/// Collect returns and yields of one function body, without entering
/// nested function or class bodies.
fn scan_body(parsed: &ParsedFile, node: Node, facts: &mut BodyFacts) {
    for child in named_children(node) {
        match SyntaxKind::of(child) {
            SyntaxKind::FunctionDef | SyntaxKind::ClassDef => {}
            SyntaxKind::Return => {
                let value = named_children(child)
                    .into_iter()
                    .next()
                    .map(|expr| classify_value(parsed, expr));
                facts.returns.push(ReturnSite {
                    line: line_of(child),
                    value,
                });
            }
            SyntaxKind::Yield => facts.yields = true,
            SyntaxKind::Other => scan_body(parsed, child, facts),
        }
    }
}

/// Classify an expression as a literal kind when it is a literal display.
fn classify_value(parsed: &ParsedFile, node: Node) -> ValueKind {
    let literal = match node.kind() {
        "none" => Some(LiteralKind::None),
        "true" | "false" => Some(LiteralKind::Boolean),
        "integer" if !is_imaginary(parsed.node_text(node)) => Some(LiteralKind::Integer),
        "float" if !is_imaginary(parsed.node_text(node)) => Some(LiteralKind::Float),
        "string" => Some(string_kind(parsed.node_text(node))),
        "concatenated_string" => named_children(node)
            .into_iter()
            .next()
            .map(|first| string_kind(parsed.node_text(first))),
        "list" => Some(LiteralKind::List),
        "dictionary" => Some(LiteralKind::Dict),
        "set" => Some(LiteralKind::Set),
        "tuple" | "expression_list" => Some(LiteralKind::Tuple),
        "parenthesized_expression" => {
            let inner = named_children(node);
            return match inner.as_slice() {
                [only] => classify_value(parsed, *only),
                _ => ValueKind::Unknown,
            };
        }
        "unary_operator" => {
            let operand = node
                .child_by_field_name("argument")
                .map(|a| classify_value(parsed, a));
            match operand {
                Some(ValueKind::Literal(LiteralKind::Integer)) => Some(LiteralKind::Integer),
                Some(ValueKind::Literal(LiteralKind::Float)) => Some(LiteralKind::Float),
                _ => None,
            }
        }
        _ => None,
    };

    literal.map(ValueKind::Literal).unwrap_or(ValueKind::Unknown)
}

fn is_imaginary(text: &str) -> bool {
    text.ends_with('j') || text.ends_with('J')
}

fn string_kind(text: &str) -> LiteralKind {
    let prefix: String = text.chars().take_while(|c| *c != '\'' && *c != '"').collect();
    if prefix.contains('b') || prefix.contains('B') {
        LiteralKind::Bytes
    } else {
        LiteralKind::String
    }
}
