//! The annotation rule set.
//!
//! Each rule is a pure function of one [`FunctionRecord`]. Rules run in the
//! fixed order of [`RULES`], so identical input always yields identical
//! diagnostics in identical order.

use crate::analysis::{FunctionRecord, ParameterInfo};

use super::annotations::{is_optional, raw_generic_suggestion, scalar_type};
use super::{Diagnostic, Rule};

type RuleFn = fn(&FunctionRecord, &mut Vec<Diagnostic>);

/// Rules in evaluation order.
pub const RULES: &[(Rule, RuleFn)] = &[
    (Rule::MissingArgAnnotation, check_missing_arg_annotations),
    (Rule::MissingReturnAnnotation, check_missing_return_annotation),
    (Rule::NoneDefaultNotOptional, check_none_defaults),
    (Rule::RawGeneric, check_raw_generics),
    (Rule::ReturnLiteralMismatch, check_return_literals),
];

/// Evaluate every rule against one function.
pub fn check_function(record: &FunctionRecord) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (_, rule) in RULES {
        rule(record, &mut diagnostics);
    }
    diagnostics
}

fn check_missing_arg_annotations(record: &FunctionRecord, out: &mut Vec<Diagnostic>) {
    for param in record.checked_parameters() {
        if param.is_annotated() {
            continue;
        }
        out.push(Diagnostic::new(
            Rule::MissingArgAnnotation,
            &record.name,
            param.line,
            format!(
                "parameter '{}' of '{}' is missing a type annotation",
                param.display_name(),
                record.name
            ),
        ));
    }
}

fn check_missing_return_annotation(record: &FunctionRecord, out: &mut Vec<Diagnostic>) {
    if record.return_annotation.is_some() || !record.produces_value() {
        return;
    }
    out.push(Diagnostic::new(
        Rule::MissingReturnAnnotation,
        &record.name,
        record.line,
        format!("function '{}' is missing a return type annotation", record.name),
    ));
}

fn check_none_defaults(record: &FunctionRecord, out: &mut Vec<Diagnostic>) {
    for param in record.checked_parameters() {
        let defaults_to_none = param.default.map(|d| d.is_none_literal()).unwrap_or(false);
        let Some(annotation) = param.annotation.as_ref() else {
            continue;
        };
        if !defaults_to_none || is_optional(&annotation.text) {
            continue;
        }
        out.push(Diagnostic::new(
            Rule::NoneDefaultNotOptional,
            &record.name,
            param.line,
            format!(
                "parameter '{}' defaults to None but is annotated as '{}'; use 'Optional[{}]'",
                param.display_name(),
                annotation.text,
                annotation.text
            ),
        ));
    }
}

fn raw_generic_diagnostic(
    record: &FunctionRecord,
    param: Option<&ParameterInfo>,
    text: &str,
    line: usize,
) -> Option<Diagnostic> {
    let suggestion = raw_generic_suggestion(text)?;
    let location = match param {
        Some(p) => format!("parameter '{}'", p.display_name()),
        None => "return annotation".to_string(),
    };
    Some(Diagnostic::new(
        Rule::RawGeneric,
        &record.name,
        line,
        format!(
            "'{}' in {} of '{}' has no type parameters; use '{}'",
            text.trim(),
            location,
            record.name,
            suggestion
        ),
    ))
}

fn check_raw_generics(record: &FunctionRecord, out: &mut Vec<Diagnostic>) {
    for param in record.checked_parameters() {
        if let Some(annotation) = &param.annotation {
            out.extend(raw_generic_diagnostic(
                record,
                Some(param),
                &annotation.text,
                param.line,
            ));
        }
    }
    if let Some(annotation) = &record.return_annotation {
        out.extend(raw_generic_diagnostic(
            record,
            None,
            &annotation.text,
            annotation.line,
        ));
    }
}

/// Flags literal returns that contradict a scalar return annotation.
///
/// Heuristic: only literal displays are compared. A `return` whose value
/// is not a literal is never reported.
fn check_return_literals(record: &FunctionRecord, out: &mut Vec<Diagnostic>) {
    let Some(declared) = record
        .return_annotation
        .as_ref()
        .and_then(|a| scalar_type(&a.text))
    else {
        return;
    };

    for site in &record.returns {
        let Some(literal) = site.value.and_then(|v| v.literal()) else {
            continue;
        };
        if declared.accepts(literal) {
            continue;
        }
        out.push(Diagnostic::new(
            Rule::ReturnLiteralMismatch,
            &record.name,
            site.line,
            format!(
                "'{}' is annotated to return '{}' but returns a {} literal",
                record.name,
                declared.name(),
                literal.python_name()
            ),
        ));
    }
}
