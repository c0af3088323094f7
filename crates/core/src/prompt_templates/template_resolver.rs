//! Placeholder substitution for prompt templates.
//!
//! Templates reference context values with `{name}` or `{name:default}`.
//! Resolution is a pure string transformation:
//!
//! - a bound, non-empty value replaces the placeholder
//! - a bound but empty value is replaced by the default, or by nothing when
//!   the placeholder has no default
//! - an unbound name leaves the placeholder text exactly as written
//!
//! Braces that do not enclose a valid identifier are copied through.

use std::collections::HashMap;

/// Resolves an optional template; `None` stays `None`.
pub fn resolve_template(
    template: Option<&str>,
    context: &HashMap<String, String>,
) -> Option<String> {
    template.map(|t| resolve(t, context))
}

/// Resolves every placeholder in `template` against `context`.
pub fn resolve(template: &str, context: &HashMap<String, String>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        match after_open.find(['{', '}']) {
            Some(close) if after_open.as_bytes()[close] == b'}' => {
                let placeholder = &rest[open..open + close + 2];
                match parse_token(&after_open[..close]) {
                    Some((name, default)) => {
                        output.push_str(substitute(name, default, placeholder, context))
                    }
                    None => output.push_str(placeholder),
                }
                rest = &after_open[close + 1..];
            }
            _ => {
                // Unterminated or nested brace: keep it literal and rescan after it.
                output.push('{');
                rest = after_open;
            }
        }
    }

    output.push_str(rest);
    output
}

/// Returns the placeholder names referenced by `template`, in order of first use.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after_open = &rest[open + 1..];
        match after_open.find(['{', '}']) {
            Some(close) if after_open.as_bytes()[close] == b'}' => {
                if let Some((name, _)) = parse_token(&after_open[..close]) {
                    if !names.iter().any(|n| n == name) {
                        names.push(name.to_string());
                    }
                }
                rest = &after_open[close + 1..];
            }
            _ => rest = after_open,
        }
    }
    names
}

fn substitute<'a>(
    name: &str,
    default: Option<&'a str>,
    placeholder: &'a str,
    context: &'a HashMap<String, String>,
) -> &'a str {
    match context.get(name) {
        Some(value) if !value.is_empty() => value.as_str(),
        Some(_) => default.unwrap_or(""),
        None => placeholder,
    }
}

fn parse_token(token: &str) -> Option<(&str, Option<&str>)> {
    let (name, default) = match token.split_once(':') {
        Some((name, default)) => (name, Some(default)),
        None => (token, None),
    };
    is_identifier(name).then_some((name, default))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
