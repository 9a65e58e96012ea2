//! `{variable}` substitution for prompt and command templates.
//!
//! - `{name}` is replaced by the value of `name` (surrounding spaces inside
//!   the braces are ignored)
//! - `{{` and `}}` render literal braces; a lone `}` is kept as-is
//! - an unknown name, an empty `{}` or an unterminated `{` is an error, so a
//!   typo never silently renders as an empty string

use std::collections::HashMap;
use thiserror::Error;

/// Template rendering failure. Positions are byte offsets into the template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("undefined variable '{name}' at position {position} in template")]
    UndefinedVariable { name: String, position: usize },

    #[error("unmatched '{{' at position {position} in template")]
    UnmatchedBrace { position: usize },

    #[error("empty variable name '{{}}' at position {position} in template")]
    EmptyVariableName { position: usize },
}

/// Render `template` against `variables`.
pub fn render_template(
    template: &str,
    variables: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(idx) = rest.find(['{', '}']) {
        out.push_str(&rest[..idx]);
        let position = offset + idx;
        let tail = &rest[idx..];

        let consumed = if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            tail.len() - after.len()
        } else if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            tail.len() - after.len()
        } else if tail.starts_with('}') {
            out.push('}');
            1
        } else {
            let Some(close) = tail.find('}') else {
                return Err(TemplateError::UnmatchedBrace { position });
            };
            let raw_name = &tail[1..close];
            if raw_name.is_empty() {
                return Err(TemplateError::EmptyVariableName { position });
            }
            let name = raw_name.trim();
            let value = variables
                .get(name)
                .ok_or_else(|| TemplateError::UndefinedVariable {
                    name: name.to_string(),
                    position,
                })?;
            out.push_str(value);
            close + 1
        };

        rest = &tail[consumed..];
        offset = position + consumed;
    }
    out.push_str(rest);

    Ok(out)
}

/// Build a variables map from key-value pairs.
pub fn vars<I, K, V>(pairs: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
