//! Interpolation templates for text content
//!
//! A template splits text into literal runs and interpolation tokens:
//!
//! ```text
//! "{{ first }} - {{ last }}"
//!    → [Expr(first), Literal(" - "), Expr(last)]
//! ```
//!
//! Rendering resolves every token against the store and concatenates the
//! result, so a change to any one token re-renders the whole text.
//!
//! An opening delimiter without a matching close, or with nothing between
//! the delimiters, is kept as literal text.

use std::fmt;

use crate::config::Syntax;
use crate::context::EvalContext;
use crate::error::PathError;
use crate::eval::PropertyPath;
use crate::value::Object;

/// Parsed text with interpolation tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct Template {
    parts: Vec<TemplatePart>,
}

/// A piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Literal text, included as-is
    Literal(String),

    /// Interpolation token, replaced by the path's value
    Expr(PropertyPath),
}

impl Template {
    /// Parse `source` using the interpolation delimiters in `syntax`.
    ///
    /// # Errors
    ///
    /// Returns `PathError` if a token's contents are not a valid path.
    pub fn parse(source: &str, syntax: &Syntax) -> Result<Self, PathError> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some((before, inner, after)) = next_token(rest, syntax) {
            literal.push_str(before);
            if !literal.is_empty() {
                parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
            }
            parts.push(TemplatePart::Expr(PropertyPath::parse(inner)?));
            rest = after;
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }

        Ok(Self { parts })
    }

    /// A template consisting of a single token.
    pub fn expression(path: PropertyPath) -> Self {
        Self {
            parts: vec![TemplatePart::Expr(path)],
        }
    }

    /// Check if `text` contains at least one interpolation token.
    pub fn contains_interpolation(text: &str, syntax: &Syntax) -> bool {
        next_token(text, syntax).is_some()
    }

    /// The template's parts in order
    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// The paths of every token, in order (duplicates included)
    pub fn expressions(&self) -> impl Iterator<Item = &PropertyPath> {
        self.parts.iter().filter_map(|part| match part {
            TemplatePart::Expr(path) => Some(path),
            TemplatePart::Literal(_) => None,
        })
    }

    /// Render against `root`, substituting every token.
    pub fn render(&self, root: &Object, ctx: &EvalContext) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Expr(path) => out.push_str(&path.read(root, ctx).to_string()),
            }
        }
        out
    }
}

/// Find the next token: `(text before, token contents, text after)`.
fn next_token<'a>(text: &'a str, syntax: &Syntax) -> Option<(&'a str, &'a str, &'a str)> {
    let (open, close) = (syntax.open.as_str(), syntax.close.as_str());
    let mut from = 0;
    while let Some(offset) = text[from..].find(open) {
        let start = from + offset;
        let inner_start = start + open.len();
        let inner_end = inner_start + text[inner_start..].find(close)?;
        if inner_end > inner_start {
            return Some((
                &text[..start],
                &text[inner_start..inner_end],
                &text[inner_end + close.len()..],
            ));
        }
        // Empty token: skip past this opening delimiter.
        from = inner_start;
    }
    None
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Template {{ parts: {:?} }}", self.parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Template {
        Template::parse(s, &Syntax::default()).unwrap()
    }

    fn expr(s: &str) -> TemplatePart {
        TemplatePart::Expr(PropertyPath::parse(s).unwrap())
    }

    fn lit(s: &str) -> TemplatePart {
        TemplatePart::Literal(s.to_string())
    }

    #[test]
    fn test_parse_mixed() {
        assert_eq!(
            parse("Hi {{ user.name }}, you are {{age}}!").parts(),
            [lit("Hi "), expr("user.name"), lit(", you are "), expr("age"), lit("!")]
        );
    }

    #[test]
    fn test_parse_adjacent_tokens() {
        assert_eq!(parse("{{a}}{{b}}").parts(), [expr("a"), expr("b")]);
    }

    #[test]
    fn test_plain_text_is_single_literal() {
        assert_eq!(parse("no tokens").parts(), [lit("no tokens")]);
        assert!(parse("").parts().is_empty());
    }

    #[test]
    fn test_unclosed_and_empty_tokens_are_literal() {
        assert_eq!(parse("a {{ b").parts(), [lit("a {{ b")]);
        assert_eq!(parse("{{}}").parts(), [lit("{{}}")]);
        assert_eq!(parse("{{}}{{x}}").parts(), [lit("{{}}"), expr("x")]);
    }

    #[test]
    fn test_invalid_token_is_error() {
        let err = Template::parse("{{ a + b }}", &Syntax::default()).unwrap_err();
        assert!(matches!(err, PathError::InvalidSegment { .. }));
        let err = Template::parse("{{   }}", &Syntax::default()).unwrap_err();
        assert_eq!(err, PathError::Empty);
    }

    #[test]
    fn test_contains_interpolation() {
        let syntax = Syntax::default();
        assert!(Template::contains_interpolation("x {{y}}", &syntax));
        assert!(!Template::contains_interpolation("x {{", &syntax));
        assert!(!Template::contains_interpolation("{{}}", &syntax));
    }

    #[test]
    fn test_custom_delimiters() {
        let syntax = Syntax {
            open: "[[".to_string(),
            close: "]]".to_string(),
            ..Syntax::default()
        };
        let template = Template::parse("{{a}} [[b]]", &syntax).unwrap();
        assert_eq!(template.parts(), [lit("{{a}} "), expr("b")]);
    }

    #[test]
    fn test_render() {
        let root = Object::new().with("a", 1).with("b", 2);
        let template = parse("{{a}}-{{b}}-{{missing}}");
        assert_eq!(template.render(&root, &EvalContext::untracked()), "1-2-");
    }

    #[test]
    fn test_expressions_lists_tokens_in_order() {
        let template = parse("{{a}} {{b}} {{a}}");
        let paths: Vec<&str> = template.expressions().map(|p| p.as_str()).collect();
        assert_eq!(paths, vec!["a", "b", "a"]);
    }
}
