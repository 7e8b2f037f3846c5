//! Placeholder expansion for URL and env-value templates.
//!
//! Templates are plain text with `{{name}}` placeholders. The leading-dot form
//! `{{ .name }}` is accepted too, with optional whitespace inside the braces.
//! Text outside placeholders, including a stray `}}`, is copied verbatim.

use std::collections::BTreeMap;

use crate::platform::Platform;
use crate::{Error, Result};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// What to do with a placeholder that has no binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownVariablePolicy {
    /// Expand to empty text.
    #[default]
    Empty,
    /// Fail with [`Error::TemplateExpansionFailed`].
    Error,
}

/// Variable bindings for one expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings(BTreeMap<String, String>);

impl Bindings {
    /// Empty bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Bindings for a download URL: `version`, `os` and `arch`.
    #[must_use]
    pub fn for_url(version: &str, platform: &Platform) -> Self {
        Self::new()
            .with("version", version)
            .with("os", platform.os.as_str())
            .with("arch", platform.arch.as_str())
    }

    /// Bindings for an env value: `version` only.
    #[must_use]
    pub fn for_env(version: &str) -> Self {
        Self::new().with("version", version)
    }

    /// Look up a binding.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateMalformed`] for an unclosed `{{`, an empty
    /// placeholder, or a placeholder that is not a plain identifier.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }

            let placeholder_offset = offset + start;
            let after_open = &rest[start + OPEN.len()..];
            let Some(end) = after_open.find(CLOSE) else {
                return Err(Error::template_malformed(
                    source,
                    placeholder_offset,
                    "unclosed placeholder",
                ));
            };

            let name = parse_variable(&after_open[..end])
                .map_err(|message| Error::template_malformed(source, placeholder_offset, message))?;
            segments.push(Segment::Variable(name.to_string()));

            let consumed = start + OPEN.len() + end + CLOSE.len();
            rest = &rest[consumed..];
            offset += consumed;
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Template source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names referenced by placeholders, in order of appearance.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Variable(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Expand against `bindings`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateExpansionFailed`] when a placeholder has no
    /// binding and `policy` is [`UnknownVariablePolicy::Error`].
    pub fn render(&self, bindings: &Bindings, policy: UnknownVariablePolicy) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(name) => match (bindings.get(name), policy) {
                    (Some(value), _) => out.push_str(value),
                    (None, UnknownVariablePolicy::Empty) => {}
                    (None, UnknownVariablePolicy::Error) => {
                        return Err(Error::template_expansion(
                            &self.source,
                            format!("unknown variable '{name}'"),
                        ));
                    }
                },
            }
        }

        Ok(out)
    }
}

/// Parse and expand in one step.
///
/// # Errors
///
/// Propagates [`Template::parse`] and [`Template::render`] errors.
pub fn expand(source: &str, bindings: &Bindings, policy: UnknownVariablePolicy) -> Result<String> {
    Template::parse(source)?.render(bindings, policy)
}

fn parse_variable(inner: &str) -> std::result::Result<&str, String> {
    let trimmed = inner.trim();
    let name = trimmed.strip_prefix('.').unwrap_or(trimmed);

    if name.is_empty() {
        return Err("empty placeholder".to_string());
    }

    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("invalid variable name '{trimmed}'"));
    }

    Ok(name)
}
