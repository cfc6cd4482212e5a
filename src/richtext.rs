//! Inline text fragments produced by the HTML reader.
//!
//! A [`Span`] carries the subset of inline styling the report template uses (bold and
//! italic) and converts into [`genpdf`][genpdf] styled strings at render time.
//!
//! [genpdf]: https://docs.rs/genpdf/

use genpdf::style::{Style, StyledString};

/// A slice of text together with inline style attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
}

impl Span {
    /// Creates a new span with the provided text and no styles applied.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Returns the raw text contained in this span.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether the span should be rendered in bold.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Returns whether the span should be rendered in italic.
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Sets the bold flag and returns the updated span.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Sets the italic flag and returns the updated span.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Convenience shorthand that marks the span as bold.
    pub fn bold(self) -> Self {
        self.with_bold(true)
    }

    /// Convenience shorthand that marks the span as italic.
    pub fn italic(self) -> Self {
        self.with_italic(true)
    }

    fn to_style(&self) -> Style {
        let mut style = Style::new();
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        style
    }

    /// Converts the span to a [`StyledString`].
    pub fn to_styled_string(&self) -> StyledString {
        StyledString::new(self.text.clone(), self.to_style())
    }

    fn same_style(&self, other: &Span) -> bool {
        self.bold == other.bold && self.italic == other.italic
    }
}

impl From<&Span> for StyledString {
    fn from(span: &Span) -> Self {
        span.to_styled_string()
    }
}

impl From<Span> for StyledString {
    fn from(span: Span) -> Self {
        span.to_styled_string()
    }
}

/// Concatenates the text of all spans, dropping styling.
pub fn plain_text<'a, I>(spans: I) -> String
where
    I: IntoIterator<Item = &'a Span>,
{
    spans.into_iter().map(Span::text).collect()
}

/// Appends `span` to `spans`, merging it into the last span when both share a style.
pub fn push_merged(spans: &mut Vec<Span>, span: Span) {
    if span.text.is_empty() {
        return;
    }
    match spans.last_mut() {
        Some(last) if last.same_style(&span) => last.text.push_str(&span.text),
        _ => spans.push(span),
    }
}
