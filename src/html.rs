//! Reader for the small HTML subset the report template is written in.
//!
//! The native PDF engine converts HTML files the same way an external converter
//! would, so it needs to read markup back from disk. Only the constructs the
//! template uses are understood:
//!
//! - `<title>` for the document title
//! - `<h1>` to `<h3>` for headings
//! - `<p>` paragraphs with `<strong>`/`<b>` and `<em>`/`<i>` inline styling
//! - `<br>` which starts a new paragraph
//! - the `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&#39;` entities and numeric references
//!
//! Any other tag is skipped while its text content is kept. Whitespace is collapsed
//! the way a browser would.

use std::fmt;

use crate::richtext::{self, Span};

/// Block-level content extracted from an HTML document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HtmlBlock {
    /// A heading with its level (1 to 3).
    Heading { level: u8, text: String },
    /// A paragraph made of styled spans.
    Paragraph(Vec<Span>),
}

/// The parsed document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HtmlDocument {
    title: Option<String>,
    blocks: Vec<HtmlBlock>,
}

impl HtmlDocument {
    /// Returns the contents of the `<title>` element, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the block-level content in document order.
    pub fn blocks(&self) -> &[HtmlBlock] {
        &self.blocks
    }
}

/// Parse errors produced by [`parse_document`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    index: usize,
    message: String,
}

impl ParseError {
    fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }

    /// Byte index in the original input where the error was detected.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Human-readable description of the parsing error.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.index)
    }
}

impl std::error::Error for ParseError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Capture {
    None,
    Title,
    Heading(u8),
    Paragraph,
}

#[derive(Debug)]
struct Tag<'a> {
    name: String,
    closing: bool,
    raw: &'a str,
}

fn parse_tag(raw: &str) -> Tag<'_> {
    let trimmed = raw.trim();
    let (closing, rest) = match trimmed.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let name = rest
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    Tag { name, closing, raw }
}

struct Reader {
    document: HtmlDocument,
    capture: Capture,
    buffer: String,
    spans: Vec<Span>,
    last_was_space: bool,
    bold: usize,
    italic: usize,
}

impl Reader {
    fn new() -> Self {
        Self {
            document: HtmlDocument::default(),
            capture: Capture::None,
            buffer: String::new(),
            spans: Vec::new(),
            last_was_space: true,
            bold: 0,
            italic: 0,
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.capture == Capture::None {
            return;
        }
        for ch in text.chars() {
            if ch.is_whitespace() {
                if !self.last_was_space {
                    self.buffer.push(' ');
                    self.last_was_space = true;
                }
            } else {
                self.buffer.push(ch);
                self.last_was_space = false;
            }
        }
    }

    fn flush_span(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let span = Span::new(std::mem::take(&mut self.buffer))
            .with_bold(self.bold > 0)
            .with_italic(self.italic > 0);
        richtext::push_merged(&mut self.spans, span);
    }

    fn take_plain_text(&mut self) -> String {
        self.flush_span();
        let spans = std::mem::take(&mut self.spans);
        richtext::plain_text(&spans).trim().to_owned()
    }

    fn begin(&mut self, capture: Capture) {
        self.finish();
        self.capture = capture;
        self.last_was_space = true;
    }

    fn finish(&mut self) {
        match self.capture {
            Capture::None => {}
            Capture::Title => {
                self.document.title = Some(self.take_plain_text());
            }
            Capture::Heading(level) => {
                let text = self.take_plain_text();
                self.document.blocks.push(HtmlBlock::Heading { level, text });
            }
            Capture::Paragraph => {
                self.flush_span();
                let mut spans = std::mem::take(&mut self.spans);
                if let Some(last) = spans.pop() {
                    let trimmed = last.text().trim_end().to_owned();
                    if !trimmed.is_empty() {
                        spans.push(
                            Span::new(trimmed)
                                .with_bold(last.is_bold())
                                .with_italic(last.is_italic()),
                        );
                    }
                }
                if !spans.is_empty() {
                    self.document.blocks.push(HtmlBlock::Paragraph(spans));
                }
            }
        }
        self.capture = Capture::None;
    }

    fn handle_tag(&mut self, tag: Tag<'_>, index: usize) -> Result<(), ParseError> {
        match (tag.name.as_str(), tag.closing) {
            ("title", false) => self.begin(Capture::Title),
            ("h1", false) => self.begin(Capture::Heading(1)),
            ("h2", false) => self.begin(Capture::Heading(2)),
            ("h3", false) => self.begin(Capture::Heading(3)),
            ("p", false) => self.begin(Capture::Paragraph),
            ("title" | "h1" | "h2" | "h3" | "p", true) => self.finish(),
            ("br", _) => {
                if self.capture == Capture::Paragraph {
                    self.begin(Capture::Paragraph);
                }
            }
            ("strong" | "b", closing) => {
                self.flush_span();
                self.bold = adjust_depth(self.bold, closing, &tag, index)?;
            }
            ("em" | "i", closing) => {
                self.flush_span();
                self.italic = adjust_depth(self.italic, closing, &tag, index)?;
            }
            _ => {}
        }
        Ok(())
    }
}

fn adjust_depth(
    depth: usize,
    closing: bool,
    tag: &Tag<'_>,
    index: usize,
) -> Result<usize, ParseError> {
    if !closing {
        return Ok(depth + 1);
    }
    depth.checked_sub(1).ok_or_else(|| {
        ParseError::new(
            index,
            format!("unexpected closing tag `<{}>` without matching opening tag", tag.raw),
        )
    })
}

/// Decodes the named and numeric character references the template can contain.
pub fn decode_entities(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('&') {
        output.push_str(&rest[..start]);
        rest = &rest[start..];

        let decoded = rest.find(';').and_then(|end| {
            let entity = &rest[1..end];
            decode_entity(entity).map(|ch| (ch, end + 1))
        });

        match decoded {
            Some((ch, consumed)) => {
                output.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                output.push('&');
                rest = &rest[1..];
            }
        }
    }

    output.push_str(rest);
    output
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let numeric = entity.strip_prefix('#')?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Parses `input` into an [`HtmlDocument`].
pub fn parse_document(input: &str) -> Result<HtmlDocument, ParseError> {
    let mut reader = Reader::new();
    let mut index = 0;

    while index < input.len() {
        let rest = &input[index..];

        if rest.starts_with("<!--") {
            let end = rest
                .find("-->")
                .ok_or_else(|| ParseError::new(index, "unterminated comment"))?;
            index += end + 3;
            continue;
        }

        if rest.starts_with('<') {
            let end = rest
                .find('>')
                .ok_or_else(|| ParseError::new(index, "unterminated tag"))?;
            let raw = &rest[1..end];
            if !raw.starts_with('!') && !raw.starts_with('?') {
                reader.handle_tag(parse_tag(raw), index)?;
            }
            index += end + 1;
            continue;
        }

        let end = rest.find('<').unwrap_or(rest.len());
        reader.push_text(&decode_entities(&rest[..end]));
        index += end;
    }

    if reader.bold > 0 || reader.italic > 0 {
        return Err(ParseError::new(index, "unclosed inline style element"));
    }

    reader.finish();
    Ok(reader.document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_report_shaped_document() {
        let html = r#"<!DOCTYPE html>
            <html>
            <head>
                <meta charset="utf-8">
                <title>Pokemon Report</title>
            </head>
            <body>
                <h1>Pokemon Report</h1>
                <p><strong>Name:</strong> PikaPika</p>
                <p><strong>Abilities:</strong> static, lightning rod</p>
            </body>
            </html>"#;

        let document = parse_document(html).expect("parse succeeds");

        assert_eq!(document.title(), Some("Pokemon Report"));
        assert_eq!(
            document.blocks(),
            &[
                HtmlBlock::Heading {
                    level: 1,
                    text: "Pokemon Report".to_owned()
                },
                HtmlBlock::Paragraph(vec![Span::new("Name:").bold(), Span::new(" PikaPika")]),
                HtmlBlock::Paragraph(vec![
                    Span::new("Abilities:").bold(),
                    Span::new(" static, lightning rod"),
                ]),
            ]
        );
    }

    #[test]
    fn collapses_whitespace_and_nests_styles() {
        let document = parse_document("<p>  very   <b>bold <i>and\n italic</i></b>  </p>")
            .expect("parse succeeds");

        assert_eq!(
            document.blocks(),
            &[HtmlBlock::Paragraph(vec![
                Span::new("very "),
                Span::new("bold ").bold(),
                Span::new("and italic").bold().italic(),
            ])]
        );
    }

    #[test]
    fn headings_drop_inline_styling() {
        let document = parse_document("<h2>Base <em>stats</em></h2>").expect("parse succeeds");
        assert_eq!(
            document.blocks(),
            &[HtmlBlock::Heading {
                level: 2,
                text: "Base stats".to_owned()
            }]
        );
    }

    #[test]
    fn line_breaks_split_paragraphs() {
        let document = parse_document("<p>one<br>two</p>").expect("parse succeeds");
        assert_eq!(document.blocks().len(), 2);
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(decode_entities("Farfetch&#x27;d &amp; co"), "Farfetch'd & co");
        assert_eq!(decode_entities("&lt;&#60;&gt;"), "<<>");
        assert_eq!(decode_entities("a & b &unknown;"), "a & b &unknown;");
    }

    #[test]
    fn error_on_unterminated_tag() {
        let err = parse_document("<p>text</p").unwrap_err();
        assert!(err.message().contains("unterminated tag"));
        assert_eq!(err.index(), 7);
    }

    #[test]
    fn error_on_unbalanced_closing_tag() {
        let err = parse_document("<p>text</strong></p>").unwrap_err();
        assert!(err.message().contains("unexpected closing tag"));
    }

    #[test]
    fn error_on_unclosed_style() {
        let err = parse_document("<p><em>text</p>").unwrap_err();
        assert!(err.message().contains("unclosed"));
    }
}
