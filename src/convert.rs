//! HTML file to PDF file conversion.
//!
//! Two engines are available. [`PdfEngine::Native`] reads the HTML back through
//! [`crate::html`] and lays it out with `genpdf`, so no external tooling is required.
//! [`PdfEngine::Wkhtmltopdf`] shells out to a wkhtmltopdf binary for full HTML/CSS
//! support.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use genpdf::elements::{Break, Paragraph};
use genpdf::style::Style;
use genpdf::{Alignment, Element, Margins, PaperSize};
use log::{debug, info};

use crate::builder::{mm_from_f64, DocumentBuilder};
use crate::error::ConvertError;
use crate::html::{self, HtmlBlock, HtmlDocument};

const DEFAULT_MARGIN_MM: f64 = 15.0;
const FOOTER_HEIGHT_MM: f64 = 10.0;
const FOOTER_FONT_SIZE: u8 = 9;
const PARAGRAPH_SPACING: f64 = 0.5;
const HEADING_SPACING: f64 = 1.0;

/// Paper sizes supported by both engines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageFormat {
    fn paper_size(self) -> PaperSize {
        match self {
            PageFormat::A4 => PaperSize::A4,
            PageFormat::Letter => PaperSize::Letter,
            PageFormat::Legal => PaperSize::Legal,
        }
    }

    /// Name understood by wkhtmltopdf's `--page-size` flag.
    pub fn as_str(self) -> &'static str {
        match self {
            PageFormat::A4 => "A4",
            PageFormat::Letter => "Letter",
            PageFormat::Legal => "Legal",
        }
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "a4" => Ok(PageFormat::A4),
            "letter" => Ok(PageFormat::Letter),
            "legal" => Ok(PageFormat::Legal),
            other => Err(format!(
                "unknown page format '{}'; expected one of a4, letter, legal",
                other
            )),
        }
    }
}

/// Which converter turns HTML into PDF.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PdfEngine {
    /// In-process rendering through `genpdf`.
    #[default]
    Native,
    /// External wkhtmltopdf binary at the given path.
    Wkhtmltopdf { executable: PathBuf },
}

/// Settings handed to a [`PdfConverter`] on every call.
#[derive(Clone, Debug, PartialEq)]
pub struct ConverterConfig {
    engine: PdfEngine,
    page_format: PageFormat,
    margin_mm: f64,
    footer: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            engine: PdfEngine::default(),
            page_format: PageFormat::default(),
            margin_mm: DEFAULT_MARGIN_MM,
            footer: true,
        }
    }
}

impl ConverterConfig {
    /// Creates a configuration using the native engine on A4 paper.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine(&self) -> &PdfEngine {
        &self.engine
    }

    pub fn page_format(&self) -> PageFormat {
        self.page_format
    }

    pub fn margin_mm(&self) -> f64 {
        self.margin_mm
    }

    /// Whether every page carries a right-aligned `Page N` footer.
    pub fn footer(&self) -> bool {
        self.footer
    }

    /// Sets the engine and returns the updated configuration.
    pub fn with_engine(mut self, engine: PdfEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Sets the paper size and returns the updated configuration.
    pub fn with_page_format(mut self, page_format: PageFormat) -> Self {
        self.page_format = page_format;
        self
    }

    /// Sets the margin applied on every side, in millimetres.
    pub fn with_margin_mm(mut self, margin_mm: f64) -> Self {
        self.margin_mm = margin_mm;
        self
    }

    /// Enables or disables the `Page N` footer.
    pub fn with_footer(mut self, footer: bool) -> Self {
        self.footer = footer;
        self
    }
}

/// Converts an HTML file on disk into a PDF file on disk.
pub trait PdfConverter {
    fn convert_file(
        &self,
        input: &Path,
        output: &Path,
        config: &ConverterConfig,
    ) -> Result<(), ConvertError>;
}

/// Default converter that dispatches on [`ConverterConfig::engine`].
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlToPdf;

impl PdfConverter for HtmlToPdf {
    fn convert_file(
        &self,
        input: &Path,
        output: &Path,
        config: &ConverterConfig,
    ) -> Result<(), ConvertError> {
        match config.engine() {
            PdfEngine::Native => render_native(input, output, config),
            PdfEngine::Wkhtmltopdf { executable } => {
                render_wkhtmltopdf(executable, input, output, config)
            }
        }
    }
}

fn render_native(
    input: &Path,
    output: &Path,
    config: &ConverterConfig,
) -> Result<(), ConvertError> {
    let markup = fs::read_to_string(input).map_err(|source| ConvertError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let document = html::parse_document(&markup)?;
    debug!(
        "Parsed {} into {} block(s)",
        input.display(),
        document.blocks().len()
    );

    build_document(&document, config)?.render_to_file(output)?;
    info!("Rendered {} to {}", input.display(), output.display());
    Ok(())
}

fn heading_font_size(level: u8) -> u8 {
    match level {
        1 => 22,
        2 => 17,
        _ => 14,
    }
}

/// Lays out a parsed HTML document as a `genpdf` document.
pub fn build_document(
    document: &HtmlDocument,
    config: &ConverterConfig,
) -> Result<genpdf::Document, genpdf::error::Error> {
    let mut builder = DocumentBuilder::new()
        .with_paper_size(config.page_format().paper_size())
        .with_margins(Margins::all(mm_from_f64(config.margin_mm())));

    if let Some(title) = document.title() {
        builder = builder.with_title(title);
    }

    if config.footer() {
        builder = builder.with_footer(mm_from_f64(FOOTER_HEIGHT_MM), |page| {
            let mut line = Paragraph::new(format!("Page {}", page));
            line.set_alignment(Alignment::Right);
            line.styled(Style::new().with_font_size(FOOTER_FONT_SIZE))
        });
    }

    let mut pdf = builder.build()?;

    for block in document.blocks() {
        match block {
            HtmlBlock::Heading { level, text } => {
                let style = Style::new().bold().with_font_size(heading_font_size(*level));
                pdf.push(Paragraph::new(text.clone()).styled(style));
                pdf.push(Break::new(HEADING_SPACING));
            }
            HtmlBlock::Paragraph(spans) => {
                let mut paragraph = Paragraph::default();
                for span in spans {
                    paragraph.push(span.to_styled_string());
                }
                pdf.push(paragraph);
                pdf.push(Break::new(PARAGRAPH_SPACING));
            }
        }
    }

    Ok(pdf)
}

/// Command line passed to wkhtmltopdf for the given files.
pub fn wkhtmltopdf_args(input: &Path, output: &Path, config: &ConverterConfig) -> Vec<OsString> {
    let margin = format!("{}mm", config.margin_mm());
    let mut args: Vec<OsString> = vec![
        "--quiet".into(),
        "--encoding".into(),
        "utf-8".into(),
        "--page-size".into(),
        config.page_format().as_str().into(),
    ];

    for side in ["--margin-top", "--margin-right", "--margin-bottom", "--margin-left"] {
        args.push(side.into());
        args.push(margin.clone().into());
    }

    if config.footer() {
        args.push("--footer-right".into());
        args.push("Page [page]".into());
        args.push("--footer-font-size".into());
        args.push(FOOTER_FONT_SIZE.to_string().into());
    }

    args.push(input.as_os_str().to_owned());
    args.push(output.as_os_str().to_owned());
    args
}

fn render_wkhtmltopdf(
    executable: &Path,
    input: &Path,
    output: &Path,
    config: &ConverterConfig,
) -> Result<(), ConvertError> {
    let args = wkhtmltopdf_args(input, output, config);
    debug!("Running {} {:?}", executable.display(), args);

    let result = Command::new(executable)
        .args(&args)
        .output()
        .map_err(|source| ConvertError::Spawn {
            program: executable.to_path_buf(),
            source,
        })?;

    if !result.status.success() {
        return Err(ConvertError::Command {
            program: executable.to_path_buf(),
            status: result.status.to_string(),
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_owned(),
        });
    }

    info!("wkhtmltopdf rendered {} to {}", input.display(), output.display());
    Ok(())
}
