//! HTML report generation.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use tera::{Context, Tera};

use crate::convert::{ConverterConfig, HtmlToPdf, PdfConverter};
use crate::error::ReportError;
use crate::model::EntityRecord;

/// File name of the intermediate HTML document.
pub const TEMPLATE_FILE_NAME: &str = "report_template.html";

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Pokemon Report</title>
</head>
<body>
    <h1>Pokemon Report</h1>
    <p><strong>Name:</strong> {{ name }}</p>
    <p><strong>Height:</strong> {{ height }} decimetres</p>
    <p><strong>Weight:</strong> {{ weight }} hectograms</p>
    <p><strong>Abilities:</strong> {{ abilities }}</p>
</body>
</html>
"#;

/// Capability to turn a record and its translated name into a report file.
pub trait ReportGenerator {
    fn generate_report(
        &self,
        record: &EntityRecord,
        translated_name: &str,
        output_path: &Path,
    ) -> Result<(), ReportError>;
}

/// Renders Pokemon reports to HTML and converts them to PDF.
pub struct PokemonReport<C = HtmlToPdf> {
    config: ConverterConfig,
    converter: C,
    work_dir: Option<PathBuf>,
}

impl PokemonReport<HtmlToPdf> {
    /// Creates a report generator using the built-in converter.
    pub fn new(config: ConverterConfig) -> Self {
        Self::with_converter(HtmlToPdf, config)
    }
}

impl<C: PdfConverter> PokemonReport<C> {
    /// Creates a report generator using a custom converter.
    pub fn with_converter(converter: C, config: ConverterConfig) -> Self {
        Self {
            config,
            converter,
            work_dir: None,
        }
    }

    /// Writes the intermediate HTML into `work_dir` instead of the current directory.
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }

    /// Returns the converter configuration passed on every conversion.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Returns the converter that turns the HTML report into a PDF.
    #[cfg(test)]
    pub(crate) fn converter(&self) -> &C {
        &self.converter
    }

    /// Location of the intermediate HTML document.
    pub fn template_path(&self) -> PathBuf {
        match &self.work_dir {
            Some(dir) => dir.join(TEMPLATE_FILE_NAME),
            None => PathBuf::from(TEMPLATE_FILE_NAME),
        }
    }

    /// Renders the report markup. Text values are HTML-escaped.
    pub fn render_html(
        &self,
        record: &EntityRecord,
        translated_name: &str,
    ) -> Result<String, ReportError> {
        let abilities = record.ability_names().collect::<Vec<_>>().join(", ");

        let mut context = Context::new();
        context.insert("name", translated_name);
        context.insert("height", &record.height);
        context.insert("weight", &record.weight);
        context.insert("abilities", &abilities);

        Ok(Tera::one_off(REPORT_TEMPLATE, &context, true)?)
    }

    /// Writes the report markup to [`TEMPLATE_FILE_NAME`] and returns its path.
    pub fn create_html_report(
        &self,
        record: &EntityRecord,
        translated_name: &str,
    ) -> Result<PathBuf, ReportError> {
        let markup = self.render_html(record, translated_name)?;
        let path = self.template_path();
        let write_error = |source| ReportError::Write {
            path: path.clone(),
            source,
        };

        {
            let file = File::create(&path).map_err(write_error)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(markup.as_bytes()).map_err(write_error)?;
            writer.flush().map_err(write_error)?;
        }

        info!("Wrote report template to {}", path.display());
        Ok(path)
    }
}

impl<C: PdfConverter> ReportGenerator for PokemonReport<C> {
    fn generate_report(
        &self,
        record: &EntityRecord,
        translated_name: &str,
        output_path: &Path,
    ) -> Result<(), ReportError> {
        let template = self.create_html_report(record, translated_name)?;
        self.converter
            .convert_file(&template, output_path, &self.config)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;

    use super::*;
    use crate::convert::PageFormat;
    use crate::error::ConvertError;
    use crate::model::AbilitySlot;

    #[derive(Default)]
    struct RecordingConverter {
        calls: RefCell<Vec<(PathBuf, PathBuf, ConverterConfig)>>,
    }

    impl PdfConverter for RecordingConverter {
        fn convert_file(
            &self,
            input: &Path,
            output: &Path,
            config: &ConverterConfig,
        ) -> Result<(), ConvertError> {
            self.calls.borrow_mut().push((
                input.to_path_buf(),
                output.to_path_buf(),
                config.clone(),
            ));
            Ok(())
        }
    }

    fn pikachu() -> EntityRecord {
        EntityRecord {
            name: "pikachu".to_owned(),
            height: 4,
            weight: 60,
            abilities: vec![AbilitySlot::new("static"), AbilitySlot::new("lightning rod")],
        }
    }

    #[test]
    fn create_html_report_writes_template_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let report = PokemonReport::with_converter(RecordingConverter::default(), ConverterConfig::new())
            .with_work_dir(dir.path());

        let path = report
            .create_html_report(&pikachu(), "PikaPika")
            .expect("template written");

        assert_eq!(path.file_name().and_then(|name| name.to_str()), Some(TEMPLATE_FILE_NAME));
        let html = fs::read_to_string(&path).expect("template readable");
        assert!(html.contains("<title>Pokemon Report</title>"));
        assert!(html.contains("Name:</strong> PikaPika"));
        assert!(html.contains("Height:</strong> 4 decimetres"));
        assert!(html.contains("Weight:</strong> 60 hectograms"));
        assert!(html.contains("Abilities:</strong> static, lightning rod"));
    }

    #[test]
    fn template_path_defaults_to_bare_file_name() {
        let report = PokemonReport::new(ConverterConfig::new());
        assert_eq!(report.template_path(), PathBuf::from("report_template.html"));
    }

    #[test]
    fn names_are_html_escaped() {
        let report = PokemonReport::new(ConverterConfig::new());
        let html = report
            .render_html(&pikachu(), "<Pika & Chu>")
            .expect("render succeeds");
        assert!(html.contains("Name:</strong> &lt;Pika &amp; Chu&gt;"));
    }

    #[test]
    fn record_without_abilities_renders_empty_list() {
        let mut record = pikachu();
        record.abilities.clear();
        let report = PokemonReport::new(ConverterConfig::new());

        let html = report.render_html(&record, "PikaPika").expect("render succeeds");
        assert!(html.contains("<p><strong>Abilities:</strong> </p>"));
    }

    #[test]
    fn generate_report_converts_exactly_once() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = ConverterConfig::new().with_page_format(PageFormat::Letter);
        let report = PokemonReport::with_converter(RecordingConverter::default(), config.clone())
            .with_work_dir(dir.path());
        let output = dir.path().join("test_report.pdf");

        report
            .generate_report(&pikachu(), "PikaPika", &output)
            .expect("report generated");

        let calls = report.converter().calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, dir.path().join(TEMPLATE_FILE_NAME));
        assert_eq!(calls[0].1, output);
        assert_eq!(&calls[0].2, report.config());
        assert_eq!(calls[0].2, config);
    }

    #[test]
    fn unwritable_template_location_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let report = PokemonReport::new(ConverterConfig::new())
            .with_work_dir(dir.path().join("does-not-exist"));

        let err = report
            .create_html_report(&pikachu(), "PikaPika")
            .unwrap_err();

        assert!(matches!(err, ReportError::Write { .. }));
    }
}
