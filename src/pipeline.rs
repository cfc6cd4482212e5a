//! Fetch → translate → render orchestration.

use std::io::Write;
use std::path::PathBuf;

use log::info;

use crate::error::PipelineError;
use crate::fetch::EntitySource;
use crate::report::ReportGenerator;
use crate::translate::{Translator, DEFAULT_TARGET_LANGUAGE};

/// Pokemon reported on when no name is given.
pub const DEFAULT_ENTITY_NAME: &str = "pikachu";

/// PDF written when no output path is given.
pub const DEFAULT_OUTPUT_PATH: &str = "pokemon_report.pdf";

/// Inputs of a single pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineSettings {
    pub entity_name: String,
    pub target_language: String,
    pub output_path: PathBuf,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            entity_name: DEFAULT_ENTITY_NAME.to_owned(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_owned(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

/// Runs the pipeline once and writes the confirmation line to `out`.
///
/// Stops at the first failure. A Pokemon the API does not return is reported as
/// [`PipelineError::NotFound`] before any translation is attempted.
pub fn run<S, T, R, W>(
    source: &S,
    translator: &T,
    report: &R,
    settings: &PipelineSettings,
    out: &mut W,
) -> Result<(), PipelineError>
where
    S: EntitySource + ?Sized,
    T: Translator + ?Sized,
    R: ReportGenerator + ?Sized,
    W: Write + ?Sized,
{
    let record = source
        .get_info(&settings.entity_name)?
        .ok_or_else(|| PipelineError::NotFound(settings.entity_name.clone()))?;
    info!("Fetched '{}'", record.name);

    let translated_name = translator.translate(&settings.entity_name, &settings.target_language)?;
    info!(
        "Translated '{}' to '{}' ({})",
        settings.entity_name, translated_name, settings.target_language
    );

    report.generate_report(&record, &translated_name, &settings.output_path)?;

    writeln!(out, "PDF report saved as {}", settings.output_path.display())?;
    Ok(())
}
