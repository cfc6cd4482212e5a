//! Error types shared across the pipeline stages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::html::ParseError;

/// Failures raised while fetching an entity from the data API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("response body is not a valid Pokemon record")]
    Decode(#[from] serde_json::Error),
}

/// Failures raised by the translation service.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation request failed")]
    Transport(#[from] reqwest::Error),

    #[error("translation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("translation service returned no translations")]
    EmptyResponse,
}

/// Failures raised while turning an HTML file into a PDF.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to read HTML input {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("HTML input could not be parsed")]
    Markup(#[from] ParseError),

    #[error("PDF rendering failed")]
    Render(#[from] genpdf::error::Error),

    #[error("failed to launch {program}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Command {
        program: PathBuf,
        status: String,
        stderr: String,
    },
}

/// Failures raised while producing the report artifact.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("template rendering failed")]
    Template(#[from] tera::Error),

    #[error("failed to write report template {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("PDF conversion failed")]
    Convert(#[from] ConvertError),
}

/// Failures that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to fetch Pokemon data")]
    Fetch(#[from] FetchError),

    #[error("Pokemon '{0}' was not found")]
    NotFound(String),

    #[error("failed to translate name")]
    Translate(#[from] TranslateError),

    #[error("failed to generate report")]
    Report(#[from] ReportError),

    #[error("failed to write confirmation")]
    Output(#[from] io::Error),
}
