use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use pokemon_report::convert::{ConverterConfig, PageFormat, PdfEngine};
use pokemon_report::fetch::{PokemonService, DEFAULT_API_BASE};
use pokemon_report::pipeline::{self, PipelineSettings, DEFAULT_ENTITY_NAME, DEFAULT_OUTPUT_PATH};
use pokemon_report::report::PokemonReport;
use pokemon_report::translate::{
    CloudTranslationClient, NameTranslator, DEFAULT_LOCATION, DEFAULT_TARGET_LANGUAGE,
};
use tracing_subscriber::EnvFilter;

/// Fetches a Pokemon from PokeAPI, translates its name and saves a PDF report.
///
/// Translation needs a Google Cloud project and an OAuth access token, e.g. from
/// `gcloud auth print-access-token`. The native PDF engine needs fonts under
/// `assets/fonts` or in `POKEMON_REPORT_FONTS_DIR`, and falls back to system fonts.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Pokemon to report on.
    #[arg(long, default_value = DEFAULT_ENTITY_NAME)]
    name: String,

    /// Language code the name is translated into.
    #[arg(long, default_value = DEFAULT_TARGET_LANGUAGE)]
    target_language: String,

    /// Where the PDF is written.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Directory for the intermediate `report_template.html`.
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// PokeAPI base URL.
    #[arg(long, env = "POKEAPI_BASE_URL", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Google Cloud project used for translation.
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    project_id: String,

    /// OAuth access token for the Cloud Translation API.
    #[arg(long, env = "GOOGLE_CLOUD_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,

    /// Cloud Translation location.
    #[arg(long, default_value = DEFAULT_LOCATION)]
    location: String,

    /// Convert with this wkhtmltopdf binary instead of the built-in renderer.
    #[arg(long, env = "WKHTMLTOPDF_PATH")]
    wkhtmltopdf: Option<PathBuf>,

    /// Paper size: a4, letter or legal.
    #[arg(long, default_value = "a4")]
    page_format: PageFormat,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let source = PokemonService::new()?.with_base_url(cli.api_base);

    let translator = NameTranslator::new(
        CloudTranslationClient::new(cli.access_token)?,
        cli.project_id,
    )
    .with_location(cli.location);

    let engine = match cli.wkhtmltopdf {
        Some(executable) => PdfEngine::Wkhtmltopdf { executable },
        None => PdfEngine::Native,
    };
    let config = ConverterConfig::new()
        .with_engine(engine)
        .with_page_format(cli.page_format);
    let mut report = PokemonReport::new(config);
    if let Some(work_dir) = cli.work_dir {
        report = report.with_work_dir(work_dir);
    }

    let settings = PipelineSettings {
        entity_name: cli.name,
        target_language: cli.target_language,
        output_path: cli.output,
    };

    pipeline::run(
        &source,
        &translator,
        &report,
        &settings,
        &mut io::stdout().lock(),
    )?;
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
