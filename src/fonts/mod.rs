//! Font loading utilities for the native PDF engine.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, FontData, FontFamily};
use log::{debug, warn};

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Environment variable pointing at a directory with the bundled font files.
pub const FONTS_DIR_ENV: &str = "POKEMON_REPORT_FONTS_DIR";

/// Environment variable overriding where system font families are looked up.
pub const SYSTEM_FONTS_DIR_ENV: &str = "POKEMON_REPORT_SYSTEM_FONTS_DIR";

const FONT_FILES: &[&str] = &[
    "Roboto-Regular.ttf",
    "Roboto-Bold.ttf",
    "Roboto-Italic.ttf",
    "Roboto-BoldItalic.ttf",
];

struct SystemFamily {
    name: &'static str,
    directory: &'static str,
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

#[cfg(not(windows))]
const SYSTEM_FAMILIES: &[SystemFamily] = &[
    SystemFamily {
        name: "Liberation Sans",
        directory: "/usr/share/fonts/truetype/liberation",
        regular: "LiberationSans-Regular.ttf",
        bold: "LiberationSans-Bold.ttf",
        italic: "LiberationSans-Italic.ttf",
        bold_italic: "LiberationSans-BoldItalic.ttf",
    },
    SystemFamily {
        name: "DejaVu Sans",
        directory: "/usr/share/fonts/truetype/dejavu",
        regular: "DejaVuSans.ttf",
        bold: "DejaVuSans-Bold.ttf",
        italic: "DejaVuSans-Oblique.ttf",
        bold_italic: "DejaVuSans-BoldOblique.ttf",
    },
];

#[cfg(windows)]
const SYSTEM_FAMILIES: &[SystemFamily] = &[SystemFamily {
    name: "Arial",
    directory: "C:\\Windows\\Fonts",
    regular: "arial.ttf",
    bold: "arialbd.ttf",
    italic: "ariali.ttf",
    bold_italic: "arialbi.ttf",
}];

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        candidates.push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts");
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn missing_font_files(path: &Path) -> Vec<PathBuf> {
    FONT_FILES
        .iter()
        .map(|name| path.join(name))
        .filter(|candidate| !candidate.is_file())
        .collect()
}

fn resolve_font_directory() -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        let exists = candidate.is_dir();
        let missing = missing_font_files(&candidate);

        if exists && missing.is_empty() {
            return Ok(candidate);
        }

        let reason = if !exists {
            format!("directory missing at {}", candidate.display())
        } else {
            let missing_list = missing
                .iter()
                .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
                .collect::<Vec<_>>()
                .join(", ");
            format!("missing files [{}]", missing_list)
        };

        attempts.push(format!("{} ({})", candidate.display(), reason));
    }

    Err(Error::new(
        format!(
            "Unable to locate bundled font directory. Checked: {}. Set {} to a directory with the Roboto family.",
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "bundled fonts directory not found"),
    ))
}

fn load_bundled_font_family() -> Result<FontFamily<FontData>, Error> {
    let directory = resolve_font_directory()?;
    debug!("Loading {} fonts from {}", DEFAULT_FONT_FAMILY_NAME, directory.display());

    fonts::from_files(&directory, DEFAULT_FONT_FAMILY_NAME, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load default font family '{}' from {}: {}",
                DEFAULT_FONT_FAMILY_NAME,
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn load_font(directory: &Path, file: &str, family: &str) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!("Failed to load {} font at {}: {}", family, path.display(), err),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

fn load_system_family(family: &SystemFamily) -> Result<FontFamily<FontData>, Error> {
    let directory =
        env_path(SYSTEM_FONTS_DIR_ENV).unwrap_or_else(|| PathBuf::from(family.directory));

    Ok(FontFamily {
        regular: load_font(&directory, family.regular, family.name)?,
        bold: load_font(&directory, family.bold, family.name)?,
        italic: load_font(&directory, family.italic, family.name)?,
        bold_italic: load_font(&directory, family.bold_italic, family.name)?,
    })
}

fn system_font_family() -> Result<(FontFamily<FontData>, &'static str), Error> {
    let mut failures = Vec::new();
    for family in SYSTEM_FAMILIES {
        match load_system_family(family) {
            Ok(loaded) => return Ok((loaded, family.name)),
            Err(err) => failures.push(err.to_string()),
        }
    }

    Err(Error::new(
        format!("No system font family available: {}", failures.join("; ")),
        io::Error::new(io::ErrorKind::NotFound, "system fonts not found"),
    ))
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Returns the bundled Roboto family, falling back to a system family when the bundled
/// files are missing.
pub fn default_font_family() -> Result<FontFamily<FontData>, Error> {
    match load_bundled_font_family() {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => match system_font_family() {
            Ok((fallback, name)) => {
                warn!(
                    "Bundled fonts unavailable ({}); falling back to system '{}' family.",
                    err, name
                );
                Ok(fallback)
            }
            Err(fallback_err) => Err(Error::new(
                format!(
                    "Bundled fonts unavailable and system fallback failed: {}",
                    fallback_err
                ),
                io::Error::new(io::ErrorKind::NotFound, "default fonts are not available"),
            )),
        },
        Err(err) => Err(err),
    }
}

/// Indicates whether any font family the native engine can use is present on disk.
pub fn default_fonts_available() -> bool {
    resolve_font_directory().is_ok()
        || SYSTEM_FAMILIES.iter().any(|family| {
            let directory =
                env_path(SYSTEM_FONTS_DIR_ENV).unwrap_or_else(|| PathBuf::from(family.directory));
            [family.regular, family.bold, family.italic, family.bold_italic]
                .iter()
                .all(|file| directory.join(file).is_file())
        })
}
