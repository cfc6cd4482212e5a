//! Core entry point for the pokemon_report crate.
//!
//! The crate runs a three step pipeline: [`fetch`] pulls a Pokemon from PokeAPI,
//! [`translate`] runs its name through Cloud Translation and [`report`] renders the
//! combined result to HTML before [`convert`] turns it into a PDF.

pub mod builder;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod fonts;
pub mod html;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod richtext;
pub mod translate;

#[cfg(test)]
mod test_support;
