//! Build a signed distance field glyph atlas from a TrueType font.
//!
//! ```text
//! sdf-atlas --font DejaVuSans.ttf --output dejavu.sdfa --range 32-126 --range 0xC0-0xFF
//! ```

mod cli;

use std::process::ExitCode;

use atlas::{AtlasBuildError, AtlasIoError, AtlasSettings, GlyphAtlas};
use clap::Parser;
use font::{Font, FontOpenError};
use thiserror::Error;

#[derive(Debug, Error)]
enum Error {
    #[error("cannot open font: {0}")]
    Font(#[from] FontOpenError),

    #[error("cannot build atlas: {0}")]
    Build(#[from] AtlasBuildError),

    #[error("cannot save atlas: {0}")]
    Save(#[from] AtlasIoError),

    #[error("cannot save atlas image: {0}")]
    Image(#[from] image::bmp::Error),
}

fn run(arguments: cli::Arguments) -> Result<(), Error> {
    let mut settings = AtlasSettings::default();
    arguments.update_settings(&mut settings);

    let font = Font::open(&arguments.font_path)?;
    let atlas = GlyphAtlas::from_settings(&font, &settings, &arguments.ranges())?;
    atlas.save(&arguments.output_path, arguments.overwrite)?;

    if let Some(image_path) = &arguments.image_path {
        atlas.save_as_image(image_path, arguments.overwrite)?;
        log::info!("Wrote atlas image to {}", image_path.display());
    }

    Ok(())
}

pub fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let arguments = cli::Arguments::parse();
    match run(arguments) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{error}");
            ExitCode::FAILURE
        },
    }
}
