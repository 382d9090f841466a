use std::{ops::RangeInclusive, path::PathBuf};

use atlas::AtlasSettings;

/// Printable ASCII
const DEFAULT_RANGE: RangeInclusive<u32> = 0x20..=0x7E;

#[derive(clap::Parser, Debug)]
#[command(name = "sdf-atlas", version, about = "Build a signed distance field glyph atlas", long_about = None)]
pub struct Arguments {
    /// The TrueType font to rasterize
    #[arg(short = 'f', long = "font", value_hint = clap::ValueHint::FilePath)]
    pub font_path: PathBuf,

    /// Where to write the atlas
    #[arg(short = 'o', long = "output", value_hint = clap::ValueHint::FilePath)]
    pub output_path: PathBuf,

    /// Also write the atlas image as a .bmp file, for debugging
    #[arg(long = "image", value_hint = clap::ValueHint::FilePath)]
    pub image_path: Option<PathBuf>,

    /// Pixels per unit of normalized glyph space, about the height of the tallest glyph
    #[arg(long)]
    glyph_size: Option<u32>,

    /// Empty pixels between glyphs
    #[arg(long)]
    padding: Option<u32>,

    /// Range of the distance field, relative to the glyph size
    #[arg(long)]
    clamp: Option<f32>,

    /// Width of the atlas in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Codepoints to include, like "32-126" or "0x400-0x4FF". May be repeated.
    ///
    /// Defaults to printable ASCII.
    #[arg(short = 'r', long = "range", value_parser = parse_range)]
    ranges: Vec<RangeInclusive<u32>>,

    /// Replace existing output files
    #[clap(
        long,
        action = clap::ArgAction::SetTrue,
    )]
    pub overwrite: bool,
}

impl Arguments {
    pub fn update_settings(&self, settings: &mut AtlasSettings) {
        if let Some(glyph_size) = self.glyph_size {
            settings.glyph_size = glyph_size;
        }

        if let Some(padding) = self.padding {
            settings.padding = padding;
        }

        if let Some(clamp) = self.clamp {
            settings.sdf_clamp = clamp;
        }

        if let Some(width) = self.width {
            settings.width = width;
        }
    }

    #[must_use]
    pub fn ranges(&self) -> Vec<RangeInclusive<u32>> {
        if self.ranges.is_empty() {
            vec![DEFAULT_RANGE]
        } else {
            self.ranges.clone()
        }
    }
}

fn parse_codepoint(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let result = if let Some(hex) = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("U+"))
        .or_else(|| s.strip_prefix("u+"))
    {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse()
    };

    result.map_err(|e| format!("invalid codepoint {s:?}: {e}"))
}

fn parse_range(s: &str) -> Result<RangeInclusive<u32>, String> {
    let (start, end) = match s.split_once('-') {
        Some((start, end)) => (parse_codepoint(start)?, parse_codepoint(end)?),
        None => {
            let codepoint = parse_codepoint(s)?;
            (codepoint, codepoint)
        },
    };

    if end < start {
        return Err(format!("range {s:?} ends before it starts"));
    }

    Ok(start..=end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_ranges() {
        assert_eq!(parse_range("32-126"), Ok(32..=126));
        assert_eq!(parse_range("0x400-0x4FF"), Ok(0x400..=0x4FF));
        assert_eq!(parse_range("U+1F600"), Ok(0x1F600..=0x1F600));
        assert_eq!(parse_range(" 65 - 66 "), Ok(65..=66));
        assert!(parse_range("66-65").is_err());
        assert!(parse_range("a-z").is_err());
    }

    #[test]
    fn default_arguments() {
        let arguments = Arguments::try_parse_from(["sdf-atlas", "-f", "font.ttf", "-o", "font.sdfa"]).unwrap();

        let mut settings = AtlasSettings::default();
        arguments.update_settings(&mut settings);
        assert_eq!(settings, AtlasSettings::default());
        assert_eq!(arguments.ranges(), vec![0x20..=0x7E]);
        assert!(!arguments.overwrite);
        assert!(arguments.image_path.is_none());
    }

    #[test]
    fn override_settings() {
        let arguments = Arguments::try_parse_from([
            "sdf-atlas",
            "--font",
            "font.ttf",
            "--output",
            "font.sdfa",
            "--image",
            "font.bmp",
            "--glyph-size",
            "48",
            "--padding",
            "4",
            "--clamp",
            "0.125",
            "--width",
            "2048",
            "--range",
            "65-90",
            "--range",
            "0xC4",
            "--overwrite",
        ])
        .unwrap();

        let mut settings = AtlasSettings::default();
        arguments.update_settings(&mut settings);
        assert_eq!(
            settings,
            AtlasSettings {
                glyph_size: 48,
                padding: 4,
                sdf_clamp: 0.125,
                width: 2048,
            }
        );
        assert_eq!(arguments.ranges(), vec![65..=90, 0xC4..=0xC4]);
        assert!(arguments.overwrite);
        assert_eq!(arguments.image_path, Some(PathBuf::from("font.bmp")));
    }

    #[test]
    fn font_is_required() {
        assert!(Arguments::try_parse_from(["sdf-atlas", "-o", "font.sdfa"]).is_err());
    }
}
