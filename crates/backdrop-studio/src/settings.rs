//! Studio settings, read from the environment.
//!
//! - `BACKDROP_EFFECT`: `dots`, `distortion` or `both` (default `dots`)
//! - `BACKDROP_IMAGE`: path of the image the distortion effect warps

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Result};
use backdrop_fx::{DistortionConfig, DotGridConfig};

pub const EFFECT_VAR: &str = "BACKDROP_EFFECT";
pub const IMAGE_VAR: &str = "BACKDROP_IMAGE";

/// Which effects are mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Dots,
    Distortion,
    /// Distortion underneath, dots on top.
    Both,
}

impl FromStr for Selection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dots" | "dot-grid" | "grid" => Ok(Self::Dots),
            "distortion" | "grid-distortion" | "image" => Ok(Self::Distortion),
            "both" | "all" => Ok(Self::Both),
            other => bail!("unknown effect '{other}' (expected dots, distortion or both)"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudioSettings {
    pub selection: Selection,
    pub dot_grid: DotGridConfig,
    pub distortion: DistortionConfig,
}

impl StudioSettings {
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(EFFECT_VAR).ok().as_deref(),
            std::env::var_os(IMAGE_VAR).map(PathBuf::from),
        )
    }

    /// Builds settings from raw variable values. Invalid values fall back to
    /// defaults with a warning.
    pub fn from_values(effect: Option<&str>, image: Option<PathBuf>) -> Self {
        let selection = match effect.map(str::parse::<Selection>) {
            Some(Ok(selection)) => selection,
            Some(Err(err)) => {
                log::warn!("{EFFECT_VAR}: {err:#}; using dots");
                Selection::default()
            }
            None => Selection::default(),
        };

        let mut distortion = DistortionConfig::default();
        if let Some(path) = image {
            distortion = distortion.with_image(path);
        } else if selection != Selection::Dots {
            log::warn!("{IMAGE_VAR} is not set; the distortion effect will draw nothing");
        }

        Self {
            selection,
            dot_grid: DotGridConfig::default().with_colors("#271E37", "#5227FF"),
            distortion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_effect_names() {
        assert_eq!("dots".parse::<Selection>().unwrap(), Selection::Dots);
        assert_eq!(" Distortion ".parse::<Selection>().unwrap(), Selection::Distortion);
        assert_eq!("both".parse::<Selection>().unwrap(), Selection::Both);
        assert!("sparkles".parse::<Selection>().is_err());
    }

    #[test]
    fn bad_effect_falls_back_to_dots() {
        let s = StudioSettings::from_values(Some("sparkles"), None);
        assert_eq!(s.selection, Selection::Dots);
    }

    #[test]
    fn image_path_reaches_distortion_config() {
        let s = StudioSettings::from_values(Some("both"), Some(PathBuf::from("/tmp/a.png")));
        assert_eq!(s.selection, Selection::Both);
        assert_eq!(s.distortion.image_source, Some(PathBuf::from("/tmp/a.png")));
    }
}
