//! Built-in color presets.
//!
//! Control points are expressed over a normalized `[0, 1]` domain; a
//! transfer function rescales them onto the data range.

use crate::space::{ColorSpace, Rgb};

/// Name of the preset used when none is configured.
pub const DEFAULT_PRESET: &str = "Cool to Warm";

/// A named set of color control points.
#[derive(Debug)]
pub struct Preset {
    pub name: &'static str,
    pub space: ColorSpace,
    pub points: &'static [(f64, Rgb)],
}

static PRESETS: &[Preset] = &[
    Preset {
        name: "Cool to Warm",
        space: ColorSpace::Diverging,
        points: &[
            (0.0, [0.23137254902, 0.298039215686, 0.752941176471]),
            (0.5, [0.865, 0.865, 0.865]),
            (1.0, [0.705882352941, 0.0156862745098, 0.149019607843]),
        ],
    },
    Preset {
        name: "Grayscale",
        space: ColorSpace::Rgb,
        points: &[(0.0, [0.0, 0.0, 0.0]), (1.0, [1.0, 1.0, 1.0])],
    },
    Preset {
        name: "X Ray",
        space: ColorSpace::Rgb,
        points: &[(0.0, [1.0, 1.0, 1.0]), (1.0, [0.0, 0.0, 0.0])],
    },
    Preset {
        name: "Blue to Red Rainbow",
        space: ColorSpace::Hsv,
        points: &[(0.0, [0.0, 0.0, 1.0]), (1.0, [1.0, 0.0, 0.0])],
    },
];

/// Look up a preset by exact name.
pub fn preset_by_name(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}

/// Names of all built-in presets.
pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|p| p.name)
}

/// The default diverging preset.
pub fn default_preset() -> &'static Preset {
    &PRESETS[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_cool_to_warm() {
        assert_eq!(default_preset().name, DEFAULT_PRESET);
        assert!(preset_by_name(DEFAULT_PRESET).is_some());
    }

    #[test]
    fn test_presets_are_sorted() {
        for preset in PRESETS {
            assert!(preset.points.windows(2).all(|w| w[0].0 < w[1].0), "{}", preset.name);
        }
    }

    #[test]
    fn test_unknown_preset() {
        assert!(preset_by_name("Viridis (matplotlib)").is_none());
        assert_eq!(preset_names().count(), 4);
    }
}
