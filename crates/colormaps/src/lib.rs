//! Color transfer functions for scalar field coloring.
//!
//! A [`ColorTransferFunction`] is built from a named [`Preset`] and mapped
//! onto a numeric range. Values outside the range clamp to the end colors.

mod presets;
mod space;

pub use presets::{default_preset, preset_by_name, preset_names, Preset, DEFAULT_PRESET};
pub use space::{diverging, hsv_to_rgb, lab_to_rgb, rgb_to_hsv, rgb_to_lab, ColorSpace, Rgb};

use space::{lerp, lerp_rgb};

/// One control point of a transfer function.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    pub x: f64,
    pub rgb: Rgb,
}

/// Piecewise color function over a scalar range.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorTransferFunction {
    preset: &'static str,
    space: ColorSpace,
    nodes: Vec<Node>,
}

impl ColorTransferFunction {
    /// Create a function from a preset over its normalized `[0, 1]` domain.
    pub fn from_preset(preset: &'static Preset) -> Self {
        Self {
            preset: preset.name,
            space: preset.space,
            nodes: preset.points.iter().map(|&(x, rgb)| Node { x, rgb }).collect(),
        }
    }

    /// Create a function from a named preset, if it exists.
    pub fn from_preset_name(name: &str) -> Option<Self> {
        preset_by_name(name).map(Self::from_preset)
    }

    /// Rescale the control points so they span `[min, max]`.
    ///
    /// A zero-width range collapses every node onto `min`; the function then
    /// maps every value to a single color.
    pub fn set_mapping_range(&mut self, min: f64, max: f64) {
        let (old_min, old_max) = match (self.nodes.first(), self.nodes.last()) {
            (Some(first), Some(last)) => (first.x, last.x),
            _ => return,
        };
        let old_width = old_max - old_min;
        for node in &mut self.nodes {
            let t = if old_width > 0.0 { (node.x - old_min) / old_width } else { 0.0 };
            node.x = lerp(min, max, t);
        }
    }

    /// Current `[min, max]` covered by the control points.
    pub fn range(&self) -> [f64; 2] {
        match (self.nodes.first(), self.nodes.last()) {
            (Some(first), Some(last)) => [first.x, last.x],
            _ => [0.0, 0.0],
        }
    }

    pub fn preset_name(&self) -> &'static str {
        self.preset
    }

    pub fn space(&self) -> ColorSpace {
        self.space
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Map a scalar value to a color.
    pub fn map_value(&self, value: f64) -> Rgb {
        let (first, last) = match (self.nodes.first(), self.nodes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return [0.0, 0.0, 0.0],
        };
        if value.is_nan() || value <= first.x {
            return first.rgb;
        }
        if value >= last.x {
            return last.rgb;
        }

        // First node strictly past the value; value > first.x so idx >= 1.
        let idx = self.nodes.partition_point(|n| n.x <= value);
        let lo = self.nodes[idx - 1];
        let hi = self.nodes[idx];
        if value == lo.x {
            return lo.rgb;
        }
        let width = hi.x - lo.x;
        if width <= 0.0 {
            return hi.rgb;
        }
        let t = (value - lo.x) / width;

        match self.space {
            ColorSpace::Rgb => lerp_rgb(lo.rgb, hi.rgb, t),
            ColorSpace::Hsv => hsv_to_rgb(lerp_rgb(rgb_to_hsv(lo.rgb), rgb_to_hsv(hi.rgb), t)),
            ColorSpace::Diverging => diverging(lo.rgb, hi.rgb, t),
        }
    }

    /// Sample the function into a table of `size` evenly spaced colors.
    pub fn table(&self, size: usize) -> Vec<Rgb> {
        let [min, max] = self.range();
        match size {
            0 => Vec::new(),
            1 => vec![self.map_value(min)],
            _ => (0..size)
                .map(|i| self.map_value(lerp(min, max, i as f64 / (size - 1) as f64)))
                .collect(),
        }
    }
}

impl Default for ColorTransferFunction {
    fn default() -> Self {
        Self::from_preset(default_preset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_range_rescales_nodes() {
        let mut ctf = ColorTransferFunction::default();
        ctf.set_mapping_range(-10.0, 30.0);
        assert_eq!(ctf.range(), [-10.0, 30.0]);
        assert_eq!(ctf.nodes()[1].x, 10.0);
    }

    #[test]
    fn test_clamps_outside_range() {
        let mut ctf = ColorTransferFunction::from_preset_name("Grayscale").unwrap();
        ctf.set_mapping_range(0.0, 2.0);
        assert_eq!(ctf.map_value(-5.0), [0.0, 0.0, 0.0]);
        assert_eq!(ctf.map_value(5.0), [1.0, 1.0, 1.0]);
        let mid = ctf.map_value(1.0);
        assert!((mid[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_cool_to_warm_hits_control_points() {
        let mut ctf = ColorTransferFunction::default();
        ctf.set_mapping_range(0.0, 100.0);
        assert_eq!(ctf.map_value(50.0), [0.865, 0.865, 0.865]);
        let low = ctf.map_value(0.0);
        assert!((low[2] - 0.752941176471).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_range_maps_flat() {
        let mut ctf = ColorTransferFunction::default();
        ctf.set_mapping_range(4.0, 4.0);
        assert_eq!(ctf.range(), [4.0, 4.0]);
        assert_eq!(ctf.map_value(4.0), ctf.map_value(100.0 * -1.0));
    }

    #[test]
    fn test_rainbow_passes_through_green() {
        let ctf = ColorTransferFunction::from_preset_name("Blue to Red Rainbow").unwrap();
        let mid = ctf.map_value(0.5);
        assert!(mid[1] > 0.9, "expected green-ish midpoint, got {:?}", mid);
    }

    #[test]
    fn test_table_size() {
        let ctf = ColorTransferFunction::default();
        assert_eq!(ctf.table(256).len(), 256);
        assert!(ctf.table(0).is_empty());
    }
}
