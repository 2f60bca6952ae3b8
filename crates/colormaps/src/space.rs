//! Color space conversions used by transfer function interpolation.
//!
//! Diverging interpolation follows Moreland's "Diverging Color Maps for
//! Scientific Visualization": colors are blended in Msh space (polar Lab)
//! with a white midpoint inserted between saturated endpoints of distant hue.

use std::f64::consts::PI;

/// Linear color triple, components in `[0, 1]`.
pub type Rgb = [f64; 3];

/// Interpolation space of a transfer function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    Rgb,
    Hsv,
    Diverging,
}

// D65 reference white
const REF_X: f64 = 0.9505;
const REF_Y: f64 = 1.0;
const REF_Z: f64 = 1.089;

/// Saturation below which a color counts as unsaturated in Msh space.
const UNSATURATED: f64 = 0.05;

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub(crate) fn lerp_rgb(a: Rgb, b: Rgb, t: f64) -> Rgb {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

/// RGB to HSV, all components in `[0, 1]`.
pub fn rgb_to_hsv(rgb: Rgb) -> [f64; 3] {
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };
    if delta <= 0.0 {
        return [0.0, s, v];
    }

    let mut h = if r == max {
        (g - b) / delta
    } else if g == max {
        2.0 + (b - r) / delta
    } else {
        4.0 + (r - g) / delta
    } / 6.0;
    if h < 0.0 {
        h += 1.0;
    }
    [h, s, v]
}

/// HSV to RGB, all components in `[0, 1]`.
pub fn hsv_to_rgb(hsv: [f64; 3]) -> Rgb {
    let [h, s, v] = hsv;
    if s <= 0.0 {
        return [v, v, v];
    }
    let h6 = (h.rem_euclid(1.0)) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u8 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    if c > 0.0031308 {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    } else {
        12.92 * c
    }
}

fn lab_f(t: f64) -> f64 {
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

fn lab_f_inv(f: f64) -> f64 {
    let cube = f * f * f;
    if cube > 0.008856 {
        cube
    } else {
        (f - 16.0 / 116.0) / 7.787
    }
}

/// RGB to CIE L*a*b*.
pub fn rgb_to_lab(rgb: Rgb) -> [f64; 3] {
    let r = srgb_to_linear(rgb[0]);
    let g = srgb_to_linear(rgb[1]);
    let b = srgb_to_linear(rgb[2]);

    let x = 0.4124 * r + 0.3576 * g + 0.1805 * b;
    let y = 0.2126 * r + 0.7152 * g + 0.0722 * b;
    let z = 0.0193 * r + 0.1192 * g + 0.9505 * b;

    let fx = lab_f(x / REF_X);
    let fy = lab_f(y / REF_Y);
    let fz = lab_f(z / REF_Z);

    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// CIE L*a*b* to RGB, clamped to `[0, 1]`.
pub fn lab_to_rgb(lab: [f64; 3]) -> Rgb {
    let fy = (lab[0] + 16.0) / 116.0;
    let fx = lab[1] / 500.0 + fy;
    let fz = fy - lab[2] / 200.0;

    let x = REF_X * lab_f_inv(fx);
    let y = REF_Y * lab_f_inv(fy);
    let z = REF_Z * lab_f_inv(fz);

    let r = 3.2406 * x - 1.5372 * y - 0.4986 * z;
    let g = -0.9689 * x + 1.8758 * y + 0.0415 * z;
    let b = 0.0557 * x - 0.2040 * y + 1.0570 * z;

    [
        linear_to_srgb(r).clamp(0.0, 1.0),
        linear_to_srgb(g).clamp(0.0, 1.0),
        linear_to_srgb(b).clamp(0.0, 1.0),
    ]
}

fn lab_to_msh(lab: [f64; 3]) -> [f64; 3] {
    let [l, a, b] = lab;
    let m = (l * l + a * a + b * b).sqrt();
    let s = if m > 0.001 { (l / m).clamp(-1.0, 1.0).acos() } else { 0.0 };
    let h = if s > 0.001 { b.atan2(a) } else { 0.0 };
    [m, s, h]
}

fn msh_to_lab(msh: [f64; 3]) -> [f64; 3] {
    let [m, s, h] = msh;
    [m * s.cos(), m * s.sin() * h.cos(), m * s.sin() * h.sin()]
}

fn adjust_hue(msh: [f64; 3], unsat_m: f64) -> f64 {
    let [m, s, h] = msh;
    if m >= unsat_m - 0.1 {
        return h;
    }
    let spin = s * (unsat_m * unsat_m - m * m).sqrt() / (m * s.sin());
    if h > -PI / 3.0 {
        h + spin
    } else {
        h - spin
    }
}

fn angle_diff(a: f64, b: f64) -> f64 {
    let mut d = (a - b).abs();
    if d > PI {
        d = 2.0 * PI - d;
    }
    d
}

/// Interpolate between two colors in Msh space.
pub fn diverging(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let mut msh1 = lab_to_msh(rgb_to_lab(a));
    let mut msh2 = lab_to_msh(rgb_to_lab(b));
    let mut t = t;

    if msh1[1] > UNSATURATED && msh2[1] > UNSATURATED && angle_diff(msh1[2], msh2[2]) > PI / 3.0 {
        let mid = msh1[0].max(msh2[0]).max(88.0);
        if t < 0.5 {
            msh2 = [mid, 0.0, 0.0];
            t *= 2.0;
        } else {
            msh1 = [mid, 0.0, 0.0];
            t = 2.0 * t - 1.0;
        }
    }

    if msh1[1] < UNSATURATED && msh2[1] > UNSATURATED {
        msh1[2] = adjust_hue(msh2, msh1[0]);
    } else if msh2[1] < UNSATURATED && msh1[1] > UNSATURATED {
        msh2[2] = adjust_hue(msh1, msh2[0]);
    }

    let msh = [
        lerp(msh1[0], msh2[0], t),
        lerp(msh1[1], msh2[1], t),
        lerp(msh1[2], msh2[2], t),
    ];
    lab_to_rgb(msh_to_lab(msh))
}
