//! RGB <-> HSL conversion. All components are normalized to [0, 1].

/// A color in hue/saturation/lightness space; hue is in turns, not degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }
}

/// Byte channel to [0, 1]
#[inline]
pub fn unit(v: u8) -> f32 {
    f32::from(v) / 255.0
}

/// [0, 1] to byte channel, clamped then truncated
#[inline]
pub fn to_byte(v: f32) -> u8 {
    (v * 255.0).clamp(0.0, 255.0) as u8
}

/// Convert RGB to HSL. Grays (max == min) have hue and saturation 0.
pub fn rgb_to_hsl(r: f32, g: f32, b: f32) -> Hsl {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsl::new(0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl::new(h / 6.0, s, l)
}

/// Convert HSL back to RGB
pub fn hsl_to_rgb(hsl: Hsl) -> (f32, f32, f32) {
    let Hsl { h, s, l } = hsl;
    if s == 0.0 {
        return (l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

/// One channel of the piecewise hue ramp
#[inline]
fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_gray_has_no_hue_or_saturation() {
        let hsl = rgb_to_hsl(0.4, 0.4, 0.4);
        assert_eq!(hsl, Hsl::new(0.0, 0.0, 0.4));
        assert_eq!(hsl_to_rgb(hsl), (0.4, 0.4, 0.4));
    }

    #[test]
    fn test_primaries() {
        let red = rgb_to_hsl(1.0, 0.0, 0.0);
        assert!(close(red.h, 0.0) && close(red.s, 1.0) && close(red.l, 0.5));
        let green = rgb_to_hsl(0.0, 1.0, 0.0);
        assert!(close(green.h, 1.0 / 3.0));
        let blue = rgb_to_hsl(0.0, 0.0, 1.0);
        assert!(close(blue.h, 2.0 / 3.0));
    }

    #[test]
    fn test_conversion_is_reversible() {
        for &(r, g, b) in &[
            (0.9, 0.2, 0.1),
            (0.1, 0.8, 0.6),
            (0.3, 0.3, 0.9),
            (1.0, 1.0, 0.0),
            (0.75, 0.1, 0.75),
        ] {
            let (r2, g2, b2) = hsl_to_rgb(rgb_to_hsl(r, g, b));
            assert!(close(r, r2) && close(g, g2) && close(b, b2), "{r} {g} {b}");
        }
    }

    #[test]
    fn test_byte_helpers_clamp() {
        assert_eq!(to_byte(1.5), 255);
        assert_eq!(to_byte(-0.2), 0);
        assert_eq!(to_byte(unit(255)), 255);
        assert_eq!(to_byte(unit(0)), 0);
    }
}
