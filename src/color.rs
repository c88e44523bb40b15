//! Colors and the chat color scheme.
//!
//! Brightness and lightening follow HSL lightness: user-name colors darker
//! than 0.5 are blended halfway toward white before drawing so they stay
//! legible on dark backgrounds.

/// An 8-bit RGBA color. Straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// HSL lightness in `0.0..=1.0`: (max + min) / 2 over the RGB channels.
    pub fn brightness(&self) -> f32 {
        let max = self.r.max(self.g).max(self.b) as f32;
        let min = self.r.min(self.g).min(self.b) as f32;
        (max + min) / 2.0 / 255.0
    }

    /// Blend halfway toward white, preserving alpha.
    pub fn lighten(&self) -> Rgba {
        Rgba {
            r: (self.r as u16 + 255).div_ceil(2) as u8,
            g: (self.g as u16 + 255).div_ceil(2) as u8,
            b: (self.b as u16 + 255).div_ceil(2) as u8,
            a: self.a,
        }
    }

    /// Source-over blend of `self` onto an opaque destination pixel.
    pub fn over(&self, dst: [u8; 4]) -> [u8; 4] {
        let a = self.a as u32;
        if a == 255 {
            return [self.r, self.g, self.b, 255];
        }
        if a == 0 {
            return dst;
        }
        let inv = 255 - a;
        [
            ((self.r as u32 * a + dst[0] as u32 * inv) / 255) as u8,
            ((self.g as u32 * a + dst[1] as u32 * inv) / 255) as u8,
            ((self.b as u32 * a + dst[2] as u32 * inv) / 255) as u8,
            dst[3],
        ]
    }
}

/// Alpha of the overlay drawn over disabled (timed-out/deleted) messages.
pub const DISABLED_OVERLAY_ALPHA: u8 = 172;

/// Alpha of the selection fill.
pub const SELECTION_ALPHA: u8 = 127;

/// Colors the compositor draws with. Provided by the host theme layer.
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub background: Rgba,
    pub background_highlighted: Rgba,
    pub text: Rgba,
    pub selection: Rgba,
    /// True for light themes; dark custom text colors are only lightened on
    /// dark themes.
    pub light: bool,
}

impl ColorScheme {
    pub fn dark() -> Self {
        Self {
            background: Rgba::rgb(25, 25, 28),
            background_highlighted: Rgba::rgb(68, 44, 44),
            text: Rgba::rgb(235, 235, 235),
            selection: Rgba::rgba(255, 165, 0, SELECTION_ALPHA),
            light: false,
        }
    }

    pub fn light() -> Self {
        Self {
            background: Rgba::rgb(252, 252, 252),
            background_highlighted: Rgba::rgb(255, 227, 227),
            text: Rgba::rgb(20, 20, 20),
            selection: Rgba::rgba(255, 165, 0, SELECTION_ALPHA),
            light: true,
        }
    }

    /// Overlay drawn over disabled messages: the chat background at
    /// [`DISABLED_OVERLAY_ALPHA`].
    pub fn disabled_overlay(&self) -> Rgba {
        self.background.with_alpha(DISABLED_OVERLAY_ALPHA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_of_extremes() {
        assert_eq!(Rgba::rgb(0, 0, 0).brightness(), 0.0);
        assert_eq!(Rgba::rgb(255, 255, 255).brightness(), 1.0);
        let mid = Rgba::rgb(255, 0, 0).brightness();
        assert!((mid - 0.5).abs() < 0.01, "red lightness ~0.5, got {mid}");
    }

    #[test]
    fn lighten_moves_toward_white() {
        let c = Rgba::rgb(40, 80, 120).lighten();
        assert!(c.r > 40 && c.g > 80 && c.b > 120);
        assert!(c.brightness() > Rgba::rgb(40, 80, 120).brightness());
        assert_eq!(Rgba::rgb(255, 255, 255).lighten(), Rgba::rgb(255, 255, 255));
    }

    #[test]
    fn over_opaque_replaces() {
        let px = Rgba::rgb(10, 20, 30).over([1, 2, 3, 255]);
        assert_eq!(px, [10, 20, 30, 255]);
    }

    #[test]
    fn over_half_blends() {
        let px = Rgba::rgba(255, 255, 255, 128).over([0, 0, 0, 255]);
        assert!(px[0] > 120 && px[0] < 135);
    }
}
