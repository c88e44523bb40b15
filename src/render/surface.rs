//! An owned RGBA drawing surface.
//!
//! All operations clip against the surface bounds; callers may pass rects
//! partially or fully outside. Pixels are straight-alpha RGBA and the
//! surface itself is treated as opaque for blending.

use image::RgbaImage;

use crate::color::Rgba;
use crate::error::Result;
use crate::geom::Rect;

pub struct Surface {
    pixels: RgbaImage,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Surface {
    /// A surface filled with the given color.
    pub fn new(width: u32, height: u32, fill: Rgba) -> Self {
        let pixels =
            RgbaImage::from_pixel(width.max(1), height.max(1), image::Rgba([fill.r, fill.g, fill.b, 255]));
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    /// Raw pixel bytes, row-major RGBA.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Alpha-blend a solid color over a rectangle.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let clipped = rect.intersect(&self.bounds());
        if clipped.is_empty() || color.a == 0 {
            return;
        }
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
                dst.0 = color.over(dst.0);
            }
        }
    }

    /// Stroke a 1px rectangle outline. Used as the visible fallback for
    /// emotes whose image failed to decode.
    pub fn draw_rect_outline(&mut self, rect: Rect, color: Rgba) {
        if rect.is_empty() {
            return;
        }
        self.fill_rect(Rect::new(rect.x, rect.y, rect.width, 1), color);
        self.fill_rect(Rect::new(rect.x, rect.bottom() - 1, rect.width, 1), color);
        self.fill_rect(Rect::new(rect.x, rect.y, 1, rect.height), color);
        self.fill_rect(Rect::new(rect.right() - 1, rect.y, 1, rect.height), color);
    }

    /// Alpha-blend a bitmap into `dest`, scaling with nearest-neighbor when
    /// the sizes differ.
    pub fn draw_bitmap(&mut self, dest: Rect, bitmap: &RgbaImage) {
        let clipped = dest.intersect(&self.bounds());
        if clipped.is_empty() || bitmap.width() == 0 || bitmap.height() == 0 {
            return;
        }
        for y in clipped.y..clipped.bottom() {
            // Map back into source space relative to the unclipped dest rect.
            let v = (y - dest.y) as u32 * bitmap.height() / dest.height;
            for x in clipped.x..clipped.right() {
                let u = (x - dest.x) as u32 * bitmap.width() / dest.width;
                let src = bitmap.get_pixel(u.min(bitmap.width() - 1), v.min(bitmap.height() - 1)).0;
                let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
                dst.0 = Rgba::rgba(src[0], src[1], src[2], src[3]).over(dst.0);
            }
        }
    }

    /// Copy another surface's pixels at `(x, y)` without blending. Used to
    /// blit a message's off-screen buffer onto the visible surface.
    pub fn blit(&mut self, x: i32, y: i32, src: &Surface) {
        let dest = Rect::new(x, y, src.width(), src.height());
        let clipped = dest.intersect(&self.bounds());
        for py in clipped.y..clipped.bottom() {
            for px in clipped.x..clipped.right() {
                let s = src.get_pixel((px - x) as u32, (py - y) as u32);
                self.pixels.put_pixel(px as u32, py as u32, image::Rgba(s));
            }
        }
    }

    /// Blend a single pixel; no-op outside the bounds.
    pub(crate) fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return;
        }
        let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
        dst.0 = color.over(dst.0);
    }

    /// Write the surface to a PNG file.
    pub fn save_png(&self, path: &std::path::Path) -> Result<()> {
        self.pixels.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_clips_to_bounds() {
        let mut s = Surface::new(4, 4, Rgba::rgb(0, 0, 0));
        s.fill_rect(Rect::new(-2, -2, 4, 4), Rgba::rgb(255, 0, 0));
        assert_eq!(s.get_pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(s.get_pixel(2, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn bitmap_scales_nearest() {
        let mut s = Surface::new(4, 4, Rgba::rgb(0, 0, 0));
        let bitmap = RgbaImage::from_pixel(2, 2, image::Rgba([0, 255, 0, 255]));
        s.draw_bitmap(Rect::new(0, 0, 4, 4), &bitmap);
        assert_eq!(s.get_pixel(3, 3), [0, 255, 0, 255]);
    }

    #[test]
    fn blit_copies_without_blending() {
        let mut dst = Surface::new(4, 4, Rgba::rgb(9, 9, 9));
        let src = Surface::new(2, 2, Rgba::rgb(1, 2, 3));
        dst.blit(1, 1, &src);
        assert_eq!(dst.get_pixel(1, 1), [1, 2, 3, 255]);
        assert_eq!(dst.get_pixel(0, 0), [9, 9, 9, 255]);
        assert_eq!(dst.get_pixel(3, 3), [9, 9, 9, 255]);
    }

    #[test]
    fn outline_touches_only_the_border() {
        let mut s = Surface::new(5, 5, Rgba::rgb(0, 0, 0));
        s.draw_rect_outline(Rect::new(0, 0, 5, 5), Rgba::rgb(255, 0, 0));
        assert_eq!(s.get_pixel(0, 2), [255, 0, 0, 255]);
        assert_eq!(s.get_pixel(4, 4), [255, 0, 0, 255]);
        assert_eq!(s.get_pixel(2, 2), [0, 0, 0, 255]);
    }
}
