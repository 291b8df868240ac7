pub use kurbo::{Affine, Point, Rect, Vec2};

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Byte layout as stored in a pixel buffer.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Rgba8Premul {
    fn default() -> Self {
        Self::transparent()
    }
}

/// Convert a logical extent into physical pixels, rounding to the nearest integer.
///
/// Returns `None` when the product is not representable as a positive `u32`.
pub fn physical_extent(logical: u32, device_pixel_ratio: f64) -> Option<u32> {
    let v = (f64::from(logical) * device_pixel_ratio).round();
    if !v.is_finite() || v < 1.0 || v > f64::from(u32::MAX) {
        return None;
    }
    Some(v as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
