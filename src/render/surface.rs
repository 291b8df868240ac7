use crate::foundation::core::physical_extent;
use crate::foundation::error::{SkyframeError, SkyframeResult};
use vello_cpu::peniko::color::PremulRgba8;

/// Surface size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct PhysicalSize {
    /// Width in physical pixels.
    pub width: u32,
    /// Height in physical pixels.
    pub height: u32,
}

impl PhysicalSize {
    /// `round(width * dpr) x round(height * dpr)`.
    pub fn from_logical(width: u32, height: u32, device_pixel_ratio: f64) -> SkyframeResult<Self> {
        let w = physical_extent(width, device_pixel_ratio);
        let h = physical_extent(height, device_pixel_ratio);
        match (w, h) {
            (Some(width), Some(height)) => Ok(Self { width, height }),
            _ => Err(SkyframeError::surface(format!(
                "cannot size a surface for {width}x{height} at dpr {device_pixel_ratio}"
            ))),
        }
    }

    /// Bytes of RGBA8 storage.
    pub fn byte_len(self) -> usize {
        let px = (self.width as usize).saturating_mul(self.height as usize);
        px.saturating_mul(4)
    }
}

/// The single off-screen drawing target: a pixmap plus a rasterizer context of the same size.
pub struct Surface {
    size: PhysicalSize,
    pixmap: vello_cpu::Pixmap,
    ctx: vello_cpu::RenderContext,
}

impl Surface {
    fn allocate(size: PhysicalSize) -> SkyframeResult<Self> {
        let w: u16 = size
            .width
            .try_into()
            .map_err(|_| SkyframeError::surface(format!("width exceeds u16: {}", size.width)))?;
        let h: u16 = size
            .height
            .try_into()
            .map_err(|_| SkyframeError::surface(format!("height exceeds u16: {}", size.height)))?;

        let n = (size.width as usize).saturating_mul(size.height as usize);
        let mut pixels = Vec::<PremulRgba8>::new();
        pixels.try_reserve_exact(n).map_err(|e| {
            SkyframeError::surface(format!(
                "{}x{} ({} bytes): {e}",
                size.width,
                size.height,
                size.byte_len()
            ))
        })?;
        pixels.resize(n, PremulRgba8::from_u8_array([0, 0, 0, 0]));

        Ok(Self {
            size,
            pixmap: vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true),
            ctx: vello_cpu::RenderContext::new(w, h),
        })
    }

    /// Physical size.
    pub fn size(&self) -> PhysicalSize {
        self.size
    }

    /// Current pixel contents, premultiplied RGBA8, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Overwrite every pixel with `rgba` (premultiplied).
    pub fn clear(&mut self, rgba: [u8; 4]) {
        if rgba == [0, 0, 0, 0] {
            self.pixmap.data_as_u8_slice_mut().fill(0);
            return;
        }
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Copy the current pixels into a new buffer.
    ///
    /// The copy is as large as the surface itself, so allocation failure is reported instead of
    /// aborting.
    pub fn read_back(&self) -> SkyframeResult<Vec<u8>> {
        let src = self.data();
        let mut out = reserve_bytes(src.len())?;
        out.extend_from_slice(src);
        Ok(out)
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut vello_cpu::RenderContext, &mut vello_cpu::Pixmap) {
        (&mut self.ctx, &mut self.pixmap)
    }
}

fn reserve_bytes(len: usize) -> SkyframeResult<Vec<u8>> {
    let mut out = Vec::<u8>::new();
    out.try_reserve_exact(len)
        .map_err(|e| SkyframeError::draw(format!("readback of {len} bytes: {e}")))?;
    Ok(out)
}

/// Allocation counters for the surface manager.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceStats {
    /// Surfaces created (first allocation plus every resize).
    pub allocations: u64,
    /// Requests served by the existing surface.
    pub reuses: u64,
    /// Allocation attempts that failed; the previous surface stayed live.
    pub failures: u64,
    /// Total bytes allocated over the manager's lifetime.
    pub allocated_bytes: u64,
}

/// Owns the one live [`Surface`] and recreates it only when its physical size must change.
pub struct SurfaceManager {
    max_surface_bytes: usize,
    current: Option<Surface>,
    stats: SurfaceStats,
}

impl SurfaceManager {
    /// Create a manager that refuses surfaces larger than `max_surface_bytes`.
    pub fn new(max_surface_bytes: usize) -> Self {
        Self {
            max_surface_bytes,
            current: None,
            stats: SurfaceStats::default(),
        }
    }

    /// Return a surface of exactly `round(width*dpr) x round(height*dpr)` physical pixels.
    ///
    /// A surface of the right size is reused as-is, contents included. Otherwise a new one is
    /// allocated first and swapped in only on success, so a failed allocation leaves the
    /// previous surface intact.
    pub fn ensure_surface(
        &mut self,
        width: u32,
        height: u32,
        device_pixel_ratio: f64,
    ) -> SkyframeResult<&mut Surface> {
        let target = PhysicalSize::from_logical(width, height, device_pixel_ratio)?;

        let reuse = self.current.as_ref().is_some_and(|s| s.size == target);
        if reuse {
            self.stats.reuses = self.stats.reuses.saturating_add(1);
        } else {
            let fresh = self.allocate(target)?;
            if let Some(old) = self.current.as_ref() {
                tracing::info!(
                    from_w = old.size.width,
                    from_h = old.size.height,
                    to_w = target.width,
                    to_h = target.height,
                    "resizing surface"
                );
            } else {
                tracing::info!(w = target.width, h = target.height, "allocating surface");
            }
            self.current = Some(fresh);
        }

        self.current
            .as_mut()
            .ok_or_else(|| SkyframeError::surface("surface missing after allocation"))
    }

    fn allocate(&mut self, target: PhysicalSize) -> SkyframeResult<Surface> {
        let bytes = target.byte_len();
        let res = if bytes > self.max_surface_bytes {
            Err(SkyframeError::surface(format!(
                "{}x{} needs {bytes} bytes, limit is {}",
                target.width, target.height, self.max_surface_bytes
            )))
        } else {
            Surface::allocate(target)
        };

        match res {
            Ok(s) => {
                self.stats.allocations = self.stats.allocations.saturating_add(1);
                self.stats.allocated_bytes = self.stats.allocated_bytes.saturating_add(bytes as u64);
                Ok(s)
            }
            Err(e) => {
                self.stats.failures = self.stats.failures.saturating_add(1);
                Err(e)
            }
        }
    }

    /// The live surface, if any.
    pub fn current(&self) -> Option<&Surface> {
        self.current.as_ref()
    }

    /// Allocation counters.
    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
