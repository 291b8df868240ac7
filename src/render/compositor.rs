//! Scene compositing for one frame.
//!
//! Layer order, back to front: clear, radial background field, coordinate axes, calibration
//! vectors. Everything after the clear is drawn under the camera transform
//! `scale(dpr) * translate(center + offset) * scale(zoom) * rotate(rotation)`, so the
//! coordinates below are logical units around the camera origin.

use crate::contract::message::RenderCommand;
use crate::foundation::core::{Affine, Vec2};
use crate::foundation::error::SkyframeResult;
use crate::render::surface::Surface;
use crate::transfer::reply::PixelBuffer;

/// Inner radius of the background field, logical units.
pub const BACKGROUND_INNER_RADIUS: f64 = 50.0;

const BACKGROUND_INNER: [u8; 4] = [0x1a, 0x1a, 0x2e, 0xff];
const BACKGROUND_OUTER: [u8; 4] = [0x0b, 0x0b, 0x16, 0xff];
const AXIS: [u8; 4] = [0xff, 0xff, 0xff, 0x1f];
const WARM_ACCENT: [u8; 4] = [0xff, 0x6b, 0x35, 0xff];
const COOL_ACCENT: [u8; 4] = [0x4e, 0xcd, 0xc4, 0xff];

const AXIS_STROKE_WIDTH: f64 = 1.0;
const VECTOR_STROKE_WIDTH: f64 = 2.0;

/// The camera transform stack for `cmd` at `rotation` radians, in physical pixels.
pub fn scene_transform(cmd: &RenderCommand, rotation: f64) -> Affine {
    let w = f64::from(cmd.width);
    let h = f64::from(cmd.height);
    let origin = Vec2::new(w / 2.0 + cmd.camera_offset.x, h / 2.0 + cmd.camera_offset.y);
    Affine::scale(cmd.device_pixel_ratio)
        * Affine::translate(origin)
        * Affine::scale(cmd.zoom_level)
        * Affine::rotate(rotation)
}

/// Endpoints of the warm and cool calibration vectors, relative to the camera origin.
pub fn calibration_vectors(length: f64) -> [Vec2; 2] {
    [
        Vec2::new(length, -length / 2.0),
        Vec2::new(-length / 2.0, length / 2.0),
    ]
}

/// Draw one frame into `surface` and read it back.
///
/// Deterministic in `(surface size, cmd, rotation)`. `clear_rgba` is premultiplied.
pub fn draw(
    surface: &mut Surface,
    cmd: &RenderCommand,
    rotation: f64,
    clear_rgba: [u8; 4],
) -> SkyframeResult<PixelBuffer> {
    let size = surface.size();
    surface.clear([0, 0, 0, 0]);

    let w = f64::from(cmd.width);
    let h = f64::from(cmd.height);
    let (ctx, pixmap) = surface.parts_mut();
    ctx.reset();

    if clear_rgba != [0, 0, 0, 0] {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color(unpremul(clear_rgba)));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(size.width),
            f64::from(size.height),
        ));
    }

    ctx.set_transform(affine_to_cpu(scene_transform(cmd, rotation)));

    let field = vello_cpu::peniko::Gradient::new_two_point_radial(
        (0.0, 0.0),
        BACKGROUND_INNER_RADIUS as f32,
        (0.0, 0.0),
        w.max(h) as f32,
    )
    .with_stops([
        (0.0_f32, color(BACKGROUND_INNER)),
        (1.0_f32, color(BACKGROUND_OUTER)),
    ]);
    ctx.set_paint(field);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        -w / 2.0,
        -h / 2.0,
        w / 2.0,
        h / 2.0,
    ));

    // Axes are unconditional; `show_grid` is carried but not consulted.
    ctx.set_paint(color(AXIS));
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(AXIS_STROKE_WIDTH));
    ctx.stroke_path(&segment(Vec2::new(-w / 2.0, 0.0), Vec2::new(w / 2.0, 0.0)));
    ctx.stroke_path(&segment(Vec2::new(0.0, -h / 2.0), Vec2::new(0.0, h / 2.0)));

    let [warm, cool] = calibration_vectors(cmd.calibration_vector_length);
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(VECTOR_STROKE_WIDTH));
    ctx.set_paint(color(WARM_ACCENT));
    ctx.stroke_path(&segment(Vec2::ZERO, warm));
    ctx.set_paint(color(COOL_ACCENT));
    ctx.stroke_path(&segment(Vec2::ZERO, cool));

    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.flush();
    ctx.render_to_pixmap(pixmap);

    let data = surface.read_back()?;
    Ok(PixelBuffer::from_premul_rgba8(size.width, size.height, data))
}

fn segment(from: Vec2, to: Vec2) -> vello_cpu::kurbo::BezPath {
    let mut p = vello_cpu::kurbo::BezPath::new();
    p.move_to(vello_cpu::kurbo::Point::new(from.x, from.y));
    p.line_to(vello_cpu::kurbo::Point::new(to.x, to.y));
    p
}

fn color(rgba: [u8; 4]) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = rgba;
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn unpremul(rgba: [u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = rgba;
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let a16 = u16::from(a);
    let un = |c: u8| -> u8 { ((u16::from(c) * 255 + a16 / 2) / a16).min(255) as u8 };
    [un(r), un(g), un(b), a]
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
