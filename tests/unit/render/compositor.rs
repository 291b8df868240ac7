use super::*;
use crate::contract::message::{CommandKind, RenderCommand};
use crate::render::surface::SurfaceManager;

fn reference() -> RenderCommand {
    RenderCommand::new(CommandKind::Render, 800, 600)
}

fn render(cmd: &RenderCommand, rotation: f64) -> PixelBuffer {
    let mut m = SurfaceManager::new(1 << 30);
    let s = m
        .ensure_surface(cmd.width, cmd.height, cmd.device_pixel_ratio)
        .unwrap();
    draw(s, cmd, rotation, [0, 0, 0, 0]).unwrap()
}

fn px(buf: &PixelBuffer, x: u32, y: u32) -> [u8; 4] {
    buf.pixel(x, y).expect("pixel in bounds")
}

#[test]
fn transform_stack_maps_origin_to_offset_center() {
    let mut cmd = reference().with_dpr(2.0);
    cmd.camera_offset.x = 10.0;
    cmd.camera_offset.y = -20.0;
    cmd.zoom_level = 1.5;
    let t = scene_transform(&cmd, 0.0);
    let p = t * kurbo::Point::new(0.0, 0.0);
    assert!((p.x - 820.0).abs() < 1e-9);
    assert!((p.y - 560.0).abs() < 1e-9);

    let q = t * kurbo::Point::new(10.0, 0.0);
    assert!((q.x - p.x - 30.0).abs() < 1e-9);
}

#[test]
fn rotation_is_applied_innermost() {
    let cmd = reference();
    let t = scene_transform(&cmd, std::f64::consts::FRAC_PI_2);
    let p = t * kurbo::Point::new(10.0, 0.0);
    assert!((p.x - 400.0).abs() < 1e-9);
    assert!((p.y - 310.0).abs() < 1e-9);
}

#[test]
fn buffer_has_physical_dimensions() {
    let buf = render(&reference(), 0.0);
    assert_eq!((buf.width(), buf.height()), (800, 600));
    assert_eq!(buf.as_bytes().len(), 800 * 600 * 4);

    let hi = render(&reference().with_dpr(1.5), 0.0);
    assert_eq!((hi.width(), hi.height()), (1200, 900));
}

#[test]
fn background_is_brighter_at_the_center() {
    let buf = render(&reference(), 0.0);
    let inner = px(&buf, 420, 330);
    let corner = px(&buf, 2, 2);
    assert_eq!(corner[3], 255);
    assert!(inner[0] > corner[0]);
    assert!(inner[2] > corner[2]);
}

#[test]
fn zoomed_out_leaves_corners_uncovered() {
    let mut cmd = reference();
    cmd.zoom_level = 0.5;
    let buf = render(&cmd, 0.0);
    assert_eq!(px(&buf, 2, 2), [0, 0, 0, 0]);
    assert_eq!(px(&buf, 400, 150)[3], 255);
}

#[test]
fn horizontal_axis_is_drawn() {
    let buf = render(&reference(), 0.0);
    let on_axis = px(&buf, 700, 300);
    let off_axis = px(&buf, 700, 310);
    assert!(on_axis[0] > off_axis[0].saturating_add(5));
}

#[test]
fn axes_do_not_depend_on_show_grid() {
    let mut hidden = reference();
    hidden.show_grid = false;
    assert_eq!(
        render(&reference(), 0.0).as_bytes(),
        render(&hidden, 0.0).as_bytes()
    );
}

#[test]
fn calibration_vectors_use_accent_colors() {
    assert_eq!(
        calibration_vectors(100.0),
        [Vec2::new(100.0, -50.0), Vec2::new(-50.0, 50.0)]
    );

    let buf = render(&reference(), 0.0);
    let warm = px(&buf, 450, 274);
    assert!(warm[0] > 150);
    assert!(warm[0] > warm[1].saturating_add(50));

    let cool = px(&buf, 375, 324);
    assert!(cool[1] > cool[0].saturating_add(50));
}

#[test]
fn same_inputs_give_identical_pixels() {
    let mut cmd = reference();
    cmd.zoom_level = 1.3;
    cmd.camera_offset.x = 12.5;
    let a = render(&cmd, 0.7);
    let b = render(&cmd, 0.7);
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn redraw_on_reused_surface_is_identical() {
    let cmd = reference();
    let mut m = SurfaceManager::new(1 << 30);
    let a = draw(m.ensure_surface(800, 600, 1.0).unwrap(), &cmd, 0.3, [0, 0, 0, 0]).unwrap();
    let b = draw(m.ensure_surface(800, 600, 1.0).unwrap(), &cmd, 0.3, [0, 0, 0, 0]).unwrap();
    assert_eq!(m.stats().allocations, 1);
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn rotation_changes_the_frame() {
    let a = render(&reference(), 0.0);
    let b = render(&reference(), 1.0);
    assert_ne!(a.as_bytes(), b.as_bytes());
}

#[test]
fn clear_color_shows_where_the_field_does_not_reach() {
    let mut cmd = reference();
    cmd.zoom_level = 0.5;
    let mut m = SurfaceManager::new(1 << 30);
    let s = m.ensure_surface(800, 600, 1.0).unwrap();
    let buf = draw(s, &cmd, 0.0, [0, 0, 64, 255]).unwrap();
    assert_eq!(px(&buf, 2, 2), [0, 0, 64, 255]);
}

#[test]
fn celestial_objects_are_not_drawn() {
    let mut with_objects = reference();
    with_objects
        .celestial_objects
        .push(crate::contract::message::CelestialObject {
            kind: crate::contract::message::CelestialKind::Star,
            x: 10.0,
            y: 10.0,
            magnitude: 1.0,
        });
    assert_eq!(
        render(&reference(), 0.0).as_bytes(),
        render(&with_objects, 0.0).as_bytes()
    );
}
