use super::*;

const BIG: usize = 1 << 30;

#[test]
fn physical_size_scales_and_rounds() {
    let s = PhysicalSize::from_logical(800, 600, 1.0).unwrap();
    assert_eq!((s.width, s.height), (800, 600));

    let s = PhysicalSize::from_logical(101, 333, 1.5).unwrap();
    assert_eq!((s.width, s.height), (152, 500));
    assert_eq!(s.byte_len(), 152 * 500 * 4);
}

#[test]
fn same_request_allocates_once() {
    let mut m = SurfaceManager::new(BIG);
    m.ensure_surface(200, 100, 2.0).unwrap();
    m.ensure_surface(200, 100, 2.0).unwrap();

    let st = m.stats();
    assert_eq!(st.allocations, 1);
    assert_eq!(st.reuses, 1);
    let size = m.current().unwrap().size();
    assert_eq!((size.width, size.height), (400, 200));
}

#[test]
fn each_changed_dimension_reallocates_once() {
    let mut m = SurfaceManager::new(BIG);
    m.ensure_surface(200, 100, 1.0).unwrap();
    m.ensure_surface(300, 100, 1.0).unwrap();
    m.ensure_surface(300, 150, 1.0).unwrap();
    m.ensure_surface(300, 150, 2.0).unwrap();
    assert_eq!(m.stats().allocations, 4);
    assert_eq!(m.stats().reuses, 0);
}

#[test]
fn logical_change_with_same_physical_size_reuses() {
    let mut m = SurfaceManager::new(BIG);
    m.ensure_surface(200, 200, 1.0).unwrap();
    // 100 * 2.0 == 200 * 1.0
    m.ensure_surface(100, 100, 2.0).unwrap();
    assert_eq!(m.stats().allocations, 1);
}

#[test]
fn reuse_keeps_pixel_contents() {
    let mut m = SurfaceManager::new(BIG);
    m.ensure_surface(100, 100, 1.0).unwrap().clear([1, 2, 3, 4]);
    let s = m.ensure_surface(100, 100, 1.0).unwrap();
    assert_eq!(&s.data()[..4], &[1, 2, 3, 4]);
}

#[test]
fn over_budget_request_fails_and_keeps_previous_surface() {
    let budget = PhysicalSize::from_logical(200, 200, 1.0).unwrap().byte_len();
    let mut m = SurfaceManager::new(budget);
    m.ensure_surface(200, 200, 1.0).unwrap();

    let err = m.ensure_surface(300, 300, 1.0).err().expect("must fail");
    assert!(matches!(err, SkyframeError::SurfaceAllocation(_)));

    let st = m.stats();
    assert_eq!(st.allocations, 1);
    assert_eq!(st.failures, 1);
    let size = m.current().unwrap().size();
    assert_eq!((size.width, size.height), (200, 200));
}

#[test]
fn sizes_beyond_rasterizer_limits_are_allocation_failures() {
    let mut m = SurfaceManager::new(usize::MAX);
    let err = m.ensure_surface(70_000, 100, 1.0).err().expect("must fail");
    assert!(err.to_string().contains("exceeds u16"));
    assert!(m.current().is_none());
}

#[test]
fn clear_fills_every_pixel() {
    let mut m = SurfaceManager::new(BIG);
    let s = m.ensure_surface(100, 100, 1.0).unwrap();
    s.clear([9, 8, 7, 255]);
    assert!(s.data().chunks_exact(4).all(|px| px == [9, 8, 7, 255]));
    s.clear([0, 0, 0, 0]);
    assert!(s.data().iter().all(|&b| b == 0));
}

#[test]
fn read_back_copies_current_pixels() {
    let mut m = SurfaceManager::new(BIG);
    let s = m.ensure_surface(100, 100, 1.0).unwrap();
    s.clear([5, 6, 7, 8]);
    let copy = s.read_back().unwrap();
    assert_eq!(copy.as_slice(), s.data());
}

#[test]
fn unsatisfiable_readback_is_a_draw_error() {
    let err = reserve_bytes(usize::MAX).unwrap_err();
    assert!(matches!(err, SkyframeError::Draw(_)));
    assert!(err.to_string().contains("readback"));
}
