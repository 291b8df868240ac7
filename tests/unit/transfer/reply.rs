use super::*;

fn buf(w: u32, h: u32, fill: [u8; 4]) -> PixelBuffer {
    PixelBuffer::from_premul_rgba8(w, h, fill.repeat((w * h) as usize))
}

#[test]
fn pixel_lookup_is_bounds_checked() {
    let b = buf(3, 2, [1, 2, 3, 4]);
    assert_eq!(b.pixel(2, 1), Some([1, 2, 3, 4]));
    assert_eq!(b.pixel(3, 0), None);
    assert_eq!(b.pixel(0, 2), None);
}

#[test]
fn straight_alpha_conversion_undoes_premultiplication() {
    let b = buf(1, 1, [64, 32, 0, 128]);
    assert_eq!(b.to_straight_rgba(), vec![128, 64, 0, 128]);

    let opaque = buf(1, 1, [10, 20, 30, 255]);
    assert_eq!(opaque.to_straight_rgba(), vec![10, 20, 30, 255]);
}

#[test]
fn render_reply_serializes_with_wire_names() {
    let reply = Reply::from_outcome(Ok(RenderReply::new(buf(2, 2, [0; 4]), 1.5)));
    let v = serde_json::to_value(&reply).unwrap();
    assert_eq!(v["type"], "render");
    assert_eq!(v["drawTime"], 1.5);
    assert_eq!(v["imageData"]["width"], 2);
    assert_eq!(v["imageData"]["byteLength"], 16);
}

#[test]
fn error_reply_carries_message() {
    let reply = Reply::from_outcome(Err(SkyframeError::draw("rasterizer exploded")));
    assert!(reply.error().unwrap().contains("rasterizer exploded"));
    let v = serde_json::to_value(&reply).unwrap();
    assert_eq!(v["type"], "error");
    assert!(v["error"].as_str().unwrap().starts_with("draw failed:"));
}

#[test]
fn transfer_moves_the_allocation() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let chan = TransferChannel::new(tx);

    let frame = buf(4, 4, [7; 4]);
    let ptr = frame.as_bytes().as_ptr();
    chan.respond(Ok(RenderReply::new(frame, 0.0))).unwrap();
    // `frame` is moved; reading it here would not compile.

    let got = rx.recv().unwrap().into_render().unwrap().into_pixels();
    assert_eq!(got.as_bytes().as_ptr(), ptr);
    assert_eq!(got.into_vec().len(), 64);
}

#[test]
fn respond_fails_once_receiver_is_dropped() {
    let (tx, rx) = crossbeam_channel::unbounded();
    drop(rx);
    let chan = TransferChannel::new(tx);
    let err = chan.respond(Err(SkyframeError::draw("x"))).unwrap_err();
    assert!(matches!(err, SkyframeError::Channel(_)));
}
