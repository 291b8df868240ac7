/// Frame compositing.
pub mod compositor;
/// Surface lifecycle.
pub mod surface;
