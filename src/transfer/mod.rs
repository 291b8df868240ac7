/// Replies and the move-only pixel buffer.
pub mod reply;
