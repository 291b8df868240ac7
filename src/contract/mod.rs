/// Typed command model.
pub mod message;
/// Payload validation.
pub mod validate;
