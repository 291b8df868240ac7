//! Skyframe is an off-thread renderer for astronomical overlay frames.
//!
//! A dedicated thread receives JSON-shaped drawing commands, validates them, keeps the
//! accumulated rotation of the view, composites a background field, coordinate axes and
//! calibration vectors onto a surface sized in physical pixels, and hands the finished pixel
//! buffer back by moving it through a channel.
//!
//! - Validate payloads with [`validate`]
//! - Drive a [`RenderEngine`] directly on the current thread, or
//! - [`Renderer::spawn`] a worker and talk to it through a [`RendererHandle`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Rotation accumulator.
pub mod animation;
/// Inbound message types and validation.
pub mod contract;
/// The single-threaded command processor.
pub mod engine;
/// Surfaces and scene compositing.
pub mod render;
/// Outbound replies and the pixel buffer hand-off.
pub mod transfer;
/// The dedicated renderer thread.
pub mod worker;

pub use crate::foundation::core::{Affine, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{SkyframeError, SkyframeResult};

pub use crate::animation::integrator::{ROTATION_TICK, RotationState, advance};
pub use crate::contract::message::{
    CalibrationStatus, CameraOffset, CelestialKind, CelestialObject, CommandKind, RenderCommand,
};
pub use crate::contract::validate::{ValidationError, Violation, parse_command, validate};
pub use crate::engine::{RenderEngine, RendererOpts, WorkerReport};
pub use crate::render::surface::{PhysicalSize, SurfaceManager, SurfaceStats};
pub use crate::transfer::reply::{ErrorReply, PixelBuffer, RenderReply, Reply, TransferChannel};
pub use crate::worker::{Renderer, RendererHandle};
