use crate::animation::integrator::RotationState;
use crate::contract::message::{CommandKind, RenderCommand};
use crate::contract::validate::{parse_command, validate};
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{SkyframeError, SkyframeResult};
use crate::render::compositor;
use crate::render::surface::{SurfaceManager, SurfaceStats};
use crate::transfer::reply::{RenderReply, Reply};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

/// Renderer configuration.
#[derive(Clone, Debug)]
pub struct RendererOpts {
    /// Name of the dedicated renderer thread.
    pub thread_name: String,
    /// Largest surface, in bytes, the renderer will allocate. Larger requests fail the command.
    pub max_surface_bytes: usize,
    /// Color the surface is cleared to before each frame.
    pub clear_rgba: Rgba8Premul,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            thread_name: "skyframe-renderer".to_string(),
            max_surface_bytes: 1 << 30,
            clear_rgba: Rgba8Premul::transparent(),
        }
    }
}

impl RendererOpts {
    /// Return options with a different surface byte limit.
    pub fn with_max_surface_bytes(mut self, bytes: usize) -> Self {
        self.max_surface_bytes = bytes;
        self
    }

    /// Return options with a configured clear color.
    pub fn with_clear_rgba(mut self, clear: Rgba8Premul) -> Self {
        self.clear_rgba = clear;
        self
    }

    /// Return options with a different thread name.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// Lifetime statistics of one execution unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerReport {
    /// Messages taken off the mailbox.
    pub commands_processed: u64,
    /// Frames successfully rendered.
    pub renders: u64,
    /// Animate messages applied.
    pub animations: u64,
    /// Error replies emitted.
    pub errors: u64,
    /// Surfaces allocated (first plus every resize).
    pub surface_allocations: u64,
    /// Final accumulated rotation, radians.
    pub accumulated_rotation: f64,
}

/// The renderer's state machine: one surface, one rotation accumulator, one command at a time.
///
/// Owned by exactly one thread; see [`crate::worker::Renderer`] for the threaded wrapper.
pub struct RenderEngine {
    surfaces: SurfaceManager,
    rotation: RotationState,
    clear_rgba: [u8; 4],
    report: WorkerReport,
    #[cfg(test)]
    panic_next_draw: bool,
}

impl RenderEngine {
    /// Create an engine with no surface and zero rotation.
    pub fn new(opts: &RendererOpts) -> Self {
        Self {
            surfaces: SurfaceManager::new(opts.max_surface_bytes),
            rotation: RotationState::default(),
            clear_rgba: opts.clear_rgba.to_array(),
            report: WorkerReport::default(),
            #[cfg(test)]
            panic_next_draw: false,
        }
    }

    /// Process one untyped message. `Animate` yields no reply; everything else yields exactly one.
    pub fn process(&mut self, raw: &serde_json::Value) -> Option<Reply> {
        self.handle(raw).map(Reply::from_outcome)
    }

    /// Parse JSON text, then [`RenderEngine::process`] it.
    pub fn process_text(&mut self, text: &str) -> Option<Reply> {
        self.handle_text(text).map(Reply::from_outcome)
    }

    /// Like [`RenderEngine::process`], but hands back the outcome before it becomes a reply.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn handle(&mut self, raw: &serde_json::Value) -> Option<SkyframeResult<RenderReply>> {
        let outcome = validate(raw)
            .map_err(SkyframeError::from)
            .and_then(|cmd| self.execute(&cmd));
        self.finish(outcome)
    }

    /// Like [`RenderEngine::process_text`], but hands back the outcome.
    pub fn handle_text(&mut self, text: &str) -> Option<SkyframeResult<RenderReply>> {
        let outcome = parse_command(text)
            .map_err(SkyframeError::from)
            .and_then(|cmd| self.execute(&cmd));
        self.finish(outcome)
    }

    fn finish(
        &mut self,
        outcome: SkyframeResult<Option<RenderReply>>,
    ) -> Option<SkyframeResult<RenderReply>> {
        self.report.commands_processed = self.report.commands_processed.saturating_add(1);
        if outcome.is_err() {
            self.report.errors = self.report.errors.saturating_add(1);
        }
        outcome.transpose()
    }

    // Callers outside the crate go through `handle`, so every command here passed `validate`.
    pub(crate) fn execute(&mut self, cmd: &RenderCommand) -> SkyframeResult<Option<RenderReply>> {
        match cmd.kind {
            CommandKind::Animate => {
                let rotation = self.rotation.tick(cmd.rotation_speed, cmd.auto_rotate);
                self.report.animations = self.report.animations.saturating_add(1);
                tracing::debug!(rotation, "animate");
                Ok(None)
            }
            CommandKind::Render => self.render(cmd).map(Some),
        }
    }

    fn render(&mut self, cmd: &RenderCommand) -> SkyframeResult<RenderReply> {
        #[cfg(test)]
        let panic_in_draw = std::mem::take(&mut self.panic_next_draw);
        let surface =
            self.surfaces
                .ensure_surface(cmd.width, cmd.height, cmd.device_pixel_ratio)?;
        let rotation = self.rotation.tick(cmd.rotation_speed, cmd.auto_rotate);
        let clear = self.clear_rgba;

        let t0 = Instant::now();
        let pixels = catch_unwind(AssertUnwindSafe(|| {
            #[cfg(test)]
            if panic_in_draw {
                panic!("rasterizer fault");
            }
            compositor::draw(surface, cmd, rotation, clear)
        }))
        .map_err(|payload| SkyframeError::draw(panic_message(payload.as_ref())))??;
        let draw_time_ms = t0.elapsed().as_secs_f64() * 1000.0;

        tracing::debug!(
            w = pixels.width(),
            h = pixels.height(),
            rotation,
            draw_time_ms,
            "rendered frame"
        );
        self.report.renders = self.report.renders.saturating_add(1);
        Ok(RenderReply::new(pixels, draw_time_ms))
    }

    /// Accumulated rotation in radians.
    pub fn rotation(&self) -> f64 {
        self.rotation.radians()
    }

    /// Surface allocation counters.
    pub fn surface_stats(&self) -> SurfaceStats {
        self.surfaces.stats()
    }

    /// Statistics so far.
    pub fn report(&self) -> WorkerReport {
        WorkerReport {
            surface_allocations: self.surfaces.stats().allocations,
            accumulated_rotation: self.rotation.radians(),
            ..self.report
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return format!("panic during compositing: {s}");
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return format!("panic during compositing: {s}");
    }
    "panic during compositing".to_string()
}

#[cfg(test)]
#[path = "../tests/unit/engine.rs"]
mod tests;
