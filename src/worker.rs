use crate::engine::{RenderEngine, RendererOpts, WorkerReport};
use crate::foundation::error::{SkyframeError, SkyframeResult};
use crate::transfer::reply::{Reply, TransferChannel};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug)]
enum Inbound {
    Payload(serde_json::Value),
    Text(String),
}

/// Entry point for the off-thread renderer.
pub struct Renderer;

impl Renderer {
    /// Start a dedicated renderer thread.
    ///
    /// The thread owns the surface and the rotation accumulator; the caller talks to it only
    /// through the returned handle. Both mailboxes are unbounded, so a caller that posts faster
    /// than frames can be drawn must pace itself.
    pub fn spawn(opts: RendererOpts) -> SkyframeResult<RendererHandle> {
        let (in_tx, in_rx) = unbounded::<Inbound>();
        let (out_tx, out_rx) = unbounded::<Reply>();
        let name = opts.thread_name.clone();
        let join = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_renderer_thread(opts, in_rx, TransferChannel::new(out_tx)))
            .map_err(|e| SkyframeError::channel(format!("failed to spawn {name}: {e}")))?;

        Ok(RendererHandle {
            inbound: Some(in_tx),
            replies: out_rx,
            join_handle: Some(join),
        })
    }
}

fn run_renderer_thread(
    opts: RendererOpts,
    inbound: Receiver<Inbound>,
    out: TransferChannel,
) -> WorkerReport {
    tracing::info!(thread = %opts.thread_name, "renderer started");
    let mut engine = RenderEngine::new(&opts);

    // Ends once every sender is dropped and the queue is drained.
    for msg in inbound.iter() {
        let outcome = match msg {
            Inbound::Payload(v) => engine.handle(&v),
            Inbound::Text(s) => engine.handle_text(&s),
        };
        if let Some(outcome) = outcome
            && let Err(e) = out.respond(outcome)
        {
            tracing::debug!(error = %e, "dropping reply");
        }
    }

    let report = engine.report();
    tracing::info!(
        commands = report.commands_processed,
        renders = report.renders,
        errors = report.errors,
        "renderer stopped"
    );
    report
}

/// Caller-side handle to a running renderer.
///
/// Dropping the handle stops the renderer after it drains queued messages.
pub struct RendererHandle {
    inbound: Option<Sender<Inbound>>,
    replies: Receiver<Reply>,
    join_handle: Option<JoinHandle<WorkerReport>>,
}

impl RendererHandle {
    fn sender(&self) -> SkyframeResult<&Sender<Inbound>> {
        self.inbound
            .as_ref()
            .ok_or_else(|| SkyframeError::channel("renderer is shut down"))
    }

    fn post_inbound(&self, msg: Inbound) -> SkyframeResult<()> {
        self.sender()?
            .send(msg)
            .map_err(|_| SkyframeError::channel("renderer thread is gone"))
    }

    /// Queue an untyped command.
    pub fn post(&self, payload: serde_json::Value) -> SkyframeResult<()> {
        self.post_inbound(Inbound::Payload(payload))
    }

    /// Queue a command given as JSON text.
    pub fn post_text(&self, text: impl Into<String>) -> SkyframeResult<()> {
        self.post_inbound(Inbound::Text(text.into()))
    }

    /// Block for the next reply.
    pub fn recv(&self) -> SkyframeResult<Reply> {
        self.replies
            .recv()
            .map_err(|_| SkyframeError::channel("renderer thread is gone"))
    }

    /// Wait up to `timeout` for the next reply. `Ok(None)` on timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> SkyframeResult<Option<Reply>> {
        match self.replies.recv_timeout(timeout) {
            Ok(r) => Ok(Some(r)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(SkyframeError::channel("renderer thread is gone"))
            }
        }
    }

    /// Next reply if one is ready.
    pub fn try_recv(&self) -> SkyframeResult<Option<Reply>> {
        match self.replies.try_recv() {
            Ok(r) => Ok(Some(r)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                Err(SkyframeError::channel("renderer thread is gone"))
            }
        }
    }

    /// The reply mailbox, for `select!` or iteration.
    pub fn replies(&self) -> &Receiver<Reply> {
        &self.replies
    }

    /// Close the mailbox without waiting.
    ///
    /// The renderer finishes queued work and then drops its end of the reply channel, so
    /// iterating [`RendererHandle::replies`] ends after the last reply.
    pub fn close(&mut self) {
        self.inbound.take();
    }

    /// Close the mailbox, let the renderer finish queued work, and return its final report.
    ///
    /// Replies already produced stay readable through [`RendererHandle::replies`] until the
    /// handle itself is dropped, so call this after collecting what you need.
    pub fn shutdown(&mut self) -> SkyframeResult<WorkerReport> {
        self.inbound.take();
        let handle = self
            .join_handle
            .take()
            .ok_or_else(|| SkyframeError::channel("renderer already shut down"))?;
        handle
            .join()
            .map_err(|_| SkyframeError::channel("renderer thread panicked"))
    }
}

impl Drop for RendererHandle {
    fn drop(&mut self) {
        self.inbound.take();
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}
