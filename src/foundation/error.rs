use crate::contract::validate::ValidationError;

/// Result alias used across the renderer.
pub type SkyframeResult<T> = Result<T, SkyframeError>;

/// Every failure the renderer can report.
///
/// All variants are recoverable from the execution unit's point of view: the worker converts them
/// into an error reply and keeps draining its mailbox.
#[derive(thiserror::Error, Debug)]
pub enum SkyframeError {
    /// An inbound payload broke the message contract. Nothing was mutated.
    #[error("contract violation: {0}")]
    Contract(#[from] ValidationError),

    /// The drawing surface could not be (re)created at the requested size.
    #[error("surface allocation failed: {0}")]
    SurfaceAllocation(String),

    /// Compositing failed (including a caught panic inside the rasterizer).
    #[error("draw failed: {0}")]
    Draw(String),

    /// A command could not be encoded.
    #[error("serde error: {0}")]
    Serde(String),

    /// The renderer thread went away or a channel endpoint was closed.
    #[error("channel error: {0}")]
    Channel(String),

    /// Escape hatch for errors from collaborators.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SkyframeError {
    /// Build a [`SkyframeError::SurfaceAllocation`].
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::SurfaceAllocation(msg.into())
    }

    /// Build a [`SkyframeError::Draw`].
    pub fn draw(msg: impl Into<String>) -> Self {
        Self::Draw(msg.into())
    }

    /// Build a [`SkyframeError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`SkyframeError::Channel`].
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    /// Return `true` for contract violations.
    pub fn is_contract(&self) -> bool {
        matches!(self, Self::Contract(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
