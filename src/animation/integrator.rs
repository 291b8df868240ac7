/// Rotation advance per processed command, per unit of `rotationSpeed`.
pub const ROTATION_TICK: f64 = 0.01;

/// Advance an accumulated rotation by one tick.
///
/// This is a per-call integrator: no clock is read, so `speed` is in units per command.
pub fn advance(rotation: f64, speed: f64, auto_rotate: bool) -> f64 {
    if !auto_rotate {
        return rotation;
    }
    rotation + speed * ROTATION_TICK
}

/// The renderer's accumulated rotation, in radians.
///
/// Grows without wrapping; trigonometry downstream takes care of periodicity. Only a new
/// execution unit starts from zero again.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationState {
    radians: f64,
    ticks: u64,
}

impl RotationState {
    /// Current accumulated rotation.
    pub fn radians(&self) -> f64 {
        self.radians
    }

    /// How many commands actually advanced the rotation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Apply one tick and return the new rotation.
    pub fn tick(&mut self, speed: f64, auto_rotate: bool) -> f64 {
        self.radians = advance(self.radians, speed, auto_rotate);
        if auto_rotate {
            self.ticks = self.ticks.saturating_add(1);
        }
        self.radians
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/integrator.rs"]
mod tests;
