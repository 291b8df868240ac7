/// Per-call rotation integrator.
pub mod integrator;
