/// A disc in world coordinates.
///
/// Velocity is carried through unchanged; rendering only reads position and radius.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Particle {
    /// Center x (world units).
    pub x: f64,
    /// Center y (world units, floor rest position is `y = 0`).
    pub y: f64,
    /// Velocity x.
    pub vx: f64,
    /// Velocity y.
    pub vy: f64,
    /// Radius (world units).
    pub r: f64,
}

/// One simulation snapshot from the trace.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    /// Simulation time in seconds.
    pub t: f64,
    /// Cumulative count of discharged particles.
    pub flow_total: u64,
    /// Particles in trace order.
    pub particles: Vec<Particle>,
}

impl Frame {
    /// Create a frame with no particles.
    pub fn new(t: f64, flow_total: u64) -> Self {
        Self {
            t,
            flow_total,
            particles: Vec::new(),
        }
    }

    /// Mean discharge rate `flow_total / t`, or `None` when it is undefined (`t == 0`) or not
    /// finite.
    pub fn flow_rate(&self) -> Option<f64> {
        if self.t == 0.0 {
            return None;
        }
        let rate = self.flow_total as f64 / self.t;
        rate.is_finite().then_some(rate)
    }
}
