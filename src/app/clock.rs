//! Frame time and interpolated scalars
//!
//! Everything that animates is driven from the per-frame delta time: the
//! global and per-phase clocks, exponentially smoothed tweens, the error
//! shake and the one-shot easing curves.

/// One-shot easing curves, all mapping [0, 1] onto [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    CubicOut,
    QuadOut,
    QuadInOut,
}

impl Easing {
    /// Applies the curve; `t` is clamped to [0, 1] first
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Scalar smoothed toward a target
///
/// Each step moves the value by `(target - value) * min(rate * dt, 1)`, so
/// it converges monotonically and never overshoots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    value: f32,
    rate: f32,
}

impl Tween {
    pub fn new(rate: f32) -> Self {
        Self { value: 0.0, rate }
    }

    pub fn with_value(rate: f32, value: f32) -> Self {
        Self { value, rate }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn step(&mut self, target: f32, dt: f32) -> f32 {
        let t = (self.rate * dt).clamp(0.0, 1.0);
        self.value += (target - self.value) * t;
        self.value
    }

    /// Steps toward 1.0 when `on`, toward 0.0 otherwise
    pub fn step_toward(&mut self, on: bool, dt: f32) -> f32 {
        self.step(if on { 1.0 } else { 0.0 }, dt)
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

/// Decaying horizontal shake used for rejected input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shake {
    level: f32,
    decay_rate: f32,
    frequency: f32,
    amplitude: f32,
}

impl Shake {
    pub const MAX: f32 = 1.0;

    pub fn new(decay_rate: f32, frequency: f32, amplitude: f32) -> Self {
        Self {
            level: 0.0,
            decay_rate,
            frequency,
            amplitude,
        }
    }

    pub fn trigger(&mut self) {
        self.level = Self::MAX;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_active(&self) -> bool {
        self.level > 0.0
    }

    /// Seconds from `trigger` until the shake is fully decayed
    pub fn duration(&self) -> f32 {
        Self::MAX / self.decay_rate
    }

    /// Decays linearly, clamped at zero
    pub fn step(&mut self, dt: f32) {
        if self.level > 0.0 {
            self.level = (self.level - dt * self.decay_rate).max(0.0);
        }
    }

    /// Current horizontal panel offset in pixels
    pub fn offset(&self) -> f32 {
        if self.level <= 0.0 {
            return 0.0;
        }
        (self.level * self.frequency).sin() * self.amplitude * self.level
    }
}

/// Global and per-phase elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimationClock {
    time: f32,
    phase_time: f32,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt: f32) {
        self.time += dt;
        self.phase_time += dt;
    }

    /// Called on every phase entry
    pub fn reset_phase(&mut self) {
        self.phase_time = 0.0;
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn phase_time(&self) -> f32 {
        self.phase_time
    }
}
