//! Spring-based interpolation
//!
//! A damped second-order model: `a = -k (x - target) - b v`, integrated with a
//! fixed step of one 60 Hz frame. Values are polled after `tick(dt)`; changing
//! the target keeps the current value and velocity, so a transition that is
//! interrupted continues smoothly from wherever it was.

use serde::{Deserialize, Serialize};

use crate::domain::{ConfigError, Point};

/// Integration step in seconds.
pub const FRAME_SECONDS: f64 = 1.0 / 60.0;

/// Upper bound of integration steps per `tick`; longer gaps are dropped.
pub const MAX_STEPS_PER_TICK: u32 = 10;

/// Spring configuration parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    /// Stiffness (higher = faster response)
    pub stiffness: f64,
    /// Damping coefficient; `2 * sqrt(stiffness)` is critical damping
    pub damping: f64,
    /// Below this distance and speed the value snaps to its target
    pub precision: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::no_wobble()
    }
}

impl SpringConfig {
    pub const fn new(stiffness: f64, damping: f64) -> Self {
        Self {
            stiffness,
            damping,
            precision: 0.01,
        }
    }

    /// Close to critical damping: no visible overshoot.
    pub const fn no_wobble() -> Self {
        Self::new(170.0, 26.0)
    }

    pub const fn gentle() -> Self {
        Self::new(120.0, 14.0)
    }

    pub const fn wobbly() -> Self {
        Self::new(180.0, 12.0)
    }

    pub const fn stiff() -> Self {
        Self::new(210.0, 20.0)
    }

    /// Look up a preset by name.
    pub fn from_preset(name: &str) -> Option<Self> {
        match name {
            "no_wobble" | "default" => Some(Self::no_wobble()),
            "gentle" => Some(Self::gentle()),
            "wobbly" => Some(Self::wobbly()),
            "stiff" => Some(Self::stiff()),
            _ => None,
        }
    }

    /// Ratio of the damping to critical damping.
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * self.stiffness.sqrt())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("spring.stiffness", self.stiffness),
            ("spring.damping", self.damping),
            ("spring.precision", self.precision),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Animated scalar with spring physics
///
/// # Usage
/// ```
/// use springtree::application::spring::Spring;
///
/// let mut zoom = Spring::new(1.0);
/// zoom.set_target(2.0);
/// while zoom.is_animating() {
///     zoom.tick(1.0 / 60.0);
/// }
/// assert_eq!(zoom.get(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    current: f64,
    target: f64,
    velocity: f64,
    /// Elapsed time not yet consumed by a whole step
    pending: f64,
    config: SpringConfig,
}

impl Spring {
    pub fn new(initial: f64) -> Self {
        Self::with_config(initial, SpringConfig::default())
    }

    pub fn with_config(initial: f64, config: SpringConfig) -> Self {
        Self {
            current: initial,
            target: initial,
            velocity: 0.0,
            pending: 0.0,
            config,
        }
    }

    /// Start at `from`, heading for `to`.
    pub fn between(from: f64, to: f64, config: SpringConfig) -> Self {
        let mut spring = Self::with_config(from, config);
        spring.set_target(to);
        spring
    }

    /// Retarget; current value and velocity are kept.
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Jump immediately to value (no animation)
    pub fn set_immediate(&mut self, value: f64) {
        self.current = value;
        self.target = value;
        self.velocity = 0.0;
        self.pending = 0.0;
    }

    pub fn get(&self) -> f64 {
        self.current
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_animating(&self) -> bool {
        self.current != self.target || self.velocity != 0.0
    }

    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
    }

    /// Advance by one fixed frame.
    pub fn step(&mut self) {
        if !self.is_animating() {
            return;
        }
        let SpringConfig {
            stiffness,
            damping,
            precision,
        } = self.config;
        let spring_force = -stiffness * (self.current - self.target);
        let damping_force = -damping * self.velocity;
        let acceleration = spring_force + damping_force;

        let velocity = self.velocity + acceleration * FRAME_SECONDS;
        let current = self.current + velocity * FRAME_SECONDS;

        if velocity.abs() < precision && (current - self.target).abs() < precision {
            self.current = self.target;
            self.velocity = 0.0;
        } else {
            self.current = current;
            self.velocity = velocity;
        }
    }

    /// Advance by `dt` seconds of wall time; returns the number of frames stepped.
    pub fn tick(&mut self, dt: f64) -> u32 {
        let steps = frames_for(&mut self.pending, dt);
        for _ in 0..steps {
            self.step();
        }
        steps
    }
}

/// Consume whole frames from an elapsed-time accumulator.
pub(crate) fn frames_for(pending: &mut f64, dt: f64) -> u32 {
    if !(dt.is_finite() && dt > 0.0) {
        return 0;
    }
    *pending += dt;
    // tolerate rounding when dt is an exact multiple of the frame
    let whole = ((*pending + 1e-9) / FRAME_SECONDS).floor();
    *pending = (*pending - whole * FRAME_SECONDS).max(0.0);
    if whole >= MAX_STEPS_PER_TICK as f64 {
        *pending = 0.0;
        MAX_STEPS_PER_TICK
    } else {
        whole as u32
    }
}

/// Animated 2D point with spring physics
#[derive(Debug, Clone, PartialEq)]
pub struct SpringPoint {
    pub x: Spring,
    pub y: Spring,
}

impl SpringPoint {
    pub fn new(initial: Point, config: SpringConfig) -> Self {
        Self {
            x: Spring::with_config(initial.x, config),
            y: Spring::with_config(initial.y, config),
        }
    }

    pub fn between(from: Point, to: Point, config: SpringConfig) -> Self {
        Self {
            x: Spring::between(from.x, to.x, config),
            y: Spring::between(from.y, to.y, config),
        }
    }

    pub fn set_target(&mut self, target: Point) {
        self.x.set_target(target.x);
        self.y.set_target(target.y);
    }

    pub fn target(&self) -> Point {
        Point::new(self.x.target(), self.y.target())
    }

    pub fn get(&self) -> Point {
        Point::new(self.x.get(), self.y.get())
    }

    pub fn step(&mut self) {
        self.x.step();
        self.y.step();
    }

    pub fn is_animating(&self) -> bool {
        self.x.is_animating() || self.y.is_animating()
    }

    pub fn set_config(&mut self, config: SpringConfig) {
        self.x.set_config(config);
        self.y.set_config(config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spring_converges_and_holds() {
        let mut spring = Spring::new(0.0);
        spring.set_target(500.0);

        let mut frames = 0;
        while spring.is_animating() {
            spring.step();
            frames += 1;
            assert!(frames < 600, "spring did not converge");
        }
        assert_eq!(spring.get(), 500.0);

        spring.step();
        assert_eq!(spring.get(), 500.0, "settled spring must hold");
    }

    #[test]
    fn test_spring_no_wobble_does_not_snap() {
        let mut spring = Spring::new(0.0);
        spring.set_target(100.0);
        spring.step();
        let first = spring.get();
        assert!(first > 0.0 && first < 100.0, "got {first}");
    }

    #[test]
    fn test_spring_no_wobble_barely_overshoots() {
        let mut spring = Spring::new(0.0);
        spring.set_target(100.0);
        let mut max_value = 0.0f64;
        for _ in 0..300 {
            spring.step();
            max_value = max_value.max(spring.get());
        }
        assert!(max_value < 100.5, "overshoot {max_value}");
    }

    #[test]
    fn test_wobbly_spring_overshoots() {
        let mut spring = Spring::with_config(0.0, SpringConfig::wobbly());
        spring.set_target(1.0);
        let mut max_value = 0.0f64;
        for _ in 0..60 {
            spring.step();
            max_value = max_value.max(spring.get());
        }
        assert!(max_value > 1.0, "wobbly spring should overshoot target");
    }

    #[test]
    fn test_retarget_keeps_current_value_and_velocity() {
        let mut spring = Spring::new(0.0);
        spring.set_target(100.0);
        for _ in 0..10 {
            spring.step();
        }
        let (value, velocity) = (spring.get(), spring.velocity());
        spring.set_target(-50.0);
        assert_eq!(spring.get(), value);
        assert_eq!(spring.velocity(), velocity);
    }

    #[test]
    fn test_tick_consumes_whole_frames() {
        let mut spring = Spring::new(0.0);
        spring.set_target(1.0);
        assert_eq!(spring.tick(FRAME_SECONDS / 2.0), 0);
        assert_eq!(spring.tick(FRAME_SECONDS / 2.0), 1);
        assert_eq!(spring.tick(FRAME_SECONDS * 3.0), 3);
        assert_eq!(spring.tick(10.0), MAX_STEPS_PER_TICK);
        assert_eq!(spring.tick(-1.0), 0);
    }

    #[test]
    fn test_spring_immediate() {
        let mut spring = Spring::new(0.0);
        spring.set_immediate(5.0);
        assert_eq!(spring.get(), 5.0);
        assert!(!spring.is_animating());
    }

    #[test]
    fn test_presets_and_validation() {
        assert_eq!(SpringConfig::from_preset("stiff"), Some(SpringConfig::stiff()));
        assert_eq!(SpringConfig::from_preset("bouncy"), None);
        assert!((SpringConfig::no_wobble().damping_ratio() - 1.0).abs() < 0.01);
        let broken = SpringConfig {
            stiffness: 0.0,
            ..SpringConfig::default()
        };
        assert!(broken.validate().is_err());
    }

    #[test]
    fn test_spring_point() {
        let mut pos = SpringPoint::between(
            Point::new(0.0, 0.0),
            Point::new(100.0, 50.0),
            SpringConfig::default(),
        );
        for _ in 0..300 {
            pos.step();
        }
        assert_eq!(pos.get(), Point::new(100.0, 50.0));
        assert!(!pos.is_animating());
    }
}
