//! Scroll surface abstraction and a headless animated implementation
//!
//! The form never moves the scroll surface directly. It issues a
//! [`ScrollCommand`] and the surface reports back, through the controller,
//! once an animated scroll has settled.

use crate::measure::Generation;

/// Margin kept to the left of the focused field so part of the previous
/// field stays visible
pub const PREVIOUS_FIELD_OFFSET: f32 = 40.0;

/// Scroll offset that brings a field measured at `measured_x` into view
pub fn scroll_offset_for(measured_x: f32) -> f32 {
    (measured_x - PREVIOUS_FIELD_OFFSET).max(0.0)
}

/// A scroll request issued on behalf of one focus change
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollCommand {
    /// Target horizontal offset
    pub x: f32,
    pub animated: bool,
    /// Focus change that issued the command
    pub generation: Generation,
}

/// The scrolling ancestor that holds every field editor
pub trait ScrollSurface {
    fn scroll_to(&mut self, command: ScrollCommand);
}

impl<S: ScrollSurface + ?Sized> ScrollSurface for Box<S> {
    fn scroll_to(&mut self, command: ScrollCommand) {
        (**self).scroll_to(command)
    }
}

/// Spring parameters for animated scrolls
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollSpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl ScrollSpringConfig {
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Damping at which the spring stops oscillating
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }
}

impl Default for ScrollSpringConfig {
    /// Close to critically damped: no visible overshoot past the field
    fn default() -> Self {
        Self::new(170.0, 26.0, 1.0)
    }
}

/// RK4-integrated spring driving one scroll axis
#[derive(Clone, Copy, Debug)]
struct ScrollSpring {
    config: ScrollSpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
}

impl ScrollSpring {
    fn new(config: ScrollSpringConfig, value: f32, velocity: f32, target: f32) -> Self {
        Self {
            config,
            value,
            velocity,
            target,
        }
    }

    fn is_settled(&self) -> bool {
        // Sub-pixel and slower than a few px/s is imperceptible
        const EPSILON: f32 = 0.5;
        const VELOCITY_EPSILON: f32 = 5.0;

        (self.value - self.target).abs() < EPSILON && self.velocity.abs() < VELOCITY_EPSILON
    }

    fn step(&mut self, dt: f32) {
        let accel = |x: f32, v: f32| {
            let spring_force = -self.config.stiffness * (x - self.target);
            let damping_force = -self.config.damping * v;
            (spring_force + damping_force) / self.config.mass
        };

        let (x, v) = (self.value, self.velocity);
        let k1_v = accel(x, v);
        let k1_x = v;
        let k2_v = accel(x + k1_x * dt * 0.5, v + k1_v * dt * 0.5);
        let k2_x = v + k1_v * dt * 0.5;
        let k3_v = accel(x + k2_x * dt * 0.5, v + k2_v * dt * 0.5);
        let k3_x = v + k2_v * dt * 0.5;
        let k4_v = accel(x + k3_x * dt, v + k3_v * dt);
        let k4_x = v + k3_v * dt;

        self.velocity += (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v) * dt / 6.0;
        self.value += (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x) * dt / 6.0;
    }
}

/// Headless scroll surface for hosts without a native scroll view
///
/// Call [`tick`](Self::tick) once per frame; it returns the generation of a
/// command once that command's scroll has settled. A command that replaces
/// one still animating inherits its velocity and the replaced command never
/// reports settling.
#[derive(Debug)]
pub struct ScrollState {
    offset_x: f32,
    config: ScrollSpringConfig,
    spring: Option<ScrollSpring>,
    in_flight: Option<Generation>,
    settled: Option<Generation>,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollState {
    pub fn new() -> Self {
        Self::with_config(ScrollSpringConfig::default())
    }

    pub fn with_config(config: ScrollSpringConfig) -> Self {
        Self {
            offset_x: 0.0,
            config,
            spring: None,
            in_flight: None,
            settled: None,
        }
    }

    pub fn offset_x(&self) -> f32 {
        self.offset_x
    }

    pub fn is_animating(&self) -> bool {
        self.spring.is_some()
    }

    /// Target of the running animation, if any
    pub fn target_x(&self) -> Option<f32> {
        self.spring.map(|s| s.target)
    }

    /// Advance the animation by `dt` seconds
    ///
    /// Returns the generation of the command that settled during this tick.
    pub fn tick(&mut self, dt: f32) -> Option<Generation> {
        if let Some(spring) = self.spring.as_mut() {
            spring.step(dt);
            self.offset_x = spring.value;
            if spring.is_settled() {
                self.offset_x = spring.target;
                self.spring = None;
                self.settled = self.in_flight.take();
            }
        }
        self.settled.take()
    }
}

impl ScrollSurface for ScrollState {
    fn scroll_to(&mut self, command: ScrollCommand) {
        tracing::trace!(
            "scroll {} to x={} (animated: {})",
            command.generation,
            command.x,
            command.animated
        );

        if !command.animated {
            self.offset_x = command.x;
            self.spring = None;
            self.in_flight = None;
            self.settled = Some(command.generation);
            return;
        }

        let velocity = self.spring.map(|s| s.velocity).unwrap_or(0.0);
        self.spring = Some(ScrollSpring::new(
            self.config,
            self.offset_x,
            velocity,
            command.x,
        ));
        self.in_flight = Some(command.generation);
        self.settled = None;
    }
}
