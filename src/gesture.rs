//! Per-tick gesture primitives.
//!
//! Each type holds only the scalars its rule needs. Profiles own them inside
//! their state and update them once per tick.

use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::math::lerp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Pressed,
    Held,
    Released,
    Idle,
}

/// Compares a button against its value on the previous tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEdge {
    was_down: bool,
}

impl ButtonEdge {
    pub fn update(&mut self, down: bool) -> Edge {
        let edge = match (self.was_down, down) {
            (false, true) => Edge::Pressed,
            (true, true) => Edge::Held,
            (true, false) => Edge::Released,
            (false, false) => Edge::Idle,
        };
        self.was_down = down;
        edge
    }

    pub fn is_down(&self) -> bool {
        self.was_down
    }
}

/// Fires when a press lands within `window` seconds of the previous reference
/// event.
///
/// `press` checks and records in one step. `mark` only moves the reference,
/// which lets a caller measure from the last release by marking every held tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoubleClick {
    last_event: Option<f64>,
}

impl DoubleClick {
    pub fn press(&mut self, now: f64, window: f64) -> bool {
        let double = self
            .last_event
            .map(|last| now - last < window)
            .unwrap_or(false);
        self.last_event = Some(now);
        double
    }

    pub fn mark(&mut self, now: f64) {
        self.last_event = Some(now);
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldTimer {
    held_for: f64,
}

impl HoldTimer {
    pub fn update(&mut self, down: bool, delta_time: f64) -> f64 {
        if down {
            self.held_for += delta_time;
        } else {
            self.held_for = 0.0;
        }
        self.held_for
    }

    pub fn held_for(&self) -> f64 {
        self.held_for
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggle {
    on: bool,
}

impl Toggle {
    pub fn flip(&mut self) -> bool {
        self.on = !self.on;
        self.on
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

/// Analog to boolean with separate on and off thresholds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hysteresis {
    active: bool,
}

impl Hysteresis {
    pub fn update(&mut self, value: f32, activate: f32, deactivate: f32) -> bool {
        if self.active {
            if value < deactivate {
                self.active = false;
            }
        } else if value > activate {
            self.active = true;
        }
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Trackpad touch with per-tick drag delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchTracker {
    touching: bool,
    last_position: na::Vector2<f32>,
    last_touch_time: Option<f64>,
}

impl Default for TouchTracker {
    fn default() -> Self {
        Self {
            touching: false,
            last_position: na::Vector2::zeros(),
            last_touch_time: None,
        }
    }
}

impl TouchTracker {
    /// Returns the drag since the previous tick. The delta is zero on the first
    /// touched tick so lifting and landing elsewhere does not jump.
    pub fn update(&mut self, touching: bool, position: na::Vector2<f32>, now: f64) -> na::Vector2<f32> {
        let was_touching = self.touching;
        self.touching = touching;
        if !touching {
            return na::Vector2::zeros();
        }
        self.last_touch_time = Some(now);
        let delta = if was_touching {
            position - self.last_position
        } else {
            na::Vector2::zeros()
        };
        self.last_position = position;
        delta
    }

    pub fn is_touching(&self) -> bool {
        self.touching
    }

    pub fn idle_for(&self, now: f64) -> Option<f64> {
        self.last_touch_time.map(|last| now - last)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisLimits {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl AxisLimits {
    pub fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }
}

/// One offset axis driven by touch or wheel deltas.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetAxis {
    pub value: f32,
}

impl OffsetAxis {
    pub fn new(value: f32) -> Self {
        Self { value }
    }

    pub fn accumulate(&mut self, delta: f32, scale: f32, limits: &AxisLimits) -> f32 {
        self.value = (self.value + delta * scale).clamp(limits.min, limits.max);
        self.value
    }

    pub fn clamp(&mut self, limits: &AxisLimits) -> f32 {
        self.value = self.value.clamp(limits.min, limits.max);
        self.value
    }

    /// Moves toward `target` by `rate * delta_time` of the remaining distance and
    /// snaps onto it once closer than `snap_epsilon`.
    pub fn decay_towards(&mut self, target: f32, rate: f32, delta_time: f32, snap_epsilon: f32) -> f32 {
        let t = (rate * delta_time).clamp(0.0, 1.0);
        self.value = lerp(self.value, target, t);
        if (self.value - target).abs() <= snap_epsilon {
            self.value = target;
        }
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn button_edges() {
        let mut edge = ButtonEdge::default();
        assert_eq!(edge.update(false), Edge::Idle);
        assert_eq!(edge.update(true), Edge::Pressed);
        assert_eq!(edge.update(true), Edge::Held);
        assert_eq!(edge.update(false), Edge::Released);
        assert!(!edge.is_down());
    }

    #[test]
    fn double_click_inside_window() {
        let mut detector = DoubleClick::default();
        assert!(!detector.press(10.0, 0.3));
        assert!(detector.press(10.2, 0.3));
    }

    #[test]
    fn double_click_outside_window() {
        let mut detector = DoubleClick::default();
        assert!(!detector.press(10.0, 0.3));
        assert!(!detector.press(10.5, 0.3));
    }

    #[test]
    fn first_press_is_never_double() {
        let mut detector = DoubleClick::default();
        assert!(!detector.press(0.0, 0.3));
    }

    #[test]
    fn marking_measures_from_release() {
        let mut detector = DoubleClick::default();
        detector.press(1.0, 0.5);
        // held for a second, released at 2.0
        detector.mark(1.5);
        detector.mark(2.0);
        assert!(detector.press(2.4, 0.5));
    }

    #[test]
    fn hold_timer_resets() {
        let mut timer = HoldTimer::default();
        timer.update(true, 0.1);
        assert_relative_eq!(timer.update(true, 0.1), 0.2);
        assert_relative_eq!(timer.update(false, 0.1), 0.0);
    }

    #[test]
    fn toggle_flips() {
        let mut toggle = Toggle::default();
        assert!(toggle.flip());
        assert!(!toggle.flip());
    }

    #[test]
    fn hysteresis_holds_between_thresholds() {
        let mut trigger = Hysteresis::default();
        assert!(!trigger.update(0.5, 0.7, 0.3));
        assert!(trigger.update(0.8, 0.7, 0.3));
        assert!(trigger.update(0.5, 0.7, 0.3));
        assert!(!trigger.update(0.2, 0.7, 0.3));
        assert!(!trigger.update(0.5, 0.7, 0.3));
    }

    #[test]
    fn touch_delta_only_while_dragging() {
        let mut touch = TouchTracker::default();
        let first = touch.update(true, na::Vector2::new(0.1, 0.1), 0.0);
        assert_eq!(first, na::Vector2::zeros());
        let drag = touch.update(true, na::Vector2::new(0.3, -0.1), 0.016);
        assert_relative_eq!(drag.x, 0.2, epsilon = 1e-6);
        assert_relative_eq!(drag.y, -0.2, epsilon = 1e-6);
        assert_eq!(touch.update(false, na::Vector2::new(0.9, 0.9), 0.032), na::Vector2::zeros());
        // landing somewhere else does not jump
        assert_eq!(touch.update(true, na::Vector2::new(-0.5, 0.5), 0.048), na::Vector2::zeros());
    }

    #[test]
    fn touch_idle_time() {
        let mut touch = TouchTracker::default();
        assert_eq!(touch.idle_for(1.0), None);
        touch.update(true, na::Vector2::zeros(), 1.0);
        touch.update(false, na::Vector2::zeros(), 1.5);
        assert_relative_eq!(touch.idle_for(1.5).unwrap(), 0.5);
    }

    #[test]
    fn accumulation_never_leaves_limits() {
        let limits = AxisLimits::new(0.25, 1.0, 0.4);
        let mut axis = OffsetAxis::new(0.4);
        for _ in 0..100 {
            let value = axis.accumulate(0.3, 0.5, &limits);
            assert!((limits.min..=limits.max).contains(&value));
        }
        assert_relative_eq!(axis.value, 1.0);
        for _ in 0..100 {
            let value = axis.accumulate(-0.7, 0.5, &limits);
            assert!((limits.min..=limits.max).contains(&value));
        }
        assert_relative_eq!(axis.value, 0.25);
    }

    #[test]
    fn idle_decay_reaches_default() {
        let mut axis = OffsetAxis::new(1.0);
        let tick = 1.0 / 60.0;
        let mut ticks = 0;
        while axis.value != 0.4 {
            axis.decay_towards(0.4, 2.0, tick, 0.001);
            ticks += 1;
            assert!(ticks < 400, "decay did not settle");
        }
        assert_eq!(axis.value, 0.4);
    }

    #[test]
    fn decay_is_monotonic() {
        let mut axis = OffsetAxis::new(-0.3);
        let mut previous = axis.value;
        for _ in 0..50 {
            let value = axis.decay_towards(0.0, 2.0, 1.0 / 60.0, 0.001);
            assert!(value >= previous);
            assert!(value <= 0.0);
            previous = value;
        }
    }

    #[test]
    fn long_frame_does_not_overshoot() {
        let mut axis = OffsetAxis::new(1.0);
        axis.decay_towards(0.4, 2.0, 5.0, 0.001);
        assert_eq!(axis.value, 0.4);
    }
}
