use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::math::EulerAngles;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: na::Vector3<f32>,
    #[serde(default)]
    pub orientation: EulerAngles,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: na::Vector3::zeros(),
            orientation: EulerAngles::default(),
        }
    }
}

impl Pose {
    pub fn new(position: na::Vector3<f32>, orientation: EulerAngles) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

/// Physical buttons of the handheld controller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerButtons {
    pub trackpad_touch: bool,
    pub trackpad_click: bool,
    pub trigger: bool,
    pub back: bool,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
pub enum Key {
    W,
    A,
    S,
    D,
    C,
    E,
    F,
    G,
    P,
    Q,
    R,
    T,
    Space,
    LeftControl,
    UpArrow,
    DownArrow,
    LeftArrow,
    RightArrow,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardState {
    /// keys held this tick
    pub down: BTreeSet<Key>,
    /// keys that went down since the previous tick
    pub pressed: BTreeSet<Key>,
}

impl KeyboardState {
    pub fn key_down(&self, key: Key) -> bool {
        self.down.contains(&key)
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// -1, 0 or 1 from a pair of opposing keys
    pub fn axis(&self, negative: Key, positive: Key) -> f32 {
        let positive = if self.key_down(positive) { 1.0 } else { 0.0 };
        let negative = if self.key_down(negative) { 1.0 } else { 0.0 };
        positive - negative
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseState {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
    /// side button 3
    pub back: bool,
    /// side button 4
    pub forward: bool,
    pub delta_x: f32,
    pub delta_y: f32,
    pub wheel: f32,
}

/// Everything the host exposes for one poll tick.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    /// wall clock seconds read at tick start
    pub time: f64,
    pub head: Pose,
    pub controller: Pose,
    pub buttons: ControllerButtons,
    /// analog trigger when the controller reports one
    pub trigger_value: Option<f32>,
    pub trackpad: [f32; 2],
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
}

impl InputSnapshot {
    pub fn at(time: f64) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }

    pub fn trackpad(&self) -> na::Vector2<f32> {
        na::Vector2::new(self.trackpad[0], self.trackpad[1])
    }
}
