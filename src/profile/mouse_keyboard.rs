//! Mouse and keyboard driving the head and both controllers.
//!
//! Meant for dual controller mode with continuous locomotion:
//!
//! * mouse moves the view, wheel extends the right arm
//! * right mouse reaches for the backpack, left mouse is the right trigger
//! * middle mouse or the menu key is application menu
//! * WASD is the left trackpad, arrows and side buttons the right one
//! * toggle key swaps the left hand between rest and support positions
//! * crouch key toggles crouching

use nalgebra as na;
use serde::Serialize;
use tracing::*;

use super::{advance_clock, rate_factor, RemapProfile};
use crate::{
    configuration::MouseKeyboardConfig,
    gesture::{OffsetAxis, Toggle},
    input::{InputSnapshot, Key},
    math::{self, EulerAngles},
    output::{OutputCommand, PRIMARY, SECONDARY},
};

#[derive(Debug, Clone, Serialize)]
pub struct MouseKeyboardState {
    pub timestamp: f64,
    started_at: f64,
    offset_x: OffsetAxis,
    offset_y: OffsetAxis,
    offset_z: OffsetAxis,
    /// orientation the hands follow, trails the head
    forward: EulerAngles,
    grabbing: bool,
    crouch: Toggle,
    hand_toggle: Toggle,
    last_activity: Option<f64>,
    last_output: OutputCommand,
}

impl MouseKeyboardState {
    pub fn is_crouching(&self) -> bool {
        self.crouch.is_on()
    }

    pub fn is_grabbing(&self) -> bool {
        self.grabbing
    }

    pub fn hand_offset(&self) -> na::Vector3<f32> {
        na::Vector3::new(self.offset_x.value, self.offset_y.value, self.offset_z.value)
    }

    pub fn forward(&self) -> EulerAngles {
        self.forward
    }
}

#[derive(Debug, Clone, Default)]
pub struct MouseKeyboardProfile {
    config: MouseKeyboardConfig,
}

impl MouseKeyboardProfile {
    pub fn new(config: MouseKeyboardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MouseKeyboardConfig {
        &self.config
    }

    /// Returns the orientation the hands should follow this tick.
    fn update_hand_offset(
        &self,
        state: &mut MouseKeyboardState,
        input: &InputSnapshot,
        head_orientation: EulerAngles,
        delta_time: f64,
    ) -> EulerAngles {
        let config = &self.config;
        let mut target = head_orientation;

        state.offset_z.value -= input.mouse.wheel * config.wheel_scale * delta_time as f32;

        if input.mouse.right {
            let t = rate_factor(config.grab_rate, delta_time);
            state.offset_x.value = math::lerp(state.offset_x.value, config.grab_offset.x, t);
            state.offset_y.value = math::lerp(state.offset_y.value, config.grab_offset.y, t);
            state.offset_z.value = math::lerp(state.offset_z.value, config.grab_offset.z, t);
            target.roll = config.grab_roll_degrees.to_radians();
            if !state.grabbing {
                debug!("Reaching for backpack");
            }
            state.grabbing = true;
        } else if state.grabbing {
            state.offset_x.value = 0.0;
            state.offset_y.value = 0.0;
            state.offset_z.value = config.release_offset_z;
            state.grabbing = false;
        } else {
            state.offset_x.clamp(&config.offset_x);
            state.offset_y.clamp(&config.offset_y);
            state.offset_z.clamp(&config.offset_z);
        }

        let now = input.time;
        let wheel_moving = input.mouse.wheel != 0.0;
        let active = input.mouse.left || state.grabbing || wheel_moving;
        if active {
            state.last_activity = Some(now);
        }
        let idle_for = now - state.last_activity.unwrap_or(state.started_at);
        if !active && idle_for > config.idle_timeout {
            let delta_time = delta_time as f32;
            let (rate, snap) = (config.idle_decay_rate, config.snap_epsilon);
            state.offset_x.decay_towards(config.offset_x.default, rate, delta_time, snap);
            state.offset_y.decay_towards(config.offset_y.default, rate, delta_time, snap);
        }

        target
    }
}

impl RemapProfile for MouseKeyboardProfile {
    type State = MouseKeyboardState;

    fn name(&self) -> &'static str {
        "mouse_keyboard"
    }

    fn start(&self, now: f64) -> MouseKeyboardState {
        MouseKeyboardState {
            timestamp: now,
            started_at: now,
            offset_x: OffsetAxis::default(),
            offset_y: OffsetAxis::default(),
            offset_z: OffsetAxis::default(),
            forward: EulerAngles::default(),
            grabbing: false,
            crouch: Toggle::default(),
            hand_toggle: Toggle::default(),
            last_activity: None,
            last_output: OutputCommand::default(),
        }
    }

    fn tick(
        &self,
        mut state: MouseKeyboardState,
        input: &InputSnapshot,
    ) -> (MouseKeyboardState, OutputCommand) {
        let Some(delta_time) = advance_clock(&mut state.timestamp, input.time) else {
            let output = state.last_output;
            return (state, output);
        };
        let config = &self.config;
        let keys = &config.keys;
        let keyboard = &input.keyboard;
        let mouse = &input.mouse;
        let mut output = state.last_output;

        // right trackpad from arrows and mouse side buttons
        let touch_y = if mouse.forward || keyboard.key_down(Key::UpArrow) {
            1.0
        } else if mouse.back || keyboard.key_down(Key::DownArrow) {
            -1.0
        } else {
            0.0
        };
        let touch_x = if keyboard.key_down(Key::LeftArrow) {
            -1.0
        } else if keyboard.key_down(Key::RightArrow) {
            1.0
        } else {
            0.0
        };
        output.controllers[PRIMARY].trackpad = na::Vector2::new(touch_x, touch_y);

        // left trackpad from WASD
        let walk = na::Vector2::new(keyboard.axis(Key::A, Key::D), keyboard.axis(Key::S, Key::W));
        let walking = walk != na::Vector2::zeros();
        output.two_controllers = true;
        let left = &mut output.controllers[SECONDARY];
        left.trackpad = walk;
        left.buttons.trackpad_touch = walking;
        left.buttons.trackpad_click = walking;

        let head_orientation = output.head.orientation;
        let target = self.update_hand_offset(&mut state, input, head_orientation, delta_time);
        state.forward = state
            .forward
            .move_towards(target, config.follow_rate * delta_time as f32);

        // head height and crouch
        if keyboard.key_pressed(keys.crouch) {
            let crouching = state.crouch.flip();
            debug!(crouching, "Crouch toggled");
        }
        let head_height = if state.crouch.is_on() {
            config.crouch_height
        } else {
            0.0
        };
        output.overrides.head_position = true;
        output.head.position = na::Vector3::new(
            0.0,
            math::lerp(
                output.head.position.y,
                head_height,
                rate_factor(config.crouch_rate, delta_time),
            ),
            0.0,
        );

        // mouse look, x turns about the vertical axis
        output.overrides.head_orientation = true;
        output.head.orientation.pitch -= mouse.delta_x * config.mouse_sensitivity;
        output.head.orientation.roll -= mouse.delta_y * config.mouse_sensitivity;

        let hand_roll = config.hand_roll_degrees.to_radians();
        output.overrides.controller_orientation = true;
        let mut aim = state.forward;
        aim.roll += hand_roll;
        let right_orientation = output.controllers[PRIMARY]
            .pose
            .orientation
            .lerp(aim, config.orientation_smoothing);

        output.overrides.controller_position = true;
        let offset = math::rotate_vector(state.forward, state.hand_offset());
        let pivot = math::rotate_vector(state.forward, config.pivot);
        let mut desired = pivot + offset;
        desired.y += head_height;

        let smoothing = rate_factor(config.position_smoothing, delta_time);
        let right = &mut output.controllers[PRIMARY];
        right.pose.orientation = right_orientation;
        right.pose.position = math::lerp_vector(right.pose.position, desired, smoothing);

        // left hand
        if keyboard.key_pressed(keys.hand_toggle) {
            let supporting = state.hand_toggle.flip();
            debug!(supporting, "Left hand toggled");
        }
        let mut left_local = config.left_hand_offset;
        if keyboard.key_down(keys.hand_forward) {
            left_local.z -= config.left_hand_reach;
        } else if keyboard.key_down(keys.hand_backward) {
            left_local.z += config.left_hand_reach;
        }
        let desired_left = if state.hand_toggle.is_on() || mouse.right {
            desired + math::rotate_vector(state.forward, left_local)
        } else {
            let rest = config.left_hand_rest + na::Vector3::new(0.0, head_height, 0.0);
            math::rotate_vector(state.forward, rest)
        };

        let left = &mut output.controllers[SECONDARY];
        left.pose.position = math::lerp_vector(left.pose.position, desired_left, smoothing);
        left.pose.orientation = right_orientation;
        left.pose.orientation.roll -= hand_roll;
        left.set_trigger(keyboard.key_down(keys.trigger));

        let right = &mut output.controllers[PRIMARY];
        right.buttons.system = keyboard.key_down(keys.system);
        right.buttons.application_menu = keyboard.key_down(keys.menu) || mouse.middle;
        right.buttons.trackpad_click =
            !state.grabbing && (mouse.forward || mouse.back || touch_x != 0.0);
        right.buttons.trackpad_touch = true;
        right.buttons.grip = keyboard.key_down(keys.grip);
        right.set_trigger(mouse.left);

        state.last_output = output;
        (state, output)
    }
}
