//! GearVR controller as a right hand.
//!
//! * rotate the controller to move and rotate the hand
//! * swipe the trackpad to extend the arm
//! * double-click trackpad down to crouch
//! * back is grip, double-click back is system
//! * trackpad centre click is application menu

use nalgebra as na;
use serde::Serialize;
use tracing::*;

use super::{advance_clock, rate_factor, RemapProfile};
use crate::{
    configuration::GearVrConfig,
    gesture::{ButtonEdge, DoubleClick, Edge, HoldTimer, Hysteresis, OffsetAxis, Toggle, TouchTracker},
    input::{InputSnapshot, Pose},
    math::{self, EulerAngles},
    output::{OutputCommand, PRIMARY},
};

#[derive(Debug, Clone, Serialize)]
pub struct GearVrState {
    pub timestamp: f64,
    started_at: f64,
    touch: TouchTracker,
    click: bool,
    click_hold: HoldTimer,
    down_click: bool,
    down_double: DoubleClick,
    crouch: Toggle,
    back: ButtonEdge,
    back_double: DoubleClick,
    system_active: bool,
    trigger: Hysteresis,
    arm_x: OffsetAxis,
    arm_y: OffsetAxis,
    arm_z: OffsetAxis,
    last_output: OutputCommand,
}

impl GearVrState {
    pub fn is_crouching(&self) -> bool {
        self.crouch.is_on()
    }

    /// Hand offset from the arm pivot in controller space.
    pub fn arm_offset(&self) -> na::Vector3<f32> {
        na::Vector3::new(self.arm_x.value, self.arm_y.value, -self.arm_z.value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GearVrProfile {
    config: GearVrConfig,
}

impl GearVrProfile {
    pub fn new(config: GearVrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GearVrConfig {
        &self.config
    }

    /// Trackpad click, down-zone double click and centre click.
    /// Returns whether the centre of the trackpad was clicked.
    fn update_trackpad_click(
        &self,
        state: &mut GearVrState,
        clicking: bool,
        touch: na::Vector2<f32>,
        now: f64,
        delta_time: f64,
    ) -> bool {
        let config = &self.config;
        if clicking {
            // the down zone only becomes a plain click once the double click gap passed
            if (!state.click && state.click_hold.held_for() > config.click_hold_gap)
                || touch.y > config.down_zone
            {
                state.click = true;
            }
            state.click_hold.update(true, delta_time);
            if !state.down_click && touch.y < config.down_zone {
                if state.down_double.press(now, config.down_double_click_window) {
                    let crouching = state.crouch.flip();
                    debug!(crouching, "Down double click");
                }
                state.down_click = true;
            }
        } else {
            state.click_hold.update(false, delta_time);
            state.click = false;
            state.down_click = false;
        }

        let center = config.center_zone;
        if state.click && touch.x.abs() < center && touch.y.abs() < center {
            state.click = false;
            true
        } else {
            false
        }
    }

    fn update_back(&self, state: &mut GearVrState, back_down: bool, now: f64) {
        match state.back.update(back_down) {
            Edge::Pressed => {
                if state
                    .back_double
                    .press(now, self.config.back_double_click_window)
                {
                    debug!("Back double click");
                    state.system_active = true;
                }
            }
            // measure the double click window from the last held tick
            Edge::Held => state.back_double.mark(now),
            Edge::Released => (),
            Edge::Idle => state.system_active = false,
        }
    }

    fn update_arm(&self, state: &mut GearVrState, drag: na::Vector2<f32>, now: f64, delta_time: f64) {
        let config = &self.config;
        if state.touch.is_touching() {
            state.arm_x.accumulate(drag.x, config.touch_scale_x, &config.arm_x);
            state.arm_z.accumulate(drag.y, config.touch_scale_z, &config.arm_z);
            state.arm_y.clamp(&config.arm_y);
            return;
        }

        let idle_for = state
            .touch
            .idle_for(now)
            .unwrap_or(now - state.started_at);
        if idle_for > config.idle_timeout {
            let delta_time = delta_time as f32;
            let (rate, snap) = (config.idle_decay_rate, config.snap_epsilon);
            state.arm_x.decay_towards(config.arm_x.default, rate, delta_time, snap);
            state.arm_y.decay_towards(config.arm_y.default, rate, delta_time, snap);
            state.arm_z.decay_towards(config.arm_z.default, rate, delta_time, snap);
        }
    }

    fn hand_orientation(
        &self,
        touching: bool,
        head_position: na::Vector3<f32>,
        head_rotation: EulerAngles,
        hand_position: na::Vector3<f32>,
        controller_rotation: EulerAngles,
    ) -> EulerAngles {
        let config = &self.config;
        if !touching {
            let mut rotation = controller_rotation;
            rotation.roll += config.idle_roll_degrees.to_radians();
            return rotation;
        }

        // aim from the hand through the right eye
        let right_eye = head_position
            + math::rotate_vector(head_rotation, na::Vector3::new(config.eye_offset, 0.0, 0.0));
        let look_direction = math::normalize_or_zero(right_eye - hand_position);
        let local_up = math::rotate_vector(controller_rotation, na::Vector3::y());
        let mut rotation = match math::look_rotation(look_direction, local_up) {
            Ok(rotation) => math::quaternion_to_euler(&rotation),
            Err(err) => {
                debug!(%err, "Keeping raw controller rotation");
                controller_rotation
            }
        };
        rotation.roll += config.touch_roll_degrees.to_radians();
        rotation
    }
}

impl RemapProfile for GearVrProfile {
    type State = GearVrState;

    fn name(&self) -> &'static str {
        "gearvr"
    }

    fn start(&self, now: f64) -> GearVrState {
        let config = &self.config;
        GearVrState {
            timestamp: now,
            started_at: now,
            touch: TouchTracker::default(),
            click: false,
            click_hold: HoldTimer::default(),
            down_click: false,
            down_double: DoubleClick::default(),
            crouch: Toggle::default(),
            back: ButtonEdge::default(),
            back_double: DoubleClick::default(),
            system_active: false,
            trigger: Hysteresis::default(),
            arm_x: OffsetAxis::new(config.arm_x.default),
            arm_y: OffsetAxis::new(config.arm_y.default),
            arm_z: OffsetAxis::new(config.arm_z.default),
            last_output: OutputCommand::default(),
        }
    }

    fn tick(&self, mut state: GearVrState, input: &InputSnapshot) -> (GearVrState, OutputCommand) {
        let now = input.time;
        let Some(delta_time) = advance_clock(&mut state.timestamp, now) else {
            let output = state.last_output;
            return (state, output);
        };
        let config = &self.config;
        let mut output = state.last_output;

        let mut head_position = input.head.position;
        if state.crouch.is_on() {
            head_position.y = config.crouch_height;
        }
        let head_rotation = input.head.orientation;
        let controller_rotation = input.controller.orientation;

        let touching = input.buttons.trackpad_touch;
        let touch = input.trackpad();
        let drag = state.touch.update(touching, touch, now);

        let center_click =
            self.update_trackpad_click(&mut state, input.buttons.trackpad_click, touch, now, delta_time);
        self.update_back(&mut state, input.buttons.back, now);
        self.update_arm(&mut state, drag, now, delta_time);

        let arm_pivot = if touching {
            config.arm_local_position
        } else {
            config.arm_local_position_steady
        };
        let hand_pivot = head_position + math::rotate_vector(head_rotation, arm_pivot);
        let hand_position = hand_pivot + math::rotate_vector(controller_rotation, state.arm_offset());
        let hand_rotation = self.hand_orientation(
            touching,
            head_position,
            head_rotation,
            hand_position,
            controller_rotation,
        );

        output.overrides.controller_orientation = true;
        output.overrides.controller_position = true;
        output.overrides.head_position = true;
        output.two_controllers = false;

        let head_to_display = if config.arcore_correction {
            config.head_to_display_distance
        } else {
            0.0
        };
        output.head = Pose::new(
            head_position
                - math::rotate_vector(head_rotation, na::Vector3::new(0.0, 0.0, head_to_display)),
            head_rotation,
        );

        let trigger_pulled = match input.trigger_value {
            Some(value) => state
                .trigger
                .update(value, config.trigger_activate, config.trigger_deactivate),
            None => input.buttons.trigger,
        };

        let hand = &mut output.controllers[PRIMARY];
        hand.pose.orientation = hand_rotation;
        hand.pose.position = math::lerp_vector(
            hand.pose.position,
            hand_position,
            rate_factor(config.position_smoothing, delta_time),
        );
        hand.trackpad = if touching { touch } else { na::Vector2::zeros() };
        hand.buttons.trackpad_touch = touching;
        hand.buttons.trackpad_click = state.click;
        hand.buttons.application_menu = center_click;
        hand.buttons.grip = input.buttons.back || input.keyboard.key_down(config.grip_key);
        hand.buttons.system = state.system_active;
        hand.set_trigger(trigger_pulled);
        if let Some(value) = input.trigger_value {
            hand.trigger_value = value;
        }

        state.last_output = output;
        (state, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ControllerButtons;
    use approx::assert_relative_eq;

    const TICK: f64 = 1.0 / 60.0;

    struct Rig {
        profile: GearVrProfile,
        state: GearVrState,
        time: f64,
    }

    impl Rig {
        fn new() -> Self {
            let profile = GearVrProfile::default();
            let state = profile.start(0.0);
            Self {
                profile,
                state,
                time: 0.0,
            }
        }

        fn step(&mut self, input: InputSnapshot) -> OutputCommand {
            self.step_after(TICK, input)
        }

        fn step_after(&mut self, delta: f64, mut input: InputSnapshot) -> OutputCommand {
            self.time += delta;
            input.time = self.time;
            let (state, output) = self.profile.tick(self.state.clone(), &input);
            self.state = state;
            output
        }

        fn idle(&mut self) -> OutputCommand {
            self.step(InputSnapshot::default())
        }
    }

    fn touch_at(x: f32, y: f32) -> InputSnapshot {
        InputSnapshot {
            buttons: ControllerButtons {
                trackpad_touch: true,
                ..Default::default()
            },
            trackpad: [x, y],
            ..Default::default()
        }
    }

    fn click_at(x: f32, y: f32) -> InputSnapshot {
        let mut input = touch_at(x, y);
        input.buttons.trackpad_click = true;
        input
    }

    fn back(down: bool) -> InputSnapshot {
        InputSnapshot {
            buttons: ControllerButtons {
                back: down,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn stalled_clock_repeats_output() {
        let mut rig = Rig::new();
        let first = rig.step(touch_at(0.2, 0.3));
        let state_before = rig.state.timestamp;
        let repeated = rig.step_after(0.0, touch_at(-0.9, -0.9));
        assert_eq!(first, repeated);
        assert_eq!(rig.state.timestamp, state_before);
    }

    #[test]
    fn overrides_are_enabled() {
        let mut rig = Rig::new();
        let output = rig.idle();
        assert!(output.overrides.controller_position);
        assert!(output.overrides.controller_orientation);
        assert!(output.overrides.head_position);
        assert!(!output.overrides.head_orientation);
        assert!(!output.two_controllers);
    }

    #[test]
    fn double_click_down_toggles_crouch() {
        let mut rig = Rig::new();
        rig.step(click_at(0.0, -0.9));
        rig.step(touch_at(0.0, -0.9));
        rig.step_after(0.1, click_at(0.0, -0.9));
        assert!(rig.state.is_crouching());
        let output = rig.idle();
        assert_relative_eq!(output.head.position.y, -0.7);

        rig.step_after(1.0, click_at(0.0, -0.9));
        rig.step(touch_at(0.0, -0.9));
        rig.step_after(0.1, click_at(0.0, -0.9));
        assert!(!rig.state.is_crouching());
    }

    #[test]
    fn slow_clicks_do_not_crouch() {
        let mut rig = Rig::new();
        rig.step(click_at(0.0, -0.9));
        rig.step(touch_at(0.0, -0.9));
        rig.step_after(0.5, click_at(0.0, -0.9));
        assert!(!rig.state.is_crouching());
    }

    #[test]
    fn center_click_is_menu() {
        let mut rig = Rig::new();
        let output = rig.step(click_at(0.1, 0.1));
        assert!(output.primary().buttons.application_menu);
        assert!(!output.primary().buttons.trackpad_click);
    }

    #[test]
    fn edge_click_is_trackpad_click() {
        let mut rig = Rig::new();
        let output = rig.step(click_at(0.9, 0.0));
        assert!(output.primary().buttons.trackpad_click);
        assert!(!output.primary().buttons.application_menu);
    }

    #[test]
    fn down_zone_click_waits_for_hold_gap() {
        let mut rig = Rig::new();
        let output = rig.step(click_at(0.0, -0.9));
        assert!(!output.primary().buttons.trackpad_click);
        for _ in 0..12 {
            rig.step(click_at(0.0, -0.9));
        }
        let output = rig.step(click_at(0.0, -0.9));
        assert!(output.primary().buttons.trackpad_click);
    }

    #[test]
    fn back_is_grip_and_double_back_is_system() {
        let mut rig = Rig::new();
        let output = rig.step(back(true));
        assert!(output.primary().buttons.grip);
        assert!(!output.primary().buttons.system);
        rig.step(back(false));
        let output = rig.step_after(0.2, back(true));
        assert!(output.primary().buttons.system);
        // stays up through the release tick
        let output = rig.step(back(false));
        assert!(output.primary().buttons.system);
        let output = rig.step(back(false));
        assert!(!output.primary().buttons.system);
    }

    #[test]
    fn slow_back_clicks_are_not_system() {
        let mut rig = Rig::new();
        rig.step(back(true));
        rig.step(back(false));
        let output = rig.step_after(0.8, back(true));
        assert!(!output.primary().buttons.system);
    }

    #[test]
    fn keyboard_grip() {
        let mut rig = Rig::new();
        let mut input = InputSnapshot::default();
        input.keyboard.down.insert(crate::input::Key::R);
        assert!(rig.step(input).primary().buttons.grip);
    }

    #[test]
    fn swipe_extends_arm_within_limits() {
        let mut rig = Rig::new();
        let mut y = -1.0;
        rig.step(touch_at(0.0, y));
        for _ in 0..5 {
            for _ in 0..20 {
                y += 0.1;
                rig.step(touch_at(0.0, y));
            }
            // lift and swipe again
            rig.idle();
            y = -1.0;
            rig.step(touch_at(0.0, y));
        }
        let offset = rig.state.arm_offset();
        assert_relative_eq!(offset.z, -1.0);
    }

    #[test]
    fn sideways_swipe_is_clamped() {
        let mut rig = Rig::new();
        for (from, to) in [(-1.0, 1.0), (1.0, -1.0)] {
            for _ in 0..20 {
                rig.step(touch_at(from, 0.0));
                rig.step(touch_at(to, 0.0));
                rig.idle();
                let offset = rig.state.arm_offset();
                assert!((-0.3..=0.3).contains(&offset.x));
            }
        }
        assert_relative_eq!(rig.state.arm_offset().x, -0.3);
    }

    #[test]
    fn arm_returns_to_default_when_idle() {
        let mut rig = Rig::new();
        rig.step(touch_at(0.0, -1.0));
        rig.step(touch_at(0.0, 1.0));
        assert_relative_eq!(rig.state.arm_offset().z, -1.0);
        let mut ticks = 0;
        while rig.state.arm_offset().z != -0.4 {
            rig.idle();
            ticks += 1;
            assert!(ticks < 600, "arm never settled");
        }
        assert_eq!(rig.state.arm_offset(), na::Vector3::new(-0.1, 0.0, -0.4));
    }

    #[test]
    fn idle_hand_settles_at_steady_pivot() {
        let mut rig = Rig::new();
        let mut output = rig.idle();
        for _ in 0..60 {
            output = rig.idle();
        }
        // steady pivot (0.2, -0.25, -0.1) plus default arm (-0.1, 0.0, -0.4)
        let position = output.primary().pose.position;
        assert_relative_eq!(position.x, 0.1, epsilon = 1e-4);
        assert_relative_eq!(position.y, -0.25, epsilon = 1e-4);
        assert_relative_eq!(position.z, -0.5, epsilon = 1e-4);
        assert_relative_eq!(
            output.primary().pose.orientation.roll,
            45_f32.to_radians(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn touch_aims_through_right_eye() {
        let mut rig = Rig::new();
        rig.step(touch_at(0.0, 0.0));
        let output = rig.step(touch_at(0.0, 0.0));
        let hand = output.primary();
        let mut aim = hand.pose.orientation;
        aim.roll -= 60_f32.to_radians();
        let forward = math::rotate_vector(aim, na::Vector3::z());

        let hand_target = na::Vector3::new(0.2, -0.15, -0.1) + rig.state.arm_offset();
        let eye = na::Vector3::new(0.023, 0.0, 0.0);
        let expected = (eye - hand_target).normalize();
        assert_relative_eq!(forward.x, expected.x, epsilon = 1e-4);
        assert_relative_eq!(forward.y, expected.y, epsilon = 1e-4);
        assert_relative_eq!(forward.z, expected.z, epsilon = 1e-4);
    }

    #[test]
    fn arcore_correction_moves_head() {
        let profile = GearVrProfile::new(GearVrConfig {
            arcore_correction: true,
            ..Default::default()
        });
        let state = profile.start(0.0);
        let (_, output) = profile.tick(state, &InputSnapshot::at(TICK));
        assert_relative_eq!(output.head.position.z, 0.25);
    }

    #[test]
    fn analog_trigger_uses_hysteresis() {
        let mut rig = Rig::new();
        let analog = |value: f32| InputSnapshot {
            trigger_value: Some(value),
            ..Default::default()
        };
        assert!(!rig.step(analog(0.5)).primary().trigger);
        assert!(rig.step(analog(0.8)).primary().trigger);
        let output = rig.step(analog(0.5));
        assert!(output.primary().trigger);
        assert_relative_eq!(output.primary().trigger_value, 0.5);
        assert!(!rig.step(analog(0.1)).primary().trigger);
    }

    #[test]
    fn trackpad_axis_only_while_touched() {
        let mut rig = Rig::new();
        let output = rig.step(touch_at(0.4, -0.2));
        assert_eq!(output.primary().trackpad, na::Vector2::new(0.4, -0.2));
        assert!(output.primary().buttons.trackpad_touch);
        let output = rig.idle();
        assert_eq!(output.primary().trackpad, na::Vector2::zeros());
        assert!(!output.primary().buttons.trackpad_touch);
    }
}
