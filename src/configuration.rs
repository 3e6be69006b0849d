use config::Config;
use nalgebra as na;
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};
use tracing::*;

use crate::{gesture::AxisLimits, input::Key};

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    #[default]
    Gearvr,
    MouseKeyboard,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub profile: ProfileKind,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub gearvr: GearVrConfig,
    #[serde(default)]
    pub mouse_keyboard: MouseKeyboardConfig,
    #[serde(default)]
    pub host: HostConfig,
}

impl AppConfig {
    pub fn load_config(config: &Option<PathBuf>) -> anyhow::Result<Self> {
        let settings = if let Some(config) = config {
            info!("Using configuration from {:?}", config);
            Config::builder()
                .add_source(config::Environment::with_prefix("APP").separator("__"))
                .add_source(config::File::with_name(
                    config
                        .to_str()
                        .ok_or_else(|| anyhow::anyhow!("Failed to convert path"))?,
                ))
                .build()?
        } else {
            info!("Using dev configuration");
            Config::builder()
                .add_source(config::Environment::with_prefix("APP").separator("__"))
                .add_source(config::File::with_name("config/settings"))
                .add_source(config::File::with_name("config/dev_settings").required(false))
                .build()?
        };

        Ok(settings.try_deserialize()?)
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ReplayConfig {
    pub tick_rate_hz: f64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { tick_rate_hz: 60.0 }
    }
}

impl ReplayConfig {
    /// Interval between paced ticks.
    pub fn tick_period(&self) -> anyhow::Result<Duration> {
        let rate = self.tick_rate_hz;
        if !rate.is_finite() || rate <= 0.0 {
            anyhow::bail!("tick rate must be a positive number, got {}", rate);
        }
        let period = Duration::try_from_secs_f64(rate.recip())?;
        if period.is_zero() {
            anyhow::bail!("tick rate {} is too high to pace", rate);
        }
        Ok(period)
    }
}

/// Global position offset the host adds to every tracked device.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct HostConfig {
    pub enable_offset_position: bool,
    pub offset_position: na::Vector3<f32>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            enable_offset_position: false,
            offset_position: na::Vector3::zeros(),
        }
    }
}

/// Single GearVR controller acting as the right hand.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GearVrConfig {
    /// arm pivot relative to the head while the trackpad is touched
    pub arm_local_position: na::Vector3<f32>,
    /// arm pivot relative to the head while the trackpad is idle
    pub arm_local_position_steady: na::Vector3<f32>,
    pub arm_x: AxisLimits,
    pub arm_y: AxisLimits,
    pub arm_z: AxisLimits,
    pub touch_scale_x: f32,
    pub touch_scale_z: f32,
    /// seconds without touch before the arm drifts back
    pub idle_timeout: f64,
    pub idle_decay_rate: f32,
    pub snap_epsilon: f32,
    pub position_smoothing: f32,
    pub crouch_height: f32,
    pub arcore_correction: bool,
    pub head_to_display_distance: f32,
    pub eye_offset: f32,
    /// trackpad y below this counts as the down button
    pub down_zone: f32,
    /// half width of the square trackpad centre zone
    pub center_zone: f32,
    pub click_hold_gap: f64,
    pub down_double_click_window: f64,
    pub back_double_click_window: f64,
    pub touch_roll_degrees: f32,
    pub idle_roll_degrees: f32,
    pub trigger_activate: f32,
    pub trigger_deactivate: f32,
    pub grip_key: Key,
}

impl Default for GearVrConfig {
    fn default() -> Self {
        Self {
            arm_local_position: na::Vector3::new(0.2, -0.15, -0.1),
            arm_local_position_steady: na::Vector3::new(0.2, -0.25, -0.1),
            arm_x: AxisLimits::new(-0.3, 0.3, -0.1),
            arm_y: AxisLimits::new(-0.3, 0.3, 0.0),
            arm_z: AxisLimits::new(0.25, 1.0, 0.4),
            touch_scale_x: 0.25,
            touch_scale_z: 0.5,
            idle_timeout: 0.2,
            idle_decay_rate: 2.0,
            snap_epsilon: 0.001,
            position_smoothing: 30.0,
            crouch_height: -0.7,
            arcore_correction: false,
            head_to_display_distance: -0.25,
            eye_offset: 0.023,
            down_zone: -0.75,
            center_zone: 0.7,
            click_hold_gap: 0.15,
            down_double_click_window: 0.3,
            back_double_click_window: 0.5,
            touch_roll_degrees: 60.0,
            idle_roll_degrees: 45.0,
            trigger_activate: 0.7,
            trigger_deactivate: 0.3,
            grip_key: Key::R,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct KeyBindings {
    pub trigger: Key,
    pub system: Key,
    pub menu: Key,
    pub grip: Key,
    pub hand_toggle: Key,
    pub hand_forward: Key,
    pub hand_backward: Key,
    pub crouch: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            trigger: Key::E,
            system: Key::Q,
            menu: Key::T,
            grip: Key::R,
            hand_toggle: Key::C,
            hand_forward: Key::F,
            hand_backward: Key::G,
            crouch: Key::LeftControl,
        }
    }
}

/// Mouse and keyboard driving the head and both controllers.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MouseKeyboardConfig {
    pub keys: KeyBindings,
    /// right hand pivot, placed near the right eye for aiming
    pub pivot: na::Vector3<f32>,
    /// offset the right hand reaches for while the right mouse button is held
    pub grab_offset: na::Vector3<f32>,
    pub grab_rate: f32,
    pub grab_roll_degrees: f32,
    /// z offset applied when the grab is released
    pub release_offset_z: f32,
    pub offset_x: AxisLimits,
    pub offset_y: AxisLimits,
    pub offset_z: AxisLimits,
    pub wheel_scale: f32,
    pub idle_timeout: f64,
    pub idle_decay_rate: f32,
    pub snap_epsilon: f32,
    pub mouse_sensitivity: f32,
    pub follow_rate: f32,
    pub orientation_smoothing: f32,
    pub position_smoothing: f32,
    pub crouch_height: f32,
    pub crouch_rate: f32,
    pub hand_roll_degrees: f32,
    pub left_hand_offset: na::Vector3<f32>,
    pub left_hand_reach: f32,
    pub left_hand_rest: na::Vector3<f32>,
}

impl Default for MouseKeyboardConfig {
    fn default() -> Self {
        Self {
            keys: KeyBindings::default(),
            pivot: na::Vector3::new(-0.0421, 0.0, -0.5),
            grab_offset: na::Vector3::new(0.2, 0.0, 0.2),
            grab_rate: 6.0,
            grab_roll_degrees: 180.0,
            release_offset_z: 0.15,
            offset_x: AxisLimits::new(-0.4, 0.4, 0.0),
            offset_y: AxisLimits::new(-0.4, 0.4, 0.0),
            offset_z: AxisLimits::new(-0.9, 0.4, 0.0),
            wheel_scale: 0.3,
            idle_timeout: 0.4,
            idle_decay_rate: 2.0,
            snap_epsilon: 0.001,
            mouse_sensitivity: 0.001,
            follow_rate: 8.0,
            orientation_smoothing: 0.2,
            position_smoothing: 30.0,
            crouch_height: -0.5,
            crouch_rate: 10.0,
            hand_roll_degrees: 58.0,
            left_hand_offset: na::Vector3::new(-0.04, -0.15, 0.0),
            left_hand_reach: 0.2,
            left_hand_rest: na::Vector3::new(-0.3, -0.2, -0.4),
        }
    }
}
