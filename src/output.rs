use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::input::Pose;

/// Which channels the host should take from the script instead of hardware.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overrides {
    pub head_position: bool,
    pub head_orientation: bool,
    pub controller_position: bool,
    pub controller_orientation: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalButtons {
    pub trackpad_touch: bool,
    pub trackpad_click: bool,
    pub grip: bool,
    pub system: bool,
    pub application_menu: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerOutput {
    pub pose: Pose,
    pub trackpad: na::Vector2<f32>,
    pub buttons: LogicalButtons,
    pub trigger: bool,
    pub trigger_value: f32,
}

impl Default for ControllerOutput {
    fn default() -> Self {
        Self {
            pose: Pose::default(),
            trackpad: na::Vector2::zeros(),
            buttons: LogicalButtons::default(),
            trigger: false,
            trigger_value: 0.0,
        }
    }
}

impl ControllerOutput {
    pub fn set_trigger(&mut self, pulled: bool) {
        self.trigger = pulled;
        self.trigger_value = if pulled { 1.0 } else { 0.0 };
    }
}

pub const PRIMARY: usize = 0;
pub const SECONDARY: usize = 1;

/// Everything a profile writes back to the host for one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputCommand {
    pub overrides: Overrides,
    pub head: Pose,
    pub two_controllers: bool,
    pub controllers: [ControllerOutput; 2],
}

impl OutputCommand {
    pub fn primary(&self) -> &ControllerOutput {
        &self.controllers[PRIMARY]
    }

    pub fn secondary(&self) -> &ControllerOutput {
        &self.controllers[SECONDARY]
    }
}
