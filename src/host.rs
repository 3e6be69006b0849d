//! What the host ends up applying after honouring the override flags.

use serde::Serialize;

use crate::{
    configuration::HostConfig,
    input::{InputSnapshot, Pose},
    output::{OutputCommand, PRIMARY, SECONDARY},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedFrame {
    pub head: Pose,
    pub controllers: [Pose; 2],
}

pub fn resolve_frame(input: &InputSnapshot, output: &OutputCommand, host: &HostConfig) -> ResolvedFrame {
    let overrides = &output.overrides;

    let head = Pose {
        position: if overrides.head_position {
            output.head.position
        } else {
            input.head.position
        },
        orientation: if overrides.head_orientation {
            output.head.orientation
        } else {
            input.head.orientation
        },
    };

    let controller = |index: usize| {
        // only one physical controller, the second exists when the script drives it
        let scripted = index == PRIMARY || output.two_controllers;
        let script = &output.controllers[index].pose;
        Pose {
            position: if overrides.controller_position && scripted {
                script.position
            } else {
                input.controller.position
            },
            orientation: if overrides.controller_orientation && scripted {
                script.orientation
            } else {
                input.controller.orientation
            },
        }
    };

    let mut frame = ResolvedFrame {
        head,
        controllers: [controller(PRIMARY), controller(SECONDARY)],
    };
    if host.enable_offset_position {
        frame.head.position += host.offset_position;
        for controller in frame.controllers.iter_mut() {
            controller.position += host.offset_position;
        }
    }
    frame
}
