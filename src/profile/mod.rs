pub mod gearvr;
pub mod mouse_keyboard;

use crate::{input::InputSnapshot, output::OutputCommand};

pub use gearvr::{GearVrProfile, GearVrState};
pub use mouse_keyboard::{MouseKeyboardProfile, MouseKeyboardState};

/// A per-tick remapping rule set.
///
/// `tick` is pure: everything carried between ticks lives in `State`.
pub trait RemapProfile {
    type State: Clone + std::fmt::Debug;

    fn name(&self) -> &'static str;

    /// State for a session that starts at wall clock `now`.
    fn start(&self, now: f64) -> Self::State;

    fn tick(&self, state: Self::State, input: &InputSnapshot) -> (Self::State, OutputCommand);
}

/// Seconds since the previous tick, or `None` when the clock did not advance.
pub(crate) fn advance_clock(timestamp: &mut f64, now: f64) -> Option<f64> {
    let delta_time = now - *timestamp;
    if delta_time > 0.0 {
        *timestamp = now;
        Some(delta_time)
    } else {
        None
    }
}

/// Lerp factor for a per-second rate, clamped so long frames do not overshoot.
pub(crate) fn rate_factor(rate: f32, delta_time: f64) -> f32 {
    (rate * delta_time as f32).clamp(0.0, 1.0)
}
