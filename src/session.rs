use tracing::*;

use crate::{
    configuration::{AppConfig, ProfileKind},
    input::InputSnapshot,
    output::OutputCommand,
    profile::{GearVrProfile, MouseKeyboardProfile, RemapProfile},
};

/// Host facing side of a profile: call once per poll tick.
pub trait InputRemapper {
    fn profile_name(&self) -> &'static str;

    fn poll(&mut self, input: &InputSnapshot) -> OutputCommand;

    /// Drops all per-session state. The next poll starts a new session.
    fn reset(&mut self);
}

/// Owns a profile and its state between ticks.
#[derive(Debug)]
pub struct Session<P: RemapProfile> {
    profile: P,
    state: Option<P::State>,
}

impl<P: RemapProfile> Session<P> {
    pub fn new(profile: P) -> Self {
        Self {
            profile,
            state: None,
        }
    }

    pub fn state(&self) -> Option<&P::State> {
        self.state.as_ref()
    }

    pub fn profile(&self) -> &P {
        &self.profile
    }
}

impl<P: RemapProfile> InputRemapper for Session<P> {
    fn profile_name(&self) -> &'static str {
        self.profile.name()
    }

    fn poll(&mut self, input: &InputSnapshot) -> OutputCommand {
        let state = match self.state.take() {
            Some(state) => state,
            None => {
                info!(profile = self.profile.name(), time = input.time, "Starting session");
                self.profile.start(input.time)
            }
        };
        let (state, output) = self.profile.tick(state, input);
        self.state = Some(state);
        output
    }

    fn reset(&mut self) {
        self.state = None;
    }
}

pub fn remapper_from_config(config: &AppConfig) -> Box<dyn InputRemapper> {
    match config.profile {
        ProfileKind::Gearvr => Box::new(Session::new(GearVrProfile::new(config.gearvr.clone()))),
        ProfileKind::MouseKeyboard => Box::new(Session::new(MouseKeyboardProfile::new(
            config.mouse_keyboard.clone(),
        ))),
    }
}
