use common::types::Percent;

use crate::{config::ClimberConfig, control::ramp::ProportionalRamp, peripheral::SpeedOutput};

/// Climbing winch and the control panel rotator, both ramped
pub struct Climber {
    winch: ProportionalRamp<Box<dyn SpeedOutput>>,
    rotator: ProportionalRamp<Box<dyn SpeedOutput>>,
}

impl Climber {
    pub fn new(
        winch: Box<dyn SpeedOutput>,
        rotator: Box<dyn SpeedOutput>,
        config: ClimberConfig,
    ) -> Self {
        Self {
            winch: ProportionalRamp::new(winch, config.winch_ramp_gain),
            rotator: ProportionalRamp::new(rotator, config.rotator_ramp_gain),
        }
    }

    pub fn set_winch(&mut self, speed: Percent) {
        self.winch.set_setpoint(speed);
    }

    pub fn set_rotator(&mut self, speed: Percent) {
        self.rotator.set_setpoint(speed);
    }

    pub fn winch(&self) -> Percent {
        self.winch.current()
    }

    pub fn rotator(&self) -> Percent {
        self.rotator.current()
    }

    pub fn stop(&mut self) {
        self.winch.stop();
        self.rotator.stop();
    }
}
