use common::{
    error::LogErrorExt,
    types::{Percent, Rpm},
};

use crate::{config::LauncherConfig, control::ramp::ProportionalRamp, peripheral::LaunchActuator};

/// Flywheel launcher. Open loop speed goes through a ramp so the wheel is not
/// slammed from rest, velocity commands go straight to the motor controller
pub struct Launcher {
    ramp: ProportionalRamp<Box<dyn LaunchActuator>>,
    config: LauncherConfig,
}

impl Launcher {
    pub fn new(actuator: Box<dyn LaunchActuator>, config: LauncherConfig) -> Self {
        Self {
            ramp: ProportionalRamp::new(actuator, config.ramp_gain),
            config,
        }
    }

    pub fn spin(&mut self, speed: Percent) {
        self.ramp.set_setpoint(speed);
    }

    /// Ramp down to rest
    pub fn zero(&mut self) {
        self.ramp.zero();
    }

    pub fn spin_velocity(&mut self, rpm: Rpm) {
        let native = rpm.0 * self.config.native_per_rpm;
        self.ramp
            .output_mut()
            .set_velocity(native)
            .log_error("Launcher velocity");

        // Open loop picks up from wherever closed loop left the wheel
        let measured = self.measured_output();
        self.ramp.reset_to(measured);
    }

    pub fn stop(&mut self) {
        self.ramp.stop();
    }

    pub fn velocity(&self) -> Rpm {
        Rpm(self.ramp.output().velocity() / self.config.native_per_rpm)
    }

    pub fn at_velocity(&self, target: Rpm, tolerance: Rpm) -> bool {
        (self.velocity().0 - target.0).abs() <= tolerance.0
    }

    pub fn measured_output(&self) -> Percent {
        self.ramp.output().output()
    }

    pub fn ramp_gain(&self) -> f64 {
        self.ramp.gain()
    }

    pub fn set_ramp_gain(&mut self, gain: f64) {
        self.ramp.set_gain(gain);
    }

    pub fn reset_ramp_gain(&mut self) {
        self.ramp.set_gain(self.config.ramp_gain);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        config::RobotConfig,
        peripheral::{
            launcher::DualMotorLauncher,
            sim::{FlywheelCommand, SimField, Wheel},
        },
    };

    const CONFIG: LauncherConfig = RobotConfig::DEFAULT.launcher;

    fn launcher(field: &SimField) -> Launcher {
        Launcher::new(
            Box::new(DualMotorLauncher::new(
                field.launch_motor(Wheel::Main, false),
                field.launch_motor(Wheel::Main, true),
            )),
            CONFIG,
        )
    }

    #[test]
    fn spin_ramps() {
        let field = SimField::new();
        let mut launcher = launcher(&field);

        launcher.spin(Percent::MAX_VAL);
        assert_eq!(launcher.measured_output(), Percent::new(CONFIG.ramp_gain));
        assert_eq!(
            field.with(|state| state.flywheel_command),
            FlywheelCommand::Output(CONFIG.ramp_gain)
        );
    }

    #[test]
    fn reaches_velocity() {
        let field = SimField::new();
        let mut launcher = launcher(&field);

        for _ in 0..100 {
            launcher.spin_velocity(Rpm(4000.0));
            field.step(Duration::from_millis(20));
        }

        assert!(launcher.at_velocity(Rpm(4000.0), Rpm(10.0)));
        assert!(!launcher.at_velocity(Rpm(5000.0), Rpm(100.0)));
    }

    #[test]
    fn open_loop_continues_from_closed_loop() {
        let field = SimField::new();
        let mut launcher = launcher(&field);

        for _ in 0..100 {
            launcher.spin_velocity(Rpm(4000.0));
            field.step(Duration::from_millis(20));
        }
        launcher.spin_velocity(Rpm(4000.0));
        let before = launcher.measured_output().get();

        launcher.zero();
        let after = launcher.measured_output().get();
        assert!((after - before * (1.0 - CONFIG.ramp_gain)).abs() < 1e-9);
    }

    #[test]
    fn stop_cuts_output() {
        let field = SimField::new();
        let mut launcher = launcher(&field);

        launcher.spin(Percent::MAX_VAL);
        launcher.stop();
        assert_eq!(
            field.with(|state| state.flywheel_command),
            FlywheelCommand::Output(0.0)
        );
    }
}
