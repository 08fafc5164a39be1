use common::{
    error::LogErrorExt,
    types::{clamp, Degrees, Percent, PidController, PidGains, TargetingStatus},
};

use crate::{
    config::TargetingConfig,
    peripheral::{DriveActuator, HeadingSource, VisionSource},
};

/// Where the targeting loop gets its error from
pub trait BearingSource {
    /// Signed angle from where the robot points to where it should point,
    /// positive when the goal is clockwise. `None` when there is nothing to
    /// aim at this cycle
    fn bearing(&self) -> Option<Degrees>;
}

impl<T: BearingSource + ?Sized> BearingSource for Box<T> {
    fn bearing(&self) -> Option<Degrees> {
        (**self).bearing()
    }
}

/// Aim using the vision target
pub struct VisionBearing<V>(pub V);

impl<V: VisionSource> BearingSource for VisionBearing<V> {
    fn bearing(&self) -> Option<Degrees> {
        if !self.0.has_target() {
            return None;
        }

        let bearing = self.0.bearing_error();
        bearing.0.is_finite().then_some(bearing)
    }
}

/// Aim at a fixed heading using the gyro
pub struct HeadingBearing<H> {
    gyro: H,
    setpoint: Degrees,
}

impl<H: HeadingSource> HeadingBearing<H> {
    pub fn new(gyro: H, setpoint: Degrees) -> Self {
        Self { gyro, setpoint }
    }

    pub fn setpoint(&self) -> Degrees {
        self.setpoint
    }

    pub fn set_setpoint(&mut self, setpoint: Degrees) {
        self.setpoint = setpoint;
    }
}

impl<H: HeadingSource> BearingSource for HeadingBearing<H> {
    fn bearing(&self) -> Option<Degrees> {
        let heading = self.gyro.heading()?;
        if !heading.0.is_finite() {
            return None;
        }

        // The gyro reading is continuous, the error must not be
        Some(heading.shortest_from(self.setpoint))
    }
}

/// Turns the robot in place until the bearing source reports the goal dead ahead
pub struct TargetingController<S> {
    source: S,
    config: TargetingConfig,
    gains: PidGains,
    pid: PidController,
    status: TargetingStatus,
}

impl<S: BearingSource> TargetingController<S> {
    pub fn new(source: S, config: TargetingConfig) -> Self {
        Self {
            source,
            gains: config.gains,
            config,
            pid: PidController::default(),
            status: TargetingStatus::default(),
        }
    }

    /// Runs one cycle of the loop and returns whether the robot is on target.
    ///
    /// With nothing to aim at the drivetrain is explicitly stopped, so a turn
    /// from an earlier cycle can never stay latched.
    pub fn target<D: DriveActuator + ?Sized>(&mut self, drive: &mut D) -> bool {
        let Some(bearing) = self.source.bearing() else {
            self.pid.interrupt();
            self.status = TargetingStatus::default();

            drive
                .drive(Percent::ZERO, Percent::ZERO)
                .log_error("Targeting stop");
            return false;
        };

        // Inverted so a setpoint of zero turns toward the goal
        let error = -bearing.0;

        let output = self.pid.update(error, self.gains) / self.config.output_divisor;
        let turn = Percent::new(clamp(output, self.gains.peak_output));

        drive
            .drive(Percent::ZERO, turn)
            .log_error("Targeting turn");

        let on_target = error.abs() <= self.config.tolerance.0;
        self.status = TargetingStatus {
            on_target,
            error: Some(Degrees(error)),
            turn,
        };

        on_target
    }

    /// Must be called every time targeting becomes active
    pub fn reset_error(&mut self) {
        self.pid.reset();
        self.status = TargetingStatus::default();
    }

    pub fn reset_gains(&mut self) {
        self.gains = self.config.gains;
    }

    /// Tuning only
    pub fn set_gains(&mut self, k_p: f64, k_i: f64, k_d: f64) {
        self.gains = PidGains {
            k_p,
            k_i,
            k_d,
            ..self.gains
        };
    }

    pub fn apply_gains(&mut self, gains: PidGains) {
        self.gains = gains;
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    pub fn status(&self) -> TargetingStatus {
        self.status
    }

    pub fn pid(&self) -> &PidController {
        &self.pid
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
