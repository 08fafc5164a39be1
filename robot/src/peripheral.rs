//! Capabilities the control code needs from the hardware
//!
//! Everything here is a narrow view of one device. Subsystems receive these at
//! construction and never reach for a device on their own. Sensor reads are
//! infallible, a sensor without data reports "nothing" instead of failing.
//! Actuator writes return errors which the control cycle logs and moves past.

pub mod launcher;
pub mod sim;

use std::time::{Duration, Instant};

use common::types::{Degrees, Percent, Ticks};

/// Vision camera reporting the target it is tracking
pub trait VisionSource {
    fn has_target(&self) -> bool;

    /// Horizontal angle to the target, positive when it is clockwise of the
    /// camera axis. Meaningless when `has_target` is false
    fn bearing_error(&self) -> Degrees;
}

/// Gyro heading, continuous (may read past ±180°), increasing counter-clockwise
pub trait HeadingSource {
    /// `None` until the gyro has produced a reading
    fn heading(&self) -> Option<Degrees>;
}

pub trait DriveActuator {
    fn drive(&mut self, forward: Percent, turn: Percent) -> anyhow::Result<()>;

    fn position(&self) -> Ticks;
    fn reset_position(&mut self) -> anyhow::Result<()>;
}

/// Open loop motor, used for the feed belt, intake, climber and rotator
pub trait SpeedOutput {
    fn set_speed(&mut self, speed: Percent) -> anyhow::Result<()>;
}

/// Launcher flywheel. `set_speed` is the open loop command
pub trait LaunchActuator: SpeedOutput {
    /// Closed loop velocity in native units
    fn set_velocity(&mut self, native: f64) -> anyhow::Result<()>;

    /// Measured velocity in native units
    fn velocity(&self) -> f64;

    /// Output currently applied by the motor controller
    fn output(&self) -> Percent;
}

pub trait Solenoid {
    fn set(&mut self, extended: bool) -> anyhow::Result<()>;
}

pub trait BallSensors {
    fn intake_side(&self) -> bool;
    fn launch_side(&self) -> bool;
}

pub trait Clock {
    /// Time since some fixed point, must never go backwards
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock(Instant);

impl SystemClock {
    pub fn new() -> Self {
        Self(Instant::now())
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.0.elapsed()
    }
}

impl<T: VisionSource + ?Sized> VisionSource for Box<T> {
    fn has_target(&self) -> bool {
        (**self).has_target()
    }

    fn bearing_error(&self) -> Degrees {
        (**self).bearing_error()
    }
}

impl<T: HeadingSource + ?Sized> HeadingSource for Box<T> {
    fn heading(&self) -> Option<Degrees> {
        (**self).heading()
    }
}

impl<T: DriveActuator + ?Sized> DriveActuator for Box<T> {
    fn drive(&mut self, forward: Percent, turn: Percent) -> anyhow::Result<()> {
        (**self).drive(forward, turn)
    }

    fn position(&self) -> Ticks {
        (**self).position()
    }

    fn reset_position(&mut self) -> anyhow::Result<()> {
        (**self).reset_position()
    }
}

impl<T: SpeedOutput + ?Sized> SpeedOutput for Box<T> {
    fn set_speed(&mut self, speed: Percent) -> anyhow::Result<()> {
        (**self).set_speed(speed)
    }
}

impl<T: LaunchActuator + ?Sized> LaunchActuator for Box<T> {
    fn set_velocity(&mut self, native: f64) -> anyhow::Result<()> {
        (**self).set_velocity(native)
    }

    fn velocity(&self) -> f64 {
        (**self).velocity()
    }

    fn output(&self) -> Percent {
        (**self).output()
    }
}
