//! Default tuning for every subsystem
//!
//! These are the values the robot runs a match with. The dashboard can
//! override some of them in test mode, see `common::store::tokens`.

use std::time::Duration;

use common::types::{Degrees, Percent, PidGains, Rpm, Ticks};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetingConfig {
    pub gains: PidGains,
    pub tolerance: Degrees,
    /// Turns the PID output, in degrees of error, into a turn command
    pub output_divisor: f64,
}

/// How the flywheel motors are mounted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LauncherArrangement {
    Single { inverted: bool },
    /// Follower mirrors the leader
    Dual,
    /// Separate top and bottom wheels
    IndependentDual { bottom_ratio: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LauncherConfig {
    pub arrangement: LauncherArrangement,
    pub ramp_gain: f64,
    /// Native encoder velocity units per RPM
    pub native_per_rpm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoConfig {
    pub reverse_speed: Percent,
    /// Encoder position that counts as "at the wall", must be negative
    pub reverse_distance: Ticks,
    pub warmup_speed: Percent,
    /// Launcher output that must be reached before spinning up
    pub warmup_fraction: f64,
    pub target_rpm: Rpm,
    pub rpm_tolerance: Rpm,
    pub feed_speed: Percent,
    pub feed_duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrivetrainConfig {
    /// Which way the shifter solenoid points in low gear depends on how the
    /// gearbox was assembled
    pub low_gear_extended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagazineConfig {
    pub intake_speed: Percent,
    pub index_speed: Percent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimberConfig {
    pub winch_ramp_gain: f64,
    pub rotator_ramp_gain: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotConfig {
    pub targeting: TargetingConfig,
    pub launcher: LauncherConfig,
    pub auto: AutoConfig,
    pub drivetrain: DrivetrainConfig,
    pub magazine: MagazineConfig,
    pub climber: ClimberConfig,
}

impl RobotConfig {
    pub const DEFAULT: RobotConfig = RobotConfig {
        targeting: TargetingConfig {
            gains: PidGains {
                k_p: 1.0,
                k_i: 0.01,
                k_d: 2.0,
                k_f: 0.0,
                integral_zone: 10.0,
                peak_output: 1.0,
            },
            tolerance: Degrees(1.0),
            output_divisor: 30.0,
        },
        launcher: LauncherConfig {
            arrangement: LauncherArrangement::Dual,
            ramp_gain: 0.1,
            // 2048 counts per revolution, reported per 100ms
            native_per_rpm: 2048.0 / 600.0,
        },
        auto: AutoConfig {
            reverse_speed: Percent::new(-0.5),
            reverse_distance: Ticks(-10_000),
            warmup_speed: Percent::new(0.6),
            warmup_fraction: 0.5,
            target_rpm: Rpm(4000.0),
            rpm_tolerance: Rpm(100.0),
            feed_speed: Percent::new(0.8),
            feed_duration: Duration::from_secs(3),
        },
        drivetrain: DrivetrainConfig {
            low_gear_extended: true,
        },
        magazine: MagazineConfig {
            intake_speed: Percent::new(0.7),
            index_speed: Percent::new(0.5),
        },
        climber: ClimberConfig {
            winch_ramp_gain: 0.2,
            rotator_ramp_gain: 0.3,
        },
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_gains(&self.targeting.gains)?;

        finite("targeting.tolerance", self.targeting.tolerance.0)?;
        positive("targeting.output_divisor", self.targeting.output_divisor)?;

        validate_ramp_gain("launcher.ramp_gain", self.launcher.ramp_gain)?;
        positive("launcher.native_per_rpm", self.launcher.native_per_rpm)?;
        if let LauncherArrangement::IndependentDual { bottom_ratio } = self.launcher.arrangement {
            non_negative("launcher.bottom_ratio", bottom_ratio)?;
        }

        if self.auto.reverse_distance.0 >= 0 {
            return Err(ConfigError::ReverseDistance(self.auto.reverse_distance));
        }
        finite("auto.warmup_fraction", self.auto.warmup_fraction)?;
        validate_rpm("auto.target_rpm", self.auto.target_rpm)?;
        validate_rpm("auto.rpm_tolerance", self.auto.rpm_tolerance)?;

        validate_ramp_gain("climber.winch_ramp_gain", self.climber.winch_ramp_gain)?;
        validate_ramp_gain("climber.rotator_ramp_gain", self.climber.rotator_ramp_gain)?;

        Ok(())
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} must be greater than zero, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must be within 0..=1, got {value}")]
    RampGain { name: &'static str, value: f64 },
    #[error("reverse distance must be behind the start line, got {0}")]
    ReverseDistance(Ticks),
}

pub fn validate_gains(gains: &PidGains) -> Result<(), ConfigError> {
    for (name, value) in [
        ("gains.k_p", gains.k_p),
        ("gains.k_i", gains.k_i),
        ("gains.k_d", gains.k_d),
        ("gains.k_f", gains.k_f),
        ("gains.integral_zone", gains.integral_zone),
        ("gains.peak_output", gains.peak_output),
    ] {
        finite(name, value)?;
        if value < 0.0 {
            return Err(ConfigError::Negative { name, value });
        }
    }

    Ok(())
}

pub fn validate_ramp_gain(name: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::RampGain { name, value });
    }

    Ok(())
}

pub fn validate_rpm(name: &'static str, rpm: Rpm) -> Result<(), ConfigError> {
    non_negative(name, rpm.0)
}

fn finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { name, value });
    }

    Ok(())
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { name, value });
    }

    Ok(())
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NotPositive { name, value });
    }

    Ok(())
}
