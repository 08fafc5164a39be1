use common::types::Degrees;

use crate::{
    config::{LauncherArrangement, RobotConfig},
    control::targeting::{BearingSource, HeadingBearing, TargetingController, VisionBearing},
    peripheral::{
        launcher::{DualMotorLauncher, IndependentDualLauncher, SingleMotorLauncher},
        sim::{MotorSlot, SimField, Wheel},
        LaunchActuator,
    },
    subsystems::{Climber, Drivetrain, Launcher, Magazine},
};

/// Every mechanism on the robot. Only one mode drives it at a time
pub struct Robot {
    pub drivetrain: Drivetrain,
    pub targeting: TargetingController<Box<dyn BearingSource>>,
    pub launcher: Launcher,
    pub magazine: Magazine,
    pub climber: Climber,
}

/// What the targeting loop aims with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aim {
    Vision,
    Heading(Degrees),
}

impl Robot {
    /// Robot wired to simulated devices
    pub fn simulated(field: &SimField, config: &RobotConfig, aim: Aim) -> Self {
        let bearing: Box<dyn BearingSource> = match aim {
            Aim::Vision => Box::new(VisionBearing(field.camera())),
            Aim::Heading(setpoint) => Box::new(HeadingBearing::new(field.gyro(), setpoint)),
        };

        let launch: Box<dyn LaunchActuator> = match config.launcher.arrangement {
            LauncherArrangement::Single { inverted } => Box::new(SingleMotorLauncher::new(
                field.launch_motor(Wheel::Main, inverted),
                inverted,
            )),
            LauncherArrangement::Dual => Box::new(DualMotorLauncher::new(
                field.launch_motor(Wheel::Main, false),
                field.launch_motor(Wheel::Main, true),
            )),
            LauncherArrangement::IndependentDual { bottom_ratio } => {
                Box::new(IndependentDualLauncher::new(
                    field.launch_motor(Wheel::Main, false),
                    field.launch_motor(Wheel::Backspin, true),
                    bottom_ratio,
                ))
            }
        };

        Self {
            drivetrain: Drivetrain::new(
                Box::new(field.drive()),
                Box::new(field.shifter()),
                config.drivetrain,
            ),
            targeting: TargetingController::new(bearing, config.targeting),
            launcher: Launcher::new(launch, config.launcher),
            magazine: Magazine::new(
                Box::new(field.motor(MotorSlot::Intake)),
                Box::new(field.motor(MotorSlot::Feed)),
                Box::new(field.ball_sensors()),
                config.magazine,
            ),
            climber: Climber::new(
                Box::new(field.motor(MotorSlot::Climber)),
                Box::new(field.motor(MotorSlot::Rotator)),
                config.climber,
            ),
        }
    }

    /// Zero every actuator and forget targeting history. Anything commanded
    /// before this would otherwise stay latched in the motor controllers
    pub fn stop_all(&mut self) {
        self.drivetrain.stop();
        self.launcher.stop();
        self.magazine.stop();
        self.climber.stop();
        self.targeting.reset_error();
    }
}
