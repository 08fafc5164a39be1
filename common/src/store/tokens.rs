//! Definitions of everything that can be stored in the global store

use crate::{
    store::Token,
    types::{
        AutoState, DriveCommand, Gear, LauncherCommand, MagazineStatus, Percent, PidGains,
        RobotMode, Rpm, TargetingStatus,
    },
};

// Written by the field connection

#[rustfmt::skip]
pub const ROBOT_MODE: Token<RobotMode> = Token::new_const("robot.mode");

// Written by the driver station

#[rustfmt::skip]
pub const TELEOP_DRIVE: Token<DriveCommand> = Token::new_const("robot.teleop.drive");
#[rustfmt::skip]
pub const TELEOP_TARGET_ASSIST: Token<bool> = Token::new_const("robot.teleop.target_assist");
#[rustfmt::skip]
pub const TELEOP_GEAR: Token<Gear> = Token::new_const("robot.teleop.gear");
#[rustfmt::skip]
pub const TELEOP_LAUNCHER: Token<LauncherCommand> = Token::new_const("robot.teleop.launcher");
#[rustfmt::skip]
pub const TELEOP_INTAKE: Token<bool> = Token::new_const("robot.teleop.intake");
#[rustfmt::skip]
pub const TELEOP_FEED: Token<bool> = Token::new_const("robot.teleop.feed");
#[rustfmt::skip]
pub const TELEOP_CLIMBER: Token<Percent> = Token::new_const("robot.teleop.climber");
#[rustfmt::skip]
pub const TELEOP_ROTATOR: Token<Percent> = Token::new_const("robot.teleop.rotator");

// Written by the dashboard, only read in test mode

#[rustfmt::skip]
pub const TUNING_TARGETING_GAINS: Token<PidGains> = Token::new_const("robot.tuning.targeting.gains");
#[rustfmt::skip]
pub const TUNING_LAUNCHER_RAMP_GAIN: Token<f64> = Token::new_const("robot.tuning.launcher.ramp_gain");
#[rustfmt::skip]
pub const TUNING_LAUNCHER_TARGET_RPM: Token<Rpm> = Token::new_const("robot.tuning.launcher.target_rpm");

// Written by the robot

#[rustfmt::skip]
pub const TARGETING_STATUS: Token<TargetingStatus> = Token::new_const("robot.status.targeting");
#[rustfmt::skip]
pub const AUTO_STATE: Token<AutoState> = Token::new_const("robot.status.auto");
#[rustfmt::skip]
pub const LAUNCHER_RPM: Token<Rpm> = Token::new_const("robot.status.launcher.rpm");
#[rustfmt::skip]
pub const MAGAZINE: Token<MagazineStatus> = Token::new_const("robot.status.magazine");
#[rustfmt::skip]
pub const ACTIVE_GEAR: Token<Gear> = Token::new_const("robot.status.gear");
