use common::{
    error::LogErrorExt,
    types::{DriveCommand, Gear, Percent, Ticks},
};

use crate::{
    config::DrivetrainConfig,
    peripheral::{DriveActuator, Solenoid},
};

pub struct Drivetrain {
    drive: Box<dyn DriveActuator>,
    shifter: Box<dyn Solenoid>,
    config: DrivetrainConfig,
    gear: Gear,
    last: DriveCommand,
}

impl Drivetrain {
    pub fn new(
        drive: Box<dyn DriveActuator>,
        shifter: Box<dyn Solenoid>,
        config: DrivetrainConfig,
    ) -> Self {
        Self {
            drive,
            shifter,
            config,
            gear: Gear::Low,
            last: DriveCommand::NEUTRAL,
        }
    }

    pub fn arcade(&mut self, command: DriveCommand) {
        self.last = command;
        self.drive
            .drive(command.forward, command.turn)
            .log_error("Drive");
    }

    pub fn stop(&mut self) {
        self.arcade(DriveCommand::NEUTRAL);
    }

    pub fn shift(&mut self, gear: Gear) {
        let extended = match gear {
            Gear::Low => self.config.low_gear_extended,
            Gear::High => !self.config.low_gear_extended,
        };

        if self.shifter.set(extended).log_error("Shift").is_some() {
            self.gear = gear;
        }
    }

    pub fn gear(&self) -> Gear {
        self.gear
    }

    pub fn last_command(&self) -> DriveCommand {
        self.last
    }
}

/// Lets the targeting loop steer through the drivetrain
impl DriveActuator for Drivetrain {
    fn drive(&mut self, forward: Percent, turn: Percent) -> anyhow::Result<()> {
        self.last = DriveCommand::new(forward, turn);
        self.drive.drive(forward, turn)
    }

    fn position(&self) -> Ticks {
        self.drive.position()
    }

    fn reset_position(&mut self) -> anyhow::Result<()> {
        self.drive.reset_position()
    }
}
