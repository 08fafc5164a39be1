use common::{
    error::LogErrorExt,
    types::{MagazineStatus, Percent},
};

use crate::{
    config::MagazineConfig,
    peripheral::{BallSensors, SpeedOutput},
};

/// Intake roller plus the belt that carries balls up to the launcher.
///
/// A ball is seen at the intake end and again at the launch end. While
/// indexing the belt only moves balls up until one is waiting at the launch
/// end, it never pushes a ball into the flywheel on its own.
pub struct Magazine {
    intake: Box<dyn SpeedOutput>,
    belt: Box<dyn SpeedOutput>,
    sensors: Box<dyn BallSensors>,
    config: MagazineConfig,
    intaking: bool,
}

impl Magazine {
    pub fn new(
        intake: Box<dyn SpeedOutput>,
        belt: Box<dyn SpeedOutput>,
        sensors: Box<dyn BallSensors>,
        config: MagazineConfig,
    ) -> Self {
        Self {
            intake,
            belt,
            sensors,
            config,
            intaking: false,
        }
    }

    pub fn set_intaking(&mut self, intaking: bool) {
        self.intaking = intaking;
    }

    /// Run once per cycle when not launching
    pub fn index(&mut self) {
        let intake = if self.intaking {
            self.config.intake_speed
        } else {
            Percent::ZERO
        };
        self.intake.set_speed(intake).log_error("Intake");

        let status = self.status();
        let belt = if status.intake_side && !status.launch_side {
            self.config.index_speed
        } else {
            Percent::ZERO
        };
        self.belt.set_speed(belt).log_error("Index belt");
    }

    /// Push balls into the launcher
    pub fn feed(&mut self, speed: Percent) {
        self.belt.set_speed(speed).log_error("Feed belt");
    }

    pub fn stop(&mut self) {
        self.intaking = false;
        self.intake.set_speed(Percent::ZERO).log_error("Intake stop");
        self.belt.set_speed(Percent::ZERO).log_error("Belt stop");
    }

    pub fn status(&self) -> MagazineStatus {
        MagazineStatus {
            intake_side: self.sensors.intake_side(),
            launch_side: self.sensors.launch_side(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        config::RobotConfig,
        peripheral::sim::{MotorSlot, SimField},
    };

    const TICK: Duration = Duration::from_millis(20);

    fn magazine(field: &SimField) -> Magazine {
        Magazine::new(
            Box::new(field.motor(MotorSlot::Intake)),
            Box::new(field.motor(MotorSlot::Feed)),
            Box::new(field.ball_sensors()),
            RobotConfig::DEFAULT.magazine,
        )
    }

    #[test]
    fn indexing_stacks_without_launching() {
        let field = SimField::new();
        field.with(|state| {
            state.intake_ball = false;
            state.launch_ball = false;
        });
        let mut magazine = magazine(&field);
        magazine.set_intaking(true);

        for _ in 0..50 {
            magazine.index();
            field.step(TICK);
        }

        field.with(|state| {
            assert!(state.launch_ball);
            assert!(state.intake_ball);
            assert_eq!(state.launched, 0);
            assert_eq!(state.feed, Percent::ZERO);
        });
    }

    #[test]
    fn idle_without_balls() {
        let field = SimField::new();
        field.with(|state| {
            state.intake_ball = false;
            state.launch_ball = false;
            state.loose_balls = 0;
        });
        let mut magazine = magazine(&field);

        magazine.index();
        field.with(|state| {
            assert_eq!(state.intake, Percent::ZERO);
            assert_eq!(state.feed, Percent::ZERO);
        });
    }

    #[test]
    fn feeding_empties_the_magazine() {
        let field = SimField::new();
        let mut magazine = magazine(&field);

        for _ in 0..5 {
            magazine.feed(Percent::new(0.8));
            field.step(TICK);
        }

        assert_eq!(field.with(|state| state.launched), 2);
        assert_eq!(magazine.status(), MagazineStatus::default());

        magazine.stop();
        assert_eq!(field.with(|state| state.feed), Percent::ZERO);
    }
}
