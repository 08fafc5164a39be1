use std::time::Duration;

use common::{
    error::LogErrorExt,
    types::{AutoState, DriveCommand, Percent},
};
use tracing::info;

use crate::{
    config::AutoConfig,
    peripheral::{Clock, DriveActuator},
    robot::Robot,
};

/// The autonomous routine: back up to the wall, aim, spin up, empty the
/// magazine, stop.
///
/// Every call to `periodic` re-issues the current phase's commands and checks
/// its exit condition. A phase only ever hands over to the next one in
/// `AutoState::ORDER`, at most once per call. If a condition never holds the
/// routine waits in that phase until the mode changes.
pub struct AutonomousSequencer<C> {
    clock: C,
    config: AutoConfig,
    state: AutoState,
    phase_entered_at: Duration,
}

impl<C: Clock> AutonomousSequencer<C> {
    pub fn new(clock: C, config: AutoConfig) -> Self {
        let phase_entered_at = clock.now();

        Self {
            clock,
            config,
            state: AutoState::ReverseToWall,
            phase_entered_at,
        }
    }

    pub fn init(&mut self, robot: &mut Robot) {
        robot.launcher.stop();
        robot.magazine.stop();
        robot.targeting.reset_error();
        robot.drivetrain.stop();
        robot
            .drivetrain
            .reset_position()
            .log_error("Zero drive encoder");

        self.state = AutoState::ReverseToWall;
        self.phase_entered_at = self.clock.now();

        info!("Autonomous started");
    }

    pub fn periodic(&mut self, robot: &mut Robot) -> AutoState {
        let now = self.clock.now();
        let config = &self.config;

        let done = match self.state {
            AutoState::ReverseToWall => {
                robot
                    .drivetrain
                    .arcade(DriveCommand::new(config.reverse_speed, Percent::ZERO));

                robot.drivetrain.position() <= config.reverse_distance
            }
            AutoState::AcquireTarget => {
                let on_target = robot.targeting.target(&mut robot.drivetrain);
                robot.launcher.spin(config.warmup_speed);

                on_target && robot.launcher.measured_output().get() > config.warmup_fraction
            }
            AutoState::SpinUpLauncher => {
                robot.targeting.target(&mut robot.drivetrain);
                robot.launcher.spin_velocity(config.target_rpm);

                robot
                    .launcher
                    .at_velocity(config.target_rpm, config.rpm_tolerance)
            }
            AutoState::FeedBalls => {
                robot.drivetrain.stop();
                robot.launcher.spin_velocity(config.target_rpm);
                robot.magazine.feed(config.feed_speed);

                now.saturating_sub(self.phase_entered_at) >= config.feed_duration
            }
            AutoState::Done => {
                robot.drivetrain.stop();
                robot.launcher.stop();
                robot.magazine.stop();

                false
            }
        };

        if done {
            if let Some(next) = self.state.next() {
                info!(
                    "Autonomous {:?} -> {:?} after {:.2}s",
                    self.state,
                    next,
                    now.saturating_sub(self.phase_entered_at).as_secs_f64()
                );

                self.state = next;
                self.phase_entered_at = now;
            }
        }

        self.state
    }

    pub fn state(&self) -> AutoState {
        self.state
    }

    pub fn phase_entered_at(&self) -> Duration {
        self.phase_entered_at
    }
}
