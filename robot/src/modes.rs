//! Which code drives the robot this cycle
//!
//! The field decides the mode, `ModeController` makes sure only that mode's
//! logic writes to the actuators. Whenever the mode changes everything is
//! zeroed before the new mode runs, otherwise a command from the old mode
//! would stay latched in the motor controllers.

use common::{
    store::{tokens, Store, UpdateCallback},
    types::{LauncherCommand, Percent, PidGains, RobotMode, Rpm},
};
use tracing::{info, warn};

use crate::{
    config::{self, ConfigError, RobotConfig},
    control::sequencer::AutonomousSequencer,
    peripheral::Clock,
    robot::Robot,
};

pub struct ModeController<C> {
    mode: RobotMode,
    sequencer: AutonomousSequencer<C>,
    feed_speed: Percent,

    /// Target assist was held last cycle
    assisting: bool,

    tuning: Tuning,
}

/// Last values seen on the tuning tokens, valid or not
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Tuning {
    gains: Option<PidGains>,
    ramp_gain: Option<f64>,
    target_rpm: Option<Rpm>,
}

impl<C: Clock> ModeController<C> {
    pub fn new(clock: C, config: &RobotConfig) -> Self {
        Self {
            mode: RobotMode::Disabled,
            sequencer: AutonomousSequencer::new(clock, config.auto),
            feed_speed: config.auto.feed_speed,
            assisting: false,
            tuning: Tuning::default(),
        }
    }

    pub fn mode(&self) -> RobotMode {
        self.mode
    }

    pub fn sequencer(&self) -> &AutonomousSequencer<C> {
        &self.sequencer
    }

    pub fn set_mode(&mut self, mode: RobotMode, robot: &mut Robot) {
        if mode == self.mode {
            return;
        }

        info!("Mode {:?} -> {:?}", self.mode, mode);

        // Exit
        robot.stop_all();
        if self.mode == RobotMode::Test {
            robot.targeting.reset_gains();
            robot.launcher.reset_ramp_gain();
            self.tuning = Tuning::default();
        }
        self.assisting = false;

        // Enter
        match mode {
            RobotMode::Disabled => {}
            RobotMode::Autonomous => self.sequencer.init(robot),
            RobotMode::Teleop | RobotMode::Test => robot.targeting.reset_error(),
        }

        self.mode = mode;
    }

    /// Runs one control cycle.
    ///
    /// Invalid tuning is returned after the cycle has run with the previous
    /// values, it never stops the robot.
    pub fn periodic<U: UpdateCallback>(
        &mut self,
        robot: &mut Robot,
        store: &mut Store<U>,
    ) -> Result<(), ConfigError> {
        let mode = store.get_copied(&tokens::ROBOT_MODE).unwrap_or_default();
        self.set_mode(mode, robot);

        let tuning = if self.mode == RobotMode::Test {
            self.poll_tuning(robot, store)
        } else {
            Ok(())
        };

        match self.mode {
            RobotMode::Disabled => {}
            RobotMode::Autonomous => {
                self.sequencer.periodic(robot);
            }
            RobotMode::Teleop | RobotMode::Test => self.teleop(robot, store),
        }

        self.publish(robot, store);

        tuning
    }

    fn teleop<U: UpdateCallback>(&mut self, robot: &mut Robot, store: &Store<U>) {
        let assist = store
            .get_copied(&tokens::TELEOP_TARGET_ASSIST)
            .unwrap_or(false);
        if assist {
            if !self.assisting {
                robot.targeting.reset_error();
            }
            robot.targeting.target(&mut robot.drivetrain);
        } else {
            let command = store.get_copied(&tokens::TELEOP_DRIVE).unwrap_or_default();
            robot.drivetrain.arcade(command);
        }
        self.assisting = assist;

        if let Some(gear) = store.get_copied(&tokens::TELEOP_GEAR) {
            if gear != robot.drivetrain.gear() {
                robot.drivetrain.shift(gear);
            }
        }

        match store.get_copied(&tokens::TELEOP_LAUNCHER).unwrap_or_default() {
            LauncherCommand::Off => robot.launcher.zero(),
            LauncherCommand::Speed(speed) => robot.launcher.spin(speed),
            LauncherCommand::Velocity(rpm) => {
                let rpm = self.tuning_rpm().unwrap_or(rpm);
                robot.launcher.spin_velocity(rpm);
            }
        }

        let intaking = store.get_copied(&tokens::TELEOP_INTAKE).unwrap_or(false);
        robot.magazine.set_intaking(intaking);
        if store.get_copied(&tokens::TELEOP_FEED).unwrap_or(false) {
            robot.magazine.feed(self.feed_speed);
        } else {
            robot.magazine.index();
        }

        let winch = store.get_copied(&tokens::TELEOP_CLIMBER).unwrap_or_default();
        let rotator = store.get_copied(&tokens::TELEOP_ROTATOR).unwrap_or_default();
        robot.climber.set_winch(winch);
        robot.climber.set_rotator(rotator);
    }

    /// Target RPM override, only while tuning
    fn tuning_rpm(&self) -> Option<Rpm> {
        if self.mode != RobotMode::Test {
            return None;
        }

        self.tuning
            .target_rpm
            .filter(|rpm| config::validate_rpm("tuning.target_rpm", *rpm).is_ok())
    }

    /// Applies tuning values that changed since the last cycle
    fn poll_tuning<U: UpdateCallback>(
        &mut self,
        robot: &mut Robot,
        store: &Store<U>,
    ) -> Result<(), ConfigError> {
        let mut result = Ok(());

        let gains = store.get_copied(&tokens::TUNING_TARGETING_GAINS);
        if gains != self.tuning.gains {
            self.tuning.gains = gains;

            if let Some(gains) = gains {
                match config::validate_gains(&gains) {
                    Ok(()) => {
                        info!("Targeting gains tuned to {gains:?}");
                        robot.targeting.apply_gains(gains);
                    }
                    Err(err) => {
                        warn!("Rejected targeting gains: {err}");
                        result = result.and(Err(err));
                    }
                }
            }
        }

        let ramp_gain = store.get_copied(&tokens::TUNING_LAUNCHER_RAMP_GAIN);
        if ramp_gain != self.tuning.ramp_gain {
            self.tuning.ramp_gain = ramp_gain;

            if let Some(ramp_gain) = ramp_gain {
                match config::validate_ramp_gain("tuning.launcher.ramp_gain", ramp_gain) {
                    Ok(()) => {
                        info!("Launcher ramp gain tuned to {ramp_gain}");
                        robot.launcher.set_ramp_gain(ramp_gain);
                    }
                    Err(err) => {
                        warn!("Rejected launcher ramp gain: {err}");
                        result = result.and(Err(err));
                    }
                }
            }
        }

        let target_rpm = store.get_copied(&tokens::TUNING_LAUNCHER_TARGET_RPM);
        if target_rpm != self.tuning.target_rpm {
            self.tuning.target_rpm = target_rpm;

            if let Some(target_rpm) = target_rpm {
                if let Err(err) = config::validate_rpm("tuning.launcher.target_rpm", target_rpm) {
                    warn!("Rejected launcher target rpm: {err}");
                    result = result.and(Err(err));
                }
            }
        }

        result
    }

    fn publish<U: UpdateCallback>(&self, robot: &Robot, store: &mut Store<U>) {
        store.insert_if_changed(&tokens::TARGETING_STATUS, robot.targeting.status());
        store.insert_if_changed(&tokens::AUTO_STATE, self.sequencer.state());
        store.insert_if_changed(&tokens::LAUNCHER_RPM, robot.launcher.velocity());
        store.insert_if_changed(&tokens::MAGAZINE, robot.magazine.status());
        store.insert_if_changed(&tokens::ACTIVE_GEAR, robot.drivetrain.gear());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use common::{
        store::{create_update, Token},
        types::{AutoState, DriveCommand, Gear},
    };

    use super::*;
    use crate::{
        peripheral::sim::{FlywheelCommand, MockClock, SimField},
        robot::Aim,
    };

    const TICK: Duration = Duration::from_millis(20);

    struct Harness {
        field: SimField,
        clock: MockClock,
        robot: Robot,
        modes: ModeController<MockClock>,
        store: Store<()>,
    }

    impl Harness {
        fn new() -> Self {
            let field = SimField::new();
            let clock = MockClock::new();

            Self {
                robot: Robot::simulated(&field, &RobotConfig::DEFAULT, Aim::Vision),
                modes: ModeController::new(clock.clone(), &RobotConfig::DEFAULT),
                store: Store::new(()),
                field,
                clock,
            }
        }

        /// Values from the driver station and dashboard arrive as shared keys
        fn set<V: std::any::Any + Send + Sync>(&mut self, token: &Token<V>, value: V) {
            self.store.handle_update_shared(&create_update(token, value));
        }

        fn tick(&mut self) -> Result<(), ConfigError> {
            let result = self.modes.periodic(&mut self.robot, &mut self.store);
            self.field.step(TICK);
            self.clock.advance(TICK);
            result
        }
    }

    #[test]
    fn disabled_by_default() {
        let mut harness = Harness::new();
        harness.set(
            &tokens::TELEOP_DRIVE,
            DriveCommand::new(Percent::MAX_VAL, Percent::ZERO),
        );

        harness.tick().unwrap();

        assert_eq!(harness.modes.mode(), RobotMode::Disabled);
        assert_eq!(harness.field.with(|state| state.drive), DriveCommand::NEUTRAL);
    }

    #[test]
    fn teleop_drives_everything() {
        let mut harness = Harness::new();
        let drive = DriveCommand::new(Percent::new(0.5), Percent::new(-0.25));

        harness.set(&tokens::ROBOT_MODE, RobotMode::Teleop);
        harness.set(&tokens::TELEOP_DRIVE, drive);
        harness.set(&tokens::TELEOP_GEAR, Gear::High);
        harness.set(&tokens::TELEOP_LAUNCHER, LauncherCommand::Speed(Percent::MAX_VAL));
        harness.set(&tokens::TELEOP_CLIMBER, Percent::MAX_VAL);
        harness.tick().unwrap();

        harness.field.with(|state| {
            assert_eq!(state.drive, drive);
            assert!(!state.shifter_extended);
            assert_eq!(state.flywheel_command, FlywheelCommand::Output(0.1));
            assert_eq!(state.climber, Percent::new(0.2));
        });
        assert_eq!(harness.store.get_copied(&tokens::ACTIVE_GEAR), Some(Gear::High));
    }

    #[test]
    fn teleop_feed_launches() {
        let mut harness = Harness::new();
        harness.set(&tokens::ROBOT_MODE, RobotMode::Teleop);
        harness.tick().unwrap();

        // Magazine holds both balls while indexing
        harness.tick().unwrap();
        assert_eq!(harness.field.with(|state| state.launched), 0);

        harness.set(&tokens::TELEOP_FEED, true);
        for _ in 0..5 {
            harness.tick().unwrap();
        }
        assert_eq!(harness.field.with(|state| state.launched), 2);
    }

    #[test]
    fn target_assist_takes_the_drivetrain() {
        let mut harness = Harness::new();
        harness.set(&tokens::ROBOT_MODE, RobotMode::Teleop);
        harness.set(
            &tokens::TELEOP_DRIVE,
            DriveCommand::new(Percent::MAX_VAL, Percent::ZERO),
        );
        harness.set(&tokens::TELEOP_TARGET_ASSIST, true);

        for _ in 0..200 {
            harness.tick().unwrap();
        }

        let status = harness.store.get_copied(&tokens::TARGETING_STATUS).unwrap();
        assert!(status.on_target);
        assert_eq!(harness.field.with(|state| state.drive.forward), Percent::ZERO);
        assert_eq!(harness.field.with(|state| state.position), 0.0);
    }

    #[test]
    fn mode_exit_zeroes_actuators() {
        let mut harness = Harness::new();
        harness.set(&tokens::ROBOT_MODE, RobotMode::Teleop);
        harness.set(
            &tokens::TELEOP_DRIVE,
            DriveCommand::new(Percent::MAX_VAL, Percent::MAX_VAL),
        );
        harness.set(&tokens::TELEOP_LAUNCHER, LauncherCommand::Speed(Percent::MAX_VAL));
        harness.set(&tokens::TELEOP_INTAKE, true);
        harness.set(&tokens::TELEOP_FEED, true);
        harness.set(&tokens::TELEOP_CLIMBER, Percent::MAX_VAL);
        harness.set(&tokens::TELEOP_ROTATOR, Percent::MIN_VAL);
        for _ in 0..10 {
            harness.tick().unwrap();
        }

        harness.set(&tokens::ROBOT_MODE, RobotMode::Disabled);
        harness.tick().unwrap();

        harness.field.with(|state| {
            assert_eq!(state.drive, DriveCommand::NEUTRAL);
            assert_eq!(state.flywheel_command, FlywheelCommand::Output(0.0));
            assert_eq!(state.feed, Percent::ZERO);
            assert_eq!(state.intake, Percent::ZERO);
            assert_eq!(state.climber, Percent::ZERO);
            assert_eq!(state.rotator, Percent::ZERO);
        });
        assert_eq!(harness.robot.targeting.pid().accumulated_error(), 0.0);
    }

    #[test]
    fn autonomous_runs_the_sequencer() {
        let mut harness = Harness::new();
        harness.set(&tokens::ROBOT_MODE, RobotMode::Autonomous);

        harness.tick().unwrap();
        assert_eq!(
            harness.store.get_copied(&tokens::AUTO_STATE),
            Some(AutoState::ReverseToWall)
        );

        for _ in 0..1000 {
            harness.tick().unwrap();
        }
        assert_eq!(harness.modes.sequencer().state(), AutoState::Done);
        assert_eq!(harness.store.get_copied(&tokens::AUTO_STATE), Some(AutoState::Done));
    }

    #[test]
    fn tuning_only_in_test_mode() {
        let mut harness = Harness::new();
        let mut gains = RobotConfig::DEFAULT.targeting.gains;
        gains.k_p = 3.0;

        harness.set(&tokens::ROBOT_MODE, RobotMode::Teleop);
        harness.set(&tokens::TUNING_TARGETING_GAINS, gains);
        harness.set(&tokens::TUNING_LAUNCHER_RAMP_GAIN, 0.5);
        harness.tick().unwrap();

        assert_eq!(harness.robot.targeting.gains(), RobotConfig::DEFAULT.targeting.gains);
        assert_eq!(harness.robot.launcher.ramp_gain(), 0.1);

        harness.set(&tokens::ROBOT_MODE, RobotMode::Test);
        harness.tick().unwrap();

        assert_eq!(harness.robot.targeting.gains(), gains);
        assert_eq!(harness.robot.launcher.ramp_gain(), 0.5);
    }

    #[test]
    fn invalid_tuning_is_rejected() {
        let mut harness = Harness::new();
        let mut gains = RobotConfig::DEFAULT.targeting.gains;
        gains.k_i = -1.0;

        harness.set(&tokens::ROBOT_MODE, RobotMode::Test);
        harness.set(&tokens::TUNING_TARGETING_GAINS, gains);
        harness.set(&tokens::TUNING_LAUNCHER_RAMP_GAIN, 2.0);

        assert!(matches!(
            harness.tick(),
            Err(ConfigError::Negative { name: "gains.k_i", .. })
        ));
        assert_eq!(harness.robot.targeting.gains(), RobotConfig::DEFAULT.targeting.gains);
        assert_eq!(harness.robot.launcher.ramp_gain(), 0.1);

        // Reported once, not every cycle
        assert!(harness.tick().is_ok());
    }

    #[test]
    fn leaving_test_restores_defaults() {
        let mut harness = Harness::new();
        let mut gains = RobotConfig::DEFAULT.targeting.gains;
        gains.k_d = 0.0;

        harness.set(&tokens::ROBOT_MODE, RobotMode::Test);
        harness.set(&tokens::TUNING_TARGETING_GAINS, gains);
        harness.set(&tokens::TUNING_LAUNCHER_RAMP_GAIN, 0.9);
        harness.tick().unwrap();
        assert_eq!(harness.robot.targeting.gains(), gains);

        harness.set(&tokens::ROBOT_MODE, RobotMode::Teleop);
        harness.tick().unwrap();

        assert_eq!(harness.robot.targeting.gains(), RobotConfig::DEFAULT.targeting.gains);
        assert_eq!(harness.robot.launcher.ramp_gain(), 0.1);

        // Coming back picks the tuning up again
        harness.set(&tokens::ROBOT_MODE, RobotMode::Test);
        harness.tick().unwrap();
        assert_eq!(harness.robot.targeting.gains(), gains);
    }

    #[test]
    fn tuned_rpm_overrides_velocity_command() {
        let mut harness = Harness::new();
        harness.set(&tokens::ROBOT_MODE, RobotMode::Test);
        harness.set(&tokens::TELEOP_LAUNCHER, LauncherCommand::Velocity(Rpm(4000.0)));
        harness.set(&tokens::TUNING_LAUNCHER_TARGET_RPM, Rpm(3000.0));

        for _ in 0..100 {
            harness.tick().unwrap();
        }
        assert!(harness.robot.launcher.at_velocity(Rpm(3000.0), Rpm(10.0)));

        harness.set(&tokens::ROBOT_MODE, RobotMode::Teleop);
        for _ in 0..100 {
            harness.tick().unwrap();
        }
        assert!(harness.robot.launcher.at_velocity(Rpm(4000.0), Rpm(10.0)));
    }
}
