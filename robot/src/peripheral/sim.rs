//! Simulated devices backed by a small kinematic model of the robot
//!
//! Used when no hardware is attached and by the tests. All devices handed out
//! by one `SimField` share the same state, so driving the robot turns the
//! gyro and moves the target in the camera's view.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use anyhow::bail;
use common::types::{Degrees, DriveCommand, Percent, Ticks};

use super::{
    BallSensors, Clock, DriveActuator, HeadingSource, LaunchActuator, Solenoid, SpeedOutput,
    VisionSource,
};

/// Degrees per second at full turn
pub const MAX_TURN_RATE: f64 = 180.0;
/// Encoder ticks per second at full forward
pub const MAX_DRIVE_RATE: f64 = 20_000.0;
/// Flywheel velocity in native units at full output
pub const FLYWHEEL_FREE_SPEED: f64 = 21_777.0;
/// Inverse of the flywheel time constant
const FLYWHEEL_RESPONSE: f64 = 10.0;
pub const CAMERA_HALF_FOV: f64 = 29.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlywheelCommand {
    Output(f64),
    Velocity(f64),
}

/// The launcher has a main flywheel and, on some robots, a separate backspin
/// wheel under it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    Main,
    Backspin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorSlot {
    Feed,
    Intake,
    Climber,
    Rotator,
}

#[derive(Debug, Clone)]
pub struct FieldState {
    pub heading: f64,
    pub gyro_connected: bool,
    pub position: f64,
    pub drive: DriveCommand,

    /// Heading the robot must face to point at the goal, `None` hides the goal
    pub target_heading: Option<f64>,

    pub flywheel_command: FlywheelCommand,
    pub flywheel_velocity: f64,
    pub backspin_command: FlywheelCommand,
    pub backspin_velocity: f64,

    pub feed: Percent,
    pub intake: Percent,
    pub climber: Percent,
    pub rotator: Percent,
    pub shifter_extended: bool,

    pub intake_ball: bool,
    pub launch_ball: bool,
    /// Balls lying in front of the intake
    pub loose_balls: u32,
    pub launched: u32,

    /// Makes every actuator write fail
    pub unplugged: bool,
}

impl Default for FieldState {
    fn default() -> Self {
        Self {
            heading: 0.0,
            gyro_connected: true,
            position: 0.0,
            drive: DriveCommand::NEUTRAL,
            target_heading: Some(8.0),
            flywheel_command: FlywheelCommand::Output(0.0),
            flywheel_velocity: 0.0,
            backspin_command: FlywheelCommand::Output(0.0),
            backspin_velocity: 0.0,
            feed: Percent::ZERO,
            intake: Percent::ZERO,
            climber: Percent::ZERO,
            rotator: Percent::ZERO,
            shifter_extended: false,
            intake_ball: true,
            launch_ball: true,
            loose_balls: 3,
            launched: 0,
            unplugged: false,
        }
    }
}

impl FieldState {
    pub fn step(&mut self, dt: Duration) {
        let dt = dt.as_secs_f64();

        self.heading += self.drive.turn.get() * MAX_TURN_RATE * dt;
        self.position += self.drive.forward.get() * MAX_DRIVE_RATE * dt;

        let response = (FLYWHEEL_RESPONSE * dt).min(1.0);
        for wheel in [Wheel::Main, Wheel::Backspin] {
            let (command, velocity) = self.wheel_mut(wheel);
            let goal = match *command {
                FlywheelCommand::Output(output) => output * FLYWHEEL_FREE_SPEED,
                FlywheelCommand::Velocity(velocity) => {
                    velocity.clamp(-FLYWHEEL_FREE_SPEED, FLYWHEEL_FREE_SPEED)
                }
            };
            *velocity += (goal - *velocity) * response;
        }

        // The belt moves at most one ball one slot per step
        if self.feed.get() > 0.0 {
            if self.launch_ball {
                self.launch_ball = false;
                self.launched += 1;
            } else if self.intake_ball {
                self.intake_ball = false;
                self.launch_ball = true;
            }
        }

        if self.intake.get() > 0.0 && !self.intake_ball && self.loose_balls > 0 {
            self.loose_balls -= 1;
            self.intake_ball = true;
        }
    }

    pub fn bearing(&self) -> Option<Degrees> {
        let target = self.target_heading?;
        let bearing = Degrees(self.heading).shortest_from(Degrees(target));

        (bearing.0.abs() <= CAMERA_HALF_FOV).then_some(bearing)
    }

    pub fn wheel(&self, wheel: Wheel) -> (FlywheelCommand, f64) {
        match wheel {
            Wheel::Main => (self.flywheel_command, self.flywheel_velocity),
            Wheel::Backspin => (self.backspin_command, self.backspin_velocity),
        }
    }

    fn wheel_mut(&mut self, wheel: Wheel) -> (&mut FlywheelCommand, &mut f64) {
        match wheel {
            Wheel::Main => (&mut self.flywheel_command, &mut self.flywheel_velocity),
            Wheel::Backspin => (&mut self.backspin_command, &mut self.backspin_velocity),
        }
    }

    /// Output the wheel's motor controller is applying
    pub fn wheel_output(&self, wheel: Wheel) -> f64 {
        match self.wheel(wheel) {
            (FlywheelCommand::Output(output), _) => output,
            (FlywheelCommand::Velocity(_), velocity) => velocity / FLYWHEEL_FREE_SPEED,
        }
    }

    fn check_plugged_in(&self, device: &str) -> anyhow::Result<()> {
        if self.unplugged {
            bail!("{device} is not responding");
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimField(Arc<Mutex<FieldState>>);

impl SimField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut FieldState) -> R) -> R {
        let mut state = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub fn step(&self, dt: Duration) {
        self.with(|state| state.step(dt))
    }

    pub fn drive(&self) -> SimDrive {
        SimDrive {
            field: self.clone(),
            zero: 0.0,
        }
    }

    pub fn gyro(&self) -> SimGyro {
        SimGyro(self.clone())
    }

    pub fn camera(&self) -> SimCamera {
        SimCamera(self.clone())
    }

    pub fn launch_motor(&self, wheel: Wheel, inverted: bool) -> SimLaunchMotor {
        SimLaunchMotor {
            field: self.clone(),
            wheel,
            sign: if inverted { -1.0 } else { 1.0 },
        }
    }

    pub fn motor(&self, slot: MotorSlot) -> SimMotor {
        SimMotor {
            field: self.clone(),
            slot,
        }
    }

    pub fn shifter(&self) -> SimShifter {
        SimShifter(self.clone())
    }

    pub fn ball_sensors(&self) -> SimBallSensors {
        SimBallSensors(self.clone())
    }
}

pub struct SimDrive {
    field: SimField,
    /// Field position the encoder was last zeroed at
    zero: f64,
}

impl DriveActuator for SimDrive {
    fn drive(&mut self, forward: Percent, turn: Percent) -> anyhow::Result<()> {
        self.field.with(|state| {
            state.check_plugged_in("Drivetrain")?;
            state.drive = DriveCommand::new(forward, turn);
            Ok(())
        })
    }

    fn position(&self) -> Ticks {
        let position = self.field.with(|state| state.position);
        Ticks((position - self.zero).round() as i64)
    }

    fn reset_position(&mut self) -> anyhow::Result<()> {
        self.zero = self.field.with(|state| {
            state.check_plugged_in("Drive encoder")?;
            anyhow::Ok(state.position)
        })?;

        Ok(())
    }
}

pub struct SimGyro(SimField);

impl HeadingSource for SimGyro {
    fn heading(&self) -> Option<Degrees> {
        self.0
            .with(|state| state.gyro_connected.then_some(Degrees(state.heading)))
    }
}

pub struct SimCamera(SimField);

impl VisionSource for SimCamera {
    fn has_target(&self) -> bool {
        self.0.with(|state| state.bearing().is_some())
    }

    fn bearing_error(&self) -> Degrees {
        self.0.with(|state| state.bearing().unwrap_or_default())
    }
}

/// One side of a wheel. Motors on opposite sides of the same wheel see it
/// spinning in opposite directions
pub struct SimLaunchMotor {
    field: SimField,
    wheel: Wheel,
    sign: f64,
}

impl SimLaunchMotor {
    fn command(&self, command: FlywheelCommand) -> anyhow::Result<()> {
        self.field.with(|state| {
            state.check_plugged_in("Launcher")?;
            *state.wheel_mut(self.wheel).0 = command;
            Ok(())
        })
    }
}

impl SpeedOutput for SimLaunchMotor {
    fn set_speed(&mut self, speed: Percent) -> anyhow::Result<()> {
        self.command(FlywheelCommand::Output(self.sign * speed.get()))
    }
}

impl LaunchActuator for SimLaunchMotor {
    fn set_velocity(&mut self, native: f64) -> anyhow::Result<()> {
        self.command(FlywheelCommand::Velocity(self.sign * native))
    }

    fn velocity(&self) -> f64 {
        self.sign * self.field.with(|state| state.wheel(self.wheel).1)
    }

    fn output(&self) -> Percent {
        Percent::new(self.sign * self.field.with(|state| state.wheel_output(self.wheel)))
    }
}

pub struct SimMotor {
    field: SimField,
    slot: MotorSlot,
}

impl SpeedOutput for SimMotor {
    fn set_speed(&mut self, speed: Percent) -> anyhow::Result<()> {
        self.field.with(|state| {
            state.check_plugged_in("Motor")?;
            let output = match self.slot {
                MotorSlot::Feed => &mut state.feed,
                MotorSlot::Intake => &mut state.intake,
                MotorSlot::Climber => &mut state.climber,
                MotorSlot::Rotator => &mut state.rotator,
            };
            *output = speed;
            Ok(())
        })
    }
}

pub struct SimShifter(SimField);

impl Solenoid for SimShifter {
    fn set(&mut self, extended: bool) -> anyhow::Result<()> {
        self.0.with(|state| {
            state.check_plugged_in("Shifter")?;
            state.shifter_extended = extended;
            Ok(())
        })
    }
}

pub struct SimBallSensors(SimField);

impl BallSensors for SimBallSensors {
    fn intake_side(&self) -> bool {
        self.0.with(|state| state.intake_ball)
    }

    fn launch_side(&self) -> bool {
        self.0.with(|state| state.launch_ball)
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone, Default)]
pub struct MockClock(Arc<AtomicU64>);

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Duration) {
        self.0.store(now.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_micros() as u64, Ordering::Relaxed);
    }
}

impl Clock for MockClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.0.load(Ordering::Relaxed))
    }
}
