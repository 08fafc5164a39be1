//! Definitions of important types used throughout the project

use std::fmt::{Display, Formatter};
use std::ops::{Add, Neg, Sub};

/// Forward/turn pair sent to the drivetrain.
///
/// +forward drives the robot forwards, +turn rotates it counter-clockwise (top view)
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DriveCommand {
    pub forward: Percent,
    pub turn: Percent,
}

impl DriveCommand {
    pub const NEUTRAL: DriveCommand = DriveCommand {
        forward: Percent::ZERO,
        turn: Percent::ZERO,
    };

    pub const fn new(forward: Percent, turn: Percent) -> Self {
        Self { forward, turn }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Gear {
    #[default]
    Low,
    High,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum RobotMode {
    #[default]
    Disabled,
    Autonomous,
    Teleop,
    /// Teleop with live tuning from the dashboard
    Test,
}

/// Phases of the autonomous mission, in the only order they may run
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum AutoState {
    #[default]
    ReverseToWall,
    AcquireTarget,
    SpinUpLauncher,
    FeedBalls,
    Done,
}

impl AutoState {
    pub const ORDER: [AutoState; 5] = [
        AutoState::ReverseToWall,
        AutoState::AcquireTarget,
        AutoState::SpinUpLauncher,
        AutoState::FeedBalls,
        AutoState::Done,
    ];

    /// The immediate successor, `None` for the terminal state
    pub const fn next(self) -> Option<AutoState> {
        match self {
            AutoState::ReverseToWall => Some(AutoState::AcquireTarget),
            AutoState::AcquireTarget => Some(AutoState::SpinUpLauncher),
            AutoState::SpinUpLauncher => Some(AutoState::FeedBalls),
            AutoState::FeedBalls => Some(AutoState::Done),
            AutoState::Done => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, AutoState::Done)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub enum LauncherCommand {
    #[default]
    Off,
    Speed(Percent),
    Velocity(Rpm),
}

/// Published once per cycle by the targeting controller
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct TargetingStatus {
    pub on_target: bool,
    /// `None` when nothing was visible this cycle
    pub error: Option<Degrees>,
    pub turn: Percent,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct MagazineStatus {
    pub intake_side: bool,
    pub launch_side: bool,
}

// Basic Units

#[derive(Debug, Copy, Clone, Default, PartialOrd, PartialEq)]
pub struct Degrees(pub f64);

impl Degrees {
    /// Maps the angle into (-180, 180]
    pub fn wrapped(self) -> Degrees {
        let angle = self.0 % 360.0;

        if angle > 180.0 {
            Degrees(angle - 360.0)
        } else if angle <= -180.0 {
            Degrees(angle + 360.0)
        } else {
            Degrees(angle)
        }
    }

    /// Signed angle from `reference` to `self` along the shorter way around
    pub fn shortest_from(self, reference: Degrees) -> Degrees {
        Degrees(self.0 - reference.0).wrapped()
    }

    pub fn abs(self) -> Degrees {
        Degrees(self.0.abs())
    }
}

impl Neg for Degrees {
    type Output = Degrees;

    fn neg(self) -> Self::Output {
        Degrees(-self.0)
    }
}

impl Display for Degrees {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!("{:.2}deg", self.0))
    }
}

#[derive(Debug, Copy, Clone, Default, PartialOrd, PartialEq)]
pub struct Rpm(pub f64);

impl Display for Rpm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!("{:.0}rpm", self.0))
    }
}

/// Raw encoder position
#[derive(Debug, Copy, Clone, Default, PartialOrd, Ord, PartialEq, Eq)]
pub struct Ticks(pub i64);

impl Display for Ticks {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!("{}ticks", self.0))
    }
}

#[derive(Debug, Copy, Clone, Default, PartialOrd, PartialEq)]
pub struct Percent(f64);

impl Percent {
    pub const MAX_VAL: Percent = Percent(1.0);
    pub const MIN_VAL: Percent = Percent(-1.0);
    pub const ZERO: Percent = Percent(0.0);

    /// Creates a new `Percent`, saturating to -1.0..=1.0. NaN becomes zero
    pub const fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value).clamp(Self::MIN_VAL, Self::MAX_VAL)
    }

    /// Clamps a value to be between `min` and `max`
    pub const fn clamp(self, min: Percent, max: Percent) -> Percent {
        if self.0 > max.0 {
            max
        } else if self.0 < min.0 {
            min
        } else {
            self
        }
    }

    /// Get the value as a float between -1.0 and 1.0
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Add<Percent> for Percent {
    type Output = Percent;

    fn add(self, rhs: Percent) -> Self::Output {
        Percent::new(self.0 + rhs.0)
    }
}

impl Sub<Percent> for Percent {
    type Output = Percent;

    fn sub(self, rhs: Percent) -> Self::Output {
        Percent::new(self.0 - rhs.0)
    }
}

impl Neg for Percent {
    type Output = Percent;

    fn neg(self) -> Self::Output {
        Percent(-self.0)
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!("{:.2}%", self.0 * 100.0))
    }
}

// Control

/// Controller gains, replaced as a whole when tuned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub k_p: f64,
    pub k_i: f64,
    pub k_d: f64,
    /// Added in the direction of the error to overcome static friction
    pub k_f: f64,

    /// Bound on the accumulated error
    pub integral_zone: f64,
    /// Bound on the scaled output
    pub peak_output: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PidController {
    accumulated_error: f64,
    previous_error: Option<f64>,
    last_output: f64,
}

impl PidController {
    pub fn update(&mut self, error: f64, gains: PidGains) -> f64 {
        self.accumulated_error = clamp(self.accumulated_error + error, gains.integral_zone);

        // No derivative kick on the first sample after a reset
        let delta = match self.previous_error {
            Some(previous_error) => error - previous_error,
            None => 0.0,
        };
        self.previous_error = Some(error);

        let feedforward = if error == 0.0 {
            0.0
        } else {
            gains.k_f * error.signum()
        };

        let output = gains.k_p * error
            + gains.k_i * self.accumulated_error
            + gains.k_d * delta
            + feedforward;
        self.last_output = output;

        output
    }

    /// Forget the previous sample without touching the integral
    pub fn interrupt(&mut self) {
        self.previous_error = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn accumulated_error(&self) -> f64 {
        self.accumulated_error
    }

    pub fn previous_error(&self) -> Option<f64> {
        self.previous_error
    }

    pub fn last_output(&self) -> f64 {
        self.last_output
    }
}

/// Symmetric clamp that tolerates a negative or NaN range
pub fn clamp(val: f64, range: f64) -> f64 {
    let range = range.abs();
    val.max(-range).min(range)
}
