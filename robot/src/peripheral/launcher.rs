//! Launcher motor arrangements
//!
//! Each arrangement is a `LaunchActuator` in its own right, the launcher
//! subsystem does not know how many motors spin the flywheel.

use common::types::Percent;

use super::{LaunchActuator, SpeedOutput};

/// One motor on the flywheel
pub struct SingleMotorLauncher<M> {
    motor: M,
    inverted: bool,
}

impl<M: LaunchActuator> SingleMotorLauncher<M> {
    pub fn new(motor: M, inverted: bool) -> Self {
        Self { motor, inverted }
    }

    fn sign(&self) -> f64 {
        if self.inverted {
            -1.0
        } else {
            1.0
        }
    }
}

impl<M: LaunchActuator> SpeedOutput for SingleMotorLauncher<M> {
    fn set_speed(&mut self, speed: Percent) -> anyhow::Result<()> {
        let speed = if self.inverted { -speed } else { speed };
        self.motor.set_speed(speed)
    }
}

impl<M: LaunchActuator> LaunchActuator for SingleMotorLauncher<M> {
    fn set_velocity(&mut self, native: f64) -> anyhow::Result<()> {
        self.motor.set_velocity(self.sign() * native)
    }

    fn velocity(&self) -> f64 {
        self.sign() * self.motor.velocity()
    }

    fn output(&self) -> Percent {
        let output = self.motor.output();
        if self.inverted {
            -output
        } else {
            output
        }
    }
}

/// Two motors on opposite sides of the flywheel, the follower copies the
/// leader's command mirrored. Only the leader's encoder is read
pub struct DualMotorLauncher<L, F> {
    leader: L,
    follower: F,
}

impl<L: LaunchActuator, F: LaunchActuator> DualMotorLauncher<L, F> {
    pub fn new(leader: L, follower: F) -> Self {
        Self { leader, follower }
    }
}

impl<L: LaunchActuator, F: LaunchActuator> SpeedOutput for DualMotorLauncher<L, F> {
    fn set_speed(&mut self, speed: Percent) -> anyhow::Result<()> {
        self.leader.set_speed(speed)?;
        self.follower.set_speed(-speed)
    }
}

impl<L: LaunchActuator, F: LaunchActuator> LaunchActuator for DualMotorLauncher<L, F> {
    fn set_velocity(&mut self, native: f64) -> anyhow::Result<()> {
        self.leader.set_velocity(native)?;
        self.follower.set_velocity(-native)
    }

    fn velocity(&self) -> f64 {
        self.leader.velocity()
    }

    fn output(&self) -> Percent {
        self.leader.output()
    }
}

/// Two motors each on their own wheel. Both are commanded, the measured
/// velocity is the mean of the two
pub struct IndependentDualLauncher<A, B> {
    top: A,
    bottom: B,
    /// Bottom wheel speed relative to the top wheel, for backspin
    bottom_ratio: f64,
}

impl<A: LaunchActuator, B: LaunchActuator> IndependentDualLauncher<A, B> {
    pub fn new(top: A, bottom: B, bottom_ratio: f64) -> Self {
        Self {
            top,
            bottom,
            bottom_ratio,
        }
    }
}

impl<A: LaunchActuator, B: LaunchActuator> SpeedOutput for IndependentDualLauncher<A, B> {
    fn set_speed(&mut self, speed: Percent) -> anyhow::Result<()> {
        self.top.set_speed(speed)?;
        self.bottom
            .set_speed(Percent::new(-speed.get() * self.bottom_ratio))
    }
}

impl<A: LaunchActuator, B: LaunchActuator> LaunchActuator for IndependentDualLauncher<A, B> {
    fn set_velocity(&mut self, native: f64) -> anyhow::Result<()> {
        self.top.set_velocity(native)?;
        self.bottom.set_velocity(-native * self.bottom_ratio)
    }

    fn velocity(&self) -> f64 {
        let bottom = if self.bottom_ratio == 0.0 {
            self.top.velocity()
        } else {
            -self.bottom.velocity() / self.bottom_ratio
        };

        (self.top.velocity() + bottom) / 2.0
    }

    fn output(&self) -> Percent {
        self.top.output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeMotor {
        output: f64,
        velocity: f64,
    }

    impl SpeedOutput for FakeMotor {
        fn set_speed(&mut self, speed: Percent) -> anyhow::Result<()> {
            self.output = speed.get();
            Ok(())
        }
    }

    impl LaunchActuator for FakeMotor {
        fn set_velocity(&mut self, native: f64) -> anyhow::Result<()> {
            self.velocity = native;
            Ok(())
        }

        fn velocity(&self) -> f64 {
            self.velocity
        }

        fn output(&self) -> Percent {
            Percent::new(self.output)
        }
    }

    #[test]
    fn inverted_single_motor() {
        let mut launcher = SingleMotorLauncher::new(FakeMotor::default(), true);

        launcher.set_speed(Percent::new(0.4)).unwrap();
        launcher.set_velocity(1000.0).unwrap();

        assert_eq!(launcher.motor.output, -0.4);
        assert_eq!(launcher.output(), Percent::new(0.4));
        assert_eq!(launcher.velocity(), 1000.0);
    }

    #[test]
    fn follower_mirrors_leader() {
        let mut launcher = DualMotorLauncher::new(FakeMotor::default(), FakeMotor::default());

        launcher.set_speed(Percent::new(0.7)).unwrap();
        launcher.set_velocity(5000.0).unwrap();

        assert_eq!(launcher.follower.output, -0.7);
        assert_eq!(launcher.follower.velocity, -5000.0);
        assert_eq!(launcher.velocity(), 5000.0);
    }

    #[test]
    fn independent_wheels_average() {
        let mut launcher =
            IndependentDualLauncher::new(FakeMotor::default(), FakeMotor::default(), 0.5);

        launcher.set_velocity(4000.0).unwrap();
        assert_eq!(launcher.bottom.velocity, -2000.0);
        assert_eq!(launcher.velocity(), 4000.0);

        // Bottom wheel lagging pulls the estimate down
        launcher.bottom.velocity = -1000.0;
        assert_eq!(launcher.velocity(), 3000.0);
    }
}
