use common::{error::LogErrorExt, types::Percent};

use crate::peripheral::SpeedOutput;

/// Moves an output toward its setpoint by a fixed fraction of the remaining
/// error every call.
///
/// There is no stored setpoint and no notion of time, the ramp only advances
/// when `set_setpoint` is called, so callers drive it once per control cycle.
/// After `n` calls toward `s` the remaining error is `(1 - gain)^n` of what it
/// started as.
pub struct ProportionalRamp<O> {
    output: O,
    gain: f64,
    current: f64,
}

impl<O: SpeedOutput> ProportionalRamp<O> {
    pub fn new(output: O, gain: f64) -> Self {
        Self {
            output,
            gain: gain.clamp(0.0, 1.0),
            current: 0.0,
        }
    }

    pub fn set_setpoint(&mut self, target: Percent) {
        let error = target.get() - self.current;
        self.current = (self.current + error * self.gain).clamp(-1.0, 1.0);

        self.output
            .set_speed(Percent::new(self.current))
            .log_error("Ramp output");
    }

    /// Ramp toward zero
    pub fn zero(&mut self) {
        self.set_setpoint(Percent::ZERO);
    }

    /// Cut the output immediately
    pub fn stop(&mut self) {
        self.current = 0.0;

        self.output
            .set_speed(Percent::ZERO)
            .log_error("Ramp stop");
    }

    /// Continue ramping from `value` without commanding it. Used when the
    /// output was driven by something else in the meantime
    pub fn reset_to(&mut self, value: Percent) {
        self.current = value.get();
    }

    pub fn current(&self) -> Percent {
        Percent::new(self.current)
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn set_gain(&mut self, gain: f64) {
        if gain.is_nan() {
            return;
        }
        self.gain = gain.clamp(0.0, 1.0);
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<f64>);

    impl SpeedOutput for Recorder {
        fn set_speed(&mut self, speed: Percent) -> anyhow::Result<()> {
            self.0.push(speed.get());
            Ok(())
        }
    }

    #[test]
    fn halves_the_gap_each_call() {
        let mut ramp = ProportionalRamp::new(Recorder::default(), 0.5);

        for _ in 0..4 {
            ramp.set_setpoint(Percent::MAX_VAL);
        }

        assert_eq!(ramp.output().0, vec![0.5, 0.75, 0.875, 0.9375]);
    }

    #[test]
    fn never_overshoots() {
        let mut ramp = ProportionalRamp::new(Recorder::default(), 0.5);

        for _ in 0..200 {
            ramp.set_setpoint(Percent::MAX_VAL);
            assert!(ramp.current().get() <= 1.0);
        }
        assert!((ramp.current().get() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn geometric_convergence() {
        for gain in [0.05, 0.3, 0.5, 0.9, 1.0] {
            for target in [-1.0, -0.35, 0.0, 0.6, 1.0] {
                let mut ramp = ProportionalRamp::new(Recorder::default(), gain);
                ramp.reset_to(Percent::new(-target / 2.0));

                let mut gap = (ramp.current().get() - target).abs();
                for _ in 0..30 {
                    ramp.set_setpoint(Percent::new(target));
                    let next_gap = (ramp.current().get() - target).abs();

                    assert!((next_gap - gap * (1.0 - gain)).abs() < 1e-9);
                    gap = next_gap;
                }
            }
        }
    }

    #[test]
    fn unit_gain_follows_instantly_zero_gain_freezes() {
        let mut follower = ProportionalRamp::new(Recorder::default(), 1.0);
        follower.set_setpoint(Percent::new(-0.3));
        assert_eq!(follower.current(), Percent::new(-0.3));

        let mut frozen = ProportionalRamp::new(Recorder::default(), 0.0);
        frozen.reset_to(Percent::new(0.2));
        frozen.set_setpoint(Percent::MAX_VAL);
        assert_eq!(frozen.current(), Percent::new(0.2));
    }

    #[test]
    fn zero_ramps_stop_cuts() {
        let mut ramp = ProportionalRamp::new(Recorder::default(), 0.5);
        ramp.set_setpoint(Percent::MAX_VAL);

        ramp.zero();
        assert_eq!(ramp.current(), Percent::new(0.25));

        ramp.stop();
        assert_eq!(ramp.current(), Percent::ZERO);
        assert_eq!(ramp.output().0.last(), Some(&0.0));
    }

    #[test]
    fn gain_is_clamped() {
        let mut ramp = ProportionalRamp::new(Recorder::default(), 4.0);
        assert_eq!(ramp.gain(), 1.0);

        ramp.set_gain(-0.2);
        assert_eq!(ramp.gain(), 0.0);

        ramp.set_gain(f64::NAN);
        assert_eq!(ramp.gain(), 0.0);
    }
}
