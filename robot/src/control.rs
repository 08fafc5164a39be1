//! The closed loop parts of the robot: aiming, ramping and the autonomous routine

pub mod ramp;
pub mod sequencer;
pub mod targeting;
