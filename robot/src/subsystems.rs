//! Mechanisms built from the peripherals

pub mod climber;
pub mod drivetrain;
pub mod launcher;
pub mod magazine;

pub use climber::Climber;
pub use drivetrain::Drivetrain;
pub use launcher::Launcher;
pub use magazine::Magazine;
