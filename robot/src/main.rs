//! Robot code for the competition robot: targeting, launching and the
//! autonomous routine
#![warn(
    meta_variable_misuse,
    //missing_debug_implementations,
    //missing_docs,
    //unsafe_code,
    //unused_results,
    //unreachable_pub,
    //clippy::pedantic,
    //clippy::nursery,
    //clippy::unwrap_used,
    //clippy::expect_used
)]

pub mod config;
pub mod control;
pub mod event;
pub mod events;
pub mod modes;
pub mod peripheral;
pub mod robot;
pub mod subsystems;
mod systems;

use crate::systems::control::ControlSystem;
use crate::systems::error::ErrorSystem;
use crate::systems::field::FieldSystem;
use crate::systems::logging::LogEventSystem;
use crate::systems::stop::StopSystem;
use crate::systems::SystemManager;
use tracing::{info, Level};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();
    info!("Starting robot");

    let mut systems = SystemManager::new();

    info!("---------- Registering systems ----------");
    systems.add_system::<StopSystem>();
    systems.add_system::<ErrorSystem>();
    systems.add_system::<LogEventSystem>();
    systems.add_system::<ControlSystem>();
    systems.add_system::<FieldSystem>();
    info!("-----------------------------------------");

    systems.start()?;
    info!("Robot stopped");

    Ok(())
}
