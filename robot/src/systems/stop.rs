use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread::Scope,
};

use anyhow::Context;
use tracing::info;

use crate::{event::Event, events::EventHandle};

use super::System;

static STOP_THE_WORLD: AtomicBool = AtomicBool::new(false);

/// Ctrl-C ends the program
pub struct StopSystem;

impl System for StopSystem {
    const NAME: &'static str = "Stop";

    fn start<'scope>(
        mut events: EventHandle,
        _spawner: &'scope Scope<'scope, '_>,
    ) -> anyhow::Result<()> {
        let _ = events.take_listner();

        ctrlc::set_handler(move || {
            info!("Ctrl-C, stopping");

            stop_world();
            events.send(Event::Exit);
        })
        .context("Set ctrl-c")?;

        Ok(())
    }
}

pub fn world_stopped() -> bool {
    STOP_THE_WORLD.load(Ordering::Relaxed)
}

/// Tick threads finish their current cycle and return. Listeners still need
/// an `Event::Exit`
pub fn stop_world() {
    STOP_THE_WORLD.store(true, Ordering::Relaxed);
}
