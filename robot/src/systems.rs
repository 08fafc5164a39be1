pub mod control;
pub mod error;
pub mod field;
pub mod logging;
pub mod stop;

use std::{
    marker::PhantomData,
    thread::{self, Scope},
};

use anyhow::Context;
use tracing::{error, info};

use crate::{event::Event, events::EventHandle};

/// A part of the robot program that runs on its own threads and talks to the
/// rest over the event bus
pub trait System {
    const NAME: &'static str;

    /// Spawn the system's threads. Must not block
    fn start<'scope>(
        events: EventHandle,
        spawner: &'scope Scope<'scope, '_>,
    ) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct SystemManager(Vec<Box<dyn SystemStarter>>);

impl SystemManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_system<S: System + 'static>(&mut self) {
        info!("Registered {}", S::NAME);
        self.0.push(Box::new(Starter::<S>(PhantomData)));
    }

    /// Runs every system until they have all exited
    pub fn start(self) -> anyhow::Result<()> {
        let mut handles = EventHandle::create(self.0.len() + 1);
        let mut own = handles.pop().context("Create event bus")?;
        let _ = own.take_listner();

        thread::scope(|spawner| {
            for (system, events) in self.0.iter().zip(handles) {
                info!("Starting {}", system.name());

                let started = system
                    .start(events, spawner)
                    .with_context(|| format!("Start {}", system.name()));
                if let Err(err) = started {
                    error!("Could not start {}, stopping", system.name());

                    stop::stop_world();
                    own.send(Event::Exit);
                    return Err(err);
                }
            }

            info!("All systems started");
            Ok(())
        })
    }
}

/// Object safe handle on a `System` type
trait SystemStarter {
    fn name(&self) -> &'static str;

    fn start<'scope>(
        &self,
        events: EventHandle,
        spawner: &'scope Scope<'scope, '_>,
    ) -> anyhow::Result<()>;
}

struct Starter<S>(PhantomData<fn() -> S>);

impl<S: System> SystemStarter for Starter<S> {
    fn name(&self) -> &'static str {
        S::NAME
    }

    fn start<'scope>(
        &self,
        events: EventHandle,
        spawner: &'scope Scope<'scope, '_>,
    ) -> anyhow::Result<()> {
        S::start(events, spawner)
    }
}
