use std::thread::Scope;

use anyhow::Context;
use tracing::{debug, span, Level};

use crate::{event::Event, events::EventHandle, systems::System};

/// System for debugging
/// Prints all messages on the event bus
pub struct LogEventSystem;

impl System for LogEventSystem {
    const NAME: &'static str = "Event logger";

    fn start<'scope>(
        mut events: EventHandle,
        spawner: &'scope Scope<'scope, '_>,
    ) -> anyhow::Result<()> {
        let listner = events.take_listner().context("Event logger listener")?;

        spawner.spawn(move || {
            let _span = span!(Level::DEBUG, "Event logger").entered();

            for event in listner.into_iter() {
                match &*event {
                    // Status is written every control cycle
                    // Hide this
                    Event::Store((key, _)) if key.as_str().starts_with("robot.status") => {}

                    Event::Store((key, _)) => {
                        debug!("Store({key}, ..)");
                    }
                    Event::Exit => {
                        debug!("Exit");
                        return;
                    }
                    event => {
                        debug!("{event:?}");
                    }
                }
            }
        });

        Ok(())
    }
}
