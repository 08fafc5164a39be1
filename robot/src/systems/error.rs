use std::thread::Scope;

use anyhow::Context;
use tracing::{error, span, Level};

use crate::{event::Event, events::EventHandle, systems::System};

/// Handles error events
pub struct ErrorSystem;

impl System for ErrorSystem {
    const NAME: &'static str = "Error";

    fn start<'scope>(
        mut events: EventHandle,
        spawner: &'scope Scope<'scope, '_>,
    ) -> anyhow::Result<()> {
        let listner = events.take_listner().context("Error listener")?;

        spawner.spawn(move || {
            let _span = span!(Level::ERROR, "Error handler").entered();
            let mut count = 0usize;

            for event in listner.into_iter() {
                match &*event {
                    Event::Error(err) => {
                        count += 1;
                        error!("Encountered error #{count}: {err:?}");
                    }
                    Event::Exit => return,
                    _ => {}
                }
            }
        });

        Ok(())
    }
}
