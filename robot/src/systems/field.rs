use std::{
    thread::{self, Scope},
    time::{Duration, Instant},
};

use common::{
    store::{tokens, Store},
    types::RobotMode,
};
use tracing::{info, span, Level};

use crate::{event::Event, events::EventHandle, systems::stop};

use super::System;

/// A match as the field runs it
const MATCH: [(RobotMode, Duration); 3] = [
    (RobotMode::Disabled, Duration::from_secs(1)),
    (RobotMode::Autonomous, Duration::from_secs(15)),
    (RobotMode::Teleop, Duration::from_secs(135)),
];

const POLL: Duration = Duration::from_millis(20);

/// Stands in for the field management system. Plays one match, then
/// disables the robot and stops the program
pub struct FieldSystem;

impl System for FieldSystem {
    const NAME: &'static str = "Field";

    fn start<'scope>(
        mut events: EventHandle,
        spawner: &'scope Scope<'scope, '_>,
    ) -> anyhow::Result<()> {
        // Nothing on the bus concerns the field
        let _ = events.take_listner();

        spawner.spawn(move || {
            let _span = span!(Level::INFO, "Field thread").entered();

            let mut store = {
                let mut events = events.clone();
                Store::new(move |update| {
                    events.send(Event::Store(update));
                })
            };

            for (mode, duration) in MATCH {
                info!("Field: {mode:?} for {}s", duration.as_secs());
                store.insert(&tokens::ROBOT_MODE, mode);

                if !wait(duration) {
                    return;
                }
            }

            info!("Field: match over");
            store.insert(&tokens::ROBOT_MODE, RobotMode::Disabled);

            // Let the control cycle see the mode change before exiting
            if wait(POLL * 5) {
                stop::stop_world();
                events.send(Event::Exit);
            }
        });

        Ok(())
    }
}

/// Sleeps for `duration`, returns false if the program is stopping
fn wait(duration: Duration) -> bool {
    let deadline = Instant::now() + duration;

    loop {
        if stop::world_stopped() {
            return false;
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return true;
        }

        thread::sleep(remaining.min(POLL));
    }
}
