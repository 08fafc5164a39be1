use std::{
    sync::Arc,
    thread::{self, Scope},
    time::{Duration, Instant},
};

use anyhow::Context;
use common::{error::LogErrorExt, store::Store};
use crossbeam::channel::bounded;
use tracing::{info, span, warn, Level};

use crate::{
    config::RobotConfig,
    event::Event,
    events::EventHandle,
    modes::ModeController,
    peripheral::{sim::SimField, SystemClock},
    robot::{Aim, Robot},
    systems::stop,
};

use super::System;

pub const PERIOD: Duration = Duration::from_millis(20);

/// Owns every mechanism and runs the control cycle.
///
/// No hardware is attached, the robot is wired to a simulated field which is
/// advanced once per cycle.
pub struct ControlSystem;

impl System for ControlSystem {
    const NAME: &'static str = "Control";

    fn start<'scope>(
        mut events: EventHandle,
        spawner: &'scope Scope<'scope, '_>,
    ) -> anyhow::Result<()> {
        let listner = events.take_listner().context("Control listener")?;

        let config = RobotConfig::DEFAULT;
        config.validate().context("Validate robot config")?;

        let (tx, rx) = bounded(30);

        {
            let tx = tx.clone();
            spawner.spawn(move || {
                let _span = span!(Level::INFO, "Control watcher thread").entered();

                for event in listner {
                    match &*event {
                        Event::Store(_) => {
                            tx.try_send(ControlEvent::Event(event))
                                .log_error("Send Event");
                        }
                        Event::Exit => {
                            tx.try_send(ControlEvent::Exit).log_error("Send Exit");
                            return;
                        }
                        _ => {}
                    }
                }
            });
        }

        {
            let tx = tx;
            spawner.spawn(move || {
                let _span = span!(Level::INFO, "Control tick thread").entered();

                let mut deadline = Instant::now() + PERIOD;

                while !stop::world_stopped() {
                    tx.try_send(ControlEvent::Tick).log_error("Send tick");

                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if !remaining.is_zero() {
                        thread::sleep(remaining);
                    } else {
                        warn!("Behind schedual");
                    }
                    deadline += PERIOD;
                }
            });
        }

        {
            let rx = rx;
            spawner.spawn(move || {
                let _span = span!(Level::INFO, "Control thread").entered();

                let mut store = {
                    let mut events = events.clone();
                    Store::new(move |update| {
                        events.send(Event::Store(update));
                    })
                };

                let field = SimField::new();
                let mut robot = Robot::simulated(&field, &config, Aim::Vision);
                let mut modes = ModeController::new(SystemClock::new(), &config);

                for event in rx {
                    match event {
                        ControlEvent::Event(event) => {
                            if let Event::Store(update) = &*event {
                                store.handle_update_shared(update);
                            }
                        }
                        ControlEvent::Tick => {
                            if let Err(err) = modes.periodic(&mut robot, &mut store) {
                                events.send(Event::Error(
                                    anyhow::Error::new(err).context("Apply tuning"),
                                ));
                            }

                            field.step(PERIOD);
                        }
                        ControlEvent::Exit => {
                            robot.stop_all();
                            info!("Actuators zeroed");

                            return;
                        }
                    }
                }
            });
        }

        Ok(())
    }
}

enum ControlEvent {
    Event(Arc<Event>),
    Tick,
    Exit,
}
