use std::sync::Arc;

use crossbeam::channel::{Receiver, Sender, TrySendError};
use tracing::error;

use crate::event::Event;

/// Events a slow system may fall behind by before new ones are dropped
const CAPACITY: usize = 50;

/// One system's connection to the broadcast bus. Every handle can send to
/// every listener, including its own
#[derive(Debug, Clone)]
pub struct EventHandle {
    peers: Vec<Sender<Arc<Event>>>,
    listner: Option<Receiver<Arc<Event>>>,
}

impl EventHandle {
    pub fn create(count: usize) -> Vec<EventHandle> {
        let (peers, listners): (Vec<_>, Vec<_>) = (0..count)
            .map(|_| crossbeam::channel::bounded(CAPACITY))
            .unzip();

        listners
            .into_iter()
            .map(|listner| EventHandle {
                peers: peers.clone(),
                listner: Some(listner),
            })
            .collect()
    }

    #[tracing::instrument(skip(self))]
    pub fn send(&mut self, event: Event) {
        let event = Arc::new(event);

        // Peers that hung up are forgotten
        self.peers.retain(|peer| match peer.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                error!("Message channel full, event dropped");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }

    pub fn listner(&self) -> Option<&Receiver<Arc<Event>>> {
        self.listner.as_ref()
    }

    pub fn take_listner(&mut self) -> Option<Receiver<Arc<Event>>> {
        self.listner.take()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcasts_to_everyone() {
        let mut handles = EventHandle::create(3);

        handles[0].send(Event::Exit);

        for handle in &handles {
            let event = handle.listner().unwrap().try_recv().unwrap();
            assert!(matches!(*event, Event::Exit));
        }
    }

    #[test]
    fn forgets_dropped_listeners() {
        let mut handles = EventHandle::create(2);
        let mut sender = handles.remove(0);
        drop(handles);

        sender.send(Event::Exit);
        assert_eq!(sender.peer_count(), 1);

        let listner = sender.take_listner().unwrap();
        drop(listner);
        sender.send(Event::Exit);
        assert_eq!(sender.peer_count(), 0);
    }
}
