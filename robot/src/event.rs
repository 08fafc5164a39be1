use common::store::Update;

/// Repersents a message a system can brodcast
#[derive(Debug)]
pub enum Event {
    /// A system wrote one of its own keys
    Store(Update),

    Error(anyhow::Error),
    Exit,
}
