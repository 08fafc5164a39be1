//! Key value store where the value is any type
//!
//! Every system keeps its own `Store`. Keys a system writes are "owned" and
//! announced through the update callback, keys written by anyone else arrive
//! through `handle_update_shared`. The dashboard and the field connection are
//! just other writers, so tuning values and mode changes show up here too.

pub mod tokens;

use std::{
    any::Any,
    fmt::{self, Display, Formatter},
    marker::PhantomData,
    sync::Arc,
};

use fxhash::FxHashMap as HashMap;
use tracing::error;

pub type Key = KeyImpl;
pub type Value = Arc<dyn Any + Send + Sync>;
pub type Update = (Key, Value);

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Token<V>(pub KeyImpl, PhantomData<V>);

impl<V> Token<V> {
    pub const fn new_const(key: &'static str) -> Self {
        Self(KeyImpl(key), PhantomData)
    }
}

pub struct Store<C> {
    owned: HashMap<Key, Value>,
    shared: HashMap<Key, Value>,
    callback: C,
}

impl<C: UpdateCallback> Store<C> {
    pub fn new(update_callback: C) -> Self {
        Self {
            owned: Default::default(),
            shared: Default::default(),
            callback: update_callback,
        }
    }

    pub fn insert<V: Any + Send + Sync>(&mut self, key: &Token<V>, value: V) {
        if self.shared.contains_key(&key.0) {
            error!("Tried to update a shared key: {:?}", key.0);
            return;
        }

        let value: Value = Arc::new(value);

        self.callback.call((key.0, value.clone()));
        self.owned.insert(key.0, value);
    }

    /// Like `insert` but stays silent when the stored value is equal.
    /// Status values are written every cycle and rarely change
    pub fn insert_if_changed<V: Any + Send + Sync + PartialEq>(&mut self, key: &Token<V>, value: V) {
        let unchanged = self
            .owned
            .get(&key.0)
            .and_then(|it| it.downcast_ref::<V>())
            .is_some_and(|current| *current == value);

        if !unchanged {
            self.insert(key, value);
        }
    }
}

impl<C> Store<C> {
    pub fn get<V: Any + Send + Sync>(&self, key: &Token<V>) -> Option<Arc<V>> {
        self.owned
            .get(&key.0)
            .or_else(|| self.shared.get(&key.0))
            .cloned()
            .and_then(|it| it.downcast::<V>().ok())
    }

    pub fn get_copied<V: Any + Send + Sync + Copy>(&self, key: &Token<V>) -> Option<V> {
        self.get(key).map(|it| *it)
    }

    #[tracing::instrument(skip(self))]
    pub fn handle_update_shared(&mut self, update: &Update) {
        if self.owned.contains_key(&update.0) {
            return;
        }

        self.shared.insert(update.0, update.1.clone());
    }
}

pub trait UpdateCallback {
    fn call(&mut self, update: Update);
}

impl<F> UpdateCallback for F
where
    F: FnMut(Update),
{
    fn call(&mut self, update: Update) {
        (self)(update)
    }
}

impl UpdateCallback for () {
    fn call(&mut self, _: Update) {}
}

/// Every key is declared in `tokens`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyImpl(&'static str);

impl KeyImpl {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Display for KeyImpl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn create_update<V: Any + Send + Sync>(key: &Token<V>, value: V) -> Update {
    (key.0, Arc::new(value))
}
