use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

struct Subscribers<T> {
  senders: Vec<UnboundedSender<T>>,
}

impl<T: Clone> Subscribers<T> {
  fn new() -> Self {
    Subscribers { senders: Vec::new() }
  }

  fn add(&mut self) -> (UnboundedSender<T>, UnboundedReceiver<T>) {
    let (tx, rx) = unbounded_channel();
    self.senders.push(tx.clone());
    (tx, rx)
  }

  fn publish(&mut self, value: &T) {
    // Dropped receivers are pruned here.
    self.senders.retain(|tx| tx.send(value.clone()).is_ok());
  }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Observable value with replay-latest delivery: every subscriber first receives the current value, then every
/// later update in order.
pub struct StateSlot<T> {
  inner: Mutex<(T, Subscribers<T>)>,
}

impl<T: Clone> StateSlot<T> {
  pub fn new(initial: T) -> Self {
    StateSlot { inner: Mutex::new((initial, Subscribers::new())) }
  }

  pub fn get(&self) -> T {
    lock(&self.inner).0.clone()
  }

  pub fn set(&self, value: T) {
    let mut inner = lock(&self.inner);
    inner.1.publish(&value);
    inner.0 = value;
  }

  pub fn subscribe(&self) -> UnboundedReceiver<T> {
    let mut inner = lock(&self.inner);
    let current = inner.0.clone();
    let (tx, rx) = inner.1.add();
    let _ = tx.send(current);
    rx
  }
}

/// One-shot events: a raised value reaches the subscribers present at that moment exactly once and is never
/// replayed to late subscribers. The last raised value is kept for inspection only.
pub struct EventSlot<T> {
  inner: Mutex<(Option<T>, Subscribers<T>)>,
}

impl<T: Clone> EventSlot<T> {
  pub fn new() -> Self {
    EventSlot { inner: Mutex::new((None, Subscribers::new())) }
  }

  pub fn last(&self) -> Option<T> {
    lock(&self.inner).0.clone()
  }

  pub fn raise(&self, value: T) {
    let mut inner = lock(&self.inner);
    inner.1.publish(&value);
    inner.0 = Some(value);
  }

  pub fn subscribe(&self) -> UnboundedReceiver<T> {
    lock(&self.inner).1.add().1
  }
}

impl<T: Clone> Default for EventSlot<T> {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  fn drain<T>(rx: &mut UnboundedReceiver<T>) -> Vec<T> {
    let mut values = vec![];
    while let Ok(value) = rx.try_recv() {
      values.push(value);
    }
    values
  }

  #[test]
  fn test_state_slot_replays_latest_to_late_subscriber() {
    let slot = StateSlot::new(false);
    slot.set(true);

    let mut rx = slot.subscribe();

    assert_eq!(drain(&mut rx), vec![true]);
  }

  #[test]
  fn test_state_slot_delivers_every_update_in_order() {
    let slot = StateSlot::new(0);
    let mut rx = slot.subscribe();

    slot.set(1);
    slot.set(2);

    assert_eq!(drain(&mut rx), vec![0, 1, 2]);
    assert_eq!(slot.get(), 2);
  }

  #[test]
  fn test_state_slot_prunes_dropped_subscribers() {
    let slot = StateSlot::new(0);
    let rx = slot.subscribe();
    drop(rx);

    slot.set(1);

    assert_eq!(lock(&slot.inner).1.senders.len(), 0);
  }

  #[test]
  fn test_event_slot_is_not_replayed() {
    let slot = EventSlot::new();
    let mut early = slot.subscribe();
    slot.raise("Error: timeout".to_string());

    let mut late = slot.subscribe();

    assert_eq!(drain(&mut early), vec!["Error: timeout".to_string()]);
    assert_eq!(drain(&mut late), Vec::<String>::new());
    assert_eq!(slot.last(), Some("Error: timeout".to_string()));
  }
}
