//! Fetch-once cell with in-flight request deduplication.

use std::future::Future;
use tokio::sync::Mutex;

/// A lazily-populated slot that fetches its value at most once and merges
/// concurrent fetch attempts.
///
/// The lock is held across the fetch, so a second caller arriving while a
/// fetch is outstanding waits for it and then observes the stored value
/// instead of issuing a duplicate request. A failed fetch leaves the slot
/// empty and releases the lock; the next caller retries.
pub struct CachedCell<T> {
  slot: Mutex<Option<T>>,
}

impl<T: Clone> CachedCell<T> {
  pub fn new() -> Self {
    Self {
      slot: Mutex::new(None),
    }
  }

  /// Clone of the stored value, if populated.
  pub async fn get(&self) -> Option<T> {
    self.slot.lock().await.clone()
  }

  pub async fn is_populated(&self) -> bool {
    self.slot.lock().await.is_some()
  }

  /// Return the stored value, fetching it first if the slot is empty.
  ///
  /// The slot is only assigned after the fetch fully succeeds.
  pub async fn get_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<T, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
  {
    let mut slot = self.slot.lock().await;
    if let Some(value) = slot.as_ref() {
      return Ok(value.clone());
    }

    let value = fetch().await?;
    *slot = Some(value.clone());
    Ok(value)
  }

  /// Empty the slot; the next `get_or_fetch` fetches again.
  pub async fn clear(&self) {
    *self.slot.lock().await = None;
  }
}

impl<T: Clone> Default for CachedCell<T> {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::time::Duration;

  #[tokio::test]
  async fn test_fetches_once() {
    let cell = CachedCell::new();
    let calls = AtomicUsize::new(0);

    for _ in 0..3 {
      let value: Result<u32, ()> = cell
        .get_or_fetch(|| async {
          calls.fetch_add(1, Ordering::SeqCst);
          Ok(42)
        })
        .await;
      assert_eq!(value, Ok(42));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cell.get().await, Some(42));
  }

  #[tokio::test]
  async fn test_concurrent_callers_join_one_fetch() {
    let cell = CachedCell::new();
    let calls = AtomicUsize::new(0);

    let fetch = || async {
      calls.fetch_add(1, Ordering::SeqCst);
      tokio::time::sleep(Duration::from_millis(20)).await;
      Ok::<_, ()>("value".to_string())
    };

    let (a, b) = tokio::join!(cell.get_or_fetch(fetch), cell.get_or_fetch(fetch));
    assert_eq!(a.unwrap(), "value");
    assert_eq!(b.unwrap(), "value");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_failed_fetch_leaves_slot_empty_and_retries() {
    let cell = CachedCell::new();

    let failed: Result<u32, &str> = cell.get_or_fetch(|| async { Err("remote down") }).await;
    assert_eq!(failed, Err("remote down"));
    assert!(!cell.is_populated().await);

    let ok: Result<u32, &str> = cell.get_or_fetch(|| async { Ok(7) }).await;
    assert_eq!(ok, Ok(7));
  }

  #[tokio::test]
  async fn test_clear_forces_refetch() {
    let cell = CachedCell::new();
    let calls = AtomicUsize::new(0);
    let fetch = || async {
      Ok::<_, ()>(calls.fetch_add(1, Ordering::SeqCst))
    };

    assert_eq!(cell.get_or_fetch(fetch).await, Ok(0));
    cell.clear().await;
    assert_eq!(cell.get_or_fetch(fetch).await, Ok(1));
  }
}
