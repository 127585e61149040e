//! Typed single-flight execution
//!
//! At most one producer per key is in flight at any instant; every
//! concurrent caller for that key awaits the same outcome, failures
//! included. A group retains nothing once a flight lands: it is a barrier,
//! not a cache, and the next call for the key starts fresh.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

type FlightMap<K, T> = Arc<Mutex<HashMap<K, SharedFlight<T>>>>;
type SharedFlight<T> = Shared<BoxFuture<'static, T>>;

/// Clears a key's in-flight marker when dropped.
///
/// Lives inside the driver task, so the marker clears the moment the
/// producer finishes, on the panic unwind path, and independently of
/// whether any waiter is still around.
struct FlightGuard<K: Eq + Hash, T> {
    in_flight: FlightMap<K, T>,
    key: K,
}

impl<K: Eq + Hash, T> Drop for FlightGuard<K, T> {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.key);
    }
}

/// Deduplicates concurrent async work by key
pub struct FlightGroup<K, T> {
    in_flight: FlightMap<K, T>,
}

impl<K, T> FlightGroup<K, T>
where
    K: Eq + Hash + Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Runs `producer` under `key`, or joins the flight already underway.
    ///
    /// The producer is driven by a detached task and always runs to
    /// completion; a caller that stops waiting does not cancel the fetch
    /// other waiters may still need. The check-and-register step is atomic
    /// under one lock, so exactly one producer starts per key per flight.
    pub async fn run<F>(&self, key: K, producer: F) -> T
    where
        F: Future<Output = T> + Send + 'static,
    {
        let flight = {
            let mut in_flight = self.in_flight.lock();
            if let Some(existing) = in_flight.get(&key) {
                existing.clone()
            } else {
                let guard = FlightGuard {
                    in_flight: Arc::clone(&self.in_flight),
                    key: key.clone(),
                };
                let driver = tokio::spawn(async move {
                    let outcome = producer.await;
                    // Marker clears before waiters observe the outcome
                    drop(guard);
                    outcome
                });
                let flight: SharedFlight<T> = async move {
                    match driver.await {
                        Ok(outcome) => outcome,
                        // The driver is never aborted, so a join error can
                        // only be a producer panic
                        Err(err) => std::panic::resume_unwind(err.into_panic()),
                    }
                }
                .boxed()
                .shared();
                in_flight.insert(key, flight.clone());
                flight
            }
        };

        flight.await
    }

    /// Number of flights currently outstanding.
    pub fn outstanding(&self) -> usize {
        self.in_flight.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.lock().is_empty()
    }
}

impl<K, T> Default for FlightGroup<K, T>
where
    K: Eq + Hash + Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
