use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Default quiet period before a debounced value settles.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Debounce execution of a closure after a period of inactivity.
///
/// Dropping the debouncer cancels any pending closure.
pub struct Debouncer {
    delay: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Create a new `Debouncer` with the specified delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            handle: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `f` once `delay` has passed without another `call`.
    ///
    /// Each call replaces whatever was scheduled before it.
    pub fn call<F>(&mut self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let quiet = self.delay;
        let task = tokio::spawn(async move {
            sleep(quiet).await;
            f();
        });
        self.handle = Some(task);
    }

    /// Abort the pending action, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether an action is scheduled and has not run yet.
    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Delayed view of a changing value.
///
/// [`set`](Self::set) records a new source value; the settled value only
/// follows once no further `set` happens for the debouncer's delay.
/// Subscribers are woken when the settled value actually changes.
pub struct Debounced<T> {
    debouncer: Debouncer,
    settled: Arc<watch::Sender<T>>,
}

impl<T> Debounced<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: T, delay: Duration) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            debouncer: Debouncer::new(delay),
            settled: Arc::new(tx),
        }
    }

    /// Record a new source value, superseding any pending one.
    pub fn set(&mut self, value: T) {
        let settled = Arc::clone(&self.settled);
        self.debouncer.call(move || {
            settled.send_if_modified(|current| {
                if *current == value {
                    false
                } else {
                    *current = value;
                    true
                }
            });
        });
    }

    /// The most recently settled value.
    pub fn get(&self) -> T {
        self.settled.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.settled.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test(start_paused = true)]
    async fn only_the_last_call_runs() {
        let runs = Arc::new(Mutex::new(Vec::new()));
        let mut d = Debouncer::new(Duration::from_millis(50));
        for n in 1..=3 {
            let runs = runs.clone();
            d.call(move || runs.lock().unwrap().push(n));
            sleep(Duration::from_millis(20)).await;
        }
        assert!(d.is_pending());
        assert!(runs.lock().unwrap().is_empty());

        sleep(Duration::from_millis(31)).await;
        assert_eq!(*runs.lock().unwrap(), vec![3]);
        assert!(!d.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_debouncer_cancels_pending_action() {
        let called = Arc::new(Mutex::new(false));
        let c = called.clone();
        let mut d = Debouncer::new(Duration::from_millis(100));
        d.call(move || {
            *c.lock().unwrap() = true;
        });
        assert!(d.is_pending());
        drop(d);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!*called.lock().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_pending_action() {
        let called = Arc::new(Mutex::new(false));
        let c = called.clone();
        let mut d = Debouncer::default();
        d.call(move || {
            *c.lock().unwrap() = true;
        });
        d.cancel();
        assert!(!d.is_pending());
        tokio::time::sleep(DEFAULT_DELAY * 2).await;
        assert!(!*called.lock().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn value_settles_after_quiet_period() {
        let mut value = Debounced::new("a", Duration::from_millis(300));
        // source changes at t=0 (initial), t=100, t=200
        sleep(Duration::from_millis(100)).await;
        value.set("b");
        sleep(Duration::from_millis(100)).await;
        value.set("c");

        sleep(Duration::from_millis(299)).await;
        assert_eq!(value.get(), "a");

        sleep(Duration::from_millis(2)).await;
        assert_eq!(value.get(), "c");
        assert!(!value.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_skip_unchanged_values() {
        let mut value = Debounced::new(String::from("same"), Duration::from_millis(50));
        let mut rx = value.subscribe();
        value.set("same".into());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!rx.has_changed().unwrap());

        value.set("new".into());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "new");
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_value_cancels_pending_emission() {
        let mut value = Debounced::new(1u32, Duration::from_millis(50));
        let mut rx = value.subscribe();
        value.set(2);
        drop(value);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*rx.borrow_and_update(), 1);
        assert!(rx.changed().await.is_err());
    }
}
