//! Cancellable interval refresh.
//!
//! Screens approximate server push by refetching on a fixed interval
//! while mounted. Each screen owns a `Poller`: the tick fires once
//! immediately, then every `interval`, and stops unconditionally on
//! `stop` or drop so no timer outlives its screen. Ticks run one at a
//! time; a slow fetch delays the next tick instead of overlapping it.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawn the refresh loop. Must be called from within a tokio runtime.
    pub fn start<F, Fut>(interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                tick().await;
            }
        });
        Self { handle }
    }

    /// Cancel the loop. Safe to call more than once; also happens on drop.
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn ticks_immediately_then_on_interval() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let _poller = Poller::start(Duration::from_millis(100), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        // Paused time advances only while every task is idle, so tick
        // counts are deterministic: t=0, 100, 200, 300.
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_future_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let poller = Poller::start(Duration::from_millis(100), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(150)).await;
        poller.stop();
        let ticks_at_stop = count.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), ticks_at_stop);
        assert!(poller.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_the_timer() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        {
            let _poller = Poller::start(Duration::from_millis(100), move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        let ticks_at_drop = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), ticks_at_drop);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_ticks_do_not_overlap() {
        let active = Arc::new(AtomicUsize::new(0));
        let overlapped = Arc::new(AtomicUsize::new(0));
        let (active_c, overlapped_c) = (Arc::clone(&active), Arc::clone(&overlapped));

        let _poller = Poller::start(Duration::from_millis(50), move || {
            let active = Arc::clone(&active_c);
            let overlapped = Arc::clone(&overlapped_c);
            async move {
                if active.fetch_add(1, Ordering::SeqCst) > 0 {
                    overlapped.fetch_add(1, Ordering::SeqCst);
                }
                // Three intervals long, enough to overlap under setInterval.
                tokio::time::sleep(Duration::from_millis(150)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(overlapped.load(Ordering::SeqCst), 0);
    }
}
