use std::{
    sync::{atomic::AtomicBool, Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, Utc};
use tauri::async_runtime::{self, JoinHandle};

use crate::{
    append_poll_log,
    backend_client::PlannerBackend,
    notification_deduper::NotificationDeduper,
    notification_dispatcher::{NotificationDispatcher, ShellSink},
    poll_scheduler::{self, PollContext, PollOutcome},
    AtomicFlagGuard,
};

type DynPollContext = PollContext<dyn PlannerBackend, dyn ShellSink>;

struct RuntimeTimers {
    poll: JoinHandle<()>,
    dedup_reset: JoinHandle<()>,
}

/// Owns the background timers and the dedup set for the process lifetime.
pub(crate) struct ShellRuntime {
    poll_interval: Duration,
    dedup_reset_interval: Duration,
    deduper: Arc<NotificationDeduper>,
    tick_in_flight: Arc<AtomicBool>,
    timers: Mutex<Option<RuntimeTimers>>,
}

impl ShellRuntime {
    pub(crate) fn new(poll_interval: Duration, dedup_reset_interval: Duration) -> Self {
        Self {
            poll_interval,
            dedup_reset_interval,
            deduper: Arc::new(NotificationDeduper::new()),
            tick_in_flight: Arc::new(AtomicBool::new(false)),
            timers: Mutex::new(None),
        }
    }

    /// Spawns both timers. Returns `false` when they are already running.
    pub(crate) fn start(
        &self,
        backend: Arc<dyn PlannerBackend>,
        sink: Arc<dyn ShellSink>,
        dispatcher: NotificationDispatcher,
    ) -> bool {
        let mut timers = match self.timers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if timers.is_some() {
            return false;
        }

        let context: DynPollContext = PollContext {
            backend,
            sink,
            deduper: Arc::clone(&self.deduper),
            dispatcher,
        };
        let tick_in_flight = Arc::clone(&self.tick_in_flight);
        let poll = async_runtime::spawn(poll_scheduler::poll_loop(
            self.poll_interval,
            move || {
                let context = context.clone();
                let tick_in_flight = Arc::clone(&tick_in_flight);
                async move {
                    let outcome = run_guarded_tick(&context, &tick_in_flight, Utc::now).await;
                    tracing::debug!(target: "poll", ?outcome, "poll tick finished");
                }
            },
        ));
        let dedup_reset = async_runtime::spawn(poll_scheduler::dedup_reset_loop(
            self.dedup_reset_interval,
            Arc::clone(&self.deduper),
        ));

        *timers = Some(RuntimeTimers { poll, dedup_reset });
        append_poll_log(&format!(
            "background timers started: poll every {}s, dedup reset every {}s",
            self.poll_interval.as_secs(),
            self.dedup_reset_interval.as_secs()
        ));
        true
    }

    /// Cancels both timers. Safe to call repeatedly and from a panic hook.
    pub(crate) fn stop(&self) -> bool {
        let timers = match self.timers.try_lock() {
            Ok(mut guard) => guard.take(),
            Err(std::sync::TryLockError::Poisoned(poisoned)) => poisoned.into_inner().take(),
            Err(std::sync::TryLockError::WouldBlock) => None,
        };
        let Some(timers) = timers else {
            return false;
        };
        timers.poll.abort();
        timers.dedup_reset.abort();
        append_poll_log("background timers cancelled");
        true
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.timers
            .lock()
            .map(|timers| timers.is_some())
            .unwrap_or(false)
    }
}

/// Runs a tick unless the previous one is still in flight.
pub(crate) async fn run_guarded_tick<C>(
    context: &DynPollContext,
    tick_in_flight: &AtomicBool,
    clock: C,
) -> PollOutcome
where
    C: Fn() -> DateTime<Utc>,
{
    let Some(_in_flight) = AtomicFlagGuard::try_set(tick_in_flight) else {
        append_poll_log("previous poll tick still running, skipping this one");
        return PollOutcome::Skipped;
    };
    poll_scheduler::run_poll_tick(context, clock).await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::notification_dispatcher::test_support::RecordingSink;
    use crate::planner_task::PlannerTask;
    use crate::poll_scheduler::test_support::ScriptedBackend;
    use crate::shell_locale::shell_texts_for_locale;

    struct BlockingBackend {
        entered: AtomicUsize,
        release: Notify,
    }

    #[async_trait]
    impl PlannerBackend for BlockingBackend {
        async fn fetch_login_state(&self) -> bool {
            self.entered.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            false
        }

        async fn fetch_due_tasks(&self) -> Vec<PlannerTask> {
            Vec::new()
        }
    }

    fn dispatcher() -> NotificationDispatcher {
        NotificationDispatcher::new(shell_texts_for_locale("en-US"))
    }

    #[tokio::test]
    async fn overlapping_tick_is_skipped_while_previous_is_in_flight() {
        let backend = Arc::new(BlockingBackend {
            entered: AtomicUsize::new(0),
            release: Notify::new(),
        });
        let context: DynPollContext = PollContext {
            backend: backend.clone(),
            sink: Arc::new(RecordingSink::new()),
            deduper: Arc::new(NotificationDeduper::new()),
            dispatcher: dispatcher(),
        };
        let flag = Arc::new(AtomicBool::new(false));

        let first = {
            let context = context.clone();
            let flag = Arc::clone(&flag);
            tokio::spawn(async move { run_guarded_tick(&context, &flag, Utc::now).await })
        };
        while backend.entered.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let second = run_guarded_tick(&context, &flag, Utc::now).await;
        assert_eq!(second, PollOutcome::Skipped);

        backend.release.notify_one();
        assert_eq!(first.await.expect("first tick"), PollOutcome::LoggedOut);

        let backend_calls = backend.entered.load(Ordering::SeqCst);
        assert_eq!(backend_calls, 1);
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_timer_keeps_firing_and_skips_while_a_tick_hangs() {
        let backend = Arc::new(BlockingBackend {
            entered: AtomicUsize::new(0),
            release: Notify::new(),
        });
        let context: DynPollContext = PollContext {
            backend: backend.clone(),
            sink: Arc::new(RecordingSink::new()),
            deduper: Arc::new(NotificationDeduper::new()),
            dispatcher: dispatcher(),
        };
        let flag = Arc::new(AtomicBool::new(false));
        let skipped = Arc::new(AtomicUsize::new(0));

        let timer = {
            let skipped = Arc::clone(&skipped);
            let flag = Arc::clone(&flag);
            tokio::spawn(poll_scheduler::poll_loop(Duration::from_secs(60), move || {
                let context = context.clone();
                let flag = Arc::clone(&flag);
                let skipped = Arc::clone(&skipped);
                async move {
                    if run_guarded_tick(&context, &flag, Utc::now).await == PollOutcome::Skipped {
                        skipped.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }))
        };

        tokio::time::sleep(Duration::from_secs(270)).await;
        assert_eq!(backend.entered.load(Ordering::SeqCst), 1);
        assert_eq!(skipped.load(Ordering::SeqCst), 4);

        backend.release.notify_one();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(backend.entered.load(Ordering::SeqCst), 2);
        assert_eq!(skipped.load(Ordering::SeqCst), 4);

        timer.abort();
    }

    #[test]
    fn start_runs_first_tick_and_stop_cancels_timers() {
        let runtime = ShellRuntime::new(Duration::from_secs(3600), Duration::from_secs(86_400));
        let backend = Arc::new(ScriptedBackend::new(false, Vec::new()));
        let sink = Arc::new(RecordingSink::new());

        assert!(runtime.start(backend.clone(), sink.clone(), dispatcher()));
        assert!(runtime.is_running());
        assert!(!runtime.start(backend.clone(), sink.clone(), dispatcher()));

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while backend.login_calls() == 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(backend.login_calls(), 1);
        assert_eq!(backend.due_calls(), 0);

        assert!(runtime.stop());
        assert!(!runtime.is_running());
        assert!(!runtime.stop());
    }
}
