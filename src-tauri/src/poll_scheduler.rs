use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;

use crate::{
    append_poll_log,
    backend_client::PlannerBackend,
    notification_deduper::NotificationDeduper,
    notification_dispatcher::{
        DeadlineBucket, NotificationDispatcher, NotificationReadiness, ShellSink,
    },
    GRANT_READY_MESSAGE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PollPhase {
    Idle,
    CheckingLogin,
    LoggedOut,
    CheckingDeadlines,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PollOutcome {
    /// A previous tick was still in flight.
    Skipped,
    LoggedOut,
    NotificationsUnavailable,
    Checked {
        fetched: usize,
        eligible: usize,
        dispatched: usize,
    },
}

/// Collaborators of one poll tick.
pub(crate) struct PollContext<B: ?Sized, S: ?Sized> {
    pub(crate) backend: Arc<B>,
    pub(crate) sink: Arc<S>,
    pub(crate) deduper: Arc<NotificationDeduper>,
    pub(crate) dispatcher: NotificationDispatcher,
}

impl<B: ?Sized, S: ?Sized> Clone for PollContext<B, S> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            sink: Arc::clone(&self.sink),
            deduper: Arc::clone(&self.deduper),
            dispatcher: self.dispatcher,
        }
    }
}

fn enter(phase: PollPhase) {
    tracing::debug!(target: "poll", ?phase, "poll phase");
}

/// One login + deadline check. Deadlines are only fetched after a positive
/// login check.
pub(crate) async fn run_poll_tick<B, S, C>(context: &PollContext<B, S>, clock: C) -> PollOutcome
where
    B: PlannerBackend + ?Sized,
    S: ShellSink + ?Sized,
    C: Fn() -> DateTime<Utc>,
{
    enter(PollPhase::CheckingLogin);
    let logged_in = context.backend.fetch_login_state().await;
    append_poll_log(&format!("login state: {logged_in}"));
    context.sink.emit_login_status(logged_in);

    if !logged_in {
        enter(PollPhase::LoggedOut);
        enter(PollPhase::Idle);
        return PollOutcome::LoggedOut;
    }

    match context.sink.notification_readiness() {
        NotificationReadiness::Ready => context.sink.emit_grant(GRANT_READY_MESSAGE),
        NotificationReadiness::Unsupported(message) => {
            append_poll_log(&format!("skipping deadline check: {message}"));
            context.sink.emit_grant(&message);
            enter(PollPhase::Idle);
            return PollOutcome::NotificationsUnavailable;
        }
    }

    enter(PollPhase::CheckingDeadlines);
    let tasks = context.backend.fetch_due_tasks().await;
    let fetched = tasks.len();
    let candidates: Vec<_> = tasks
        .into_iter()
        .filter(|task| task.is_notification_candidate())
        .collect();
    let eligible = candidates.len();
    append_poll_log(&format!(
        "found {fetched} tasks, {eligible} pending with deadline"
    ));

    let mut dispatched = 0;
    for task in &candidates {
        let Some(task_id) = task.id.as_ref() else {
            tracing::warn!(target: "poll", "pending task without id, skipping");
            continue;
        };
        // Recorded before classification: a task first seen as not due waits
        // for the next dedup reset.
        if !context.deduper.should_notify(task_id) {
            continue;
        }

        let deadline = task.deadline.as_ref().and_then(|deadline| deadline.to_utc());
        if deadline.is_none() {
            tracing::warn!(target: "poll", task_id = %task_id, "unparseable deadline");
        }
        let title = task.display_title(context.dispatcher.untitled_task());
        let bucket = context
            .dispatcher
            .dispatch(context.sink.as_ref(), title, deadline, clock());
        if bucket != DeadlineBucket::NotDue {
            dispatched += 1;
        }
    }

    append_poll_log(&format!(
        "dispatched {dispatched} notifications, {} task ids recorded",
        context.deduper.len()
    ));
    enter(PollPhase::Idle);
    PollOutcome::Checked {
        fetched,
        eligible,
        dispatched,
    }
}

/// Fires immediately, then once per `period`. Each tick runs as its own
/// task, so a slow tick never delays the next firing.
pub(crate) async fn poll_loop<F, Fut>(period: Duration, mut on_tick: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        tokio::spawn(on_tick());
    }
}

/// Clears the dedup set once per `period`, starting one period after launch.
pub(crate) async fn dedup_reset_loop(period: Duration, deduper: Arc<NotificationDeduper>) {
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let cleared = deduper.reset();
        append_poll_log(&format!("dedup set reset, {cleared} task ids cleared"));
    }
}
