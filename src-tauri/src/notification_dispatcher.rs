use chrono::{DateTime, Utc};
use tauri::{AppHandle, Emitter};
use tauri_plugin_notification::{NotificationExt, PermissionState};

use crate::{
    shell_locale::ShellTexts, GRANT_EVENT, GRANT_UNSUPPORTED_MESSAGE, LOGIN_STATUS_EVENT,
    MAIN_WINDOW_LABEL, NOTIFICATION_EVENT,
};

const ONE_DAY_MS: i64 = 24 * 60 * 60 * 1000;
const THREE_DAYS_MS: i64 = 3 * ONE_DAY_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeadlineBucket {
    Overdue,
    DueWithinOneDay,
    DueWithinThreeDays,
    NotDue,
}

/// Buckets `deadline - now`; each upper bound is inclusive.
pub(crate) fn classify(deadline_ms: i64, now_ms: i64) -> DeadlineBucket {
    let remaining = deadline_ms.saturating_sub(now_ms);
    if remaining <= 0 {
        DeadlineBucket::Overdue
    } else if remaining <= ONE_DAY_MS {
        DeadlineBucket::DueWithinOneDay
    } else if remaining <= THREE_DAYS_MS {
        DeadlineBucket::DueWithinThreeDays
    } else {
        DeadlineBucket::NotDue
    }
}

pub(crate) fn classify_at(deadline: DateTime<Utc>, now: DateTime<Utc>) -> DeadlineBucket {
    classify(deadline.timestamp_millis(), now.timestamp_millis())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NotificationReadiness {
    Ready,
    Unsupported(String),
}

/// Everything the poll tick pushes out of the process: UI events and OS
/// notifications.
pub(crate) trait ShellSink: Send + Sync {
    fn emit_login_status(&self, logged_in: bool);
    fn emit_grant(&self, message: &str);
    fn emit_deadline_event(&self, task_title: &str);
    fn notification_readiness(&self) -> NotificationReadiness;
    fn show_notification(&self, title: &str, body: &str);
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct NotificationDispatcher {
    texts: ShellTexts,
}

impl NotificationDispatcher {
    pub(crate) fn new(texts: ShellTexts) -> Self {
        Self { texts }
    }

    pub(crate) fn untitled_task(&self) -> &'static str {
        self.texts.untitled_task
    }

    fn body_for(&self, bucket: DeadlineBucket) -> Option<&'static str> {
        match bucket {
            DeadlineBucket::Overdue => Some(self.texts.overdue_body),
            DeadlineBucket::DueWithinOneDay => Some(self.texts.due_within_one_day_body),
            DeadlineBucket::DueWithinThreeDays => Some(self.texts.due_within_three_days_body),
            DeadlineBucket::NotDue => None,
        }
    }

    /// Classifies and, unless not due, fires one OS notification plus one UI
    /// event. A deadline that cannot be resolved counts as not due.
    pub(crate) fn dispatch<S>(
        &self,
        sink: &S,
        task_title: &str,
        deadline: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DeadlineBucket
    where
        S: ShellSink + ?Sized,
    {
        let bucket = deadline
            .map(|deadline| classify_at(deadline, now))
            .unwrap_or(DeadlineBucket::NotDue);

        let Some(body) = self.body_for(bucket) else {
            tracing::debug!(task = task_title, "no deadline notification needed");
            return bucket;
        };

        tracing::info!(task = task_title, ?bucket, "sending deadline notification");
        sink.emit_deadline_event(task_title);
        sink.show_notification(
            &format!("{}{}", self.texts.notification_title_prefix, task_title),
            body,
        );
        bucket
    }
}

/// Routes sink calls to the main window and the notification plugin.
pub(crate) struct TauriShellSink {
    app_handle: AppHandle,
}

impl TauriShellSink {
    pub(crate) fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }

    fn emit_to_main<P>(&self, event: &str, payload: P)
    where
        P: serde::Serialize + Clone,
    {
        if let Err(error) = self.app_handle.emit_to(MAIN_WINDOW_LABEL, event, payload) {
            tracing::warn!("failed to emit {event} to main window: {error}");
        }
    }
}

impl ShellSink for TauriShellSink {
    fn emit_login_status(&self, logged_in: bool) {
        self.emit_to_main(LOGIN_STATUS_EVENT, logged_in);
    }

    fn emit_grant(&self, message: &str) {
        self.emit_to_main(GRANT_EVENT, message.to_string());
    }

    fn emit_deadline_event(&self, task_title: &str) {
        self.emit_to_main(NOTIFICATION_EVENT, task_title.to_string());
    }

    fn notification_readiness(&self) -> NotificationReadiness {
        match self.app_handle.notification().permission_state() {
            Ok(PermissionState::Granted) => NotificationReadiness::Ready,
            Ok(PermissionState::Denied) => {
                NotificationReadiness::Unsupported(GRANT_UNSUPPORTED_MESSAGE.to_string())
            }
            // Desktop notification services do not prompt; treat as usable.
            Ok(_) => NotificationReadiness::Ready,
            Err(error) => NotificationReadiness::Unsupported(format!(
                "{GRANT_UNSUPPORTED_MESSAGE}: {error}"
            )),
        }
    }

    fn show_notification(&self, title: &str, body: &str) {
        if let Err(error) = self
            .app_handle
            .notification()
            .builder()
            .title(title)
            .body(body)
            .show()
        {
            tracing::warn!("failed to show deadline notification: {error}");
        }
    }
}
