use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    backend_config::ShellConfig,
    shell_locale::{self, ShellTexts},
    shell_runtime::ShellRuntime,
    window_lifecycle::WindowManager,
};

/// Managed state shared by window, tray and runtime handlers.
pub(crate) struct DesktopState {
    pub(crate) config: ShellConfig,
    pub(crate) texts: ShellTexts,
    pub(crate) window: WindowManager,
    pub(crate) runtime: ShellRuntime,
    is_quitting: AtomicBool,
}

impl DesktopState {
    pub(crate) fn new(config: ShellConfig) -> Self {
        let texts = shell_locale::shell_texts_for_locale(config.locale);
        Self {
            window: WindowManager::new(config.backend_url.clone(), texts),
            runtime: ShellRuntime::new(config.poll_interval, config.dedup_reset_interval),
            texts,
            config,
            is_quitting: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_quitting(&self) -> bool {
        self.is_quitting.load(Ordering::Acquire)
    }

    /// Returns `true` for the first caller only.
    pub(crate) fn mark_quitting(&self) -> bool {
        !self.is_quitting.swap(true, Ordering::AcqRel)
    }
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct BridgeResult {
    pub(crate) ok: bool,
    pub(crate) reason: Option<String>,
}

pub(crate) struct AtomicFlagGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> AtomicFlagGuard<'a> {
    pub(crate) fn try_set(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self { flag })
    }
}

impl Drop for AtomicFlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[test]
    fn atomic_flag_guard_try_set_rejects_double_set_until_drop() {
        let flag = AtomicBool::new(false);

        let guard = AtomicFlagGuard::try_set(&flag).expect("first set should succeed");
        assert!(flag.load(Ordering::Relaxed));
        assert!(AtomicFlagGuard::try_set(&flag).is_none());

        drop(guard);
        assert!(!flag.load(Ordering::Relaxed));
        assert!(AtomicFlagGuard::try_set(&flag).is_some());
    }

    #[test]
    fn mark_quitting_reports_first_caller_only() {
        let state = DesktopState::new(ShellConfig::from_lookup(|_| None));
        assert!(!state.is_quitting());
        assert!(state.mark_quitting());
        assert!(!state.mark_quitting());
        assert!(state.is_quitting());
    }
}
