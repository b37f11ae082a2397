use std::sync::{Mutex, MutexGuard};

use url::Url;

use crate::{offline_page, shell_locale::ShellTexts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindowPhase {
    Loading,
    Ready,
    LoadFailed,
    Hidden,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CloseDecision {
    Allow,
    HideInstead,
}

/// The operations the lifecycle needs from the native window.
pub(crate) trait WindowSurface {
    fn navigate(&self, url: &Url) -> Result<(), String>;
    fn show(&self) -> Result<(), String>;
    fn hide(&self) -> Result<(), String>;
    fn set_focus(&self) -> Result<(), String>;
    fn is_minimized(&self) -> Result<bool, String>;
    fn unminimize(&self) -> Result<(), String>;
    fn destroy(&self) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Content {
    Loading,
    Ready,
    LoadFailed,
}

#[derive(Debug)]
struct WindowStatus {
    content: Content,
    hidden: bool,
    destroyed: bool,
}

/// Lifecycle of the single primary window: backend load with offline
/// fallback, close-to-hide, reveal and final destruction.
pub(crate) struct WindowManager {
    backend_url: Url,
    texts: ShellTexts,
    status: Mutex<WindowStatus>,
}

impl WindowManager {
    pub(crate) fn new(backend_url: Url, texts: ShellTexts) -> Self {
        Self {
            backend_url,
            texts,
            status: Mutex::new(WindowStatus {
                content: Content::Loading,
                hidden: false,
                destroyed: false,
            }),
        }
    }

    fn status(&self) -> MutexGuard<'_, WindowStatus> {
        match self.status.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn backend_url(&self) -> &Url {
        &self.backend_url
    }

    pub(crate) fn phase(&self) -> WindowPhase {
        let status = self.status();
        if status.destroyed {
            WindowPhase::Destroyed
        } else if status.hidden {
            WindowPhase::Hidden
        } else {
            match status.content {
                Content::Loading => WindowPhase::Loading,
                Content::Ready => WindowPhase::Ready,
                Content::LoadFailed => WindowPhase::LoadFailed,
            }
        }
    }

    /// Marks a (re)load as started. Returns `false` once destroyed.
    pub(crate) fn begin_load(&self) -> bool {
        let mut status = self.status();
        if status.destroyed {
            return false;
        }
        status.content = Content::Loading;
        true
    }

    /// Applies the result of probing the backend: navigate on success, fall
    /// back to the offline page otherwise.
    pub(crate) fn complete_load<S>(&self, surface: &S, probe: Result<(), String>) -> WindowPhase
    where
        S: WindowSurface + ?Sized,
    {
        if self.status().destroyed {
            return WindowPhase::Destroyed;
        }

        let backend_url = self.backend_url.clone();
        let result = probe.and_then(|()| surface.navigate(&backend_url));
        match result {
            Ok(()) => {
                self.status().content = Content::Ready;
                tracing::info!("main window loaded {backend_url}");
            }
            Err(reason) => {
                self.handle_load_failure(surface, backend_url.as_str(), &reason);
            }
        }
        self.phase()
    }

    /// Load failures for a blank target are ignored; anything else swaps in
    /// the offline page.
    pub(crate) fn handle_load_failure<S>(
        &self,
        surface: &S,
        validated_url: &str,
        reason: &str,
    ) -> WindowPhase
    where
        S: WindowSurface + ?Sized,
    {
        let validated_url = validated_url.trim();
        if validated_url.is_empty() || validated_url == "about:blank" {
            return self.phase();
        }

        tracing::error!("load failed for {validated_url}: {reason}");
        self.render_offline_page(surface);
        self.phase()
    }

    fn render_offline_page<S>(&self, surface: &S)
    where
        S: WindowSurface + ?Sized,
    {
        self.status().content = Content::LoadFailed;
        let html = offline_page::render_offline_page(&self.texts, &self.backend_url);
        let result =
            offline_page::offline_page_url(&html).and_then(|url| surface.navigate(&url));
        if let Err(error) = result {
            tracing::error!("failed to render offline page: {error}");
        }
    }

    pub(crate) fn handle_close_request<S>(&self, surface: &S, quitting: bool) -> CloseDecision
    where
        S: WindowSurface + ?Sized,
    {
        if quitting || self.status().destroyed {
            return CloseDecision::Allow;
        }
        self.hide(surface);
        CloseDecision::HideInstead
    }

    pub(crate) fn hide<S>(&self, surface: &S)
    where
        S: WindowSurface + ?Sized,
    {
        if let Err(error) = surface.hide() {
            tracing::warn!("failed to hide main window: {error}");
            return;
        }
        self.status().hidden = true;
    }

    /// Un-minimizes, shows and focuses the window.
    pub(crate) fn reveal<S>(&self, surface: &S) -> Result<(), String>
    where
        S: WindowSurface + ?Sized,
    {
        if self.status().destroyed {
            return Err("main window already destroyed".to_string());
        }
        if surface.is_minimized().unwrap_or(false) {
            surface.unminimize()?;
        }
        surface.show()?;
        self.status().hidden = false;
        surface.set_focus()
    }

    pub(crate) fn destroy<S>(&self, surface: &S) -> Result<(), String>
    where
        S: WindowSurface + ?Sized,
    {
        {
            let mut status = self.status();
            if status.destroyed {
                return Ok(());
            }
            status.destroyed = true;
        }
        surface.destroy()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::{Cell, RefCell};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum SurfaceCall {
        Navigate(String),
        Show,
        Hide,
        Focus,
        Unminimize,
        Destroy,
    }

    #[derive(Default)]
    pub(crate) struct FakeSurface {
        pub(crate) minimized: Cell<bool>,
        pub(crate) visible: Cell<bool>,
        pub(crate) focused: Cell<bool>,
        pub(crate) fail_navigation_to: RefCell<Option<String>>,
        calls: RefCell<Vec<SurfaceCall>>,
    }

    impl FakeSurface {
        pub(crate) fn calls(&self) -> Vec<SurfaceCall> {
            self.calls.borrow().clone()
        }

        pub(crate) fn last_navigation(&self) -> Option<String> {
            self.calls().into_iter().rev().find_map(|call| match call {
                SurfaceCall::Navigate(url) => Some(url),
                _ => None,
            })
        }
    }

    impl WindowSurface for FakeSurface {
        fn navigate(&self, url: &Url) -> Result<(), String> {
            self.calls
                .borrow_mut()
                .push(SurfaceCall::Navigate(url.to_string()));
            match self.fail_navigation_to.borrow().as_deref() {
                Some(prefix) if url.as_str().starts_with(prefix) => {
                    Err("net::ERR_CONNECTION_REFUSED".to_string())
                }
                _ => Ok(()),
            }
        }

        fn show(&self) -> Result<(), String> {
            self.calls.borrow_mut().push(SurfaceCall::Show);
            self.visible.set(true);
            Ok(())
        }

        fn hide(&self) -> Result<(), String> {
            self.calls.borrow_mut().push(SurfaceCall::Hide);
            self.visible.set(false);
            self.focused.set(false);
            Ok(())
        }

        fn set_focus(&self) -> Result<(), String> {
            self.calls.borrow_mut().push(SurfaceCall::Focus);
            self.focused.set(true);
            Ok(())
        }

        fn is_minimized(&self) -> Result<bool, String> {
            Ok(self.minimized.get())
        }

        fn unminimize(&self) -> Result<(), String> {
            self.calls.borrow_mut().push(SurfaceCall::Unminimize);
            self.minimized.set(false);
            Ok(())
        }

        fn destroy(&self) -> Result<(), String> {
            self.calls.borrow_mut().push(SurfaceCall::Destroy);
            self.visible.set(false);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{FakeSurface, SurfaceCall};
    use super::*;
    use crate::shell_locale::shell_texts_for_locale;

    fn manager() -> WindowManager {
        WindowManager::new(
            Url::parse("http://localhost:8080/").expect("url"),
            shell_texts_for_locale("en-US"),
        )
    }

    fn decode_offline_page(data_url: &str) -> String {
        use base64::Engine as _;
        let encoded = data_url
            .split_once("base64,")
            .map(|(_, encoded)| encoded)
            .expect("base64 data url");
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .expect("decode");
        String::from_utf8(bytes).expect("utf8")
    }

    #[test]
    fn successful_probe_navigates_to_backend() {
        let manager = manager();
        let surface = FakeSurface::default();

        assert_eq!(manager.phase(), WindowPhase::Loading);
        assert_eq!(manager.complete_load(&surface, Ok(())), WindowPhase::Ready);
        assert_eq!(
            surface.calls(),
            vec![SurfaceCall::Navigate("http://localhost:8080/".to_string())]
        );
    }

    #[test]
    fn failed_probe_renders_offline_page_with_retry() {
        let manager = manager();
        let surface = FakeSurface::default();

        let phase = manager.complete_load(&surface, Err("connection refused".to_string()));

        assert_eq!(phase, WindowPhase::LoadFailed);
        let last = surface.last_navigation().expect("offline navigation");
        assert!(last.starts_with("data:text/html"));
        let html = decode_offline_page(&last);
        assert!(html.contains(r#"id="retry""#));
        assert!(html.contains("http://localhost:8080/"));
    }

    #[test]
    fn navigation_error_after_probe_still_falls_back() {
        let manager = manager();
        let surface = FakeSurface::default();
        *surface.fail_navigation_to.borrow_mut() = Some("http://localhost:8080".to_string());

        assert_eq!(manager.complete_load(&surface, Ok(())), WindowPhase::LoadFailed);
        assert!(surface
            .last_navigation()
            .expect("navigation")
            .starts_with("data:"));
    }

    #[test]
    fn retry_after_repeated_failure_renders_offline_page_again() {
        let manager = manager();
        let surface = FakeSurface::default();

        manager.complete_load(&surface, Err("down".to_string()));
        assert!(manager.begin_load());
        assert_eq!(manager.phase(), WindowPhase::Loading);
        assert_eq!(
            manager.complete_load(&surface, Err("still down".to_string())),
            WindowPhase::LoadFailed
        );

        let offline_renders = surface
            .calls()
            .into_iter()
            .filter(|call| matches!(call, SurfaceCall::Navigate(url) if url.starts_with("data:")))
            .count();
        assert_eq!(offline_renders, 2);

        assert_eq!(manager.complete_load(&surface, Ok(())), WindowPhase::Ready);
    }

    #[test]
    fn blank_url_failures_are_ignored() {
        let manager = manager();
        let surface = FakeSurface::default();

        assert_eq!(
            manager.handle_load_failure(&surface, "about:blank", "aborted"),
            WindowPhase::Loading
        );
        assert_eq!(
            manager.handle_load_failure(&surface, "  ", "aborted"),
            WindowPhase::Loading
        );
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn close_request_hides_instead_of_destroying() {
        let manager = manager();
        let surface = FakeSurface::default();
        manager.complete_load(&surface, Ok(()));
        surface.visible.set(true);

        assert_eq!(
            manager.handle_close_request(&surface, false),
            CloseDecision::HideInstead
        );
        assert_eq!(manager.phase(), WindowPhase::Hidden);
        assert!(!surface.visible.get());
        assert!(!surface.calls().contains(&SurfaceCall::Destroy));

        manager.reveal(&surface).expect("reveal");
        assert_eq!(manager.phase(), WindowPhase::Ready);
    }

    #[test]
    fn close_request_is_allowed_while_quitting() {
        let manager = manager();
        let surface = FakeSurface::default();
        assert_eq!(manager.handle_close_request(&surface, true), CloseDecision::Allow);
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn reveal_unminimizes_shows_and_focuses() {
        let manager = manager();
        let surface = FakeSurface::default();
        surface.minimized.set(true);

        manager.reveal(&surface).expect("reveal");

        assert_eq!(
            surface.calls(),
            vec![SurfaceCall::Unminimize, SurfaceCall::Show, SurfaceCall::Focus]
        );
        assert!(surface.visible.get());
        assert!(surface.focused.get());
    }

    #[test]
    fn destroy_is_terminal() {
        let manager = manager();
        let surface = FakeSurface::default();

        manager.destroy(&surface).expect("destroy");
        manager.destroy(&surface).expect("second destroy is a no-op");

        assert_eq!(manager.phase(), WindowPhase::Destroyed);
        assert!(!manager.begin_load());
        assert!(manager.reveal(&surface).is_err());
        assert_eq!(
            manager.complete_load(&surface, Ok(())),
            WindowPhase::Destroyed
        );
        assert_eq!(surface.calls(), vec![SurfaceCall::Destroy]);
    }
}
