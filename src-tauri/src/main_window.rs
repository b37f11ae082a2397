use std::time::Duration;

use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use url::Url;

use crate::{
    append_desktop_log, desktop_bridge, offline_page, window_lifecycle::WindowSurface,
    DesktopState, APP_IDENTITY, MAIN_WINDOW_LABEL,
};

impl WindowSurface for WebviewWindow {
    fn navigate(&self, url: &Url) -> Result<(), String> {
        WebviewWindow::navigate(self, url.clone())
            .map_err(|error| format!("Failed to navigate main window: {error}"))
    }

    fn show(&self) -> Result<(), String> {
        WebviewWindow::show(self).map_err(|error| format!("Failed to show main window: {error}"))
    }

    fn hide(&self) -> Result<(), String> {
        WebviewWindow::hide(self).map_err(|error| format!("Failed to hide main window: {error}"))
    }

    fn set_focus(&self) -> Result<(), String> {
        WebviewWindow::set_focus(self)
            .map_err(|error| format!("Failed to focus main window: {error}"))
    }

    fn is_minimized(&self) -> Result<bool, String> {
        WebviewWindow::is_minimized(self)
            .map_err(|error| format!("Failed to read main window minimized state: {error}"))
    }

    fn unminimize(&self) -> Result<(), String> {
        WebviewWindow::unminimize(self)
            .map_err(|error| format!("Failed to unminimize main window: {error}"))
    }

    fn destroy(&self) -> Result<(), String> {
        WebviewWindow::destroy(self)
            .map_err(|error| format!("Failed to destroy main window: {error}"))
    }
}

/// Creates the primary window on the bundled loading page. The backend is
/// loaded separately by [`load_backend`].
pub(crate) fn create_main_window(app_handle: &AppHandle) -> Result<WebviewWindow, String> {
    if let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) {
        return Ok(window);
    }

    let retry_app_handle = app_handle.clone();
    WebviewWindowBuilder::new(
        app_handle,
        MAIN_WINDOW_LABEL,
        WebviewUrl::App("index.html".into()),
    )
    .title(APP_IDENTITY)
    .inner_size(1000.0, 800.0)
    .initialization_script(&desktop_bridge::bridge_script())
    .on_navigation(move |url: &Url| {
        if offline_page::is_retry_request(url) {
            append_desktop_log("offline page retry requested");
            spawn_backend_load(&retry_app_handle);
            return false;
        }
        true
    })
    .build()
    .map_err(|error| format!("Failed to create main window: {error}"))
}

pub(crate) fn spawn_backend_load(app_handle: &AppHandle) {
    let app_handle = app_handle.clone();
    tauri::async_runtime::spawn(async move {
        load_backend(&app_handle).await;
    });
}

/// Probes the backend and either navigates the window to it or renders the
/// offline page.
pub(crate) async fn load_backend(app_handle: &AppHandle) {
    let state = app_handle.state::<DesktopState>();
    if !state.window.begin_load() {
        append_desktop_log("backend load skipped: main window destroyed");
        return;
    }

    let probe = probe_backend(state.window.backend_url(), state.config.http_timeout).await;
    if let Err(error) = &probe {
        append_desktop_log(&format!("backend probe failed: {error}"));
    }

    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        append_desktop_log("backend load skipped: main window not found");
        return;
    };
    let phase = state.window.complete_load(&window, probe);
    append_desktop_log(&format!("main window load finished: {phase:?}"));
}

/// Any HTTP response counts as reachable; only transport failures fail.
async fn probe_backend(backend_url: &Url, timeout: Duration) -> Result<(), String> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|error| format!("Failed to build probe client: {error}"))?;
    client
        .get(backend_url.clone())
        .send()
        .await
        .map(|response| {
            tracing::debug!(status = %response.status(), "backend probe answered");
        })
        .map_err(|error| format!("{backend_url} unreachable: {error}"))
}

#[cfg(test)]
mod tests {
    use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn probe_accepts_any_http_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let url = Url::parse(&format!("{}/", server.uri())).expect("url");

        assert!(probe_backend(&url, Duration::from_secs(5)).await.is_ok());
    }

    #[tokio::test]
    async fn probe_fails_when_nothing_listens() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);
        let url = Url::parse(&format!("http://127.0.0.1:{port}/")).expect("url");

        let error = probe_backend(&url, Duration::from_secs(5))
            .await
            .expect_err("closed port");
        assert!(error.contains("unreachable"));
    }
}
