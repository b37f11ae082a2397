use tauri::{AppHandle, Manager};

use crate::{MAIN_WINDOW_LABEL, SESSION_COOKIE_MARKER, SESSION_COOKIE_NAME};

/// Source of the `Cookie` header identifying the signed-in user.
///
/// Implementations never fail: an unreadable cookie store yields an empty
/// header and the request goes out anonymous.
pub(crate) trait SessionSource: Send + Sync {
    fn current_session_header(&self) -> String;
}

pub(crate) fn is_session_cookie(name: &str) -> bool {
    name == SESSION_COOKIE_NAME || name.contains(SESSION_COOKIE_MARKER)
}

pub(crate) fn build_session_header<'a, I>(cookies: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    cookies
        .into_iter()
        .filter(|(name, _)| is_session_cookie(name))
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reads the session cookies out of the main webview's cookie jar.
pub(crate) struct WebviewSessionSource {
    app_handle: AppHandle,
}

impl WebviewSessionSource {
    pub(crate) fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl SessionSource for WebviewSessionSource {
    fn current_session_header(&self) -> String {
        let Some(window) = self.app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
            tracing::debug!("main window not available, sending anonymous request");
            return String::new();
        };

        match window.cookies() {
            Ok(cookies) => {
                let header = build_session_header(
                    cookies
                        .iter()
                        .map(|cookie| (cookie.name(), cookie.value())),
                );
                tracing::debug!(
                    total = cookies.len(),
                    has_session = !header.is_empty(),
                    "read webview cookies"
                );
                header
            }
            Err(error) => {
                tracing::warn!("failed to read webview cookies: {error}");
                String::new()
            }
        }
    }
}
