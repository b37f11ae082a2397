use tauri::{AppHandle, Manager};

use crate::{main_window, DesktopState, MAIN_WINDOW_LABEL};

pub fn show_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("show_main_window skipped: main window not found");
        return;
    };

    let state = app_handle.state::<DesktopState>();
    if let Err(error) = state.window.reveal(&window) {
        log(&format!("failed to reveal main window: {error}"));
    }
}

pub fn reload_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    if app_handle.get_webview_window(MAIN_WINDOW_LABEL).is_none() {
        log("reload_main_window skipped: main window not found");
        return;
    }
    log("reloading main window from configured backend url");
    main_window::spawn_backend_load(app_handle);
}
