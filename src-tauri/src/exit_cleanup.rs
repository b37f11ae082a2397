use tauri::{AppHandle, Manager};

use crate::{append_shutdown_log, single_instance, DesktopState, MAIN_WINDOW_LABEL, TRAY_ID};

/// Orderly teardown: cancel timers, destroy the window, remove the tray and
/// release the instance lock. Only the first caller performs it.
pub(crate) fn teardown_shell(app_handle: &AppHandle, reason: &str) -> bool {
    let state = app_handle.state::<DesktopState>();
    if !state.mark_quitting() {
        append_shutdown_log(&format!("teardown already in progress, ignoring {reason}"));
        return false;
    }
    append_shutdown_log(&format!("shell teardown started: {reason}"));

    if state.runtime.stop() {
        append_shutdown_log("poll and dedup reset timers cancelled");
    }

    if let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) {
        if let Err(error) = state.window.destroy(&window) {
            append_shutdown_log(&format!("failed to destroy main window: {error}"));
        }
    }

    if app_handle.remove_tray_by_id(TRAY_ID).is_none() {
        append_shutdown_log("tray icon already removed");
    }

    single_instance::release(app_handle);
    append_shutdown_log("shell teardown finished");
    true
}

/// Late cleanup for exits that did not come from the tray menu.
pub(crate) fn stop_background_work(app_handle: &AppHandle) {
    let Some(state) = app_handle.try_state::<DesktopState>() else {
        return;
    };
    state.mark_quitting();
    if state.runtime.stop() {
        append_shutdown_log("background timers cancelled on exit");
    }
}
