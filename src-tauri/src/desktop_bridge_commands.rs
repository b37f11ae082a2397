use tauri::{AppHandle, Manager};

use crate::{append_desktop_log, window_actions, BridgeResult, DesktopState};

fn reload_decision(destroyed: bool) -> BridgeResult {
    if destroyed {
        BridgeResult {
            ok: false,
            reason: Some("Main window already destroyed.".to_string()),
        }
    } else {
        BridgeResult {
            ok: true,
            reason: None,
        }
    }
}

#[tauri::command]
pub(crate) fn desktop_bridge_is_desktop_runtime() -> bool {
    true
}

/// Reloads the main window to the configured backend URL.
#[tauri::command]
pub(crate) fn desktop_bridge_reload_app(app_handle: AppHandle) -> BridgeResult {
    let state = app_handle.state::<DesktopState>();
    let result = reload_decision(state.is_quitting() || !state.window.begin_load());
    if result.ok {
        append_desktop_log("renderer requested reload");
        window_actions::reload_main_window(&app_handle, append_desktop_log);
    }
    result
}
