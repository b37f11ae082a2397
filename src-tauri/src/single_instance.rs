use tauri::{plugin::TauriPlugin, AppHandle, Manager, Wry};

use crate::{
    append_desktop_log, append_startup_log,
    window_lifecycle::{WindowManager, WindowSurface},
    DesktopState, MAIN_WINDOW_LABEL,
};

fn describe_activation(argv: &[String], cwd: &str) -> String {
    format!(
        "second instance launch redirected to running instance (args: {}, cwd: {cwd})",
        argv.len()
    )
}

/// Brings the running instance's window forward for a second launch.
pub(crate) fn activate_existing_window<S>(
    manager: &WindowManager,
    surface: &S,
    argv: &[String],
    cwd: &str,
) -> Result<(), String>
where
    S: WindowSurface + ?Sized,
{
    append_startup_log(&describe_activation(argv, cwd));
    manager.reveal(surface)
}

/// Must be the first plugin registered: a second process exits inside the
/// plugin before any window, tray or timer exists.
pub(crate) fn plugin() -> TauriPlugin<Wry> {
    tauri_plugin_single_instance::init(|app_handle, argv, cwd| {
        let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
            append_desktop_log("second instance activation ignored: main window not found");
            return;
        };
        let state = app_handle.state::<DesktopState>();
        if let Err(error) = activate_existing_window(&state.window, &window, &argv, &cwd) {
            append_desktop_log(&format!("failed to activate main window: {error}"));
        }
    })
}

pub(crate) fn release(app_handle: &AppHandle) {
    tauri_plugin_single_instance::destroy(app_handle);
}
