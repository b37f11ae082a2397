use std::sync::Arc;

use tauri::{AppHandle, Manager, RunEvent, WindowEvent};

use crate::{
    append_desktop_log, append_startup_log,
    backend_client::HttpPlannerBackend,
    backend_config::ShellConfig,
    exit_cleanup, fatal_error, logging, main_window,
    notification_dispatcher::{NotificationDispatcher, TauriShellSink},
    session_bridge::{SessionSource, WebviewSessionSource},
    single_instance, tray_setup,
    window_lifecycle::CloseDecision,
    DesktopState, DESKTOP_LOG_FILE, MAIN_WINDOW_LABEL,
};

fn start_shell_runtime(app_handle: &AppHandle) -> Result<(), String> {
    let state = app_handle.state::<DesktopState>();
    let session: Arc<dyn SessionSource> = Arc::new(WebviewSessionSource::new(app_handle.clone()));
    let backend = HttpPlannerBackend::new(
        state.config.backend_url.clone(),
        state.config.http_timeout,
        session,
    )?;
    let sink = TauriShellSink::new(app_handle.clone());

    if !state.runtime.start(
        Arc::new(backend),
        Arc::new(sink),
        NotificationDispatcher::new(state.texts),
    ) {
        append_startup_log("shell runtime already started");
    }
    Ok(())
}

pub(crate) fn run() {
    let log_path =
        logging::resolve_desktop_log_path(logging::default_desktop_root_dir(), DESKTOP_LOG_FILE);
    if let Err(error) = logging::init_logging(&log_path) {
        eprintln!("failed to initialize logging: {error}");
    }

    append_startup_log("desktop process starting");
    append_startup_log(&format!("desktop log path: {}", log_path.display()));

    let config = ShellConfig::from_env();
    append_startup_log(&format!(
        "backend url: {}, poll interval: {}s, locale: {}",
        config.backend_url,
        config.poll_interval.as_secs(),
        config.locale
    ));

    tauri::Builder::default()
        .plugin(single_instance::plugin())
        .plugin(tauri_plugin_notification::init())
        .manage(DesktopState::new(config))
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::desktop_bridge_is_desktop_runtime,
            crate::desktop_bridge_commands::desktop_bridge_reload_app,
        ])
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW_LABEL {
                return;
            }

            if let WindowEvent::CloseRequested { api, .. } = event {
                let app_handle = window.app_handle();
                let Some(webview_window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
                    return;
                };
                let state = app_handle.state::<DesktopState>();
                match state
                    .window
                    .handle_close_request(&webview_window, state.is_quitting())
                {
                    CloseDecision::Allow => {}
                    CloseDecision::HideInstead => {
                        api.prevent_close();
                        append_desktop_log("main window close intercepted, hidden to tray");
                    }
                }
            }
        })
        .setup(|app| {
            let app_handle = app.handle().clone();
            fatal_error::install_panic_hook(app_handle.clone());

            if let Err(error) = tray_setup::setup_tray(&app_handle) {
                append_startup_log(&format!("failed to initialize tray: {error}"));
            }

            match main_window::create_main_window(&app_handle) {
                Ok(_) => main_window::spawn_backend_load(&app_handle),
                Err(error) => append_startup_log(&format!("failed to create main window: {error}")),
            }

            if let Err(error) = start_shell_runtime(&app_handle) {
                append_startup_log(&format!("failed to start shell runtime: {error}"));
            }

            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::Exit => {
                exit_cleanup::stop_background_work(app_handle);
            }
            #[cfg(target_os = "macos")]
            RunEvent::Reopen { .. } => {
                crate::window_actions::show_main_window(app_handle, append_desktop_log);
            }
            _ => {}
        });
}
