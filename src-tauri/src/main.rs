#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
mod app_runtime;
mod app_types;
mod backend_client;
mod backend_config;
mod desktop_bridge;
mod desktop_bridge_commands;
mod exit_cleanup;
mod fatal_error;
mod logging;
mod main_window;
mod notification_deduper;
mod notification_dispatcher;
mod offline_page;
mod planner_task;
mod poll_scheduler;
mod session_bridge;
mod shell_locale;
mod shell_runtime;
mod single_instance;
mod tray_actions;
mod tray_menu_handler;
mod tray_setup;
mod window_actions;
mod window_lifecycle;

pub(crate) use app_constants::*;
pub(crate) use app_types::{AtomicFlagGuard, BridgeResult, DesktopState};
pub(crate) use logging::{
    append_desktop_log, append_poll_log, append_shutdown_log, append_startup_log,
};

fn main() {
    app_runtime::run();
}
