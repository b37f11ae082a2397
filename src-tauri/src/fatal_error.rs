use std::{any::Any, panic};

use tauri::{AppHandle, Manager};

use crate::{single_instance, DesktopState};

const FATAL_EXIT_CODE: i32 = 1;

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Any panic, on any thread or task, terminates the process after cancelling
/// the timers and releasing the instance lock.
pub(crate) fn install_panic_hook(app_handle: AppHandle) {
    let previous_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        previous_hook(info);

        let location = info
            .location()
            .map(|location| format!("{}:{}", location.file(), location.line()))
            .unwrap_or_else(|| "unknown location".to_string());
        tracing::error!(
            target: "fatal",
            location = %location,
            "unrecoverable panic, terminating: {}",
            panic_message(info.payload())
        );

        if let Some(state) = app_handle.try_state::<DesktopState>() {
            state.mark_quitting();
            state.runtime.stop();
        }
        single_instance::release(&app_handle);
        std::process::exit(FATAL_EXIT_CODE);
    }));
}
