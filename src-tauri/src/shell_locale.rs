use crate::SHELL_LOCALE_ENV;

#[derive(Debug, Clone, Copy)]
pub struct ShellTexts {
    pub tray_tooltip: &'static str,
    pub tray_show: &'static str,
    pub tray_quit: &'static str,
    pub notification_title_prefix: &'static str,
    pub overdue_body: &'static str,
    pub due_within_one_day_body: &'static str,
    pub due_within_three_days_body: &'static str,
    pub untitled_task: &'static str,
    pub offline_heading: &'static str,
    pub offline_backend_hint: &'static str,
    pub offline_backend_hint_close: &'static str,
    pub offline_restart_hint: &'static str,
    pub offline_retry: &'static str,
}

pub fn shell_texts_for_locale(locale: &str) -> ShellTexts {
    if locale == "en-US" {
        return ShellTexts {
            tray_tooltip: "Lattice-Planner",
            tray_show: "Open Lattice-Planner",
            tray_quit: "Quit",
            notification_title_prefix: "Task deadline: ",
            overdue_body: "This task is past its deadline. Please handle it soon.",
            due_within_one_day_body: "This task is due within a day.",
            due_within_three_days_body: "This task is due within three days. Plan ahead.",
            untitled_task: "(Untitled)",
            offline_heading: "Cannot reach the Lattice-Planner service",
            offline_backend_hint: "Make sure the backend is running (address:",
            offline_backend_hint_close: ")",
            offline_restart_hint:
                "After starting the backend, press retry or reopen the window from the tray.",
            offline_retry: "Retry",
        };
    }

    ShellTexts {
        tray_tooltip: "Lattice-Planner",
        tray_show: "打开 Lattice-Planner",
        tray_quit: "退出",
        notification_title_prefix: "任务截止提醒: ",
        overdue_body: "该任务已过截止时间，请尽快处理。",
        due_within_one_day_body: "该任务将在一天内截止，请留意。",
        due_within_three_days_body: "该任务将在三天内截止，请提前安排。",
        untitled_task: "(无标题)",
        offline_heading: "无法连接 Lattice-Planner 服务",
        offline_backend_hint: "请确认后端已启动（地址：",
        offline_backend_hint_close: "）",
        offline_restart_hint: "启动后端后，请点击重试，或从托盘再次打开窗口。",
        offline_retry: "重试",
    }
}

pub fn resolve_shell_locale<F>(default_shell_locale: &'static str, lookup: F) -> &'static str
where
    F: Fn(&str) -> Option<String>,
{
    for env_key in [SHELL_LOCALE_ENV, "LC_ALL", "LANG"] {
        if let Some(value) = lookup(env_key) {
            if let Some(locale) = normalize_shell_locale(&value) {
                return locale;
            }
        }
    }

    default_shell_locale
}

pub(crate) fn normalize_shell_locale(raw: &str) -> Option<&'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw == "zh-CN" {
        return Some("zh-CN");
    }
    if raw == "en-US" {
        return Some("en-US");
    }

    let lowered = raw.to_ascii_lowercase();
    if lowered.starts_with("zh") {
        return Some("zh-CN");
    }
    if lowered.starts_with("en") {
        return Some("en-US");
    }
    None
}
