use std::time::Duration;

pub(crate) const APP_IDENTITY: &str = "Lattice-Planner";
pub(crate) const MAIN_WINDOW_LABEL: &str = "main";
pub(crate) const TRAY_ID: &str = "lattice-planner-tray";

pub(crate) const DEFAULT_BACKEND_URL: &str = "http://localhost:8080/";
pub(crate) const BACKEND_URL_ENV: &str = "LATTICE_PLANNER_BASE_URL";
pub(crate) const LEGACY_BACKEND_URL_ENV: &str = "ELECTRON_APP_BASE_URL";
pub(crate) const POLL_INTERVAL_ENV: &str = "LATTICE_PLANNER_POLL_INTERVAL_SECS";
pub(crate) const DEDUP_RESET_INTERVAL_ENV: &str = "LATTICE_PLANNER_DEDUP_RESET_SECS";
pub(crate) const HTTP_TIMEOUT_ENV: &str = "LATTICE_PLANNER_HTTP_TIMEOUT_MS";
pub(crate) const SHELL_LOCALE_ENV: &str = "LATTICE_PLANNER_LOCALE";

pub(crate) const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub(crate) const DEFAULT_DEDUP_RESET_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
pub(crate) const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_millis(30_000);

pub(crate) const LOGIN_STATE_ENDPOINT: &str = "user-logged-in";
pub(crate) const DUE_DATES_ENDPOINT: &str = "due-dates";

pub(crate) const SESSION_COOKIE_NAME: &str = "JSESSIONID";
pub(crate) const SESSION_COOKIE_MARKER: &str = "SESSION";

pub(crate) const LOGIN_STATUS_EVENT: &str = "login-status";
pub(crate) const NOTIFICATION_EVENT: &str = "notification";
pub(crate) const GRANT_EVENT: &str = "grant";

pub(crate) const GRANT_READY_MESSAGE: &str = "Notification ready";
pub(crate) const GRANT_UNSUPPORTED_MESSAGE: &str =
    "System notifications are not supported in this environment";

pub(crate) const OFFLINE_RETRY_URL: &str = "https://lattice-planner.localhost/retry";

pub(crate) const DEFAULT_SHELL_LOCALE: &str = "zh-CN";
pub(crate) const DESKTOP_LOG_FILE: &str = "desktop.log";
pub(crate) const DESKTOP_ROOT_DIR_NAME: &str = ".lattice-planner";
