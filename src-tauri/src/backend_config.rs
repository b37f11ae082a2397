use std::{env, time::Duration};

use url::Url;

use crate::{
    shell_locale, BACKEND_URL_ENV, DEDUP_RESET_INTERVAL_ENV, DEFAULT_BACKEND_URL,
    DEFAULT_DEDUP_RESET_INTERVAL, DEFAULT_HTTP_TIMEOUT, DEFAULT_POLL_INTERVAL,
    DEFAULT_SHELL_LOCALE, HTTP_TIMEOUT_ENV, LEGACY_BACKEND_URL_ENV, POLL_INTERVAL_ENV,
};

/// Process-wide settings, resolved once before the app is built.
#[derive(Debug, Clone)]
pub(crate) struct ShellConfig {
    pub(crate) backend_url: Url,
    pub(crate) poll_interval: Duration,
    pub(crate) dedup_reset_interval: Duration,
    pub(crate) http_timeout: Duration,
    pub(crate) locale: &'static str,
}

impl ShellConfig {
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_backend_url = [BACKEND_URL_ENV, LEGACY_BACKEND_URL_ENV]
            .into_iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        Self {
            backend_url: normalize_backend_url(&raw_backend_url, DEFAULT_BACKEND_URL),
            poll_interval: parse_duration(
                lookup(POLL_INTERVAL_ENV).as_deref(),
                Duration::from_secs,
                DEFAULT_POLL_INTERVAL,
            ),
            dedup_reset_interval: parse_duration(
                lookup(DEDUP_RESET_INTERVAL_ENV).as_deref(),
                Duration::from_secs,
                DEFAULT_DEDUP_RESET_INTERVAL,
            ),
            http_timeout: parse_duration(
                lookup(HTTP_TIMEOUT_ENV).as_deref(),
                Duration::from_millis,
                DEFAULT_HTTP_TIMEOUT,
            ),
            locale: shell_locale::resolve_shell_locale(DEFAULT_SHELL_LOCALE, &lookup),
        }
    }
}

fn parse_duration(
    raw: Option<&str>,
    unit: fn(u64) -> Duration,
    fallback: Duration,
) -> Duration {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(unit)
        .unwrap_or(fallback)
}

/// Parses a backend URL, keeping only http/https and forcing a trailing slash
/// on the path so relative endpoint joins keep any path prefix.
pub(crate) fn normalize_backend_url(raw: &str, default_backend_url: &str) -> Url {
    let fallback = || {
        Url::parse(default_backend_url).unwrap_or_else(|_| {
            Url::parse(DEFAULT_BACKEND_URL).expect("DEFAULT_BACKEND_URL is a valid URL")
        })
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return fallback();
    }

    match Url::parse(trimmed) {
        Ok(mut parsed) if matches!(parsed.scheme(), "http" | "https") => {
            if !parsed.path().ends_with('/') {
                let path = format!("{}/", parsed.path());
                parsed.set_path(&path);
            }
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed
        }
        _ => fallback(),
    }
}
