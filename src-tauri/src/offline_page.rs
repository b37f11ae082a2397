use base64::Engine as _;
use url::Url;

use crate::{shell_locale::ShellTexts, APP_IDENTITY, OFFLINE_RETRY_URL};

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Self-contained page shown while the backend is unreachable. The retry
/// button navigates to [`OFFLINE_RETRY_URL`], which the window intercepts.
pub(crate) fn render_offline_page(texts: &ShellTexts, backend_url: &Url) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="UTF-8"><title>{title}</title></head>
<body style="font-family:sans-serif;padding:2em;text-align:center;background:#f5f5f5;">
  <h2>{heading}</h2>
  <p>{backend_hint} <code>{backend_url}</code>{backend_hint_close}</p>
  <p>{restart_hint}</p>
  <a id="retry" href="{retry_url}" style="display:inline-block;padding:8px 16px;border:1px solid #888;border-radius:4px;color:#222;text-decoration:none;">{retry}</a>
</body></html>"#,
        title = escape_html(APP_IDENTITY),
        heading = escape_html(texts.offline_heading),
        backend_hint = escape_html(texts.offline_backend_hint),
        backend_url = escape_html(backend_url.as_str()),
        backend_hint_close = escape_html(texts.offline_backend_hint_close),
        restart_hint = escape_html(texts.offline_restart_hint),
        retry_url = OFFLINE_RETRY_URL,
        retry = escape_html(texts.offline_retry),
    )
}

pub(crate) fn offline_page_url(html: &str) -> Result<Url, String> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(html.as_bytes());
    Url::parse(&format!("data:text/html;charset=utf-8;base64,{encoded}"))
        .map_err(|error| format!("Failed to build offline page url: {error}"))
}

pub(crate) fn is_retry_request(url: &Url) -> bool {
    Url::parse(OFFLINE_RETRY_URL)
        .map(|retry| {
            url.scheme() == retry.scheme()
                && url.host_str() == retry.host_str()
                && url.path() == retry.path()
        })
        .unwrap_or(false)
}
