use crate::{GRANT_EVENT, LOGIN_STATUS_EVENT, NOTIFICATION_EVENT};

const RELOAD_COMMAND: &str = "desktop_bridge_reload_app";
const IS_DESKTOP_COMMAND: &str = "desktop_bridge_is_desktop_runtime";

fn js_string(raw: &str) -> String {
    serde_json::to_string(raw).unwrap_or_else(|_| "\"\"".to_string())
}

/// Script injected into every page of the main window. Exposes
/// `window.latticePlanner` with `reload()`, `isDesktop()` and `on(channel, handler)`
/// for the shell event channels.
pub(crate) fn bridge_script() -> String {
    let channels = [LOGIN_STATUS_EVENT, NOTIFICATION_EVENT, GRANT_EVENT]
        .iter()
        .map(|channel| js_string(channel))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"(function () {{
  if (window.latticePlanner) {{
    return;
  }}
  const channels = [{channels}];
  const invoke = (command, args) => {{
    const internals = window.__TAURI_INTERNALS__;
    if (!internals || typeof internals.invoke !== "function") {{
      return Promise.reject(new Error("desktop bridge unavailable"));
    }}
    return internals.invoke(command, args || {{}});
  }};
  window.latticePlanner = {{
    isDesktop: () => invoke({is_desktop}),
    reload: () => invoke({reload}),
    on: (channel, handler) => {{
      const tauri = window.__TAURI__;
      if (!channels.includes(channel) || !tauri || !tauri.event) {{
        return Promise.resolve(() => {{}});
      }}
      return tauri.event.listen(channel, (event) => handler(event.payload));
    }},
  }};
}})();"#,
        channels = channels,
        is_desktop = js_string(IS_DESKTOP_COMMAND),
        reload = js_string(RELOAD_COMMAND),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_script_exposes_reload_and_channels() {
        let script = bridge_script();
        assert!(script.contains("window.latticePlanner = {"));
        assert!(script.contains(r#"invoke("desktop_bridge_reload_app")"#));
        assert!(script.contains(r#"invoke("desktop_bridge_is_desktop_runtime")"#));
        assert!(script.contains(r#"["login-status", "notification", "grant"]"#));
    }

    #[test]
    fn bridge_script_is_idempotent_per_page() {
        assert!(bridge_script().contains("if (window.latticePlanner) {\n    return;"));
    }
}
