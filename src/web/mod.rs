//! Web service: one page, one toggle button.

use axum::{Json, Router, extract::Query, response::Html, routing::get};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::debug;

pub mod button;

use button::ToggleButton;

pub fn build_router() -> Router {
  Router::new()
    .route("/", get(index))
    .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
    .layer(TraceLayer::new_for_http())
}

/// `?on=true` starts the page with the button already switched on.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  #[serde(default)]
  pub on: bool,
}

pub async fn index(Query(params): Query<PageParams>) -> Html<String> {
  let mut button = ToggleButton::new("toggle");
  if params.on {
    let mut announce = |on: bool| debug!("toggle pre-rendered, on={on}");
    button.toggle(Some(&mut announce));
  }
  Html(render_page(&button))
}

pub fn render_page(button: &ToggleButton) -> String {
  let template = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>duo-scaffold</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 2rem; }
    button { font-size: 1.25rem; padding: .5rem 1.5rem; border-radius: 6px; }
    button[aria-pressed="true"] { background: #2da44e; color: #fff; }
    #status { color: #57606a; }
  </style>
</head>
<body>
  <h1>Welcome to duo-scaffold</h1>
  __BUTTON__
  <p id="status" aria-live="polite"></p>
  <script>
    (() => {
      const button = document.getElementById('__ID__');
      const status = document.getElementById('status');
      let on = button.dataset.on === 'true';
      const onToggle = (value) => { status.textContent = 'Button is ' + (value ? 'on' : 'off'); };
      button.addEventListener('click', () => {
        on = !on;
        button.textContent = on ? 'ON' : 'OFF';
        button.setAttribute('aria-pressed', String(on));
        button.dataset.on = String(on);
        if (onToggle) onToggle(on);
      });
    })();
  </script>
</body>
</html>
"#;
  template
    .replace("__BUTTON__", &button.render())
    .replace("__ID__", &crate::util::html_escape(&button.id))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn page_embeds_button_and_script() {
    let page = render_page(&ToggleButton::new("toggle"));
    assert!(page.contains(r#"<button id="toggle""#));
    assert!(page.contains("getElementById('toggle')"));
    assert!(!page.contains("__BUTTON__"));
  }

  #[test]
  fn script_flips_every_piece_of_button_state() {
    let page = render_page(&ToggleButton::new("toggle"));
    assert!(page.contains("let on = button.dataset.on === 'true';"));
    assert!(page.contains("on = !on;"));
    assert!(page.contains("button.textContent = on ? 'ON' : 'OFF';"));
    assert!(page.contains("button.setAttribute('aria-pressed', String(on));"));
    assert!(page.contains("button.dataset.on = String(on);"));
  }
}
