//! Host-page embedding: the library runs in an iframe and reports its content
//! height to the parent frame, which resizes the iframe to match.

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

pub const RESIZE_MESSAGE_TYPE: &str = "financial-library-resize";

/// Message the embedded app posts to `window.parent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub height: f64,
}

impl ResizeMessage {
    pub fn new(height: f64) -> Self {
        Self { kind: RESIZE_MESSAGE_TYPE.to_string(), height }
    }
}

const EMBED_TEMPLATE: &str = r#"(function () {
  var script = document.currentScript;
  if (!script) { return; }
  var src = script.getAttribute('data-src') || (new URL(script.src).origin + '/');
  var iframe = document.createElement('iframe');
  iframe.src = src;
  iframe.title = script.getAttribute('data-title') || 'Resource library';
  iframe.style.width = '100%';
  iframe.style.border = '0';
  iframe.setAttribute('scrolling', 'no');
  script.parentNode.insertBefore(iframe, script);
  window.addEventListener('message', function (event) {
    if (event.source !== iframe.contentWindow) { return; }
    var data = event.data;
    if (!data || data.type !== '__RESIZE_TYPE__' || typeof data.height !== 'number') { return; }
    iframe.style.height = Math.ceil(data.height) + 'px';
  });
})();
"#;

pub fn embed_script() -> String {
    EMBED_TEMPLATE.replace("__RESIZE_TYPE__", RESIZE_MESSAGE_TYPE)
}

#[utoipa::path(get, path = "/embed.js", tag = "embed", responses((status = 200, description = "Host-page embed script", content_type = "application/javascript")))]
pub async fn embed_js() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=300"),
        ],
        embed_script(),
    )
}
