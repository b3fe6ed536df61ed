//! Typed wrappers around JS interop via `js_sys::eval()`.
//!
//! The D3.js map and chart live in `assets/js/*.js` and are loaded at runtime.
//! They are evaluated as globals (no ES modules) and exposed via `window.*`.
//! This module serializes data for those globals, fetches data files served
//! next to the WASM bundle and routes map clicks back into Rust.

use flate2::read::GzDecoder;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

static BASIN_MAP_JS: &str = include_str!("../assets/js/basin-map.js");
static SNOW_CHART_JS: &str = include_str!("../assets/js/snow-chart.js");

/// Execute arbitrary JS, wrapping in try/catch to avoid panics.
pub fn call_js(code: &str) {
    let wrapped = format!(
        "try {{ {} }} catch(e) {{ console.warn('casnow JS call failed:', e); }}",
        code
    );
    let _ = js_sys::eval(&wrapped);
}

/// Quote `text` as a JS string literal.
fn js_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "''".to_string())
}

static INIT_REQUESTED: AtomicBool = AtomicBool::new(false);

/// True exactly once per page: for the first caller of [`init_charts`].
fn claim_init() -> bool {
    !INIT_REQUESTED.swap(true, Ordering::SeqCst)
}

/// Initialize map and chart scripts once D3 has loaded.
///
/// The scripts are evaluated at global scope via indirect eval from inside
/// the polling callback, then their entry points are promoted to `window.*`.
/// Calls after the first are no-ops.
pub fn init_charts() {
    if !claim_init() {
        return;
    }
    let all_js = [BASIN_MAP_JS, SNOW_CHART_JS].join("\n");
    let _ = js_sys::eval(&format!("window.__casnowScripts = {};", js_string(&all_js)));

    let init_js = r#"
        (function() {
            if (window.__casnowChartsReady || window.__casnowInitPending) return;
            window.__casnowInitPending = true;
            var waitForD3 = setInterval(function() {
                if (typeof d3 !== 'undefined') {
                    clearInterval(waitForD3);
                    (0, eval)(window.__casnowScripts);
                    delete window.__casnowScripts;
                    if (typeof renderBasinMap !== 'undefined') window.renderBasinMap = renderBasinMap;
                    if (typeof renderSnowChart !== 'undefined') window.renderSnowChart = renderSnowChart;
                    window.__casnowChartsReady = true;
                    console.log('casnow charts initialized');
                }
            }, 100);
        })();
    "#;
    let _ = js_sys::eval(init_js);
}

/// Call `window.{function}(container, json)` once scripts and container exist.
fn render_when_ready(function: &str, container_id: &str, json: &str) {
    call_js(&format!(
        r#"
        (function() {{
            var poll = setInterval(function() {{
                if (window.__casnowChartsReady &&
                    typeof window.{function} !== 'undefined' &&
                    document.getElementById('{container_id}')) {{
                    clearInterval(poll);
                    try {{
                        window.{function}('{container_id}', {payload});
                    }} catch(e) {{ console.error('[casnow] {function} error:', e); }}
                }}
            }}, 100);
        }})();
        "#,
        payload = js_string(json),
    ));
}

/// Draw the basin map from a serialized `MapView`.
pub fn render_basin_map(container_id: &str, map_json: &str) {
    render_when_ready("renderBasinMap", container_id, map_json);
}

/// Draw the snow chart from a serialized `ChartSpec`.
pub fn render_snow_chart(container_id: &str, chart_json: &str) {
    render_when_ready("renderSnowChart", container_id, chart_json);
}

/// Destroy/clean up a chart in the given container.
pub fn destroy_chart(container_id: &str) {
    call_js(&format!(
        "var el = document.getElementById('{}'); if (el) el.innerHTML = '';",
        container_id
    ));
}

/// Route map clicks to `on_click(x, y)` in Web Mercator meters.
///
/// The map script calls `window.casnowOnMapClick` on every tap. The closure
/// lives for the rest of the page.
pub fn install_map_click_handler(on_click: impl FnMut(f64, f64) + 'static) {
    let closure = Closure::wrap(Box::new(on_click) as Box<dyn FnMut(f64, f64)>);
    if let Some(window) = web_sys::window() {
        let _ = js_sys::Reflect::set(
            &window,
            &JsValue::from_str("casnowOnMapClick"),
            closure.as_ref(),
        );
    }
    closure.forget();
}

fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Fetch a URL relative to the page and return the body bytes.
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
    let window = web_sys::window().ok_or("no window")?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js_error)?;
    let response: web_sys::Response = response.dyn_into().map_err(js_error)?;
    if !response.ok() {
        return Err(format!("HTTP {} fetching {}", response.status(), url));
    }
    let buffer = JsFuture::from(response.array_buffer().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Fetch a UTF-8 text file.
pub async fn fetch_text(url: &str) -> Result<String, String> {
    let bytes = fetch_bytes(url).await?;
    String::from_utf8(bytes).map_err(|e| format!("{} is not UTF-8: {}", url, e))
}

/// Fetch a gzip-compressed text file and decompress it.
pub async fn fetch_gz_text(url: &str) -> Result<String, String> {
    let bytes = fetch_bytes(url).await?;
    let mut text = String::new();
    GzDecoder::new(bytes.as_slice())
        .read_to_string(&mut text)
        .map_err(|e| format!("Failed to decompress {}: {}", url, e))?;
    log::info!("Decompressed {} ({} bytes)", url, text.len());
    Ok(text)
}
