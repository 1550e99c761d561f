//! Dashboard page for the `/` endpoint.
//!
//! The page embeds the current static snapshot (no recomputation) and polls
//! `/api/dynamic` from the browser for CPU, RAM and GPU figures.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::handlers::health::FOOTER_TEXT;
use crate::model::StaticInfo;
use crate::state::SharedState;

/// Browser polling period for `/api/dynamic`.
const REFRESH_MS: u64 = 2000;

/// Polling and rendering script. Kept out of `format!` to avoid brace escaping.
const PAGE_SCRIPT: &str = r#"
function setBar(id, pct) {
  const bar = document.getElementById(id + '-bar');
  const val = document.getElementById(id + '-val');
  if (!bar || !val) return;
  const clamped = Math.max(0, Math.min(100, pct));
  bar.style.width = clamped + '%';
  bar.className = 'bar-fill' + (pct >= 95 ? ' crit' : pct >= 85 ? ' warn' : '');
  val.textContent = pct.toFixed(1) + '%';
}

function esc(s) {
  return String(s).replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}[c]));
}

function renderGpus(gpus) {
  const grid = document.getElementById('gpu-grid');
  if (!gpus || gpus.length === 0) {
    grid.innerHTML = '<div class="muted">No GPU detected</div>';
    return;
  }
  grid.innerHTML = gpus.map(g => {
    const memPct = g.mem_total_mib ? (g.mem_used_mib / g.mem_total_mib) * 100 : 0;
    return `<div class="card">
      <div class="card-title">${esc(g.name)}</div>
      <div>Load: ${g.load_percent.toFixed(1)}%</div>
      <div>Temp: ${g.temperature_c}&deg;C</div>
      <div>VRAM: ${g.mem_used_mib} / ${g.mem_total_mib} MiB (${memPct.toFixed(1)}%)</div>
    </div>`;
  }).join('');
}

async function fetchDynamic() {
  try {
    const res = await fetch('/api/dynamic');
    const data = await res.json();
    setBar('cpu', data.cpu_usage_percent);
    setBar('ram', data.ram_usage_percent);
    renderGpus(data.gpus);
  } catch (e) {
    console.warn('Fetch failed:', e);
  }
}

async function refreshStatic() {
  const btn = document.getElementById('refresh-btn');
  btn.disabled = true;
  btn.textContent = 'Refreshing...';
  try {
    await fetch('/api/static/refresh');
    window.location.reload();
  } catch (e) {
    btn.textContent = 'Refresh failed';
    btn.disabled = false;
  }
}

async function poll() {
  await fetchDynamic();
  setTimeout(poll, REFRESH_MS);
}
poll();
"#;

/// Escapes text for inclusion in HTML content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn or_unknown(value: &str) -> String {
    if value.is_empty() {
        "unknown".to_string()
    } else {
        escape_html(value)
    }
}

/// Renders the disk table rows.
fn render_disk_rows(info: &StaticInfo) -> String {
    if info.disks.is_empty() {
        return r#"<tr><td colspan="4" class="muted">No readable partitions</td></tr>"#
            .to_string();
    }

    let mut rows = String::new();
    for disk in &info.disks {
        writeln!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{:.2} GiB</td><td>{:.1}%</td></tr>",
            escape_html(&disk.device),
            escape_html(&disk.mountpoint),
            disk.total_gib,
            disk.used_percent
        )
        .ok();
    }
    rows
}

/// Renders the full dashboard page.
pub fn render_page(info: &StaticInfo) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{hostname} - hostwatch</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; line-height: 1.6; }}
        .container {{ max-width: 1000px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }}
        h1 {{ color: #333; border-bottom: 3px solid #007bff; padding-bottom: 10px; }}
        h2 {{ color: #555; margin-top: 30px; }}
        .info {{ background: #e9ecef; padding: 15px; border-radius: 4px; display: flex; flex-wrap: wrap; justify-content: space-around; }}
        .info-item {{ margin: 10px; }}
        .info-label {{ font-weight: 600; color: #555; display: block; font-size: 0.9em; }}
        .info-value {{ font-size: 1.1em; color: #007bff; }}
        .bar {{ background: #e9ecef; border-radius: 4px; height: 18px; overflow: hidden; }}
        .bar-fill {{ background: #28a745; height: 100%; width: 0; transition: width 0.4s; }}
        .bar-fill.warn {{ background: #ffc107; }}
        .bar-fill.crit {{ background: #dc3545; }}
        .gauge {{ margin: 15px 0; }}
        .gauge-label {{ display: flex; justify-content: space-between; font-weight: 600; color: #555; }}
        table {{ border-collapse: collapse; width: 100%; margin: 20px 0; }}
        th {{ background: #007bff; color: white; padding: 10px; text-align: left; }}
        td {{ padding: 8px 10px; border-bottom: 1px solid #ddd; }}
        .card {{ display: inline-block; vertical-align: top; margin: 10px 20px 10px 0; padding: 12px 16px; background: #f8f9fa; border-left: 4px solid #007bff; border-radius: 4px; }}
        .card-title {{ font-weight: 600; }}
        .muted {{ color: #888; }}
        button {{ background: #007bff; color: white; border: none; padding: 8px 14px; border-radius: 4px; cursor: pointer; }}
        button:disabled {{ background: #6c757d; }}
        .footer {{ margin-top: 40px; padding-top: 20px; border-top: 1px solid #ddd; color: #666; font-size: 0.9em; text-align: center; }}
    </style>
</head>
<body>
<div class="container">
    <h1>{hostname}</h1>

    <div class="info">
        <div class="info-item"><span class="info-label">OS</span><span class="info-value">{os}</span></div>
        <div class="info-item"><span class="info-label">Processor</span><span class="info-value">{processor}</span></div>
        <div class="info-item"><span class="info-label">Architecture</span><span class="info-value">{arch}</span></div>
        <div class="info-item"><span class="info-label">Total RAM</span><span class="info-value">{ram:.2} GiB</span></div>
    </div>
    <p><button id="refresh-btn" onclick="refreshStatic()">Refresh static info</button></p>

    <h2>Utilization</h2>
    <div class="gauge">
        <div class="gauge-label"><span>CPU</span><span id="cpu-val">-</span></div>
        <div class="bar"><div id="cpu-bar" class="bar-fill"></div></div>
    </div>
    <div class="gauge">
        <div class="gauge-label"><span>RAM</span><span id="ram-val">-</span></div>
        <div class="bar"><div id="ram-bar" class="bar-fill"></div></div>
    </div>

    <h2>GPUs</h2>
    <div id="gpu-grid"><div class="muted">Sampling...</div></div>

    <h2>Disks</h2>
    <table>
        <tr><th>Device</th><th>Mount point</th><th>Total</th><th>Used</th></tr>
        {disk_rows}
    </table>

    <div class="footer"><p>{footer}</p></div>
</div>
<script>
const REFRESH_MS = {refresh_ms};
{script}
</script>
</body>
</html>"#,
        hostname = or_unknown(&info.hostname),
        os = or_unknown(&info.os),
        processor = or_unknown(&info.processor),
        arch = or_unknown(&info.arch),
        ram = info.ram_total_gib,
        disk_rows = render_disk_rows(info),
        footer = FOOTER_TEXT,
        refresh_ms = REFRESH_MS,
        script = PAGE_SCRIPT,
    )
}

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");
    state.health_stats.record_http_request();

    let info = state.telemetry.get_static();
    Html(render_page(&info))
}
