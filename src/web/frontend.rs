//! Embedded HTML/CSS/JS frontend for the aiswitch web console.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies.

/// The complete single-page console HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>aiswitch Console</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --purple: #bc8cff;
  --cyan: #39d2c0;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

/* Layout */
.app { max-width: 1200px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}

header h1 { font-size: 24px; font-weight: 600; display: flex; align-items: center; gap: 10px; }
header h1 .logo { color: var(--accent); font-family: var(--mono); font-weight: 700; }
header .subtitle { color: var(--text-muted); font-size: 13px; }

.badge {
  display: inline-flex;
  align-items: center;
  gap: 4px;
  padding: 4px 10px;
  border-radius: 12px;
  font-size: 12px;
  font-weight: 500;
  background: var(--surface);
  border: 1px solid var(--border);
}
.badge.ok { border-color: var(--green); color: var(--green); }
.badge.warn { border-color: var(--yellow); color: var(--yellow); }
.badge.err { border-color: var(--red); color: var(--red); }

/* Navigation */
nav {
  display: flex;
  gap: 4px;
  margin-bottom: 24px;
  background: var(--surface);
  border-radius: var(--radius);
  padding: 4px;
  border: 1px solid var(--border);
}
nav button {
  flex: 1;
  padding: 8px 16px;
  border: none;
  border-radius: 6px;
  background: transparent;
  color: var(--text-muted);
  font-size: 13px;
  font-weight: 500;
  cursor: pointer;
  transition: all 0.15s;
}
nav button:hover { color: var(--text); background: rgba(255,255,255,0.04); }
nav button.active { background: var(--accent); color: #fff; }

.panel { display: none; }
.panel.active { display: block; }

/* Cards */
.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}
.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 16px; }
.card-head { display: flex; justify-content: space-between; align-items: center; margin-bottom: 16px; }
.card-head h2 { margin-bottom: 0; }

/* Stats grid */
.stats-grid {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
  gap: 16px;
  margin-bottom: 16px;
}
.stat-card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  text-align: center;
}
.stat-card .value { font-size: 32px; font-weight: 700; font-family: var(--mono); color: var(--accent); line-height: 1.1; }
.stat-card .value.green { color: var(--green); }
.stat-card .value.purple { color: var(--purple); }
.stat-card .value.cyan { color: var(--cyan); }
.stat-card .label { font-size: 12px; color: var(--text-muted); margin-top: 6px; text-transform: uppercase; letter-spacing: 0.5px; }

/* Tables */
table { width: 100%; border-collapse: collapse; }
th {
  text-align: left;
  font-size: 12px;
  font-weight: 600;
  color: var(--text-muted);
  text-transform: uppercase;
  letter-spacing: 0.5px;
  padding: 8px 12px;
  border-bottom: 1px solid var(--border);
}
td { padding: 8px 12px; border-bottom: 1px solid var(--border); }
tr:last-child td { border-bottom: none; }
tr:hover td { background: rgba(255,255,255,0.02); }
.mono { font-family: var(--mono); font-size: 13px; }
.num { text-align: right; font-family: var(--mono); }
.muted { color: var(--text-muted); }
.ok { color: var(--green); }
.warn { color: var(--yellow); }
.err { color: var(--red); }
.empty-state { text-align: center; padding: 32px; color: var(--text-muted); display: none; }

/* Forms */
.form-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 12px; margin-bottom: 12px; }
label.field { display: flex; flex-direction: column; gap: 4px; font-size: 12px; color: var(--text-muted); }
label.check { display: flex; align-items: center; gap: 6px; font-size: 13px; }
input[type=text], input[type=number], input[type=password], select, textarea {
  background: var(--bg);
  border: 1px solid var(--border);
  color: var(--text);
  border-radius: 6px;
  padding: 6px 10px;
  font-size: 13px;
}
textarea { width: 100%; min-height: 320px; font-family: var(--mono); resize: vertical; }
.btn {
  padding: 6px 14px;
  border-radius: 6px;
  border: 1px solid var(--border);
  background: var(--surface);
  color: var(--text);
  font-size: 13px;
  cursor: pointer;
}
.btn:hover { border-color: var(--accent); }
.btn.primary { background: var(--accent); border-color: var(--accent); color: #fff; }
.btn.danger { color: var(--red); }
.btn.small { padding: 2px 8px; font-size: 12px; }
.btn:disabled { opacity: 0.5; cursor: default; }
.actions { display: flex; gap: 8px; align-items: center; }

/* Range selector */
.range { display: inline-flex; gap: 2px; background: var(--bg); padding: 2px; border-radius: 6px; border: 1px solid var(--border); }
.range button { border: none; background: transparent; color: var(--text-muted); padding: 4px 12px; border-radius: 4px; cursor: pointer; font-size: 12px; }
.range button.active { background: var(--accent); color: #fff; }

/* Chart */
.chart { width: 100%; height: 280px; }
.chart .axis { stroke: var(--border); }
.chart .grid { stroke: var(--border); stroke-dasharray: 2 4; }
.chart text { fill: var(--text-muted); font-size: 11px; font-family: var(--mono); }
.chart .rate { stroke: var(--green); fill: none; stroke-width: 2; }
.chart .latency { stroke: var(--purple); fill: none; stroke-width: 2; }
.chart .dot-rate { fill: var(--green); }
.chart .dot-latency { fill: var(--purple); }
.legend { display: flex; gap: 16px; font-size: 12px; color: var(--text-muted); margin-top: 8px; }
.legend span::before {
  content: '';
  display: inline-block;
  width: 10px;
  height: 10px;
  border-radius: 3px;
  margin-right: 4px;
  vertical-align: middle;
}
.legend .rate::before { background: var(--green); }
.legend .latency::before { background: var(--purple); }

.dist-row { display: flex; align-items: center; gap: 12px; margin-bottom: 8px; }
.dist-row .name { width: 80px; font-family: var(--mono); }
.dist-row .track { flex: 1; height: 14px; background: var(--bg); border-radius: 7px; overflow: hidden; }
.dist-row .fill { height: 100%; background: var(--cyan); }
.dist-row .count { width: 140px; text-align: right; font-family: var(--mono); color: var(--text-muted); }

.notice { padding: 8px 12px; border-radius: 6px; border: 1px solid var(--yellow); color: var(--yellow); margin-bottom: 16px; display: none; }

/* Toast */
.toast {
  position: fixed;
  bottom: 24px;
  right: 24px;
  padding: 10px 16px;
  border-radius: var(--radius);
  background: var(--surface);
  border: 1px solid var(--green);
  color: var(--green);
  opacity: 0;
  transition: opacity 0.2s;
  pointer-events: none;
}
.toast.show { opacity: 1; }
.toast.error { border-color: var(--red); color: var(--red); }
</style>
</head>
<body>
<div class="app">
  <header>
    <div>
      <h1><span class="logo">aiswitch</span> Console</h1>
      <div class="subtitle">Channels, models and test analytics</div>
    </div>
    <span id="backend-badge" class="badge">backend …</span>
  </header>

  <nav id="nav">
    <button data-panel="channels" class="active">Channels</button>
    <button data-panel="models">Models</button>
    <button data-panel="tests">Tests</button>
    <button data-panel="analytics">Analytics</button>
    <button data-panel="generate">Config</button>
  </nav>

  <!-- Channels -->
  <section id="panel-channels" class="panel active">
    <div class="card">
      <h2 id="ch-form-title">Add channel</h2>
      <div class="form-grid">
        <label class="field">Name<input type="text" id="ch-name"></label>
        <label class="field">Base URL<input type="text" id="ch-base-url" placeholder="https://api.openai.com"></label>
        <label class="field">API key<input type="password" id="ch-api-key"></label>
        <label class="field">Auth type
          <select id="ch-auth-type">
            <option value="bearer">bearer</option>
            <option value="api-key">api-key</option>
            <option value="none">none</option>
          </select>
        </label>
      </div>
      <div class="actions">
        <label class="check"><input type="checkbox" id="ch-active" checked> Active</label>
        <button class="btn primary" id="btn-add-channel">Add</button>
        <button class="btn" id="btn-cancel-channel" style="display:none">Cancel</button>
      </div>
    </div>
    <div class="card">
      <h2>Channels</h2>
      <table>
        <thead><tr><th>ID</th><th>Name</th><th>Base URL</th><th>Auth</th><th>Active</th><th></th></tr></thead>
        <tbody id="channels-tbody"></tbody>
      </table>
      <div class="empty-state" id="channels-empty">No channels configured.</div>
    </div>
  </section>

  <!-- Models -->
  <section id="panel-models" class="panel">
    <div class="card">
      <h2 id="md-form-title">Add model</h2>
      <div class="form-grid">
        <label class="field">Channel<select id="md-channel" class="channel-select"></select></label>
        <label class="field">Name<input type="text" id="md-name"></label>
        <label class="field">Model identifier<input type="text" id="md-identifier"></label>
        <label class="field">Display name<input type="text" id="md-display"></label>
        <label class="field">Context window<input type="number" id="md-context"></label>
        <label class="field">Max tokens<input type="number" id="md-max-tokens"></label>
        <label class="field">Cost in / 1K<input type="number" step="any" id="md-cost-in"></label>
        <label class="field">Cost out / 1K<input type="number" step="any" id="md-cost-out"></label>
      </div>
      <div class="actions">
        <label class="check"><input type="checkbox" id="md-tools"> Tools</label>
        <label class="check"><input type="checkbox" id="md-vision"> Vision</label>
        <label class="check"><input type="checkbox" id="md-active" checked> Active</label>
        <button class="btn primary" id="btn-add-model">Add</button>
        <button class="btn" id="btn-cancel-model" style="display:none">Cancel</button>
      </div>
    </div>
    <div class="card">
      <h2>Import CSV</h2>
      <div class="subtitle">Header: name,model_identifier,channel_id[,display_name,context_window,max_tokens,supports_tools,supports_vision,cost_input,cost_output,is_active]</div>
      <div class="actions" style="margin-top:12px">
        <input type="file" id="md-import-file" accept=".csv,text/csv">
        <button class="btn" id="btn-import-models">Import</button>
      </div>
      <ul id="md-import-errors" class="err" style="margin:12px 0 0 20px"></ul>
    </div>
    <div class="card">
      <div class="card-head">
        <h2>Models</h2>
        <select id="md-filter" class="channel-select" data-all="1"></select>
      </div>
      <table>
        <thead><tr><th>ID</th><th>Channel</th><th>Name</th><th>Identifier</th><th>Tools</th><th>Vision</th><th>Active</th><th></th></tr></thead>
        <tbody id="models-tbody"></tbody>
      </table>
      <div class="empty-state" id="models-empty">No models found.</div>
    </div>
    <div class="card">
      <h2>Ranking</h2>
      <table>
        <thead><tr><th>Rank</th><th>Model</th><th>Channel</th><th class="num">Score</th></tr></thead>
        <tbody id="ranking-tbody"></tbody>
      </table>
      <div class="empty-state" id="ranking-empty">No ranked models yet.</div>
    </div>
  </section>

  <!-- Tests -->
  <section id="panel-tests" class="panel">
    <div class="card">
      <h2>Run tests</h2>
      <div id="test-models" class="form-grid"></div>
      <div class="actions">
        <select id="test-type">
          <option value="speed">speed</option>
          <option value="code">code</option>
          <option value="tool">tool</option>
        </select>
        <button class="btn primary" id="btn-run-tests">Run</button>
        <button class="btn" id="btn-rerank">Update rankings</button>
      </div>
    </div>
    <div class="card">
      <div class="card-head">
        <h2>Recent results</h2>
        <button class="btn small" id="btn-refresh-results">Refresh</button>
      </div>
      <table>
        <thead><tr><th>Time</th><th>Model</th><th>Type</th><th>OK</th><th class="num">Time (ms)</th><th>Error</th></tr></thead>
        <tbody id="results-tbody"></tbody>
      </table>
      <div class="empty-state" id="results-empty">No test results yet.</div>
    </div>
  </section>

  <!-- Analytics -->
  <section id="panel-analytics" class="panel">
    <div class="notice" id="analytics-notice"></div>
    <div class="stats-grid">
      <div class="stat-card"><div class="value" id="stat-tests">—</div><div class="label">Tests</div></div>
      <div class="stat-card"><div class="value green" id="stat-rate">—</div><div class="label">Success rate</div></div>
      <div class="stat-card"><div class="value purple" id="stat-latency">—</div><div class="label">Avg response (ms)</div></div>
      <div class="stat-card"><div class="value cyan" id="stat-models">—</div><div class="label">Models tested</div></div>
    </div>
    <div class="card">
      <div class="card-head">
        <h2>Trend</h2>
        <div class="range" id="range">
          <button data-days="7" class="active">7 days</button>
          <button data-days="14">14 days</button>
          <button data-days="30">30 days</button>
        </div>
      </div>
      <svg class="chart" id="trend-chart" viewBox="0 0 800 280" preserveAspectRatio="none"></svg>
      <div class="legend"><span class="rate">Success rate (%)</span><span class="latency">Avg response (ms)</span></div>
      <div class="empty-state" id="trend-empty">No tests in this range.</div>
    </div>
    <div class="card">
      <h2>Model comparison</h2>
      <table>
        <thead><tr><th>Model</th><th class="num">Tests</th><th class="num">Success</th><th class="num">Avg (ms)</th><th class="num">Quality</th></tr></thead>
        <tbody id="comparison-tbody"></tbody>
      </table>
      <div class="empty-state" id="comparison-empty">No data.</div>
    </div>
    <div class="card">
      <h2>Test type distribution</h2>
      <div id="distribution"></div>
      <div class="empty-state" id="distribution-empty">No data.</div>
    </div>
  </section>

  <!-- Config generation -->
  <section id="panel-generate" class="panel">
    <div class="card">
      <h2>Generate config</h2>
      <div class="form-grid">
        <label class="field">Top N models<input type="number" id="gen-top-n" value="5" min="1"></label>
        <label class="field">Channel<select id="gen-channel" class="channel-select" data-all="1"></select></label>
      </div>
      <div class="actions">
        <button class="btn primary" id="btn-generate">Generate</button>
        <button class="btn" id="btn-copy" disabled>Copy</button>
        <button class="btn" id="btn-download" disabled>Download</button>
        <span class="muted" id="gen-summary"></span>
      </div>
    </div>
    <div class="card">
      <textarea id="gen-output" readonly placeholder="Generated configuration appears here"></textarea>
    </div>
  </section>
</div>

<div class="toast" id="toast"></div>

<script>
// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
let currentPanel = 'channels';
let channels = [];
let models = [];
let analyticsDays = 7;
let analyticsSeq = 0;
let editingChannel = null;
let editingModel = null;

// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  const data = await res.json().catch(() => ({}));
  if (!res.ok && !data.snapshot) {
    throw new Error(data.detail || data.error || ('HTTP ' + res.status));
  }
  return data;
}

function toast(msg, isError) {
  const el = document.getElementById('toast');
  el.textContent = msg;
  el.className = 'toast show' + (isError ? ' error' : '');
  setTimeout(() => el.className = 'toast', 3000);
}

function esc(s) {
  return String(s ?? '').replace(/[&<>"']/g, c => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' }[c]));
}

function fmt(n) {
  if (n === undefined || n === null) return '—';
  return n.toLocaleString();
}

function pct(n) {
  if (n === undefined || n === null) return '—';
  return n.toFixed(1) + '%';
}

function rateClass(r) {
  return r >= 80 ? 'ok' : r >= 50 ? 'warn' : 'err';
}

function mark(flag) {
  return flag ? '<span class="ok">✓</span>' : '<span class="err">✗</span>';
}

function showEmpty(id, empty) {
  document.getElementById(id).style.display = empty ? 'block' : 'none';
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------
document.getElementById('nav').addEventListener('click', e => {
  if (e.target.tagName !== 'BUTTON') return;
  const panel = e.target.dataset.panel;
  if (!panel) return;

  document.querySelectorAll('nav button').forEach(b => b.classList.remove('active'));
  e.target.classList.add('active');

  document.querySelectorAll('.panel').forEach(p => p.classList.remove('active'));
  document.getElementById('panel-' + panel).classList.add('active');

  currentPanel = panel;
  loadPanel(panel);
});

async function loadPanel(panel) {
  switch (panel) {
    case 'channels': return loadChannels();
    case 'models': return loadModels();
    case 'tests': return loadTests();
    case 'analytics': return loadAnalytics();
    case 'generate': return loadChannels();
  }
}

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------
async function loadChannels() {
  const badge = document.getElementById('backend-badge');
  try {
    channels = await api('GET', '/api/channels/');
    badge.className = 'badge ok';
    badge.textContent = 'backend ok';
  } catch (e) {
    badge.className = 'badge err';
    badge.textContent = 'backend unreachable';
    toast('Failed to load channels: ' + e.message, true);
    return;
  }
  renderChannels();
  fillChannelSelects();
}

function renderChannels() {
  const tbody = document.getElementById('channels-tbody');
  showEmpty('channels-empty', channels.length === 0);
  tbody.innerHTML = channels.map(c => `
    <tr>
      <td class="num">${c.id}</td>
      <td>${esc(c.name)}</td>
      <td class="mono">${esc(c.base_url)}</td>
      <td class="mono">${esc(c.auth_type)}</td>
      <td>${mark(c.is_active)}</td>
      <td class="actions">
        <button class="btn small" onclick="editChannel(${c.id})">Edit</button>
        <button class="btn small" onclick="toggleChannel(${c.id}, ${!c.is_active})">${c.is_active ? 'Disable' : 'Enable'}</button>
        <button class="btn small danger" onclick="deleteChannel(${c.id})">Delete</button>
      </td>
    </tr>
  `).join('');
}

function fillChannelSelects() {
  document.querySelectorAll('.channel-select').forEach(sel => {
    const prev = sel.value;
    const all = sel.dataset.all ? '<option value="">All channels</option>' : '';
    sel.innerHTML = all + channels.map(c => `<option value="${c.id}">${esc(c.name)}</option>`).join('');
    if (prev) sel.value = prev;
  });
}

// Fields of `next` that differ from `prev`; unset values are never sent.
function changed(prev, next) {
  const out = {};
  for (const [k, v] of Object.entries(next)) {
    if (v === undefined) continue;
    if (prev && prev[k] === v) continue;
    out[k] = v;
  }
  return out;
}

function channelForm() {
  return {
    name: document.getElementById('ch-name').value.trim(),
    base_url: document.getElementById('ch-base-url').value.trim(),
    api_key: document.getElementById('ch-api-key').value || undefined,
    auth_type: document.getElementById('ch-auth-type').value,
    is_active: document.getElementById('ch-active').checked,
  };
}

function resetChannelForm() {
  editingChannel = null;
  document.getElementById('ch-form-title').textContent = 'Add channel';
  document.getElementById('btn-add-channel').textContent = 'Add';
  document.getElementById('btn-cancel-channel').style.display = 'none';
  document.getElementById('ch-name').value = '';
  document.getElementById('ch-base-url').value = '';
  document.getElementById('ch-api-key').value = '';
  document.getElementById('ch-api-key').placeholder = '';
  document.getElementById('ch-auth-type').value = 'bearer';
  document.getElementById('ch-active').checked = true;
}

function editChannel(id) {
  const c = channels.find(c => c.id === id);
  if (!c) return;
  editingChannel = c;
  document.getElementById('ch-form-title').textContent = 'Edit channel #' + c.id;
  document.getElementById('btn-add-channel').textContent = 'Save';
  document.getElementById('btn-cancel-channel').style.display = '';
  document.getElementById('ch-name').value = c.name;
  document.getElementById('ch-base-url').value = c.base_url;
  document.getElementById('ch-api-key').value = '';
  document.getElementById('ch-api-key').placeholder = 'unchanged';
  document.getElementById('ch-auth-type').value = c.auth_type;
  document.getElementById('ch-active').checked = c.is_active;
  document.getElementById('ch-name').focus();
}

document.getElementById('btn-cancel-channel').addEventListener('click', resetChannelForm);

document.getElementById('btn-add-channel').addEventListener('click', async () => {
  const form = channelForm();
  if (!form.name || !form.base_url) return toast('Name and base URL are required', true);
  try {
    if (editingChannel) {
      const body = changed(editingChannel, form);
      if (Object.keys(body).length === 0) return toast('Nothing changed');
      await api('PUT', '/api/channels/' + editingChannel.id, body);
      toast('Channel updated');
    } else {
      await api('POST', '/api/channels/', form);
      toast('Channel created');
    }
    resetChannelForm();
    loadChannels();
  } catch (e) {
    toast('Failed to save channel: ' + e.message, true);
  }
});

async function toggleChannel(id, active) {
  try {
    await api('PUT', '/api/channels/' + id, { is_active: active });
    loadChannels();
  } catch (e) {
    toast('Failed to update channel: ' + e.message, true);
  }
}

async function deleteChannel(id) {
  if (!confirm('Delete channel ' + id + ' and all of its models?')) return;
  try {
    await api('DELETE', '/api/channels/' + id);
    toast('Channel deleted');
    loadChannels();
  } catch (e) {
    toast('Failed to delete channel: ' + e.message, true);
  }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------
function channelName(id) {
  const c = channels.find(c => c.id === id);
  return c ? c.name : '#' + id;
}

async function loadModels() {
  if (channels.length === 0) await loadChannels();
  const filter = document.getElementById('md-filter').value;
  try {
    models = await api('GET', '/api/models/' + (filter ? '?channel_id=' + filter : ''));
    renderModels();
    const ranking = await api('GET', '/api/models/ranking');
    renderRanking(ranking);
  } catch (e) {
    toast('Failed to load models: ' + e.message, true);
  }
}

function renderModels() {
  const tbody = document.getElementById('models-tbody');
  showEmpty('models-empty', models.length === 0);
  tbody.innerHTML = models.map(m => `
    <tr>
      <td class="num">${m.id}</td>
      <td>${esc(channelName(m.channel_id))}</td>
      <td>${esc(m.display_name || m.name)}</td>
      <td class="mono">${esc(m.model_identifier)}</td>
      <td>${mark(m.supports_tools)}</td>
      <td>${mark(m.supports_vision)}</td>
      <td>${mark(m.is_active)}</td>
      <td class="actions">
        <button class="btn small" onclick="editModel(${m.id})">Edit</button>
        <button class="btn small" onclick="toggleModel(${m.id}, ${!m.is_active})">${m.is_active ? 'Disable' : 'Enable'}</button>
        <button class="btn small danger" onclick="deleteModel(${m.id})">Delete</button>
      </td>
    </tr>
  `).join('');
}

function renderRanking(ranking) {
  const tbody = document.getElementById('ranking-tbody');
  showEmpty('ranking-empty', ranking.length === 0);
  tbody.innerHTML = ranking.map(r => `
    <tr class="${r.rank === 999 ? 'muted' : ''}">
      <td class="mono">${r.rank === 999 ? '—' : '#' + r.rank}</td>
      <td>${esc(r.name)}</td>
      <td>${esc(r.channel.name)}</td>
      <td class="num">${r.score.toFixed(3)}</td>
    </tr>
  `).join('');
}

document.getElementById('md-filter').addEventListener('change', loadModels);

function modelForm() {
  const num = id => {
    const v = document.getElementById(id).value;
    return v === '' ? undefined : Number(v);
  };
  return {
    channel_id: Number(document.getElementById('md-channel').value),
    name: document.getElementById('md-name').value.trim(),
    model_identifier: document.getElementById('md-identifier').value.trim(),
    display_name: document.getElementById('md-display').value.trim() || undefined,
    context_window: num('md-context'),
    max_tokens: num('md-max-tokens'),
    cost_input: num('md-cost-in'),
    cost_output: num('md-cost-out'),
    supports_tools: document.getElementById('md-tools').checked,
    supports_vision: document.getElementById('md-vision').checked,
    is_active: document.getElementById('md-active').checked,
  };
}

function setModelForm(m) {
  const val = v => (v === undefined || v === null) ? '' : v;
  document.getElementById('md-name').value = val(m && m.name);
  document.getElementById('md-identifier').value = val(m && m.model_identifier);
  document.getElementById('md-display').value = val(m && m.display_name);
  document.getElementById('md-context').value = val(m && m.context_window);
  document.getElementById('md-max-tokens').value = val(m && m.max_tokens);
  document.getElementById('md-cost-in').value = val(m && m.cost_input);
  document.getElementById('md-cost-out').value = val(m && m.cost_output);
  document.getElementById('md-tools').checked = !!(m && m.supports_tools);
  document.getElementById('md-vision').checked = !!(m && m.supports_vision);
  document.getElementById('md-active').checked = m ? m.is_active : true;
}

function resetModelForm() {
  editingModel = null;
  document.getElementById('md-form-title').textContent = 'Add model';
  document.getElementById('btn-add-model').textContent = 'Add';
  document.getElementById('btn-cancel-model').style.display = 'none';
  document.getElementById('md-channel').disabled = false;
  setModelForm(null);
}

function editModel(id) {
  const m = models.find(m => m.id === id);
  if (!m) return;
  editingModel = m;
  document.getElementById('md-form-title').textContent = 'Edit model #' + m.id;
  document.getElementById('btn-add-model').textContent = 'Save';
  document.getElementById('btn-cancel-model').style.display = '';
  document.getElementById('md-channel').value = m.channel_id;
  document.getElementById('md-channel').disabled = true;
  setModelForm(m);
  document.getElementById('md-name').focus();
}

document.getElementById('btn-cancel-model').addEventListener('click', resetModelForm);

document.getElementById('btn-add-model').addEventListener('click', async () => {
  const form = modelForm();
  if (!form.channel_id || !form.name || !form.model_identifier) {
    return toast('Channel, name and identifier are required', true);
  }
  try {
    if (editingModel) {
      // The channel of an existing model is fixed.
      delete form.channel_id;
      const body = changed(editingModel, form);
      if (Object.keys(body).length === 0) return toast('Nothing changed');
      await api('PUT', '/api/models/' + editingModel.id, body);
      toast('Model updated');
    } else {
      await api('POST', '/api/models/', form);
      toast('Model created');
    }
    resetModelForm();
    loadModels();
  } catch (e) {
    toast('Failed to save model: ' + e.message, true);
  }
});

document.getElementById('btn-import-models').addEventListener('click', async () => {
  const file = document.getElementById('md-import-file').files[0];
  const list = document.getElementById('md-import-errors');
  if (!file) return toast('Choose a CSV file first', true);
  list.innerHTML = '';
  try {
    const res = await fetch('/api/console/models/import', {
      method: 'POST',
      headers: { 'Content-Type': 'text/csv' },
      body: await file.text(),
    });
    const summary = await res.json().catch(() => ({}));
    if (!res.ok) throw new Error(summary.detail || summary.error || ('HTTP ' + res.status));
    list.innerHTML = (summary.errors || []).map(e => `<li>${esc(e)}</li>`).join('');
    toast(`Imported ${summary.imported} models`, (summary.errors || []).length > 0);
    document.getElementById('md-import-file').value = '';
    loadModels();
  } catch (e) {
    toast('Import failed: ' + e.message, true);
  }
});

async function toggleModel(id, active) {
  try {
    await api('PUT', '/api/models/' + id, { is_active: active });
    loadModels();
  } catch (e) {
    toast('Failed to update model: ' + e.message, true);
  }
}

async function deleteModel(id) {
  if (!confirm('Delete model ' + id + '?')) return;
  try {
    await api('DELETE', '/api/models/' + id);
    toast('Model deleted');
    loadModels();
  } catch (e) {
    toast('Failed to delete model: ' + e.message, true);
  }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
async function loadTests() {
  if (channels.length === 0) await loadChannels();
  try {
    models = await api('GET', '/api/models/');
  } catch (e) {
    toast('Failed to load models: ' + e.message, true);
    return;
  }
  document.getElementById('test-models').innerHTML = models
    .filter(m => m.is_active)
    .map(m => `<label class="check"><input type="checkbox" value="${m.id}"> ${esc(m.display_name || m.name)} <span class="muted">(${esc(channelName(m.channel_id))})</span></label>`)
    .join('') || '<span class="muted">No active models.</span>';
  loadResults();
}

async function loadResults() {
  try {
    const rows = await api('GET', '/api/test/results?limit=50');
    const tbody = document.getElementById('results-tbody');
    showEmpty('results-empty', rows.length === 0);
    tbody.innerHTML = rows.map(r => `
      <tr>
        <td class="mono">${esc(r.created_at.slice(0, 19).replace('T', ' '))}</td>
        <td>${esc(r.model_name)}</td>
        <td class="mono">${esc(r.test_type)}</td>
        <td>${mark(r.success)}</td>
        <td class="num">${r.response_time == null ? '—' : fmt(Math.round(r.response_time * 1000))}</td>
        <td class="muted">${esc(r.error_message || '')}</td>
      </tr>
    `).join('');
  } catch (e) {
    toast('Failed to load results: ' + e.message, true);
  }
}

document.getElementById('btn-refresh-results').addEventListener('click', loadResults);

document.getElementById('btn-run-tests').addEventListener('click', async () => {
  const ids = [...document.querySelectorAll('#test-models input:checked')].map(el => Number(el.value));
  if (ids.length === 0) return toast('Select at least one model', true);
  const test_type = document.getElementById('test-type').value;
  try {
    const ack = await api('POST', '/api/test/run', { model_ids: ids, test_type });
    toast(ack.message || 'Tests started');
  } catch (e) {
    toast('Failed to start tests: ' + e.message, true);
  }
});

document.getElementById('btn-rerank').addEventListener('click', async () => {
  try {
    const res = await api('POST', '/api/test/update-rankings');
    toast(res.message || 'Ranking update started');
  } catch (e) {
    toast('Failed to update rankings: ' + e.message, true);
  }
});

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------
document.getElementById('range').addEventListener('click', e => {
  if (e.target.tagName !== 'BUTTON') return;
  analyticsDays = Number(e.target.dataset.days);
  document.querySelectorAll('#range button').forEach(b => b.classList.toggle('active', b === e.target));
  loadAnalytics();
});

async function loadAnalytics() {
  const seq = ++analyticsSeq;
  let data;
  try {
    data = await api('GET', '/api/console/analytics?days=' + analyticsDays);
  } catch (e) {
    if (seq === analyticsSeq) toast('Failed to load analytics: ' + e.message, true);
    return;
  }
  // A newer range was requested while this one was in flight
  if (seq !== analyticsSeq) return;

  const notice = document.getElementById('analytics-notice');
  if (data.outcome === 'failed') {
    notice.textContent = 'Refresh failed, showing previous data: ' + (data.error || 'unknown error');
    notice.style.display = 'block';
  } else {
    notice.style.display = 'none';
  }
  if (data.snapshot) renderAnalytics(data.snapshot);
}

function renderAnalytics(s) {
  const trend = s.trend || [];
  const total = trend.reduce((a, p) => a + p.total, 0);
  const success = (s.history || []).reduce((a, r) => a + r.success_count, 0);
  const timed = trend.filter(p => p.timedSamples > 0);
  const latency = timed.length ? Math.round(timed.reduce((a, p) => a + p.avgResponseTime, 0) / timed.length) : null;

  document.getElementById('stat-tests').textContent = fmt(total);
  document.getElementById('stat-rate').textContent = total ? pct(success / total * 100) : '—';
  document.getElementById('stat-latency').textContent = fmt(latency);
  document.getElementById('stat-models').textContent = fmt((s.comparison || []).length);

  renderTrendChart(trend);

  const cmp = s.comparison || [];
  showEmpty('comparison-empty', cmp.length === 0);
  document.getElementById('comparison-tbody').innerHTML = cmp.map(m => `
    <tr>
      <td>${esc(m.model_name)}</td>
      <td class="num">${fmt(m.total_tests)}</td>
      <td class="num ${rateClass(m.success_rate)}">${pct(m.success_rate)}</td>
      <td class="num">${m.avg_response_time == null ? '—' : fmt(Math.round(m.avg_response_time))}</td>
      <td class="num">${m.avg_quality == null ? '—' : m.avg_quality.toFixed(2)}</td>
    </tr>
  `).join('');

  const dist = s.distribution || [];
  const distTotal = dist.reduce((a, d) => a + d.count, 0);
  showEmpty('distribution-empty', dist.length === 0);
  document.getElementById('distribution').innerHTML = dist.map(d => {
    const share = distTotal ? d.count / distTotal * 100 : 0;
    return `
      <div class="dist-row">
        <div class="name">${esc(d.test_type)}</div>
        <div class="track"><div class="fill" style="width:${share}%"></div></div>
        <div class="count">${fmt(d.count)} · <span class="${rateClass(d.success_rate)}">${pct(d.success_rate)}</span></div>
      </div>
    `;
  }).join('');
}

// Dual-axis line chart: success rate on the left (0-100), latency on the right.
function renderTrendChart(points) {
  const svg = document.getElementById('trend-chart');
  showEmpty('trend-empty', points.length === 0);
  if (points.length === 0) {
    svg.innerHTML = '';
    return;
  }

  const W = 800, H = 280, L = 48, R = 56, T = 16, B = 32;
  const w = W - L - R, h = H - T - B;
  const maxLatency = Math.max(...points.map(p => p.timedSamples > 0 ? p.avgResponseTime : 0), 1);
  const x = i => L + (points.length === 1 ? w / 2 : i * w / (points.length - 1));
  const yRate = r => T + h - r / 100 * h;
  const yLat = v => T + h - v / maxLatency * h;

  let out = '';
  for (let i = 0; i <= 4; i++) {
    const y = T + i * h / 4;
    out += `<line class="grid" x1="${L}" x2="${L + w}" y1="${y}" y2="${y}"/>`;
    out += `<text x="${L - 6}" y="${y + 4}" text-anchor="end">${100 - i * 25}%</text>`;
    out += `<text x="${L + w + 6}" y="${y + 4}">${Math.round(maxLatency * (4 - i) / 4)}</text>`;
  }
  out += `<line class="axis" x1="${L}" x2="${L + w}" y1="${T + h}" y2="${T + h}"/>`;

  const step = Math.ceil(points.length / 10);
  points.forEach((p, i) => {
    if (i % step === 0) out += `<text x="${x(i)}" y="${H - 10}" text-anchor="middle">${esc(p.date.slice(5))}</text>`;
  });

  out += `<polyline class="rate" points="${points.map((p, i) => x(i) + ',' + yRate(p.successRate)).join(' ')}"/>`;

  // Days without timings are gaps in the latency line, not zeros
  let segment = [];
  const segments = [];
  points.forEach((p, i) => {
    if (p.timedSamples > 0) {
      segment.push(x(i) + ',' + yLat(p.avgResponseTime));
    } else if (segment.length) {
      segments.push(segment);
      segment = [];
    }
  });
  if (segment.length) segments.push(segment);
  segments.forEach(s => out += `<polyline class="latency" points="${s.join(' ')}"/>`);

  points.forEach((p, i) => {
    const tip = `${p.date}: ${fmt(p.total)} tests, ${pct(p.successRate)}, ${p.timedSamples > 0 ? fmt(p.avgResponseTime) + ' ms' : 'no timing'}`;
    out += `<circle class="dot-rate" cx="${x(i)}" cy="${yRate(p.successRate)}" r="3"><title>${esc(tip)}</title></circle>`;
    if (p.timedSamples > 0) {
      out += `<circle class="dot-latency" cx="${x(i)}" cy="${yLat(p.avgResponseTime)}" r="3"><title>${esc(tip)}</title></circle>`;
    }
  });

  svg.innerHTML = out;
}

// ---------------------------------------------------------------------------
// Config generation
// ---------------------------------------------------------------------------
let generated = '';

document.getElementById('btn-generate').addEventListener('click', async () => {
  const topN = Number(document.getElementById('gen-top-n').value) || 5;
  const channel = document.getElementById('gen-channel').value;
  try {
    const res = channel
      ? await api('GET', `/api/config/generate/${channel}?top_n=${topN}`)
      : await api('POST', `/api/config/generate?top_n=${topN}`);
    generated = res.config;
    document.getElementById('gen-output').value = generated;
    document.getElementById('gen-summary').textContent = `${res.models_count} models` + (res.channel ? ` from ${res.channel}` : '');
    document.getElementById('btn-copy').disabled = false;
    document.getElementById('btn-download').disabled = false;
  } catch (e) {
    toast('Failed to generate config: ' + e.message, true);
  }
});

document.getElementById('btn-copy').addEventListener('click', async () => {
  try {
    await navigator.clipboard.writeText(generated);
    toast('Copied to clipboard');
  } catch (e) {
    toast('Copy failed: ' + e.message, true);
  }
});

document.getElementById('btn-download').addEventListener('click', () => {
  const blob = new Blob([generated], { type: 'application/json' });
  const a = document.createElement('a');
  a.href = URL.createObjectURL(blob);
  a.download = 'aiswitch-config.json';
  a.click();
  URL.revokeObjectURL(a.href);
});

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
api('GET', '/api/console/settings').then(s => {
  analyticsDays = s.default_days || 7;
  document.querySelectorAll('#range button').forEach(b => b.classList.toggle('active', Number(b.dataset.days) === analyticsDays));
  document.querySelector('header .subtitle').textContent = 'Backend: ' + s.backend_url;
}).catch(() => {});
loadPanel(currentPanel);
</script>
</body>
</html>
"##;
