//! Root status page. The chat widget itself is an external client of the
//! `/api/*` routes; this page only confirms the service is up.

use axum::response::Html;

const ROOT_INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Dokbot</title>
  <style>
    *, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
    body {
      font-family: system-ui, -apple-system, sans-serif;
      background: #0f0f0f; color: #e0e0e0;
      display: flex; align-items: center; justify-content: center;
      height: 100vh;
    }
    .card {
      text-align: center; padding: 2rem 3rem;
      border: 1px solid #333; border-radius: 12px;
      background: #1a1a1a;
    }
    h1 { font-size: 1.5rem; margin-bottom: 0.5rem; }
    p  { font-size: 0.9rem; color: #888; margin-bottom: 1rem; }
    a {
      display: inline-block; padding: 0.5rem 1.5rem;
      border-radius: 8px; background: #2a2a3a; color: #c0c0e0;
      text-decoration: none; font-size: 0.9rem;
      transition: background 0.15s;
    }
    a:hover { background: #3a3a5a; }
  </style>
</head>
<body>
  <div class="card">
    <h1>Dokbot</h1>
    <p>Chat API is running.</p>
    <a href="/api/services">Service status &rarr;</a>
  </div>
</body>
</html>
"#;

/// GET / — root status page.
pub(super) async fn root() -> Html<&'static str> {
    Html(ROOT_INDEX_HTML)
}
