use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::ScrapeError;
use crate::fetch::Fetcher;
use crate::scrape::{scrape_containers, scrape_structured};
use crate::settings::Settings;

const NO_CONTAINERS: &str = "No divs with data-lyrics-container=\"true\" found on the page";

pub struct AppState {
    pub fetcher: Fetcher,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Raw,
    Structured,
}

#[derive(Debug, Deserialize)]
pub struct ScrapeForm {
    url: Option<String>,
    #[serde(default)]
    mode: Mode,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/scrape", post(scrape))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind to `settings.bind` and serve until the process is stopped.
pub async fn serve(settings: &Settings) -> Result<()> {
    let state = Arc::new(AppState {
        fetcher: Fetcher::new(settings)?,
    });
    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind))?;
    info!("Web form listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn scrape(
    State(state): State<Arc<AppState>>,
    form: Result<Form<ScrapeForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        // No form body at all reads as an empty form.
        Err(FormRejection::InvalidFormContentType(_)) => {
            return error_response(StatusCode::BAD_REQUEST, "URL is required".to_string())
        }
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid form: {}", rejection.body_text()),
            )
        }
    };

    let Some(url) = form
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
    else {
        return error_response(StatusCode::BAD_REQUEST, "URL is required".to_string());
    };

    let result = match form.mode {
        Mode::Raw => scrape_containers(&state.fetcher, &url)
            .await
            .map(|records| Json(serde_json::json!({ "results": records }))),
        Mode::Structured => scrape_structured(&state.fetcher, &url)
            .await
            .map(|containers| Json(serde_json::json!({ "results": containers }))),
    };

    match result {
        Ok(body) => body.into_response(),
        Err(e) => scrape_error(e),
    }
}

fn scrape_error(e: ScrapeError) -> Response {
    match e {
        ScrapeError::NoContainers(_) => error_response(StatusCode::NOT_FOUND, NO_CONTAINERS.to_string()),
        ScrapeError::InvalidUrl { .. } => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        other => {
            warn!("Scrape failed: {}", other);
            error_response(
                StatusCode::BAD_GATEWAY,
                format!("Error during request: {}", other),
            )
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Lyrics Scraper</title>
<style>
body{font-family:Arial,sans-serif;max-width:800px;margin:0 auto;padding:20px;color:#1a1a1a}
form{display:flex;gap:8px;margin-bottom:20px}
input[type=url]{flex:1;padding:8px;font-size:14px}
button{padding:8px 16px}
.container{border:1px solid #ddd;margin:20px 0;padding:15px;border-radius:5px}
pre{white-space:pre-wrap;background:#f5f5f5;padding:10px;border-radius:3px}
.error{color:#c62828}
</style>
</head>
<body>
<h1>Lyrics Scraper</h1>
<form id="scrape-form">
  <input type="url" name="url" placeholder="https://..." required>
  <select name="mode">
    <option value="raw">Raw HTML</option>
    <option value="structured">Structured</option>
  </select>
  <button type="submit">Scrape</button>
</form>
<div id="status"></div>
<div id="results"></div>
<script>
const form = document.getElementById('scrape-form');
const status = document.getElementById('status');
const results = document.getElementById('results');

function block(tag, text, cls) {
  const el = document.createElement(tag);
  el.textContent = text;
  if (cls) el.className = cls;
  return el;
}

function fragmentText(f) {
  return f.content ? f.content.text : f.text;
}

form.addEventListener('submit', async (ev) => {
  ev.preventDefault();
  status.replaceChildren(block('p', 'Scraping...'));
  results.replaceChildren();
  const resp = await fetch('/scrape', { method: 'POST', body: new URLSearchParams(new FormData(form)) });
  const data = await resp.json();
  status.replaceChildren();
  if (data.error) {
    status.replaceChildren(block('p', data.error, 'error'));
    return;
  }
  for (const item of data.results) {
    const card = block('div', '', 'container');
    card.appendChild(block('h2', 'Container ' + item.container_number));
    if (item.lines) {
      const text = item.lines.map(line => line.map(fragmentText).join(' ')).join('\n');
      card.appendChild(block('pre', text));
    } else {
      card.appendChild(block('h3', 'HTML Content:'));
      card.appendChild(block('pre', item.html_content));
      card.appendChild(block('h3', 'Text Content:'));
      card.appendChild(block('p', item.text_content));
    }
    results.appendChild(card);
  }
});
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            fetcher: Fetcher::new(&Settings::default()).unwrap(),
        })
    }

    async fn upstream() -> MockServer {
        let server = MockServer::start().await;
        let song = std::fs::read_to_string("tests/fixtures/song.html").unwrap();
        Mock::given(method("GET"))
            .and(path("/song"))
            .respond_with(ResponseTemplate::new(200).set_body_string(song))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/plain"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>no lyrics</p>"))
            .mount(&server)
            .await;
        server
    }

    async fn call(url: Option<&str>, mode: Mode) -> (StatusCode, serde_json::Value) {
        let form = ScrapeForm {
            url: url.map(str::to_string),
            mode,
        };
        let resp = scrape(State(state()), Ok(Form(form))).await;
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_url() {
        let (status, body) = call(None, Mode::Raw).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "URL is required");

        let (status, _) = call(Some("   "), Mode::Raw).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn raw_results() {
        let server = upstream().await;
        let (status, body) = call(Some(&format!("{}/song", server.uri())), Mode::Raw).await;
        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["container_number"], 1);
        assert!(results[0]["html_content"]
            .as_str()
            .unwrap()
            .starts_with("<div data-lyrics-container"));
    }

    #[tokio::test]
    async fn structured_results() {
        let server = upstream().await;
        let (status, body) = call(Some(&format!("{}/song", server.uri())), Mode::Structured).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["lines"][0][0]["text"], "[Verse 1]");
        assert_eq!(body["results"][0]["lines"][1][0]["type"], "a");
    }

    #[tokio::test]
    async fn page_without_containers() {
        let server = upstream().await;
        let (status, body) = call(Some(&format!("{}/plain", server.uri())), Mode::Raw).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], NO_CONTAINERS);
    }

    #[tokio::test]
    async fn upstream_failure() {
        let (status, body) = call(Some("http://127.0.0.1:9/song"), Mode::Raw).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Error during request:"));
    }

    async fn spawn_app() -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state())).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn bodyless_post_asks_for_url() {
        let addr = spawn_app().await;
        let resp = reqwest::Client::new()
            .post(format!("http://{}/scrape", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 400);
        let body: serde_json::Value = serde_json::from_str(&resp.text().await.unwrap()).unwrap();
        assert_eq!(body["error"], "URL is required");
    }

    #[tokio::test]
    async fn unknown_mode_is_a_json_error() {
        let addr = spawn_app().await;
        for mode in ["foo", ""] {
            let resp = reqwest::Client::new()
                .post(format!("http://{}/scrape", addr))
                .form(&[("url", "http://x.test/song"), ("mode", mode)])
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status().as_u16(), 400);
            let body: serde_json::Value =
                serde_json::from_str(&resp.text().await.unwrap()).unwrap();
            assert!(body["error"].as_str().unwrap().starts_with("Invalid form:"));
        }
    }

    #[tokio::test]
    async fn form_round_trip_over_http() {
        let server = upstream().await;
        let addr = spawn_app().await;

        let client = reqwest::Client::new();
        let page = client
            .get(format!("http://{}/", addr))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(page.contains("id=\"scrape-form\""));

        let resp = client
            .post(format!("http://{}/scrape", addr))
            .form(&[("url", format!("{}/song", server.uri()))])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let body: serde_json::Value = serde_json::from_str(&resp.text().await.unwrap()).unwrap();
        assert_eq!(body["results"].as_array().unwrap().len(), 2);
    }
}
