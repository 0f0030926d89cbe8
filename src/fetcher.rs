use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{Config, EVENT_TIMEOUT_SECS, FETCH_OVERSAMPLE, PARSE_SNIPPET_LEN, USER_AGENT};
use crate::error::{AppError, Result};
use crate::ranking::{is_active_market, rank_by_volume};
use crate::stats::compute_global_stats;
use crate::types::{Event, Market, MarketSnapshot};

/// Wrapper keys tried, in priority order, when `/markets` answers with an object.
pub const MARKET_WRAPPER_KEYS: &[&str] = &["data", "markets", "items"];

/// Wrapper keys tried when `/events` answers with an object.
pub const EVENT_WRAPPER_KEYS: &[&str] = &["data", "items"];

/// Read-only Gamma REST client. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: reqwest::Client,
    base_url: String,
}

impl FetchClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.fetch_timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.gamma_api_url.clone(),
        })
    }

    /// Fetch open markets, keep the `limit` most active ones and aggregate them.
    pub async fn fetch_markets(&self, limit: usize) -> Result<MarketSnapshot> {
        let url = format!(
            "{}/markets?closed=false&limit={}",
            self.base_url,
            limit.saturating_mul(FETCH_OVERSAMPLE)
        );
        debug!(url = %url, "fetching markets");

        let body = self.get_body(&url, None).await?;
        let snapshot = build_snapshot(&body, limit)?;

        info!(
            markets = snapshot.markets.len(),
            volume_24h = snapshot.stats.volume_24h,
            "Fetched {} markets ({} active)",
            snapshot.stats.total_markets,
            snapshot.stats.active_markets,
        );
        Ok(snapshot)
    }

    /// Fetch the first open event.
    pub async fn fetch_first_event(&self) -> Result<Event> {
        let url = format!("{}/events?closed=false&limit=1", self.base_url);
        debug!(url = %url, "fetching first event");

        let body = self
            .get_body(&url, Some(Duration::from_secs(EVENT_TIMEOUT_SECS)))
            .await?;
        let events: Vec<Event> = decode_list_or_empty(&body, EVENT_WRAPPER_KEYS)?;
        events.into_iter().next().ok_or(AppError::EmptyResult)
    }

    async fn get_body(&self, url: &str, timeout: Option<Duration>) -> Result<String> {
        let mut req = self.client.get(url);
        if let Some(t) = timeout {
            req = req.timeout(t);
        }
        let resp = req.send().await.map_err(|e| {
            warn!("GET {url} failed: {e}");
            AppError::Transport(e)
        })?;
        let resp = resp.error_for_status()?;
        Ok(resp.text().await?)
    }
}

/// Decode, filter, rank, truncate and aggregate one `/markets` body.
pub fn build_snapshot(body: &str, limit: usize) -> Result<MarketSnapshot> {
    let decoded: Vec<Market> = decode_list(body, MARKET_WRAPPER_KEYS)?;
    let api_total = decoded.len();

    let mut markets: Vec<Market> = decoded.into_iter().filter(is_active_market).collect();
    if markets.is_empty() {
        warn!("[FILTER] all {api_total} markets below activity threshold");
        return Err(AppError::EmptyResult);
    }
    debug!(
        "[FILTER] kept {} of {} markets, rejected {} as inactive",
        markets.len(),
        api_total,
        api_total - markets.len(),
    );

    rank_by_volume(&mut markets);
    markets.truncate(limit);

    let stats = compute_global_stats(&markets);
    Ok(MarketSnapshot { markets, stats })
}

// ---------------------------------------------------------------------------
// Response-shape decoding
// ---------------------------------------------------------------------------

/// Which accepted shape a body matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    BareArray,
    Wrapped(&'static str),
}

/// Decode a list response that is either a bare array or an object wrapping
/// the array under one of `wrapper_keys` (first non-empty wins).
///
/// Anything else, including an empty list or invalid JSON, is a parse error
/// carrying the head of the raw body.
pub fn decode_list<T: DeserializeOwned>(body: &str, wrapper_keys: &[&'static str]) -> Result<Vec<T>> {
    let parse_error = || AppError::Parse {
        snippet: snippet(body, PARSE_SNIPPET_LEN),
    };

    let root: Value = serde_json::from_str(body).map_err(|e| {
        debug!("response is not JSON: {e}");
        parse_error()
    })?;

    let (shape, items) = as_bare_array(&root)
        .map(|items| (Shape::BareArray, items))
        .or_else(|| as_wrapped(&root, wrapper_keys))
        .ok_or_else(parse_error)?;

    debug!(shape = ?shape, count = items.len(), "decoded list response");
    Ok(items)
}

/// Like [`decode_list`], but a recognised empty list (`[]`, or a wrapper key
/// holding `[]`) decodes to an empty vec instead of a parse error.
pub fn decode_list_or_empty<T: DeserializeOwned>(body: &str, wrapper_keys: &[&'static str]) -> Result<Vec<T>> {
    match decode_list(body, wrapper_keys) {
        Err(AppError::Parse { .. }) if is_empty_list(body, wrapper_keys) => Ok(Vec::new()),
        other => other,
    }
}

fn is_empty_list(body: &str, wrapper_keys: &[&'static str]) -> bool {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => items.is_empty(),
        Ok(Value::Object(obj)) => wrapper_keys
            .iter()
            .any(|key| obj.get(*key).and_then(Value::as_array).is_some_and(|a| a.is_empty())),
        _ => false,
    }
}

fn as_bare_array<T: DeserializeOwned>(root: &Value) -> Option<Vec<T>> {
    root.as_array().and_then(|items| decode_items(items))
}

fn as_wrapped<T: DeserializeOwned>(root: &Value, wrapper_keys: &[&'static str]) -> Option<(Shape, Vec<T>)> {
    let obj = root.as_object()?;
    wrapper_keys.iter().find_map(|key| {
        obj.get(*key)
            .and_then(Value::as_array)
            .and_then(|items| decode_items(items))
            .map(|items| (Shape::Wrapped(*key), items))
    })
}

/// All items must decode; an empty array counts as no match.
fn decode_items<T: DeserializeOwned>(items: &[Value]) -> Option<Vec<T>> {
    if items.is_empty() {
        return None;
    }
    items.iter().map(|v| T::deserialize(v).ok()).collect()
}

/// First `max` bytes of `s` (cut on a char boundary), with `...` when cut.
pub fn snippet(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn below_threshold_body_is_empty_result_not_parse_error() {
        let err = build_snapshot(r#"[{"volume":"50","volume24hr":5}]"#, 10).unwrap_err();
        assert!(matches!(err, AppError::EmptyResult), "got {err:?}");
    }

    #[test]
    fn data_wrapper_single_market_snapshot() {
        let body = r#"{"data":[{"id":"1","question":"Will X happen?","volumeNum":1000,"volume24hr":50,"oneDayPriceChange":0.1}]}"#;
        let snap = build_snapshot(body, 10).expect("snapshot");

        assert_eq!(snap.markets.len(), 1);
        assert_eq!(snap.stats.total_markets, 1);
        // `active` was absent, so it reads as false.
        assert_eq!(snap.stats.active_markets, 0);
        assert_eq!(snap.stats.total_volume, 1000.0);
        assert_eq!(snap.stats.top_gainer_change, 0.1);
        assert_eq!(snap.stats.top_gainer.as_ref().map(|m| m.id.as_str()), Some("1"));
        assert_eq!(snap.stats.top_volume.as_ref().map(|m| m.id.as_str()), Some("1"));
    }

    #[test]
    fn active_flag_is_counted() {
        let body = r#"[{"id":"1","volumeNum":500,"active":true},{"id":"2","volumeNum":400}]"#;
        let snap = build_snapshot(body, 10).expect("snapshot");
        assert_eq!(snap.stats.active_markets, 1);
        assert_eq!(snap.stats.total_markets, 2);
    }

    #[test]
    fn snapshot_is_ranked_and_truncated() {
        let body = r#"[
            {"id":"a","volumeNum":200},
            {"id":"b","volumeNum":0,"volume24hr":30},
            {"id":"c","volumeNum":9000},
            {"id":"d","volumeNum":0,"volume24hr":90},
            {"id":"e","volumeNum":40,"volume24hr":2}
        ]"#;
        let snap = build_snapshot(body, 3).expect("snapshot");
        let ids: Vec<&str> = snap.markets.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "d"]);
        assert_eq!(snap.stats.total_markets, 3);
    }

    #[test]
    fn wrapper_keys_follow_priority_and_skip_empty() {
        let body = r#"{"data":[],"markets":[{"id":"m"}],"items":[{"id":"i"}]}"#;
        let list: Vec<Market> = decode_list(body, MARKET_WRAPPER_KEYS).expect("decoded");
        assert_eq!(list[0].id, "m");

        let body = r#"{"items":[{"id":"i"}],"data":[{"id":"d"}]}"#;
        let list: Vec<Market> = decode_list(body, MARKET_WRAPPER_KEYS).expect("decoded");
        assert_eq!(list[0].id, "d");
    }

    #[test]
    fn unknown_shapes_are_parse_errors() {
        for body in ["[]", "{}", r#"{"results":[{"id":"1"}]}"#, r#"["just", "strings"]"#, "42", "<html>"] {
            let err = decode_list::<Market>(body, MARKET_WRAPPER_KEYS).unwrap_err();
            assert!(matches!(err, AppError::Parse { .. }), "{body} gave {err:?}");
        }
    }

    #[test]
    fn parse_error_snippet_is_bounded() {
        let body = format!("<html>{}</html>", "é".repeat(400));
        match decode_list::<Market>(&body, MARKET_WRAPPER_KEYS) {
            Err(AppError::Parse { snippet }) => {
                assert!(snippet.ends_with("..."));
                assert!(snippet.len() <= PARSE_SNIPPET_LEN + 3);
                assert!(snippet.starts_with("<html>"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn short_body_snippet_is_untouched() {
        assert_eq!(snippet("oops", 500), "oops");
    }

    #[test]
    fn event_items_wrapper_decodes() {
        let body = r#"{"items":[{"id":"9","title":"Election","slug":"election-2028"}]}"#;
        let events: Vec<Event> = decode_list(body, EVENT_WRAPPER_KEYS).expect("decoded");
        assert_eq!(events[0].slug, "election-2028");

        // `markets` is not an accepted events wrapper.
        let body = r#"{"markets":[{"id":"9"}]}"#;
        assert!(decode_list::<Event>(body, EVENT_WRAPPER_KEYS).is_err());
    }

    /// Serve one canned HTTP response on a local port.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            let resp = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = sock.write_all(resp.as_bytes()).await;
            let _ = sock.shutdown().await;
        });
        format!("http://{addr}")
    }

    fn client_for(url: String) -> FetchClient {
        let cfg = Config {
            gamma_api_url: url,
            fetch_timeout: Duration::from_secs(5),
            ..Config::default()
        };
        FetchClient::new(&cfg).expect("client")
    }

    #[tokio::test]
    async fn fetch_markets_over_http() {
        let url = serve_once("200 OK", r#"{"markets":[{"id":"7","volumeNum":"x","volume":"250"}]}"#).await;
        let snap = client_for(url).fetch_markets(10).await.expect("snapshot");
        assert_eq!(snap.markets.len(), 1);
        assert_eq!(snap.stats.total_volume, 250.0);
    }

    #[tokio::test]
    async fn server_error_is_transport_error() {
        let url = serve_once("500 Internal Server Error", "{}").await;
        let err = client_for(url).fetch_markets(10).await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)), "got {err:?}");
    }

    #[test]
    fn empty_event_lists_decode_to_nothing() {
        for body in ["[]", r#"{"data":[]}"#, r#"{"items":[],"data":null}"#] {
            let events: Vec<Event> = decode_list_or_empty(body, EVENT_WRAPPER_KEYS).expect("decoded");
            assert!(events.is_empty(), "{body}");
        }
        for body in ["{}", r#"{"events":[]}"#, "nope"] {
            let err = decode_list_or_empty::<Event>(body, EVENT_WRAPPER_KEYS).unwrap_err();
            assert!(matches!(err, AppError::Parse { .. }), "{body}: got {err:?}");
        }
    }

    #[tokio::test]
    async fn no_open_events_is_empty_result() {
        let url = serve_once("200 OK", "[]").await;
        let err = client_for(url).fetch_first_event().await.unwrap_err();
        assert!(matches!(err, AppError::EmptyResult), "got {err:?}");
    }

    #[tokio::test]
    async fn fetch_first_event_over_http() {
        let url = serve_once("200 OK", r#"[{"id":"1","title":"First","slug":"first"},{"id":"2"}]"#).await;
        let event = client_for(url).fetch_first_event().await.expect("event");
        assert_eq!(event.title, "First");
    }
}
