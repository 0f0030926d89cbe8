use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// One Gamma market, normalized from whatever shape upstream sent.
///
/// Every field is lenient: a wrong JSON type, `null` or an unparseable string
/// degrades to zero/empty/false instead of failing the record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Market {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub question: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(deserialize_with = "lenient_string")]
    pub slug: String,
    /// Older payloads carry the slug under `marketSlug`.
    #[serde(rename = "marketSlug", deserialize_with = "lenient_string")]
    pub market_slug: String,
    #[serde(rename = "endDate", deserialize_with = "lenient_string")]
    pub end_date: String,

    /// String-encoded fallback for `volume_num`.
    #[serde(rename = "volume", deserialize_with = "lenient_string")]
    pub volume_str: String,
    #[serde(rename = "volumeNum", deserialize_with = "lenient_f64")]
    pub volume_num: f64,
    #[serde(rename = "volume24hr", deserialize_with = "lenient_f64")]
    pub volume_24hr: f64,
    #[serde(rename = "volume1wk", deserialize_with = "lenient_f64")]
    pub volume_1wk: f64,
    #[serde(rename = "volume1mo", deserialize_with = "lenient_f64")]
    pub volume_1mo: f64,

    /// String-encoded fallback for `liquidity_num`.
    #[serde(rename = "liquidity", deserialize_with = "lenient_string")]
    pub liquidity_str: String,
    #[serde(rename = "liquidityNum", deserialize_with = "lenient_f64")]
    pub liquidity_num: f64,

    #[serde(rename = "bestBid", deserialize_with = "lenient_f64")]
    pub best_bid: f64,
    #[serde(rename = "bestAsk", deserialize_with = "lenient_f64")]
    pub best_ask: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub spread: f64,
    #[serde(rename = "lastTradePrice", deserialize_with = "lenient_f64")]
    pub last_trade_price: f64,
    #[serde(rename = "openInterest", deserialize_with = "lenient_f64")]
    pub open_interest: f64,
    #[serde(rename = "commentCount", deserialize_with = "lenient_u64")]
    pub comment_count: u64,
    #[serde(deserialize_with = "lenient_f64")]
    pub competitive: f64,

    #[serde(rename = "oneHourPriceChange", deserialize_with = "lenient_f64")]
    pub one_hour_price_change: f64,
    #[serde(rename = "oneDayPriceChange", deserialize_with = "lenient_f64")]
    pub one_day_price_change: f64,
    #[serde(rename = "oneWeekPriceChange", deserialize_with = "lenient_f64")]
    pub one_week_price_change: f64,
    #[serde(rename = "oneMonthPriceChange", deserialize_with = "lenient_f64")]
    pub one_month_price_change: f64,

    #[serde(deserialize_with = "lenient_bool")]
    pub active: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub closed: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub featured: bool,

    /// JSON-encoded list, e.g. `"[\"Yes\", \"No\"]"`. Decode with [`Market::outcomes`].
    #[serde(rename = "outcomes", deserialize_with = "lenient_string")]
    pub outcomes_raw: String,
    /// JSON-encoded list, e.g. `"[\"0.62\", \"0.38\"]"`. Decode with [`Market::outcome_prices`].
    #[serde(rename = "outcomePrices", deserialize_with = "lenient_string")]
    pub outcome_prices_raw: String,
}

impl Market {
    /// `volumeNum` when positive, else the parsed `volume` string, else 0.
    pub fn effective_volume(&self) -> f64 {
        primary_or_parsed(self.volume_num, &self.volume_str)
    }

    /// `liquidityNum` when positive, else the parsed `liquidity` string, else 0.
    pub fn effective_liquidity(&self) -> f64 {
        primary_or_parsed(self.liquidity_num, &self.liquidity_str)
    }

    /// Explicit spread when positive, else ask - bid when both sides are quoted.
    pub fn effective_spread(&self) -> f64 {
        if self.spread > 0.0 {
            return self.spread;
        }
        if self.best_ask > 0.0 && self.best_bid > 0.0 {
            return self.best_ask - self.best_bid;
        }
        0.0
    }

    /// Weighted absolute price movement; short horizons weigh more.
    pub fn momentum_score(&self) -> f64 {
        self.one_hour_price_change.abs() * 3.0
            + self.one_day_price_change.abs() * 2.0
            + self.one_week_price_change.abs()
    }

    pub fn engagement_score(&self) -> f64 {
        self.volume_24hr / 1000.0 + self.comment_count as f64 * 10.0
    }

    pub fn display_slug(&self) -> &str {
        if self.slug.is_empty() {
            &self.market_slug
        } else {
            &self.slug
        }
    }

    pub fn outcomes(&self) -> Vec<String> {
        decode_string_list(&self.outcomes_raw)
    }

    pub fn outcome_prices(&self) -> Vec<String> {
        decode_string_list(&self.outcome_prices_raw)
    }

    /// YES/NO odds in percent from the first two outcome prices.
    /// A missing or unparseable price reads as 0.
    pub fn odds(&self) -> (f64, f64) {
        let prices = self.outcome_prices();
        if prices.len() < 2 {
            return (0.0, 0.0);
        }
        let pct = |s: &str| s.trim().parse::<f64>().map(|p| p * 100.0).unwrap_or(0.0);
        (pct(&prices[0]), pct(&prices[1]))
    }
}

fn primary_or_parsed(primary: f64, fallback: &str) -> f64 {
    if primary > 0.0 {
        return primary;
    }
    fallback
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Decode a JSON-encoded list of strings. Numbers are kept as their text;
/// anything else yields an empty list.
pub fn decode_string_list(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(items) => items
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Err(_) => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub slug: String,
    /// Older payloads carry the slug under `marketSlug`.
    #[serde(rename = "marketSlug", deserialize_with = "lenient_string")]
    pub market_slug: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub volume: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub liquidity: f64,
}

impl Event {
    pub fn display_slug(&self) -> &str {
        if self.slug.is_empty() {
            &self.market_slug
        } else {
            &self.slug
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Aggregate view over one fetched market list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalStats {
    pub total_markets: usize,
    pub active_markets: usize,
    pub total_volume: f64,
    pub volume_24h: f64,
    pub avg_liquidity: f64,
    /// Largest strictly positive 1-day change; `None` if nothing moved up.
    pub top_gainer: Option<Market>,
    pub top_gainer_change: f64,
    /// Largest strictly positive 24h volume.
    pub top_volume: Option<Market>,
}

/// Markets plus their stats, as produced by one successful fetch.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    pub markets: Vec<Market>,
    pub stats: GlobalStats,
}

// ---------------------------------------------------------------------------
// Lenient field decoders
// ---------------------------------------------------------------------------

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    })
}

fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Strings pass through; numbers and nested arrays/objects keep their JSON text
/// so `outcomes` sent as a real array still decodes lazily.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(json: &str) -> Market {
        serde_json::from_str(json).expect("market should decode")
    }

    #[test]
    fn effective_volume_prefers_positive_numeric_field() {
        let m = market(r#"{"volumeNum": 1000, "volume": "50"}"#);
        assert_eq!(m.effective_volume(), 1000.0);
    }

    #[test]
    fn effective_volume_falls_back_to_string_then_zero() {
        let m = market(r#"{"volumeNum": 0, "volume": "250.5"}"#);
        assert_eq!(m.effective_volume(), 250.5);

        let m = market(r#"{"volume": "not a number"}"#);
        assert_eq!(m.effective_volume(), 0.0);

        let m = market("{}");
        assert_eq!(m.effective_volume(), 0.0);
    }

    #[test]
    fn effective_liquidity_follows_same_law() {
        assert_eq!(market(r#"{"liquidityNum": 42.0, "liquidity": "7"}"#).effective_liquidity(), 42.0);
        assert_eq!(market(r#"{"liquidityNum": -3, "liquidity": "7"}"#).effective_liquidity(), 7.0);
        assert_eq!(market(r#"{"liquidity": ""}"#).effective_liquidity(), 0.0);
    }

    #[test]
    fn numeric_volume_string_field_is_accepted() {
        // Some responses send `volume` as a bare number.
        let m = market(r#"{"volume": 321.0}"#);
        assert_eq!(m.effective_volume(), 321.0);
    }

    #[test]
    fn spread_uses_explicit_field_then_book() {
        assert_eq!(market(r#"{"spread": 0.02, "bestBid": 0.4, "bestAsk": 0.5}"#).effective_spread(), 0.02);
        let m = market(r#"{"bestBid": 0.4, "bestAsk": 0.5}"#);
        assert!((m.effective_spread() - 0.1).abs() < 1e-9);
        assert_eq!(market(r#"{"bestAsk": 0.5}"#).effective_spread(), 0.0);
    }

    #[test]
    fn malformed_fields_degrade_to_defaults() {
        let m = market(
            r#"{"id": 17, "volume24hr": "abc", "active": "true", "closed": null,
                "commentCount": "12", "oneDayPriceChange": [1, 2], "question": null}"#,
        );
        assert_eq!(m.id, "17");
        assert_eq!(m.volume_24hr, 0.0);
        assert!(m.active);
        assert!(!m.closed);
        assert_eq!(m.comment_count, 12);
        assert_eq!(m.one_day_price_change, 0.0);
        assert_eq!(m.question, "");
    }

    #[test]
    fn outcome_fields_decode_lazily() {
        let m = market(r#"{"outcomes": "[\"Yes\", \"No\"]", "outcomePrices": "[\"0.62\", \"0.38\"]"}"#);
        assert_eq!(m.outcomes(), vec!["Yes", "No"]);
        let (yes, no) = m.odds();
        assert!((yes - 62.0).abs() < 1e-9);
        assert!((no - 38.0).abs() < 1e-9);
    }

    #[test]
    fn outcome_fields_accept_real_arrays_and_garbage() {
        let m = market(r#"{"outcomes": ["Up", "Down"], "outcomePrices": "oops"}"#);
        assert_eq!(m.outcomes(), vec!["Up", "Down"]);
        assert!(m.outcome_prices().is_empty());
        assert_eq!(m.odds(), (0.0, 0.0));
    }

    #[test]
    fn slug_falls_back_to_market_slug() {
        assert_eq!(market(r#"{"slug": "btc-100k", "marketSlug": "old"}"#).display_slug(), "btc-100k");
        assert_eq!(market(r#"{"marketSlug": "old"}"#).display_slug(), "old");
    }

    #[test]
    fn event_slug_falls_back_to_market_slug() {
        let e: Event = serde_json::from_str(r#"{"id": 9, "title": "Fed decision", "marketSlug": "fed-dec"}"#)
            .expect("event should decode");
        assert_eq!(e.id, "9");
        assert_eq!(e.display_slug(), "fed-dec");

        let e: Event = serde_json::from_str(r#"{"slug": "fed", "marketSlug": "fed-dec"}"#).expect("event should decode");
        assert_eq!(e.display_slug(), "fed");
    }

    #[test]
    fn momentum_and_engagement_scores() {
        let m = market(
            r#"{"oneHourPriceChange": -0.1, "oneDayPriceChange": 0.05, "oneWeekPriceChange": -0.2,
                "volume24hr": 5000, "commentCount": 3}"#,
        );
        assert!((m.momentum_score() - (0.3 + 0.1 + 0.2)).abs() < 1e-9);
        assert!((m.engagement_score() - 35.0).abs() < 1e-9);
    }
}
