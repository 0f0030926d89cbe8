use std::time::Duration;

/// Compact dollar amount: `$1.23M`, `$45.6K`, `$512`.
pub fn format_usd(v: f64) -> String {
    let abs = v.abs();
    let sign = if v < 0.0 { "-" } else { "" };
    if abs >= 1_000_000_000.0 {
        format!("{sign}${:.2}B", abs / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{sign}${:.2}M", abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{sign}${:.1}K", abs / 1_000.0)
    } else {
        format!("{sign}${:.0}", abs)
    }
}

/// Signed fractional change as a percentage: `0.05` -> `+5.0%`.
pub fn format_change(frac: f64) -> String {
    if frac == 0.0 {
        return "0.0%".to_string();
    }
    format!("{:+.1}%", frac * 100.0)
}

/// Probability already in percent: `62.0` -> `62.0%`, `0` -> `—`.
pub fn format_odds(pct: f64) -> String {
    if pct <= 0.0 {
        "—".to_string()
    } else {
        format!("{pct:.1}%")
    }
}

pub fn format_price(p: f64) -> String {
    if p > 0.0 {
        format!("{p:.3}")
    } else {
        "—".to_string()
    }
}

pub fn format_age(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{secs}s ago")
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

/// Cut to at most `max` characters, ending in `…` when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
