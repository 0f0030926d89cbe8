use crate::types::{GlobalStats, Market};

/// Aggregate a market list.
///
/// Leaders use running maxima seeded at zero with strict `>`: a list with no
/// positive 1-day change has no top gainer, and a list whose 24h volumes are
/// all zero has no volume leader.
pub fn compute_global_stats(markets: &[Market]) -> GlobalStats {
    let mut stats = GlobalStats {
        total_markets: markets.len(),
        ..GlobalStats::default()
    };

    let mut total_liquidity = 0.0;
    let mut top_gainer: Option<&Market> = None;
    let mut top_volume: Option<&Market> = None;
    let mut max_volume_24h = 0.0;

    for m in markets {
        if m.active {
            stats.active_markets += 1;
        }
        stats.total_volume += m.effective_volume();
        stats.volume_24h += m.volume_24hr;
        total_liquidity += m.effective_liquidity();

        if m.one_day_price_change > stats.top_gainer_change {
            stats.top_gainer_change = m.one_day_price_change;
            top_gainer = Some(m);
        }
        if m.volume_24hr > max_volume_24h {
            max_volume_24h = m.volume_24hr;
            top_volume = Some(m);
        }
    }

    if !markets.is_empty() {
        stats.avg_liquidity = total_liquidity / markets.len() as f64;
    }
    stats.top_gainer = top_gainer.cloned();
    stats.top_volume = top_volume.cloned();
    stats
}

/// Highest momentum first; markets that have not moved are left out.
pub fn top_by_momentum(markets: &[Market], n: usize) -> Vec<&Market> {
    top_by(markets, n, Market::momentum_score)
}

/// Highest engagement first; markets with no activity are left out.
pub fn top_by_engagement(markets: &[Market], n: usize) -> Vec<&Market> {
    top_by(markets, n, Market::engagement_score)
}

fn top_by(markets: &[Market], n: usize, score: fn(&Market) -> f64) -> Vec<&Market> {
    let mut scored: Vec<(f64, &Market)> = markets
        .iter()
        .map(|m| (score(m), m))
        .filter(|(s, _)| *s > 0.0)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().take(n).map(|(_, m)| m).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(id: &str) -> Market {
        Market {
            id: id.to_string(),
            ..Market::default()
        }
    }

    #[test]
    fn empty_list_has_no_leaders() {
        let stats = compute_global_stats(&[]);
        assert_eq!(stats, GlobalStats::default());
    }

    #[test]
    fn totals_and_average_liquidity() {
        let mut a = market("a");
        a.active = true;
        a.volume_num = 1000.0;
        a.volume_24hr = 40.0;
        a.liquidity_num = 300.0;
        let mut b = market("b");
        b.volume_str = "500".to_string();
        b.volume_24hr = 60.0;
        b.liquidity_str = "100".to_string();

        let stats = compute_global_stats(&[a, b]);
        assert_eq!(stats.total_markets, 2);
        assert_eq!(stats.active_markets, 1);
        assert_eq!(stats.total_volume, 1500.0);
        assert_eq!(stats.volume_24h, 100.0);
        assert_eq!(stats.avg_liquidity, 200.0);
        assert_eq!(stats.top_volume.map(|m| m.id), Some("b".to_string()));
    }

    #[test]
    fn no_positive_change_leaves_gainer_unset() {
        let mut a = market("a");
        a.one_day_price_change = -0.2;
        let b = market("b");
        let stats = compute_global_stats(&[a, b]);
        assert!(stats.top_gainer.is_none());
        assert_eq!(stats.top_gainer_change, 0.0);
    }

    #[test]
    fn all_zero_24h_volume_leaves_volume_leader_unset() {
        let mut a = market("a");
        a.volume_num = 10_000.0;
        let stats = compute_global_stats(&[a]);
        assert!(stats.top_volume.is_none());
    }

    #[test]
    fn first_of_equal_gainers_wins() {
        let mut a = market("a");
        a.one_day_price_change = 0.3;
        let mut b = market("b");
        b.one_day_price_change = 0.3;
        let stats = compute_global_stats(&[a, b]);
        assert_eq!(stats.top_gainer.map(|m| m.id), Some("a".to_string()));
        assert_eq!(stats.top_gainer_change, 0.3);
    }

    #[test]
    fn momentum_ranking_skips_flat_markets() {
        let mut fast = market("fast");
        fast.one_hour_price_change = -0.1;
        let mut slow = market("slow");
        slow.one_week_price_change = 0.05;
        let flat = market("flat");

        let list = [slow, flat, fast];
        let top = top_by_momentum(&list, 5);
        let ids: Vec<&str> = top.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["fast", "slow"]);
    }

    #[test]
    fn engagement_ranking_respects_limit() {
        let mut a = market("a");
        a.comment_count = 1;
        let mut b = market("b");
        b.comment_count = 5;
        let mut c = market("c");
        c.volume_24hr = 2000.0;

        let list = [a, b, c];
        let top = top_by_engagement(&list, 2);
        let ids: Vec<&str> = top.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
