use std::cmp::Ordering;

use crate::config::activity_thresholds::{MIN_VOLUME, MIN_VOLUME_24H};
use crate::types::Market;

/// A market is shown anywhere only if it clears either activity bound.
pub fn is_active_market(m: &Market) -> bool {
    m.effective_volume() > MIN_VOLUME || m.volume_24hr > MIN_VOLUME_24H
}

/// Effective volume descending. Two zero-volume markets fall back to 24h
/// volume descending so an all-zero list still has a meaningful order.
pub fn compare_by_volume(a: &Market, b: &Market) -> Ordering {
    let (va, vb) = (a.effective_volume(), b.effective_volume());
    if va == 0.0 && vb == 0.0 {
        return b.volume_24hr.total_cmp(&a.volume_24hr);
    }
    vb.total_cmp(&va)
}

/// 1-day price change descending, signed.
pub fn compare_by_change(a: &Market, b: &Market) -> Ordering {
    b.one_day_price_change.total_cmp(&a.one_day_price_change)
}

pub fn compare_by_liquidity(a: &Market, b: &Market) -> Ordering {
    b.effective_liquidity().total_cmp(&a.effective_liquidity())
}

/// Stable in-place volume ranking.
pub fn rank_by_volume(markets: &mut [Market]) {
    markets.sort_by(compare_by_volume);
}
