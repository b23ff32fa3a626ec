//! Arbitrage opportunity detection
//!
//! The single home for all threshold logic: given one asset's per-venue
//! tickers and a subscriber's filter profile, pick the widest cross-venue
//! spread or nothing. Pure and deterministic for identical input order,
//! so cycle results are reproducible in tests.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::types::{
    format_volume, ArbitrageOpportunity, SubscriberProfile, TickerQuote, VenueTrust,
};

/// Find the best spread between the cheapest and the priciest eligible
/// venue quote. Returns `None` when fewer than two quotes survive the
/// eligibility filter or the spread is below the subscriber's threshold.
pub fn detect(
    tickers: &[TickerQuote],
    profile: &SubscriberProfile,
) -> Option<ArbitrageOpportunity> {
    if tickers.is_empty() {
        return None;
    }

    let mut low: Option<&TickerQuote> = None;
    let mut high: Option<&TickerQuote> = None;
    let mut eligible = 0usize;

    for ticker in tickers.iter().filter(|t| is_eligible(t, profile)) {
        eligible += 1;
        // Strict comparisons keep the first-seen ticker on price ties.
        match low {
            Some(l) if ticker.last_price >= l.last_price => {}
            _ => low = Some(ticker),
        }
        match high {
            Some(h) if ticker.last_price <= h.last_price => {}
            _ => high = Some(ticker),
        }
    }

    // A single surviving quote has no counterparty to spread against.
    if eligible < 2 {
        return None;
    }
    let (low, high) = (low?, high?);

    let profit_percent = ((high.last_price - low.last_price) / low.last_price
        * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    if profit_percent < profile.min_profit_fraction * Decimal::ONE_HUNDRED {
        debug!(
            "{}: spread {:.2}% below subscriber threshold",
            low.base, profit_percent
        );
        return None;
    }

    let trust_indicator = low
        .trust_score
        .as_deref()
        .and_then(VenueTrust::from_label)
        .map(VenueTrust::indicator)
        .unwrap_or("")
        .to_string();

    Some(ArbitrageOpportunity {
        pair: format!(
            "{}/{}",
            low.base.to_uppercase(),
            low.target.to_uppercase()
        ),
        low_price: low.last_price,
        low_venue: low.venue.clone(),
        low_venue_url: low.trade_url.clone(),
        high_price: high.last_price,
        high_venue: high.venue.clone(),
        high_venue_url: high.trade_url.clone(),
        formatted_volume: format_volume(low.volume_24h),
        profit_percent,
        trust_indicator,
    })
}

/// Eligibility: settlement currency match, volume floor, rated venue,
/// positive price, not blacklisted. Blacklist wins over everything.
fn is_eligible(ticker: &TickerQuote, profile: &SubscriberProfile) -> bool {
    ticker.target == profile.settlement_currency
        && ticker.volume_24h >= profile.min_volume
        && ticker.trust_score.is_some()
        && ticker.last_price > Decimal::ZERO
        && !profile.is_blacklisted(&ticker.base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ticker(venue: &str, price: Decimal, volume: Decimal) -> TickerQuote {
        TickerQuote {
            base: "X".to_string(),
            target: "USDT".to_string(),
            last_price: price,
            volume_24h: volume,
            venue: venue.to_string(),
            trust_score: Some("green".to_string()),
            trade_url: Some(format!("https://{}.example/x-usdt", venue.to_lowercase())),
        }
    }

    fn profile() -> SubscriberProfile {
        let mut p = SubscriberProfile::new("chat-1");
        p.min_volume = dec!(1000);
        p.min_profit_fraction = dec!(0.05);
        p
    }

    #[test]
    fn test_empty_tickers_none() {
        assert!(detect(&[], &profile()).is_none());
    }

    #[test]
    fn test_spread_above_threshold() {
        // Scenario A: 10 vs 11 is a 10% spread over a 5% threshold
        let tickers = vec![
            ticker("V1", dec!(10), dec!(5000)),
            ticker("V2", dec!(11), dec!(6000)),
        ];
        let opp = detect(&tickers, &profile()).unwrap();

        assert_eq!(opp.profit_percent, dec!(10.00));
        assert_eq!(opp.low_venue, "V1");
        assert_eq!(opp.high_venue, "V2");
        assert_eq!(opp.pair, "X/USDT");
        assert_eq!(opp.trust_indicator, "🟢");
        assert_eq!(opp.formatted_volume, "5,000");
    }

    #[test]
    fn test_spread_below_threshold_none() {
        // Scenario B: same quotes, 15% threshold beats the 10% spread
        let tickers = vec![
            ticker("V1", dec!(10), dec!(5000)),
            ticker("V2", dec!(11), dec!(6000)),
        ];
        let mut p = profile();
        p.min_profit_fraction = dec!(0.15);

        assert!(detect(&tickers, &p).is_none());
    }

    #[test]
    fn test_all_volumes_below_floor_none() {
        // Scenario C
        let tickers = vec![
            ticker("V1", dec!(10), dec!(500)),
            ticker("V2", dec!(11), dec!(700)),
        ];
        assert!(detect(&tickers, &profile()).is_none());
    }

    #[test]
    fn test_wrong_settlement_currency_none() {
        let mut a = ticker("V1", dec!(10), dec!(5000));
        let mut b = ticker("V2", dec!(11), dec!(6000));
        a.target = "EUR".to_string();
        b.target = "EUR".to_string();

        assert!(detect(&[a, b], &profile()).is_none());
    }

    #[test]
    fn test_single_eligible_ticker_none() {
        // Second quote fails the volume floor, leaving one candidate
        let tickers = vec![
            ticker("V1", dec!(10), dec!(5000)),
            ticker("V2", dec!(11), dec!(10)),
        ];
        assert!(detect(&tickers, &profile()).is_none());
    }

    #[test]
    fn test_unrated_venue_ineligible() {
        let mut a = ticker("V1", dec!(10), dec!(5000));
        a.trust_score = None;
        let tickers = vec![
            a,
            ticker("V2", dec!(11), dec!(6000)),
            ticker("V3", dec!(12), dec!(6000)),
        ];
        // V1 is out, so the buy side is V2
        let opp = detect(&tickers, &profile()).unwrap();
        assert_eq!(opp.low_venue, "V2");
    }

    #[test]
    fn test_blacklist_beats_eligibility() {
        let mut p = profile();
        p.asset_whitelist.insert("x".to_string());
        p.asset_blacklist.insert("x".to_string());

        let tickers = vec![
            ticker("V1", dec!(10), dec!(5000)),
            ticker("V2", dec!(11), dec!(6000)),
        ];
        assert!(detect(&tickers, &p).is_none());
    }

    #[test]
    fn test_blacklist_case_insensitive() {
        let mut p = profile();
        p.asset_blacklist.insert("x".to_string());

        // Ticker base is upper-case "X"; blacklist entry is "x"
        let tickers = vec![
            ticker("V1", dec!(10), dec!(5000)),
            ticker("V2", dec!(11), dec!(6000)),
        ];
        assert!(detect(&tickers, &p).is_none());
    }

    #[test]
    fn test_tie_first_seen_wins() {
        let tickers = vec![
            ticker("V1", dec!(10), dec!(5000)),
            ticker("V2", dec!(10), dec!(6000)),
            ticker("V3", dec!(11), dec!(6000)),
            ticker("V4", dec!(11), dec!(7000)),
        ];
        let mut p = profile();
        p.min_profit_fraction = dec!(0.01);

        let opp = detect(&tickers, &p).unwrap();
        assert_eq!(opp.low_venue, "V1");
        assert_eq!(opp.high_venue, "V3");
    }

    #[test]
    fn test_idempotent() {
        let tickers = vec![
            ticker("V1", dec!(10), dec!(5000)),
            ticker("V2", dec!(11), dec!(6000)),
        ];
        let p = profile();

        assert_eq!(detect(&tickers, &p), detect(&tickers, &p));
    }

    #[test]
    fn test_threshold_monotonicity() {
        let tickers = vec![
            ticker("V1", dec!(10), dec!(5000)),
            ticker("V2", dec!(11), dec!(6000)),
        ];
        let mut p = profile();

        let found = detect(&tickers, &p).unwrap();
        p.min_profit_fraction = found.profit_percent / Decimal::ONE_HUNDRED + dec!(0.001);

        assert!(detect(&tickers, &p).is_none());
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        // (1001.25 - 1000) / 1000 = 0.125% which rounds up to 0.13
        let tickers = vec![
            ticker("V1", dec!(1000), dec!(5000)),
            ticker("V2", dec!(1001.25), dec!(6000)),
        ];
        let mut p = profile();
        p.min_profit_fraction = Decimal::ZERO;

        let opp = detect(&tickers, &p).unwrap();
        assert_eq!(opp.profit_percent, dec!(0.13));
    }

    #[test]
    fn test_unknown_trust_label_blank_indicator() {
        let mut a = ticker("V1", dec!(10), dec!(5000));
        a.trust_score = Some("purple".to_string());
        let tickers = vec![a, ticker("V2", dec!(11), dec!(6000))];

        let opp = detect(&tickers, &profile()).unwrap();
        assert_eq!(opp.trust_indicator, "");
    }

    #[test]
    fn test_zero_price_ticker_excluded() {
        let tickers = vec![
            ticker("V1", Decimal::ZERO, dec!(5000)),
            ticker("V2", dec!(10), dec!(6000)),
            ticker("V3", dec!(11), dec!(6000)),
        ];
        let opp = detect(&tickers, &profile()).unwrap();
        assert_eq!(opp.low_venue, "V2");
    }
}
