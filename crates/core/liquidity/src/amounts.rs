use alloy_primitives::{
    utils::{parse_units, ParseUnits},
    U256,
};

const BPS_DENOMINATOR: u64 = 10_000;

/// Convert a human-readable decimal amount into the token's smallest unit.
/// Empty, unparsable and zero inputs are all rejected.
pub fn parse_amount(amount: &str, decimals: u8) -> Option<U256> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_units(trimmed, decimals).ok().map(ParseUnits::get_absolute).filter(|value| !value.is_zero())
}

/// `amount` reduced by `bps` basis points; the min-out guard for a desired
/// input (e.g. 500 bps leaves 95%).
pub fn apply_bps_discount(amount: U256, bps: u64) -> U256 {
    let keep = U256::from(BPS_DENOMINATOR.saturating_sub(bps));
    amount.checked_mul(keep).map(|v| v / U256::from(BPS_DENOMINATOR)).unwrap_or(amount / U256::from(BPS_DENOMINATOR) * keep)
}

/// `bps` basis points of `amount`; the conservative fallback guard.
pub fn bps_of(amount: U256, bps: u64) -> U256 {
    let bps = U256::from(bps);
    amount.checked_mul(bps).map(|v| v / U256::from(BPS_DENOMINATOR)).unwrap_or(amount / U256::from(BPS_DENOMINATOR) * bps)
}

/// The share of `pair_balance` redeemable by `lp_amount` out of
/// `total_supply` LP tokens. `None` when the proportion cannot be computed.
pub fn proportional_share(lp_amount: U256, pair_balance: U256, total_supply: U256) -> Option<U256> {
    if total_supply.is_zero() {
        return None;
    }
    lp_amount.checked_mul(pair_balance).map(|v| v / total_supply)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(amount: &str, decimals: u8) -> U256 {
        parse_amount(amount, decimals).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(units("1000", 18), U256::from(10u128.pow(18) * 1000));
        assert_eq!(units("0.5", 18), U256::from(5u128 * 10u128.pow(17)));
        assert_eq!(units("1000", 6), U256::from(1_000_000_000u64));
        assert_eq!(parse_amount("", 18), None);
        assert_eq!(parse_amount("  ", 18), None);
        assert_eq!(parse_amount("0", 18), None);
        assert_eq!(parse_amount("abc", 18), None);
        assert_eq!(parse_amount("-5", 18), None);
    }

    #[test]
    fn test_five_percent_discount() {
        // 95% of 1000 tokens is 950 in smallest units
        assert_eq!(apply_bps_discount(units("1000", 18), 500), units("950", 18));
        assert_eq!(apply_bps_discount(U256::from(10_000u64), 500), U256::from(9_500u64));
        assert_eq!(apply_bps_discount(U256::ZERO, 500), U256::ZERO);
    }

    #[test]
    fn test_fallback_guard() {
        // 0.1% of the LP amount
        assert_eq!(bps_of(U256::from(10_000u64), 10), U256::from(10u64));
        assert_eq!(bps_of(U256::from(100u64), 10), U256::ZERO);
    }

    #[test]
    fn test_proportional_share() {
        let total = U256::from(1000u64);
        let balance = U256::from(500_000u64);
        assert_eq!(proportional_share(U256::from(100u64), balance, total), Some(U256::from(50_000u64)));
        assert_eq!(proportional_share(U256::from(100u64), balance, U256::ZERO), None);
    }
}
