//! Pure conversion and aggregation over a fetched rate table.
//!
//! Every function here is total: missing rates, zero divisors and non-finite
//! amounts contribute 0 instead of failing the whole computation.
use crate::core::currency::{ConversionDirection, MoneyEntry, RateTable, Selection};
use tracing::debug;

/// Sums of an aggregated selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionTotals {
    pub sum_of_rates: f64,
    pub sum_of_converted: f64,
}

/// Maps NaN and infinities to 0.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn forward(amount: f64, rate: Option<f64>) -> f64 {
    rate.map_or(0.0, |r| finite_or_zero(amount * r))
}

fn inverse(amount: f64, rate: Option<f64>) -> f64 {
    match rate {
        Some(r) if r != 0.0 => finite_or_zero(amount / r),
        _ => 0.0,
    }
}

/// Converts `amount` by a single `rate` in the given direction.
pub fn convert_rate(amount: f64, rate: Option<f64>, direction: ConversionDirection) -> f64 {
    let amount = finite_or_zero(amount);
    match direction {
        ConversionDirection::Forward => forward(amount, rate),
        ConversionDirection::Inverse => inverse(amount, rate),
    }
}

/// Expresses `amount` of `source` in `target`, using `rates` anchored at `base`.
///
/// Pairs not involving `base` go through it in two hops.
pub fn convert_single(
    amount: f64,
    source: &str,
    target: &str,
    base: &str,
    rates: &RateTable,
) -> f64 {
    let amount = finite_or_zero(amount);

    if source == target {
        return amount;
    }
    if source == base {
        return forward(amount, rates.rate(target));
    }
    if target == base {
        return inverse(amount, rates.rate(source));
    }

    let in_base = inverse(amount, rates.rate(source));
    let converted = forward(in_base, rates.rate(target));
    debug!("Converted {amount} {source} -> {in_base} {base} -> {converted} {target}");
    converted
}

/// Total of all entries expressed in `base`.
pub fn sum_entries(entries: &[MoneyEntry], base: &str, rates: &RateTable) -> f64 {
    let total: f64 = entries
        .iter()
        .filter(|entry| {
            let usable = entry.amount.is_finite();
            if !usable {
                debug!("Skipping non-numeric amount for {}", entry.currency);
            }
            usable
        })
        .map(|entry| convert_single(entry.amount, &entry.currency, base, base, rates))
        .sum();
    finite_or_zero(total)
}

/// Sums the rates of the selected codes and `amount` converted by each of them.
pub fn aggregate_selection(
    selection: &Selection,
    rates: &RateTable,
    amount: f64,
    direction: ConversionDirection,
) -> SelectionTotals {
    let totals = selection
        .iter()
        .fold(SelectionTotals::default(), |mut totals, code| {
            let rate = rates.rate(code);
            totals.sum_of_rates += rate.unwrap_or(0.0);
            totals.sum_of_converted += convert_rate(amount, rate, direction);
            totals
        });
    SelectionTotals {
        sum_of_rates: finite_or_zero(totals.sum_of_rates),
        sum_of_converted: finite_or_zero(totals.sum_of_converted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "USD";

    fn sample_rates() -> RateTable {
        [("EUR", 0.9), ("GBP", 0.8), ("JPY", 150.0)]
            .into_iter()
            .collect()
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identity_pair_skips_rate_lookup() {
        let empty = RateTable::new();
        assert_eq!(convert_single(12.34, "XYZ", "XYZ", BASE, &empty), 12.34);
        assert_eq!(convert_single(5.0, BASE, BASE, BASE, &empty), 5.0);

        let zero: RateTable = [("XYZ", 0.0)].into_iter().collect();
        assert_eq!(convert_single(7.0, "XYZ", "XYZ", BASE, &zero), 7.0);
    }

    #[test]
    fn test_forward_from_base() {
        let rates = sample_rates();
        assert_eq!(convert_single(10.0, BASE, "EUR", BASE, &rates), 10.0 * 0.9);
        assert_eq!(convert_single(2.0, BASE, "JPY", BASE, &rates), 300.0);
    }

    #[test]
    fn test_inverse_to_base() {
        let rates = sample_rates();
        assert_eq!(convert_single(9.0, "EUR", BASE, BASE, &rates), 9.0 / 0.9);
        assert_eq!(convert_single(300.0, "JPY", BASE, BASE, &rates), 2.0);
    }

    #[test]
    fn test_round_trip_through_base() {
        let rates = sample_rates();
        let there = convert_single(123.45, BASE, "GBP", BASE, &rates);
        let back = convert_single(there, "GBP", BASE, BASE, &rates);
        assert!(approx_eq(back, 123.45));
    }

    #[test]
    fn test_two_hop_conversion() {
        let rates = sample_rates();
        let result = convert_single(9.0, "EUR", "GBP", BASE, &rates);
        assert!(approx_eq(result, 9.0 / 0.9 * 0.8));
    }

    #[test]
    fn test_missing_rate_returns_zero() {
        let empty = RateTable::new();
        assert_eq!(convert_single(10.0, BASE, "ZZZ", BASE, &empty), 0.0);
        assert_eq!(convert_single(10.0, "ZZZ", BASE, BASE, &empty), 0.0);

        let rates = sample_rates();
        assert_eq!(convert_single(10.0, "ZZZ", "EUR", BASE, &rates), 0.0);
        assert_eq!(convert_single(10.0, "EUR", "ZZZ", BASE, &rates), 0.0);
    }

    #[test]
    fn test_zero_rate_is_never_divided_by() {
        let rates: RateTable = [("ZZZ", 0.0), ("EUR", 0.9)].into_iter().collect();
        assert_eq!(convert_single(10.0, "ZZZ", BASE, BASE, &rates), 0.0);
        assert_eq!(convert_single(10.0, "ZZZ", "EUR", BASE, &rates), 0.0);
        // Forward by a zero rate is a plain product.
        assert_eq!(convert_single(10.0, BASE, "ZZZ", BASE, &rates), 0.0);
    }

    #[test]
    fn test_non_finite_amount_is_zero() {
        let rates = sample_rates();
        assert_eq!(convert_single(f64::NAN, BASE, "EUR", BASE, &rates), 0.0);
        assert_eq!(convert_single(f64::INFINITY, "EUR", "EUR", BASE, &rates), 0.0);
    }

    #[test]
    fn test_non_finite_rate_is_missing() {
        let rates: RateTable = [("EUR", f64::INFINITY)].into_iter().collect();
        assert_eq!(convert_single(1.0, BASE, "EUR", BASE, &rates), 0.0);
        assert_eq!(convert_single(1.0, "EUR", BASE, BASE, &rates), 0.0);
    }

    #[test]
    fn test_overflow_degrades_to_zero() {
        let rates: RateTable = [("TINY", 1e-300)].into_iter().collect();
        assert_eq!(convert_single(1e300, "TINY", BASE, BASE, &rates), 0.0);
    }

    #[test]
    fn test_sum_entries_empty() {
        assert_eq!(sum_entries(&[], BASE, &sample_rates()), 0.0);
    }

    #[test]
    fn test_sum_entries_skips_non_numeric() {
        let entries = vec![
            MoneyEntry::new(5.0, BASE),
            MoneyEntry::from_input("abc", BASE),
        ];
        assert_eq!(sum_entries(&entries, BASE, &RateTable::new()), 5.0);
    }

    #[test]
    fn test_sum_entries_mixed_currencies() {
        let entries = vec![
            MoneyEntry::new(10.0, BASE),
            MoneyEntry::new(9.0, "EUR"),
            MoneyEntry::new(300.0, "JPY"),
            MoneyEntry::new(100.0, "ZZZ"),
        ];
        let total = sum_entries(&entries, BASE, &sample_rates());
        assert!(approx_eq(total, 10.0 + 10.0 + 2.0));
    }

    #[test]
    fn test_sum_entries_is_order_independent() {
        let rates = sample_rates();
        let mut entries = vec![
            MoneyEntry::new(1.5, "EUR"),
            MoneyEntry::new(2.5, "GBP"),
            MoneyEntry::new(3.5, BASE),
        ];
        let first = sum_entries(&entries, BASE, &rates);
        entries.reverse();
        assert!(approx_eq(first, sum_entries(&entries, BASE, &rates)));
    }

    #[test]
    fn test_aggregate_selection_forward() {
        let rates: RateTable = [("EUR", 0.9), ("GBP", 0.8)].into_iter().collect();
        let selection: Selection = ["EUR", "GBP"].into_iter().collect();
        let totals = aggregate_selection(&selection, &rates, 10.0, ConversionDirection::Forward);
        assert!(approx_eq(totals.sum_of_rates, 1.7));
        assert!(approx_eq(totals.sum_of_converted, 17.0));
    }

    #[test]
    fn test_aggregate_selection_inverse() {
        let rates: RateTable = [("EUR", 0.9), ("GBP", 0.8)].into_iter().collect();
        let selection: Selection = ["EUR", "GBP"].into_iter().collect();
        let totals = aggregate_selection(&selection, &rates, 10.0, ConversionDirection::Inverse);
        assert!(approx_eq(totals.sum_of_rates, 1.7));
        assert!(approx_eq(totals.sum_of_converted, 10.0 / 0.9 + 10.0 / 0.8));
        assert!((totals.sum_of_converted - 23.61).abs() < 0.01);
    }

    #[test]
    fn test_aggregate_empty_selection() {
        let totals = aggregate_selection(
            &Selection::new(),
            &sample_rates(),
            10.0,
            ConversionDirection::Forward,
        );
        assert_eq!(totals, SelectionTotals::default());
    }

    #[test]
    fn test_aggregate_selection_missing_and_zero_rates() {
        let rates: RateTable = [("EUR", 0.5), ("ZERO", 0.0)].into_iter().collect();
        let selection: Selection = ["EUR", "ZERO", "NOPE"].into_iter().collect();

        let forward = aggregate_selection(&selection, &rates, 4.0, ConversionDirection::Forward);
        assert_eq!(forward.sum_of_rates, 0.5);
        assert_eq!(forward.sum_of_converted, 2.0);

        let inverse = aggregate_selection(&selection, &rates, 4.0, ConversionDirection::Inverse);
        assert_eq!(inverse.sum_of_rates, 0.5);
        assert_eq!(inverse.sum_of_converted, 8.0);
    }

    #[test]
    fn test_sum_entries_overflowing_total_is_zero() {
        let entries = vec![MoneyEntry::new(1e308, BASE), MoneyEntry::new(1e308, BASE)];
        assert_eq!(sum_entries(&entries, BASE, &RateTable::new()), 0.0);
    }

    #[test]
    fn test_aggregate_selection_overflowing_totals_are_zero() {
        let rates: RateTable = [("A", 1e308), ("B", 1e308)].into_iter().collect();
        let selection: Selection = ["A", "B"].into_iter().collect();
        let totals = aggregate_selection(&selection, &rates, 1.0, ConversionDirection::Forward);
        assert_eq!(totals, SelectionTotals::default());
    }

    #[test]
    fn test_convert_rate_directions() {
        assert_eq!(convert_rate(10.0, Some(2.0), ConversionDirection::Forward), 20.0);
        assert_eq!(convert_rate(10.0, Some(2.0), ConversionDirection::Inverse), 5.0);
        assert_eq!(convert_rate(10.0, Some(0.0), ConversionDirection::Inverse), 0.0);
        assert_eq!(convert_rate(10.0, None, ConversionDirection::Forward), 0.0);
        assert_eq!(convert_rate(f64::NAN, Some(2.0), ConversionDirection::Forward), 0.0);
    }
}
