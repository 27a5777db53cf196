use proptest::prelude::*;

use edu_checkout::pricing::{self, PriceInput, available_channels, channel_accepts};

mod support;

#[test]
fn quote_with_discount_and_percent_fee() {
    let ch = support::channel("briva", 2_500, 2.0);
    let q = pricing::quote_with(500_000, None, Some(50_000), Some(&ch));

    assert_eq!(q.final_price, 450_000);
    assert_eq!(q.admin_fee, 11_500);
    assert_eq!(q.total, 461_500);
    assert!(!q.is_free);
}

#[test]
fn free_product_ignores_channel_fee() {
    let ch = support::channel("qris", 4_000, 0.7);
    let q = pricing::quote_with(0, None, None, Some(&ch));

    assert_eq!(q.admin_fee, 0);
    assert_eq!(q.total, 0);
    assert!(q.is_free);
}

#[test]
fn no_channel_means_no_fee() {
    let q = pricing::quote_with(250_000, None, Some(25_000), None);
    assert_eq!(q.admin_fee, 0);
    assert_eq!(q.total, 225_000);
}

#[test]
fn discount_larger_than_price_is_clamped() {
    let q = pricing::quote_with(100_000, None, Some(150_000), None);
    assert_eq!(q.discount_amount, 100_000);
    assert_eq!(q.final_price, 0);
    assert_eq!(q.total, 0);
}

#[test]
fn percent_fee_rounds_to_nearest_rupiah() {
    let ch = support::channel("ovo", 0, 0.5);
    assert_eq!(pricing::admin_fee(&ch, 101), 1); // 0.505
    assert_eq!(pricing::admin_fee(&ch, 99), 0); // 0.495
}

#[test]
fn savings_include_strikethrough_gap() {
    let q = pricing::quote_with(500_000, Some(750_000), Some(50_000), None);
    assert_eq!(q.savings, 300_000);

    let q = pricing::quote_with(500_000, Some(400_000), Some(50_000), None);
    assert_eq!(q.savings, 50_000);
}

#[test]
fn quote_reads_input_object() {
    let input: PriceInput = serde_json::from_value(serde_json::json!({
        "base_price": 500000,
        "discount_amount": 50000,
        "channel": {
            "code": "BRIVA",
            "name": "BRI Virtual Account",
            "group": "virtual_account",
            "fee_customer": { "flat": 2500, "percent": 2.0 }
        }
    }))
    .expect("price input");

    assert_eq!(pricing::quote(&input).total, 461_500);
}

#[test]
fn channel_limits_filter_availability() {
    let mut small = support::channel("alfamart", 2_500, 0.0);
    small.maximum_amount = Some(100_000);
    let mut big = support::channel("bca", 4_000, 0.0);
    big.minimum_amount = Some(10_000);
    let mut off = support::channel("dana", 0, 1.5);
    off.active = false;

    assert!(channel_accepts(&small, 100_000));
    assert!(!channel_accepts(&small, 100_001));
    assert!(!channel_accepts(&big, 9_999));
    assert!(!channel_accepts(&off, 50_000));

    let codes: Vec<String> = available_channels(&[small, big, off], 450_000)
        .into_iter()
        .map(|c| c.code)
        .collect();
    assert_eq!(codes, vec!["bca".to_string()]);
}

proptest! {
    #[test]
    fn prop_total_matches_formula(
        base in 0i64..100_000_000,
        discount_ratio in 0.0f64..=1.0,
        flat in 0i64..50_000,
        percent in 0.0f64..10.0,
    ) {
        let discount = (base as f64 * discount_ratio) as i64;
        let ch = support::channel("x", flat, percent);
        let q = pricing::quote_with(base, None, Some(discount), Some(&ch));

        if base == 0 {
            prop_assert_eq!(q.total, 0);
        } else {
            let net = (base - discount).max(0);
            let expected = net + flat + (net as f64 * percent / 100.0).round() as i64;
            prop_assert_eq!(q.total, expected);
        }
        prop_assert!(q.final_price >= 0);
    }
}
