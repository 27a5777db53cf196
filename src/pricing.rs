// src/pricing.rs
//
// Display price of a checkout: base - promo discount + customer-side channel fee.
// Amounts are integer Rupiah.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::PaymentChannel;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PriceInput {
    pub base_price: i64,
    #[serde(default)]
    pub strikethrough_price: Option<i64>,
    #[serde(default)]
    pub discount_amount: Option<i64>,
    #[serde(default)]
    pub channel: Option<PaymentChannel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriceQuote {
    pub base_price: i64,
    pub strikethrough_price: Option<i64>,
    pub discount_amount: i64,
    pub final_price: i64,
    pub admin_fee: i64,
    pub total: i64,
    pub savings: i64,
    pub is_free: bool,
}

pub fn quote(input: &PriceInput) -> PriceQuote {
    quote_with(
        input.base_price,
        input.strikethrough_price,
        input.discount_amount,
        input.channel.as_ref(),
    )
}

pub fn quote_with(
    base_price: i64,
    strikethrough_price: Option<i64>,
    discount_amount: Option<i64>,
    channel: Option<&PaymentChannel>,
) -> PriceQuote {
    let base_price = base_price.max(0);
    let discount_amount = discount_amount.unwrap_or(0).clamp(0, base_price);
    let final_price = base_price - discount_amount;
    let is_free = base_price == 0;

    // Free products never carry a fee, whatever channel is selected.
    let admin_fee = match channel {
        Some(ch) if !is_free => admin_fee(ch, final_price),
        _ => 0,
    };

    let savings = match strikethrough_price {
        Some(list_price) if list_price > base_price => list_price - base_price + discount_amount,
        _ => discount_amount,
    };

    PriceQuote {
        base_price,
        strikethrough_price,
        discount_amount,
        final_price,
        admin_fee,
        total: if is_free { 0 } else { final_price + admin_fee },
        savings,
        is_free,
    }
}

/// Customer-side fee: flat + round(amount * percent / 100).
pub fn admin_fee(channel: &PaymentChannel, amount: i64) -> i64 {
    let fee = channel.fee_customer;
    let percent_part = (amount as f64 * fee.percent / 100.0).round() as i64;
    fee.flat.max(0) + percent_part.max(0)
}

pub fn channel_accepts(channel: &PaymentChannel, amount: i64) -> bool {
    if !channel.active {
        return false;
    }
    if channel.minimum_amount.is_some_and(|min| amount < min) {
        return false;
    }
    if channel.maximum_amount.is_some_and(|max| amount > max) {
        return false;
    }
    true
}

pub fn available_channels(channels: &[PaymentChannel], amount: i64) -> Vec<PaymentChannel> {
    channels
        .iter()
        .filter(|ch| channel_accepts(ch, amount))
        .cloned()
        .collect()
}
