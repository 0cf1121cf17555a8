/// Orders at or above this subtotal ship for free, whatever the client asked for.
pub const FREE_SHIPPING_THRESHOLD: i64 = 500;

/// Requested shipping above this is not a real quote and falls back to the flat rate.
pub const MAX_SHIPPING_COST: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub unit_price: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: i64,
    pub shipping_cost: i64,
    pub tax: i64,
    pub total: i64,
}

/// `None` when the sum does not fit in an `i64`.
pub fn subtotal(lines: &[PricedLine]) -> Option<i64> {
    lines.iter().try_fold(0i64, |acc, line| {
        line.unit_price
            .checked_mul(i64::from(line.quantity))
            .and_then(|line_total| acc.checked_add(line_total))
    })
}

/// Free above the threshold, otherwise the client's figure if it is a sane amount,
/// otherwise the configured flat rate.
pub fn shipping_cost(subtotal: i64, requested: Option<f64>, flat_rate: i64) -> i64 {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        return 0;
    }
    match requested {
        Some(cost) if cost.is_finite() && (0.0..=MAX_SHIPPING_COST).contains(&cost) => {
            cost.round() as i64
        }
        _ => flat_rate,
    }
}

/// `None` when the amounts overflow.
pub fn compute_totals(
    lines: &[PricedLine],
    requested_shipping: Option<f64>,
    flat_rate: i64,
) -> Option<Totals> {
    let subtotal = subtotal(lines)?;
    let shipping_cost = shipping_cost(subtotal, requested_shipping, flat_rate);
    Some(Totals {
        subtotal,
        shipping_cost,
        tax: 0,
        total: subtotal.checked_add(shipping_cost)?,
    })
}
