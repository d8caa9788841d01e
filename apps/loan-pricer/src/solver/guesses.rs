//! Initial guess sequences for the multi-start search.

/// Strike guesses ordered by distance from spot.
///
/// Starts at `spot`, then alternates one step down and one step up
/// (`spot - step`, `spot + step`, `spot - 2·step`, ...). The downward side
/// stops before reaching `lower_bound`, the upward side before
/// `spot * upper_multiple`; once one side runs out the other continues
/// alone. Each side holds at most `max_per_side` guesses.
#[must_use]
pub fn strike_guesses(
    spot: f64,
    step_fraction: f64,
    upper_multiple: f64,
    lower_bound: f64,
    max_per_side: u32,
) -> Vec<f64> {
    let step = spot * step_fraction;
    let upper = spot * upper_multiple;
    // A multiple of the step landing on a bound up to rounding is excluded
    let slack = step * 1e-9;

    let below = (1..=max_per_side)
        .map(|k| spot - f64::from(k) * step)
        .take_while(|&k| k > lower_bound + slack);
    let above = (1..=max_per_side)
        .map(|k| spot + f64::from(k) * step)
        .take_while(|&k| k < upper - slack);

    let mut below = below.collect::<Vec<_>>().into_iter();
    let mut above = above.collect::<Vec<_>>().into_iter();

    let mut guesses = vec![spot];
    loop {
        match (below.next(), above.next()) {
            (None, None) => break,
            (down, up) => guesses.extend(down.into_iter().chain(up)),
        }
    }
    guesses
}

/// Fee guesses spiralling outward from the middle of `[0, max_fee]`.
///
/// Guess `i` is `mid + i·(mid/5)·(-1)^i` with `mid = max_fee/2`; guesses
/// outside the bounds are left for the minimizer to clamp.
#[must_use]
pub fn fee_guesses(max_fee: f64, count: u32) -> Vec<f64> {
    let middle = max_fee / 2.0;
    let interval = middle / 5.0;
    (0..count)
        .map(|i| {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            middle + f64::from(i) * interval * sign
        })
        .collect()
}
