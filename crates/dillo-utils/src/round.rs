/// Splits `total` into `parts` non-negative integer shares that sum to
/// exactly `total`, using cumulative (largest-remainder) rounding so the
/// per-share error never accumulates across the row.
///
/// Each share is `round(running_total) - round(previous_running_total)`
/// where the running total is tracked as a fixed-point rational
/// `total * i / parts`. This is how justification distributes leftover
/// stretch/shrink across a line's glue without floating-point drift: the
/// sum of the returned shares always equals `total`, unlike naive
/// per-glue rounding which can over- or under-shoot by several units.
///
/// `parts == 0` returns an empty vector.
pub fn distribute_rounded(total: i64, parts: usize) -> Vec<i64> {
    if parts == 0 {
        return Vec::new();
    }

    let parts_i = parts as i64;
    let mut shares = Vec::with_capacity(parts);
    let mut previous = 0i64;

    for i in 1..=parts_i {
        // round_half_away_from_zero(total * i / parts) without losing
        // precision to an intermediate f64 conversion.
        let numerator = total * i;
        let running = div_round_half_away_from_zero(numerator, parts_i);
        shares.push(running - previous);
        previous = running;
    }

    shares
}

fn div_round_half_away_from_zero(numerator: i64, denominator: i64) -> i64 {
    debug_assert!(denominator > 0);
    if numerator >= 0 {
        (numerator + denominator / 2) / denominator
    } else {
        -((-numerator + denominator / 2) / denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_to_total() {
        for total in [0, 1, 7, 10, 100, -33] {
            for parts in 1..=8usize {
                let shares = distribute_rounded(total, parts);
                assert_eq!(shares.len(), parts);
                assert_eq!(shares.iter().sum::<i64>(), total);
            }
        }
    }

    #[test]
    fn distributes_evenly() {
        assert_eq!(distribute_rounded(10, 4), vec![3, 2, 3, 2]);
    }

    #[test]
    fn zero_parts_is_empty() {
        assert!(distribute_rounded(5, 0).is_empty());
    }

    #[test]
    fn single_part_keeps_total() {
        assert_eq!(distribute_rounded(42, 1), vec![42]);
    }
}
