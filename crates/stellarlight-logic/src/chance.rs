//! Weighted random selection and ranged draws.

use rand::Rng;

/// Anything that can be picked by [`weighted_choice`].
pub trait WeightedChoice {
    /// Relative selection weight. Negative values count as zero.
    fn choice_weight(&self) -> f64;
}

impl<T: WeightedChoice + ?Sized> WeightedChoice for &T {
    fn choice_weight(&self) -> f64 {
        (**self).choice_weight()
    }
}

/// Pick one item with probability proportional to its weight.
///
/// Returns `None` for an empty slice. If every weight is zero the last item
/// is returned. An infinite weight wins outright; the first one is picked.
pub fn weighted_choice<'a, T: WeightedChoice>(items: &'a [T], rng: &mut impl Rng) -> Option<&'a T> {
    let last = items.last()?;
    let weight = |item: &T| item.choice_weight().max(0.0);

    if let Some(item) = items.iter().find(|i| weight(*i).is_infinite()) {
        return Some(item);
    }
    let total: f64 = items.iter().map(weight).sum();
    if total <= 0.0 || !total.is_finite() {
        return Some(last);
    }

    let mut remaining = rng.gen::<f64>() * total;
    for item in items {
        let w = weight(item);
        if w <= 0.0 {
            continue;
        }
        remaining -= w;
        if remaining <= 0.0 {
            return Some(item);
        }
    }

    // Rounding left a sliver: fall back to the last item that can be drawn.
    items.iter().rev().find(|i| weight(*i) > 0.0).or(Some(last))
}

/// Uniform draw in `[min, max)`; `min` when the range is empty.
pub fn random_range(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    if min >= max {
        return min;
    }
    rng.gen_range(min..max)
}

/// True with probability `chance` (clamped to `[0, 1]`).
pub fn roll(rng: &mut impl Rng, chance: f64) -> bool {
    rng.gen::<f64>() < chance.clamp(0.0, 1.0)
}
