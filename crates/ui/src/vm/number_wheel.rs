//! Model of the horizontally scrolling number picker.
//!
//! The value list is rendered three times side by side so the user can
//! keep scrolling in either direction; once the scroll position drifts
//! into the outer copies it is moved back to the same value in the middle
//! copy.

/// Rendered width of one value cell, in pixels.
pub const ITEM_WIDTH: f64 = 48.0;

const RECENTRE_LOW: f64 = 0.3;
const RECENTRE_HIGH: f64 = 2.7;

#[derive(Debug, Clone, PartialEq)]
pub struct NumberWheel {
    min: f64,
    step: f64,
    values: Vec<f64>,
    item_width: f64,
}

impl NumberWheel {
    /// Values `min..=max` by `step`. `None` for a non-positive step or an
    /// empty range.
    #[must_use]
    pub fn new(min: f64, max: f64, step: f64) -> Option<Self> {
        if !(step.is_finite() && step > 0.0 && min.is_finite() && max.is_finite() && max >= min) {
            return None;
        }
        let steps = ((max - min) / step + 1e-9).floor();
        let count = usize::try_from(steps as i64).ok()? + 1;
        let values = (0..count)
            .map(|k| min + step * k as f64)
            .collect();
        Some(Self {
            min,
            step,
            values,
            item_width: ITEM_WIDTH,
        })
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of rendered cells.
    #[must_use]
    pub fn rendered_len(&self) -> usize {
        self.values.len() * 3
    }

    fn len_i64(&self) -> i64 {
        i64::try_from(self.values.len()).unwrap_or(i64::MAX)
    }

    /// Value shown in rendered cell `index`; any index wraps around.
    #[must_use]
    pub fn value_at(&self, index: i64) -> f64 {
        let wrapped = usize::try_from(index.rem_euclid(self.len_i64())).unwrap_or(0);
        self.values.get(wrapped).copied().unwrap_or(self.min)
    }

    /// Position of `value` in the plain list, clamped to its ends.
    #[must_use]
    pub fn index_of(&self, value: f64) -> usize {
        let raw = ((value - self.min) / self.step).round();
        if !raw.is_finite() || raw <= 0.0 {
            return 0;
        }
        (raw as usize).min(self.values.len().saturating_sub(1))
    }

    /// Rendered cell for `value` in the middle copy.
    #[must_use]
    pub fn home_index(&self, value: f64) -> i64 {
        self.len_i64() + i64::try_from(self.index_of(value)).unwrap_or(0)
    }

    fn padding(&self, container_width: f64) -> f64 {
        container_width / 2.0 - self.item_width / 2.0
    }

    /// Rendered cell under the centre marker.
    #[must_use]
    pub fn center_index(&self, scroll_left: f64, container_width: f64) -> i64 {
        ((scroll_left + self.padding(container_width)) / self.item_width).round() as i64
    }

    /// Scroll offset that centres rendered cell `index`.
    #[must_use]
    pub fn scroll_for(&self, index: i64, container_width: f64) -> f64 {
        index as f64 * self.item_width - self.padding(container_width)
    }

    /// New scroll offset when the view drifted out of the middle band.
    #[must_use]
    pub fn recentre(&self, scroll_left: f64, container_width: f64) -> Option<f64> {
        let one_set = self.values.len() as f64 * self.item_width;
        if scroll_left >= one_set * RECENTRE_LOW && scroll_left <= one_set * RECENTRE_HIGH {
            return None;
        }
        let center = self.center_index(scroll_left, container_width);
        let target = self.len_i64() + center.rem_euclid(self.len_i64());
        Some(self.scroll_for(target, container_width))
    }
}

/// Whole numbers without decimals, everything else with one.
#[must_use]
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> NumberWheel {
        NumberWheel::new(0.0, 100.0, 2.5).unwrap()
    }

    #[test]
    fn builds_inclusive_range() {
        let wheel = weights();
        assert_eq!(wheel.len(), 41);
        assert_eq!(wheel.rendered_len(), 123);
        assert!((wheel.values()[40] - 100.0).abs() < 1e-9);
        assert!(NumberWheel::new(5.0, 1.0, 1.0).is_none());
        assert!(NumberWheel::new(0.0, 1.0, 0.0).is_none());
    }

    #[test]
    fn indices_wrap_in_both_directions() {
        let wheel = weights();
        assert!((wheel.value_at(41) - 0.0).abs() < 1e-9);
        assert!((wheel.value_at(-1) - 100.0).abs() < 1e-9);
        assert!((wheel.value_at(41 + 32) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn home_index_sits_in_the_middle_copy() {
        let wheel = weights();
        assert_eq!(wheel.home_index(80.0), 41 + 32);
        assert_eq!(wheel.home_index(-10.0), 41);
        assert_eq!(wheel.home_index(500.0), 41 + 40);
    }

    #[test]
    fn centre_and_scroll_are_inverse() {
        let wheel = weights();
        let scroll = wheel.scroll_for(60, 300.0);
        assert_eq!(wheel.center_index(scroll, 300.0), 60);
    }

    #[test]
    fn recentres_only_outside_the_middle_band() {
        let wheel = weights();
        let one_set = 41.0 * ITEM_WIDTH;
        assert!(wheel.recentre(one_set, 300.0).is_none());

        let near_start = wheel.scroll_for(3, 300.0).max(0.0);
        let moved = wheel.recentre(near_start, 300.0).unwrap();
        let index = wheel.center_index(moved, 300.0);
        assert_eq!(index, 41 + 3);
        assert!((wheel.value_at(index) - 7.5).abs() < 1e-9);
    }

    #[test]
    fn formats_whole_and_fractional_values() {
        assert_eq!(format_value(80.0), "80");
        assert_eq!(format_value(82.5), "82.5");
    }
}
