/// Minimum horizontal travel, in pixels, for a swipe.
pub const SWIPE_MIN_DISTANCE: f64 = 80.0;

/// Horizontal travel must exceed vertical travel by this factor.
pub const SWIPE_DOMINANCE: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger moved left: go to the next exercise.
    Next,
    /// Finger moved right: go back.
    Previous,
}

/// Classify a touch from `start` to `end`.
///
/// Returns `None` unless `|dx| > 80` and `|dx| > 1.5 * |dy|`, with
/// `dx = start.x - end.x`.
#[must_use]
pub fn classify_swipe(start: Point, end: Point) -> Option<SwipeDirection> {
    let dx = start.x - end.x;
    let dy = (start.y - end.y).abs();

    if dx.abs() <= SWIPE_MIN_DISTANCE || dx.abs() <= dy * SWIPE_DOMINANCE {
        return None;
    }
    if dx > 0.0 {
        Some(SwipeDirection::Next)
    } else {
        Some(SwipeDirection::Previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mostly_horizontal_swipe_triggers() {
        let start = Point::new(300.0, 200.0);
        assert_eq!(
            classify_swipe(start, Point::new(200.0, 230.0)),
            Some(SwipeDirection::Next)
        );
        assert_eq!(
            classify_swipe(start, Point::new(400.0, 170.0)),
            Some(SwipeDirection::Previous)
        );
    }

    #[test]
    fn diagonal_swipe_is_ignored() {
        let start = Point::new(300.0, 200.0);
        assert_eq!(classify_swipe(start, Point::new(210.0, 270.0)), None);
    }

    #[test]
    fn short_swipe_is_ignored() {
        let start = Point::new(300.0, 200.0);
        assert_eq!(classify_swipe(start, Point::new(220.0, 200.0)), None);
    }
}
