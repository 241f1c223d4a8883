use dreppy_core::gesture::{Point, SwipeDirection, classify_swipe};

/// Remembers where a touch began so its end can be classified.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SwipeTracker {
    start: Option<Point>,
}

impl SwipeTracker {
    pub fn begin(&mut self, at: Point) {
        self.start = Some(at);
    }

    /// Finish the touch; a touch that never began yields nothing.
    pub fn end(&mut self, at: Point) -> Option<SwipeDirection> {
        let start = self.start.take()?;
        classify_swipe(start, at)
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }
}
