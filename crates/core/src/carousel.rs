//! Auto-advancing featured carousel.

use std::time::{Duration, Instant};

/// Default interval between automatic slide changes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Slide position and auto-advance timer. Time is passed in explicitly so
/// the carousel can be driven from any tick source.
#[derive(Debug, Clone)]
pub struct Carousel {
    len: usize,
    index: usize,
    interval: Duration,
    hovered: bool,
    deadline: Option<Instant>,
}

impl Carousel {
    /// Empty carousel with the given auto-advance interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            len: 0,
            index: 0,
            interval,
            hovered: false,
            deadline: None,
        }
    }

    /// Replace the slide count, rewinding to the first slide.
    pub fn reset(&mut self, len: usize, now: Instant) {
        self.len = len;
        self.index = 0;
        self.restart_timer(now);
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no slides.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current slide.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether auto-advance is currently suspended.
    pub fn is_paused(&self) -> bool {
        self.deadline.is_none()
    }

    /// Jump to `index`, wrapping in both directions, and restart the timer.
    pub fn show(&mut self, index: isize, now: Instant) {
        self.go_to(index);
        self.restart_timer(now);
    }

    /// Manual step forward.
    pub fn next(&mut self, now: Instant) {
        self.show(self.index as isize + 1, now);
    }

    /// Manual step back.
    pub fn prev(&mut self, now: Instant) {
        self.show(self.index as isize - 1, now);
    }

    /// Pointer entered the carousel: stop auto-advance.
    pub fn hover_start(&mut self) {
        self.hovered = true;
        self.deadline = None;
    }

    /// Pointer left the carousel: resume auto-advance.
    pub fn hover_end(&mut self, now: Instant) {
        self.hovered = false;
        self.restart_timer(now);
    }

    /// Advance if the interval has elapsed. Returns whether the slide changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.go_to(self.index as isize + 1);
                self.deadline = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    fn go_to(&mut self, index: isize) {
        if self.len == 0 {
            return;
        }
        let len = self.len as isize;
        self.index = index.rem_euclid(len) as usize;
    }

    fn restart_timer(&mut self, now: Instant) {
        self.deadline = if self.len > 1 && !self.hovered {
            Some(now + self.interval)
        } else {
            None
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_in_both_directions() {
        let now = Instant::now();
        let mut carousel = Carousel::new(DEFAULT_INTERVAL);
        carousel.reset(3, now);
        carousel.prev(now);
        assert_eq!(carousel.index(), 2);
        carousel.next(now);
        assert_eq!(carousel.index(), 0);
        carousel.show(7, now);
        assert_eq!(carousel.index(), 1);
    }

    #[test]
    fn auto_advances_after_interval() {
        let start = Instant::now();
        let mut carousel = Carousel::new(DEFAULT_INTERVAL);
        carousel.reset(2, start);
        assert!(!carousel.tick(start + Duration::from_secs(4)));
        assert!(carousel.tick(start + Duration::from_secs(5)));
        assert_eq!(carousel.index(), 1);
        assert!(!carousel.tick(start + Duration::from_secs(6)));
        assert!(carousel.tick(start + Duration::from_secs(10)));
        assert_eq!(carousel.index(), 0);
    }

    #[test]
    fn manual_navigation_resets_timer() {
        let start = Instant::now();
        let mut carousel = Carousel::new(DEFAULT_INTERVAL);
        carousel.reset(3, start);
        carousel.next(start + Duration::from_secs(4));
        assert!(!carousel.tick(start + Duration::from_secs(6)));
        assert!(carousel.tick(start + Duration::from_secs(9)));
        assert_eq!(carousel.index(), 2);
    }

    #[test]
    fn hover_pauses() {
        let start = Instant::now();
        let mut carousel = Carousel::new(DEFAULT_INTERVAL);
        carousel.reset(3, start);
        carousel.hover_start();
        assert!(carousel.is_paused());
        assert!(!carousel.tick(start + Duration::from_secs(60)));
        carousel.next(start + Duration::from_secs(60));
        assert!(carousel.is_paused());
        carousel.hover_end(start + Duration::from_secs(61));
        assert!(carousel.tick(start + Duration::from_secs(66)));
    }

    #[test]
    fn single_slide_never_advances() {
        let start = Instant::now();
        let mut carousel = Carousel::new(DEFAULT_INTERVAL);
        carousel.reset(1, start);
        assert!(carousel.is_paused());
        assert!(!carousel.tick(start + Duration::from_secs(30)));
    }
}
