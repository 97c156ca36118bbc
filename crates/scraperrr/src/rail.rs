use std::time::{Duration, Instant};

use crate::settings::RailOptions;

/// Focus position over the rail's items.
///
/// An empty rail has no focus; every movement is then a no-op.
#[derive(Debug, Clone)]
pub struct FocusRail {
    len: usize,
    focused: usize,
    looping: bool,
    autoplay: Option<Duration>,
    last_move: Instant,
}

impl FocusRail {
    pub fn new_at(options: RailOptions, now: Instant) -> Self {
        Self {
            len: 0,
            focused: 0,
            looping: options.looping,
            autoplay: options.autoplay,
            last_move: now,
        }
    }

    /// Replaces the item count and puts focus back on the first item.
    pub fn reset(&mut self, len: usize, now: Instant) {
        self.len = len;
        self.focused = 0;
        self.last_move = now;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn focused(&self) -> Option<usize> {
        (self.len > 0).then_some(self.focused)
    }

    /// Moves right; returns whether focus changed.
    pub fn next(&mut self, now: Instant) -> bool {
        if self.len == 0 {
            return false;
        }
        let target = if self.focused + 1 < self.len {
            self.focused + 1
        } else if self.looping {
            0
        } else {
            return false;
        };
        self.move_to(target, now)
    }

    /// Moves left; returns whether focus changed.
    pub fn previous(&mut self, now: Instant) -> bool {
        if self.len == 0 {
            return false;
        }
        let target = if self.focused > 0 {
            self.focused - 1
        } else if self.looping {
            self.len - 1
        } else {
            return false;
        };
        self.move_to(target, now)
    }

    /// When the next autoplay step is due, if autoplay is on.
    pub fn autoplay_deadline(&self) -> Option<Instant> {
        if self.len < 2 {
            return None;
        }
        self.autoplay.map(|interval| self.last_move + interval)
    }

    /// Advances once if the autoplay interval has elapsed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.autoplay_deadline() {
            Some(deadline) if now >= deadline => {
                let moved = self.next(now);
                if !moved {
                    // Stopped at the end of a non-looping rail.
                    self.autoplay = None;
                }
                moved
            }
            _ => false,
        }
    }

    fn move_to(&mut self, target: usize, now: Instant) -> bool {
        self.last_move = now;
        if target == self.focused {
            return false;
        }
        self.focused = target;
        true
    }
}
