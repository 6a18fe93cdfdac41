//! Hero carousel selection.
//!
//! [`Carousel`] is the index state machine; [`step`] runs one animated transition and
//! [`spawn_auto_advance`] drives it from a timer. A transition requested while another
//! one is animating is dropped, not queued.

use std::sync::Arc;
use std::time::Duration;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, Instant},
};

pub const AUTO_ADVANCE_INTERVAL: Duration = Duration::from_secs(6);
pub const TRANSITION_DURATION: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    index: usize,
    animating: bool,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Carousel {
            len,
            index: 0,
            animating: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Follows a change of the featured collection, keeping the index in range.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.index >= len {
            self.index = 0;
        }
    }

    /// Starts a transition. `None` when empty or already animating.
    pub fn begin(&mut self, direction: Direction) -> Option<usize> {
        let target = match direction {
            Direction::Next => (self.index + 1) % self.len.max(1),
            Direction::Previous => (self.index + self.len.max(1) - 1) % self.len.max(1),
        };
        self.go_to(target)
    }

    pub fn next(&mut self) -> Option<usize> {
        self.begin(Direction::Next)
    }

    pub fn prev(&mut self) -> Option<usize> {
        self.begin(Direction::Previous)
    }

    /// Jumps to a slide (the indicator dots). Out-of-range targets are ignored.
    pub fn go_to(&mut self, target: usize) -> Option<usize> {
        if self.animating || self.len == 0 || target >= self.len {
            return None;
        }
        self.animating = true;
        self.index = target;
        Some(target)
    }

    pub fn finish_transition(&mut self) {
        self.animating = false;
    }
}

/// Runs one transition: move, hold the guard for [`TRANSITION_DURATION`], release.
pub async fn step(carousel: &Mutex<Carousel>, direction: Direction) -> Option<usize> {
    let index = carousel.lock().await.begin(direction)?;
    time::sleep(TRANSITION_DURATION).await;
    carousel.lock().await.finish_transition();
    Some(index)
}

/// Aborts the auto-advance timer when dropped.
pub struct AutoAdvance {
    handle: JoinHandle<()>,
}

impl Drop for AutoAdvance {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Advances the carousel every [`AUTO_ADVANCE_INTERVAL`]; ticks that land on a running
/// transition are skipped. The receiver always holds the current index.
pub fn spawn_auto_advance(carousel: Arc<Mutex<Carousel>>) -> (watch::Receiver<usize>, AutoAdvance) {
    let (tx, rx) = watch::channel(0);
    let handle = tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + AUTO_ADVANCE_INTERVAL, AUTO_ADVANCE_INTERVAL);
        loop {
            ticker.tick().await;
            if let Some(index) = step(&carousel, Direction::Next).await {
                if tx.send(index).is_err() {
                    break;
                }
            }
        }
    });
    (rx, AutoAdvance { handle })
}
