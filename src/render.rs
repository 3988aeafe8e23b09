//! Render scheduler.
//!
//! Redraw is requested, never performed immediately. Requests accumulate until the host
//! paints and calls [`RenderScheduler::take`]. Three strategies exist, cheapest first:
//!
//! - selective: an explicit set of cells (live updates, flashes)
//! - full: every visible cell
//! - reactive: a change counter the host's render loop observes and reconciles against
//!
//! Overlapping requests for the same cell coalesce, and painting always reads the current
//! cell state, so repeated requests are idempotent.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::model::Item;

/// What the next paint has to cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redraw {
    Nothing,
    /// Logical cell addresses
    Cells(Vec<Item>),
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Flash {
    started: Instant,
    duration: Duration,
}

#[derive(Debug, Default)]
pub struct RenderScheduler {
    damaged: BTreeSet<Item>,
    full: bool,
    generation: u64,
    /// Number of cells on screen; damage past half of it escalates to a full redraw
    visible_cells: usize,
    /// Keyed by logical cell; a new flash on a cell replaces the running one
    flashes: HashMap<Item, Flash>,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_visible_cells(&mut self, count: usize) {
        self.visible_cells = count;
        self.check_escalation();
    }

    /// Selective redraw of logical cells
    pub fn damage_cells<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = Item>,
    {
        if self.full {
            return;
        }
        self.damaged.extend(items);
        self.check_escalation();
    }

    pub fn redraw_all(&mut self) {
        self.full = true;
        self.damaged.clear();
    }

    /// Reactive redraw: bump the change counter and repaint everything.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.redraw_all();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_pending(&self) -> bool {
        self.full || !self.damaged.is_empty()
    }

    pub fn needs_full_redraw(&self) -> bool {
        self.full
    }

    /// Hand the pending work to the painter and reset.
    pub fn take(&mut self) -> Redraw {
        let redraw = if self.full {
            Redraw::Full
        } else if self.damaged.is_empty() {
            Redraw::Nothing
        } else {
            Redraw::Cells(self.damaged.iter().copied().collect())
        };
        self.full = false;
        self.damaged.clear();
        redraw
    }

    fn check_escalation(&mut self) {
        if self.visible_cells > 0 && self.damaged.len() * 2 > self.visible_cells {
            trace!(damaged = self.damaged.len(), visible = self.visible_cells, "escalating to full redraw");
            self.redraw_all();
        }
    }

    /// Start a highlight on `items` that fades out over `duration`.
    pub fn flash<I>(&mut self, items: I, now: Instant, duration: Duration)
    where
        I: IntoIterator<Item = Item>,
    {
        let items: Vec<Item> = items.into_iter().collect();
        let flash = Flash { started: now, duration };
        self.flashes.extend(items.iter().map(|&item| (item, flash)));
        self.damage_cells(items);
    }

    /// Remaining flash strength of a cell, from 1 down to 0
    pub fn flash_level(&self, item: Item, now: Instant) -> Option<f32> {
        let flash = self.flashes.get(&item)?;
        let elapsed = now.saturating_duration_since(flash.started);
        if elapsed >= flash.duration {
            return None;
        }
        Some(1.0 - elapsed.as_secs_f32() / flash.duration.as_secs_f32())
    }

    pub fn is_animating(&self) -> bool {
        !self.flashes.is_empty()
    }

    /// Advance flash animations: every flashing cell is repainted, finished ones dropped.
    pub fn tick(&mut self, now: Instant) {
        let items: Vec<Item> = self.flashes.keys().copied().collect();
        self.flashes
            .retain(|_, f| now.saturating_duration_since(f.started) < f.duration);
        self.damage_cells(items);
    }
}

/// Imperative redraw handle returned when a grid is built.
///
/// Hosts keep it wherever they push live updates; clones share the same scheduler.
#[derive(Debug, Clone, Default)]
pub struct GridHandle {
    scheduler: Rc<RefCell<RenderScheduler>>,
}

impl GridHandle {
    pub(crate) fn new(scheduler: Rc<RefCell<RenderScheduler>>) -> Self {
        Self { scheduler }
    }

    /// Repaint the given logical cells on the next frame
    pub fn update_cells(&self, items: &[Item]) {
        self.scheduler.borrow_mut().damage_cells(items.iter().copied());
    }

    pub fn redraw_all(&self) {
        self.scheduler.borrow_mut().redraw_all();
    }

    pub fn invalidate(&self) {
        self.scheduler.borrow_mut().invalidate();
    }

    pub fn generation(&self) -> u64 {
        self.scheduler.borrow().generation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_requests_coalesce() {
        let mut s = RenderScheduler::new();
        s.damage_cells([Item::new(1, 1), Item::new(0, 0)]);
        s.damage_cells([Item::new(1, 1)]);
        assert_eq!(s.take(), Redraw::Cells(vec![Item::new(0, 0), Item::new(1, 1)]));
        assert_eq!(s.take(), Redraw::Nothing);
    }

    #[test]
    fn test_escalates_when_most_cells_change() {
        let mut s = RenderScheduler::new();
        s.set_visible_cells(4);
        s.damage_cells([Item::new(0, 0), Item::new(1, 0)]);
        assert!(!s.needs_full_redraw());
        s.damage_cells([Item::new(2, 0)]);
        assert_eq!(s.take(), Redraw::Full);
    }

    #[test]
    fn test_invalidate_bumps_generation() {
        let mut s = RenderScheduler::new();
        s.invalidate();
        s.invalidate();
        assert_eq!(s.generation(), 2);
        assert_eq!(s.take(), Redraw::Full);
    }

    #[test]
    fn test_handle_shares_scheduler() {
        let scheduler = Rc::new(RefCell::new(RenderScheduler::new()));
        let handle = GridHandle::new(scheduler.clone());
        handle.clone().update_cells(&[Item::new(3, 4)]);
        assert_eq!(scheduler.borrow_mut().take(), Redraw::Cells(vec![Item::new(3, 4)]));
        handle.redraw_all();
        assert!(scheduler.borrow().needs_full_redraw());
    }

    #[test]
    fn test_flash_fades_out() {
        let mut s = RenderScheduler::new();
        let start = Instant::now();
        let item = Item::new(0, 0);
        s.flash([item], start, Duration::from_millis(100));
        assert_eq!(s.flash_level(item, start), Some(1.0));
        let half = s.flash_level(item, start + Duration::from_millis(50)).unwrap();
        assert!((half - 0.5).abs() < 1e-3);
        assert_eq!(s.flash_level(item, start + Duration::from_millis(100)), None);

        s.take();
        s.tick(start + Duration::from_millis(200));
        assert!(!s.is_animating());
        assert_eq!(s.take(), Redraw::Cells(vec![item]));
    }

    #[test]
    fn test_reflash_replaces_running_flashes() {
        let mut s = RenderScheduler::new();
        let start = Instant::now();
        let items: Vec<Item> = (0..50_000).map(|row| Item::new(row % 5, row)).collect();
        s.flash(items.iter().copied(), start, Duration::from_millis(100));
        let later = start + Duration::from_millis(60);
        s.flash(items.iter().copied(), later, Duration::from_millis(100));

        assert_eq!(s.flashes.len(), items.len());
        assert_eq!(s.flash_level(items[0], later), Some(1.0));
        assert!(s.flash_level(items[49_999], start + Duration::from_millis(120)).is_some());
        assert_eq!(s.flash_level(Item::new(9, 9), later), None);
    }
}
