//! Dispense queue
//!
//! Per-module pending and dispensed counters. The host adds to or
//! replaces the pending counts; a confirmed drop moves one pill from
//! pending to dispensed. Counts are unsigned and never go below zero.

use super::module::{ModuleId, MODULE_COUNT};

/// Counters of one module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModuleCounters {
    /// Pills still to dispense
    pub queued: u16,
    /// Pills confirmed dispensed since boot
    pub dispensed: u32,
}

/// Pending work for all modules
#[derive(Debug, Clone, Default)]
pub struct DispenseQueue {
    modules: [ModuleCounters; MODULE_COUNT],
}

impl DispenseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counters(&self, module: ModuleId) -> ModuleCounters {
        self.modules[module.index()]
    }

    pub fn queued(&self, module: ModuleId) -> u16 {
        self.modules[module.index()].queued
    }

    /// Queued counts in module order
    pub fn queued_all(&self) -> [u16; MODULE_COUNT] {
        self.modules.map(|m| m.queued)
    }

    /// Add pills to a module's queue
    pub fn enqueue(&mut self, module: ModuleId, count: u16) {
        let slot = &mut self.modules[module.index()];
        slot.queued = slot.queued.saturating_add(count);
    }

    /// Replace every module's queued count
    pub fn set_all(&mut self, counts: [u16; MODULE_COUNT]) {
        for (slot, count) in self.modules.iter_mut().zip(counts) {
            slot.queued = count;
        }
    }

    /// First module, in index order, with pills pending
    pub fn next_pending(&self) -> Option<ModuleId> {
        ModuleId::all().find(|m| self.modules[m.index()].queued > 0)
    }

    /// Record a confirmed drop
    pub fn record_dispensed(&mut self, module: ModuleId) {
        let slot = &mut self.modules[module.index()];
        slot.dispensed = slot.dispensed.saturating_add(1);
        slot.queued = slot.queued.saturating_sub(1);
    }

    /// Sum of all queued counts
    pub fn total_queued(&self) -> u32 {
        self.modules.iter().map(|m| u32::from(m.queued)).sum()
    }
}
