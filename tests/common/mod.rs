#![allow(dead_code)]

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use recomp_tracker::runtime::{CompositionHost, LogSink, MemorySink, TrackingSettings};

/// Positional-memo host: call sites claim slots in execution order
pub struct TestHost {
    pub settings: TrackingSettings,
    pub sink: Arc<MemorySink>,
    pub slots: Vec<Rc<dyn Any>>,
    pub cursor: usize,
    pub effects: Vec<Box<dyn FnOnce()>>,
}

impl TestHost {
    pub fn new(settings: TrackingSettings) -> Self {
        Self {
            settings,
            sink: Arc::new(MemorySink::new()),
            slots: Vec::new(),
            cursor: 0,
            effects: Vec::new(),
        }
    }

    /// Run one render pass, drop slots no call site claimed, then commit
    pub fn compose(&mut self, content: impl FnOnce(&mut Self)) {
        self.cursor = 0;
        content(self);
        self.slots.truncate(self.cursor);
        self.run_effects();
    }

    pub fn run_effects(&mut self) {
        for effect in std::mem::take(&mut self.effects) {
            effect();
        }
    }

    pub fn dispose(&mut self) {
        self.slots.clear();
    }
}

impl CompositionHost for TestHost {
    fn settings(&self) -> TrackingSettings {
        self.settings
    }

    fn sink(&self) -> Arc<dyn LogSink> {
        self.sink.clone()
    }

    fn remember<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
        let index = self.cursor;
        self.cursor += 1;
        if let Some(slot) = self.slots.get(index) {
            if let Ok(cell) = Rc::clone(slot).downcast::<RefCell<T>>() {
                return cell;
            }
        }
        let cell = Rc::new(RefCell::new(init()));
        let slot: Rc<dyn Any> = cell.clone();
        if index < self.slots.len() {
            self.slots[index] = slot;
        } else {
            self.slots.push(slot);
        }
        cell
    }

    fn side_effect(&mut self, effect: Box<dyn FnOnce()>) {
        self.effects.push(effect);
    }
}
