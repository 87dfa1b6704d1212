//! A simulated viewport that queues resize events per subscriber.

use std::collections::BTreeMap;

use crate::clamp::surface::{ChangeNotifier, ResizeSubscription};

#[derive(Debug, Clone, Default)]
pub struct SimulatedViewport {
    width_px: f32,
    next_id: u64,
    /// Pending (undelivered) resize events per live subscription.
    listeners: BTreeMap<ResizeSubscription, usize>,
}

impl SimulatedViewport {
    pub fn new(width_px: f32) -> Self {
        SimulatedViewport {
            width_px,
            ..Self::default()
        }
    }

    pub fn width(&self) -> f32 {
        self.width_px
    }

    /// Changes the width and queues one event for every live subscription.
    pub fn resize(&mut self, width_px: f32) {
        self.width_px = width_px;
        for pending in self.listeners.values_mut() {
            *pending += 1;
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ChangeNotifier for SimulatedViewport {
    fn subscribe_resize(&mut self) -> ResizeSubscription {
        let id = ResizeSubscription(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, 0);
        id
    }

    fn unsubscribe_resize(&mut self, subscription: ResizeSubscription) {
        self.listeners.remove(&subscription);
    }

    fn take_resize_events(&mut self, subscription: ResizeSubscription) -> usize {
        self.listeners
            .get_mut(&subscription)
            .map(std::mem::take)
            .unwrap_or(0)
    }
}
