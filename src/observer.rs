//! Subscriber registry for per-tick data notifications.

use crate::buffer::SampleBuffer;

/// Handle returned by [`UpdateBroadcaster::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Callback = Box<dyn FnMut(&SampleBuffer)>;

/// Ordered registry of update subscribers.
///
/// [`notify`](UpdateBroadcaster::notify) runs synchronously, in registration
/// order, and fires at most once per tick, only when that tick produced a
/// non-empty batch. Subscribers pull the slots they care about from the
/// buffer view they are handed; there is no per-subscriber payload.
#[derive(Default)]
pub struct UpdateBroadcaster {
    subscribers: Vec<(SubscriberId, Callback)>,
    next_id: u64,
}

impl UpdateBroadcaster {
    pub fn new() -> UpdateBroadcaster {
        UpdateBroadcaster::default()
    }

    /// Register a subscriber; it stays registered until explicitly removed.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriberId
    where
        F: FnMut(&SampleBuffer) + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false when the id is not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Invoke every registered subscriber with the current buffer view.
    pub fn notify(&mut self, frames: &SampleBuffer) {
        for (_, callback) in &mut self.subscribers {
            callback(frames);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn notify_runs_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut broadcaster = UpdateBroadcaster::new();
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            broadcaster.subscribe(move |_| order.borrow_mut().push(tag));
        }

        broadcaster.notify(&SampleBuffer::default());
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let hits = Rc::new(RefCell::new(0));
        let mut broadcaster = UpdateBroadcaster::new();
        let id = {
            let hits = hits.clone();
            broadcaster.subscribe(move |_| *hits.borrow_mut() += 1)
        };

        let frames = SampleBuffer::default();
        broadcaster.notify(&frames);
        assert!(broadcaster.unsubscribe(id));
        broadcaster.notify(&frames);

        assert_eq!(*hits.borrow(), 1);
        assert!(!broadcaster.unsubscribe(id));
        assert!(broadcaster.is_empty());
    }

    #[test]
    fn subscribers_see_current_counts() {
        let seen = Rc::new(RefCell::new(0usize));
        let mut broadcaster = UpdateBroadcaster::new();
        {
            let seen = seen.clone();
            broadcaster.subscribe(move |frames| *seen.borrow_mut() = frames.marker_count());
        }

        let mut frames = SampleBuffer::new(8);
        frames.commit_markers(5, 1.0);
        broadcaster.notify(&frames);
        assert_eq!(*seen.borrow(), 5);
    }
}
