use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};
use uuid::Uuid;

use crate::progress::{Region, ScrollMetrics, ScrollProgress};

pub type ProgressCallback = dyn FnMut(ScrollProgress);

struct Subscriber {
    id: Uuid,
    region: Region,
    last: Option<ScrollProgress>,
    callback: Rc<RefCell<Box<ProgressCallback>>>,
}

#[derive(Default)]
struct HubState {
    latest: Option<ScrollMetrics>,
    pending: bool,
    subscribers: Vec<Subscriber>,
}

/// The page-wide scroll subscription.
///
/// The page shell publishes every scroll reading and flushes once per frame;
/// only the most recent reading is delivered, so intermediate frames are
/// dropped. Each subscriber receives progress for its own region and only
/// when that progress changed.
#[derive(Clone, Default)]
pub struct ProgressHub {
    state: Rc<RefCell<HubState>>,
}

impl ProgressHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, region: Region, callback: F) -> Subscription
    where
        F: FnMut(ScrollProgress) + 'static,
    {
        let id = Uuid::new_v4();
        let mut state = self.state.borrow_mut();

        state.subscribers.push(Subscriber {
            id,
            region,
            last: None,
            callback: Rc::new(RefCell::new(Box::new(callback))),
        });
        // new subscribers catch up on the next flush
        let has_reading = state.latest.is_some();
        state.pending |= has_reading;

        debug!("progress subscriber {} added", id);

        Subscription {
            id,
            hub: Rc::downgrade(&self.state),
        }
    }

    /// Records a scroll reading. Last reading before `flush` wins.
    pub fn publish(&self, metrics: ScrollMetrics) {
        let mut state = self.state.borrow_mut();
        state.latest = Some(metrics);
        state.pending = true;
    }

    pub fn latest(&self) -> Option<ScrollMetrics> {
        self.state.borrow().latest
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().pending
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().subscribers.len()
    }

    /// Delivers the latest reading to every subscriber whose progress changed.
    /// Returns the number of callbacks invoked.
    pub fn flush(&self) -> usize {
        let deliveries: Vec<_> = {
            let mut state = self.state.borrow_mut();
            if !state.pending {
                return 0;
            }
            state.pending = false;

            let Some(metrics) = state.latest else {
                return 0;
            };

            state
                .subscribers
                .iter_mut()
                .filter_map(|subscriber| {
                    let progress = subscriber.region.progress(metrics);
                    if subscriber.last == Some(progress) {
                        return None;
                    }
                    subscriber.last = Some(progress);
                    Some((Rc::clone(&subscriber.callback), progress))
                })
                .collect()
        };

        // state is released so callbacks may subscribe or unsubscribe
        for (callback, progress) in &deliveries {
            (callback.borrow_mut())(*progress);
        }

        trace!("flushed progress to {} subscribers", deliveries.len());

        deliveries.len()
    }
}

/// Handle returned by `ProgressHub::subscribe`. Dropping it unsubscribes.
pub struct Subscription {
    id: Uuid,
    hub: Weak<RefCell<HubState>>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Replaces the region after a layout change and re-delivers on the next flush.
    pub fn set_region(&self, region: Region) {
        let Some(state) = self.hub.upgrade() else {
            return;
        };
        let mut state = state.borrow_mut();

        if let Some(subscriber) = state.subscribers.iter_mut().find(|s| s.id == self.id) {
            subscriber.region = region;
            subscriber.last = None;
        }
        let has_reading = state.latest.is_some();
        state.pending |= has_reading;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(state) = self.hub.upgrade() else {
            return;
        };
        // flush releases the hub before running callbacks
        if let Ok(mut state) = state.try_borrow_mut() {
            state.subscribers.retain(|s| s.id != self.id);
            debug!("progress subscriber {} removed", self.id);
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<f32>>>, impl FnMut(ScrollProgress)) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |p: ScrollProgress| sink.borrow_mut().push(p.value()))
    }

    #[test]
    fn last_published_reading_wins() {
        let hub = ProgressHub::new();
        let (seen, callback) = recorder();
        let _sub = hub.subscribe(Region::new(0.0, 2000.0), callback);

        hub.publish(ScrollMetrics::new(100.0, 1000.0));
        hub.publish(ScrollMetrics::new(300.0, 1000.0));
        hub.publish(ScrollMetrics::new(500.0, 1000.0));
        assert_eq!(hub.flush(), 1);

        assert_eq!(*seen.borrow(), vec![0.5]);
    }

    #[test]
    fn unchanged_progress_is_not_redelivered() {
        let hub = ProgressHub::new();
        let (seen, callback) = recorder();
        let _sub = hub.subscribe(Region::new(5000.0, 3000.0), callback);

        hub.publish(ScrollMetrics::new(0.0, 1000.0));
        hub.flush();
        hub.publish(ScrollMetrics::new(10.0, 1000.0));
        assert_eq!(hub.flush(), 0);
        assert_eq!(hub.flush(), 0);

        assert_eq!(*seen.borrow(), vec![0.0]);
    }

    #[test]
    fn each_subscriber_gets_its_own_region() {
        let hub = ProgressHub::new();
        let (hero, hero_cb) = recorder();
        let (process, process_cb) = recorder();
        let _a = hub.subscribe(Region::new(0.0, 3000.0), hero_cb);
        let _b = hub.subscribe(Region::new(3000.0, 2000.0), process_cb);

        hub.publish(ScrollMetrics::new(3500.0, 1000.0));
        assert_eq!(hub.flush(), 2);

        assert_eq!(*hero.borrow(), vec![1.0]);
        assert_eq!(*process.borrow(), vec![0.5]);
    }

    #[test]
    fn dropping_subscription_stops_delivery() {
        let hub = ProgressHub::new();
        let (seen, callback) = recorder();
        let sub = hub.subscribe(Region::new(0.0, 2000.0), callback);
        assert_eq!(hub.subscriber_count(), 1);

        drop(sub);
        assert_eq!(hub.subscriber_count(), 0);

        hub.publish(ScrollMetrics::new(500.0, 1000.0));
        assert_eq!(hub.flush(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn late_subscriber_catches_up_on_next_flush() {
        let hub = ProgressHub::new();
        hub.publish(ScrollMetrics::new(250.0, 1000.0));
        hub.flush();

        let (seen, callback) = recorder();
        let _sub = hub.subscribe(Region::new(0.0, 2000.0), callback);
        assert!(hub.is_pending());
        hub.flush();

        assert_eq!(*seen.borrow(), vec![0.25]);
    }

    #[test]
    fn region_change_redelivers() {
        let hub = ProgressHub::new();
        let (seen, callback) = recorder();
        let sub = hub.subscribe(Region::new(0.0, 2000.0), callback);

        hub.publish(ScrollMetrics::new(500.0, 1000.0));
        hub.flush();
        sub.set_region(Region::new(0.0, 3000.0));
        hub.flush();

        assert_eq!(*seen.borrow(), vec![0.5, 0.25]);
    }

    #[test]
    fn dropping_one_subscription_keeps_the_others() {
        let hub = ProgressHub::new();
        let (kept, kept_cb) = recorder();
        let (dropped, dropped_cb) = recorder();
        let _kept = hub.subscribe(Region::new(0.0, 2000.0), kept_cb);
        let gone = hub.subscribe(Region::new(0.0, 2000.0), dropped_cb);

        drop(gone);
        assert_eq!(hub.subscriber_count(), 1);

        hub.publish(ScrollMetrics::new(250.0, 1000.0));
        assert_eq!(hub.flush(), 1);
        assert_eq!(*kept.borrow(), vec![0.25]);
        assert!(dropped.borrow().is_empty());
    }

    #[test]
    fn subscription_outliving_hub_is_harmless() {
        let hub = ProgressHub::new();
        let sub = hub.subscribe(Region::new(0.0, 2000.0), |_| {});
        drop(hub);

        sub.set_region(Region::new(0.0, 10.0));
        drop(sub);
    }
}
