//! Ownership container for the set of touch devices currently feeding the
//! contact tracker. The set is only ever replaced wholesale: teardown of the
//! old subscriptions, re-enumeration, subscription of the new list. It is
//! generic over the device facility so the bookkeeping is testable without
//! trackpad hardware.

use tracing::{debug, info};

use crate::error::DaemonError;

/// The OS multitouch facility, reduced to what the subscription set needs.
pub trait DeviceSource {
    type Device;

    /// Lists the touch-capable devices currently attached. An empty list is
    /// an error to the caller, not to this trait.
    fn enumerate(&mut self) -> Result<Vec<Self::Device>, DaemonError>;

    /// Registers the contact-frame callback and starts the device's stream.
    fn subscribe(&mut self, device: &Self::Device);

    /// Stops the stream, unregisters the callback, and releases the handle.
    fn unsubscribe(&mut self, device: &Self::Device);
}

/// The current device list plus whether its members are subscribed.
/// "Subscribed" and "member" are kept in lockstep: every device in `devices`
/// is registered exactly while `subscribed` is true, so no teardown path can
/// leave a callback firing on a released handle.
pub struct SubscriptionSet<S: DeviceSource> {
    source: S,
    devices: Vec<S::Device>,
    subscribed: bool,
}

impl<S: DeviceSource> SubscriptionSet<S> {
    /// Enumerates the initial set. Fails with `NoDeviceFound` if the facility
    /// reports no device; without a touch surface the daemon has no purpose.
    pub fn new(mut source: S) -> Result<Self, DaemonError> {
        let devices = source.enumerate()?;
        if devices.is_empty() {
            return Err(DaemonError::NoDeviceFound);
        }
        debug!(count = devices.len(), "enumerated multitouch devices");
        Ok(SubscriptionSet { source, devices, subscribed: false })
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn subscribe_all(&mut self) {
        if self.subscribed {
            return;
        }
        for device in &self.devices {
            self.source.subscribe(device);
        }
        self.subscribed = true;
    }

    /// Unregisters and releases every member, leaving the set empty.
    /// Idempotent: a second call on an already-drained set is a no-op.
    pub fn unsubscribe_all(&mut self) {
        if self.subscribed {
            for device in &self.devices {
                self.source.unsubscribe(device);
            }
            self.subscribed = false;
        }
        self.devices.clear();
    }

    /// Replaces the whole set after a topology change: teardown of the old
    /// subscriptions, fresh enumeration, subscription of the new list. Never
    /// an in-place mutation. On enumeration failure the set stays empty and
    /// unsubscribed.
    pub fn refresh(&mut self) -> Result<(), DaemonError> {
        self.unsubscribe_all();
        let devices = self.source.enumerate()?;
        if devices.is_empty() {
            return Err(DaemonError::NoDeviceFound);
        }
        self.devices = devices;
        self.subscribe_all();
        info!(count = self.devices.len(), "refreshed multitouch device subscriptions");
        Ok(())
    }
}

impl<S: DeviceSource> Drop for SubscriptionSet<S> {
    fn drop(&mut self) {
        self.unsubscribe_all();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[derive(Debug, Default)]
    struct FakeFacility {
        attached: Vec<u32>,
        registered: Vec<u32>,
        log: Vec<(&'static str, u32)>,
    }

    /// Shared handle so tests can inspect the facility while the set owns it.
    #[derive(Clone, Default)]
    struct FakeSource(Rc<RefCell<FakeFacility>>);

    impl DeviceSource for FakeSource {
        type Device = u32;

        fn enumerate(&mut self) -> Result<Vec<u32>, DaemonError> {
            Ok(self.0.borrow().attached.clone())
        }

        fn subscribe(&mut self, device: &u32) {
            let mut f = self.0.borrow_mut();
            f.registered.push(*device);
            f.log.push(("subscribe", *device));
        }

        fn unsubscribe(&mut self, device: &u32) {
            let mut f = self.0.borrow_mut();
            f.registered.retain(|d| d != device);
            f.log.push(("unsubscribe", *device));
        }
    }

    fn source_with(attached: &[u32]) -> FakeSource {
        let source = FakeSource::default();
        source.0.borrow_mut().attached = attached.to_vec();
        source
    }

    #[test]
    fn new_fails_when_no_devices_attached() {
        let result = SubscriptionSet::new(source_with(&[]));
        assert!(matches!(result, Err(DaemonError::NoDeviceFound)));
    }

    #[test]
    fn subscribe_all_registers_every_member_once() {
        let source = source_with(&[1, 2]);
        let mut set = SubscriptionSet::new(source.clone()).unwrap();
        set.subscribe_all();
        set.subscribe_all();
        assert_eq!(source.0.borrow().registered, vec![1, 2]);
        assert_eq!(source.0.borrow().log, vec![("subscribe", 1), ("subscribe", 2)]);
    }

    #[test]
    fn teardown_is_idempotent() {
        let source = source_with(&[7]);
        let mut set = SubscriptionSet::new(source.clone()).unwrap();
        set.subscribe_all();
        set.unsubscribe_all();
        set.unsubscribe_all();
        assert!(set.is_empty());
        assert!(source.0.borrow().registered.is_empty());
        assert_eq!(source.0.borrow().log, vec![("subscribe", 7), ("unsubscribe", 7)]);
    }

    #[test]
    fn refresh_matches_fresh_enumeration() {
        let source = source_with(&[1, 2]);
        let mut set = SubscriptionSet::new(source.clone()).unwrap();
        set.subscribe_all();

        // Topology change: device 2 detached, device 3 arrived.
        source.0.borrow_mut().attached = vec![1, 3];
        set.refresh().unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(source.0.borrow().registered, vec![1, 3]);
    }

    #[test]
    fn refresh_leaves_no_registration_on_departed_devices() {
        let source = source_with(&[1, 2]);
        let mut set = SubscriptionSet::new(source.clone()).unwrap();
        set.subscribe_all();

        source.0.borrow_mut().attached = vec![2];
        set.refresh().unwrap();

        assert_eq!(source.0.borrow().log, vec![
            ("subscribe", 1),
            ("subscribe", 2),
            ("unsubscribe", 1),
            ("unsubscribe", 2),
            ("subscribe", 2),
        ]);
    }

    #[test]
    fn refresh_fails_and_drains_when_all_devices_departed() {
        let source = source_with(&[4]);
        let mut set = SubscriptionSet::new(source.clone()).unwrap();
        set.subscribe_all();

        source.0.borrow_mut().attached = vec![];
        assert!(matches!(set.refresh(), Err(DaemonError::NoDeviceFound)));
        assert!(set.is_empty());
        assert!(source.0.borrow().registered.is_empty());
    }

    #[test]
    fn drop_unsubscribes_outstanding_registrations() {
        let source = source_with(&[9]);
        {
            let mut set = SubscriptionSet::new(source.clone()).unwrap();
            set.subscribe_all();
        }
        assert!(source.0.borrow().registered.is_empty());
    }
}
