use std::sync::atomic::{AtomicU32, Ordering};

/// The process-wide tracker written by the multitouch frame callback. The
/// callback API carries no user-data pointer, so this has to be a static.
pub static CONTACTS: ContactTracker = ContactTracker::new();

/// Last-write-wins count of fingers currently touching any subscribed device.
///
/// The frame callback runs on the driver's schedule, the reader on the run
/// loop's; neither may block the other, so this is a relaxed atomic rather
/// than a lock. A read may be one frame stale, which the gesture tolerates.
#[derive(Debug)]
pub struct ContactTracker {
    count: AtomicU32,
}

impl ContactTracker {
    pub const fn new() -> Self {
        ContactTracker { count: AtomicU32::new(0) }
    }

    /// Overwrites the count with what the latest frame reported. The value is
    /// trusted driver data; 0 is legitimate.
    pub fn record_frame(&self, contacts: u32) {
        self.count.store(contacts, Ordering::Relaxed);
    }

    pub fn current(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for ContactTracker {
    fn default() -> Self {
        Self::new()
    }
}
