//! IOKit device-arrival notifications. A first-match notification on the
//! multitouch device class triggers a wholesale rebuild of the subscription
//! set, which is how the daemon survives trackpads being plugged, unplugged,
//! or re-enumerated after sleep.

use std::cell::RefCell;
use std::ffi::{c_char, c_void, CStr};
use std::process;
use std::rc::Rc;

use objc2_core_foundation::{
    kCFRunLoopDefaultMode, CFMutableDictionary, CFRunLoop, CFRunLoopSource,
};
use tracing::{debug, error};

use crate::devices::SubscriptionSet;
use crate::error::DaemonError;
use crate::sys::multitouch::MultitouchSource;

#[allow(non_camel_case_types)]
pub type mach_port_t = u32;
#[allow(non_camel_case_types)]
pub type io_object_t = mach_port_t;
#[allow(non_camel_case_types)]
pub type io_iterator_t = io_object_t;
#[allow(non_camel_case_types)]
pub type kern_return_t = i32;

type IONotificationPortRef = *mut c_void;
type IOServiceMatchingCallback = unsafe extern "C" fn(*mut c_void, io_iterator_t);

const KERN_SUCCESS: kern_return_t = 0;
const MAIN_PORT_DEFAULT: mach_port_t = 0;

/// kIOFirstMatchNotification
const FIRST_MATCH_NOTIFICATION: &CStr = c"IOServiceFirstMatch";
const DEVICE_CLASS: &CStr = c"AppleMultitouchDevice";

#[link(name = "IOKit", kind = "framework")]
unsafe extern "C" {
    fn IONotificationPortCreate(main_port: mach_port_t) -> IONotificationPortRef;
    fn IONotificationPortGetRunLoopSource(port: IONotificationPortRef) -> *mut CFRunLoopSource;
    fn IONotificationPortDestroy(port: IONotificationPortRef);
    fn IOServiceMatching(name: *const c_char) -> *mut CFMutableDictionary;
    fn IOServiceAddMatchingNotification(
        port: IONotificationPortRef,
        notification_type: *const c_char,
        matching: *mut CFMutableDictionary,
        callback: IOServiceMatchingCallback,
        refcon: *mut c_void,
        iterator: *mut io_iterator_t,
    ) -> kern_return_t;
    fn IOIteratorNext(iterator: io_iterator_t) -> io_object_t;
    fn IOObjectRelease(object: io_object_t) -> kern_return_t;
}

pub type Subscriptions = Rc<RefCell<SubscriptionSet<MultitouchSource>>>;

struct WatchCtx {
    subscriptions: Subscriptions,
}

/// Owns the notification port for the lifetime of the daemon. Dropping it
/// removes the notification and frees the callback context.
pub struct HotplugWatcher {
    port: IONotificationPortRef,
    ctx: *mut WatchCtx,
}

impl HotplugWatcher {
    /// Installs the first-match notification on the main run loop. Any
    /// failure here is `NotificationSetupFailed`; the component never retries
    /// on its own.
    pub fn start(subscriptions: Subscriptions) -> Result<Self, DaemonError> {
        let port = unsafe { IONotificationPortCreate(MAIN_PORT_DEFAULT) };
        if port.is_null() {
            return Err(DaemonError::NotificationSetupFailed);
        }

        let source = unsafe { IONotificationPortGetRunLoopSource(port) };
        if source.is_null() {
            unsafe { IONotificationPortDestroy(port) };
            return Err(DaemonError::NotificationSetupFailed);
        }
        let Some(run_loop) = CFRunLoop::main() else {
            unsafe { IONotificationPortDestroy(port) };
            return Err(DaemonError::NotificationSetupFailed);
        };
        unsafe { run_loop.add_source(Some(&*source), kCFRunLoopDefaultMode) };

        let ctx = Box::into_raw(Box::new(WatchCtx { subscriptions }));
        let mut iterator: io_iterator_t = 0;
        let kres = unsafe {
            // The matching dictionary is consumed by the notification call.
            let matching = IOServiceMatching(DEVICE_CLASS.as_ptr());
            IOServiceAddMatchingNotification(
                port,
                FIRST_MATCH_NOTIFICATION.as_ptr(),
                matching,
                device_arrived,
                ctx.cast(),
                &mut iterator,
            )
        };
        if kres != KERN_SUCCESS {
            unsafe {
                drop(Box::from_raw(ctx));
                IONotificationPortDestroy(port);
            }
            return Err(DaemonError::NotificationSetupFailed);
        }

        // The initial iterator must be drained once to arm the notification.
        drain(iterator);

        Ok(HotplugWatcher { port, ctx })
    }
}

impl Drop for HotplugWatcher {
    fn drop(&mut self) {
        unsafe {
            IONotificationPortDestroy(self.port);
            drop(Box::from_raw(self.ctx));
        }
    }
}

fn drain(iterator: io_iterator_t) {
    loop {
        let item = unsafe { IOIteratorNext(iterator) };
        if item == 0 {
            break;
        }
        let _ = unsafe { IOObjectRelease(item) };
    }
}

/// Fires on the main run loop once per arrival batch, the same execution
/// context the frame callbacks are registered from.
unsafe extern "C" fn device_arrived(refcon: *mut c_void, iterator: io_iterator_t) {
    drain(iterator);

    let ctx = unsafe { &*(refcon as *const WatchCtx) };
    debug!("multitouch topology changed; rebuilding subscriptions");
    if let Err(err) = ctx.subscriptions.borrow_mut().refresh() {
        // Every touch surface is gone; the daemon has nothing left to do.
        error!("device refresh failed after topology change: {err}");
        process::exit(1);
    }
}
