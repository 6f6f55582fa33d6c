//! Bindings to the private MultitouchSupport framework and the contact-frame
//! callback that feeds the contact tracker. These APIs are undocumented and
//! reverse-engineered; they can change between macOS releases.

use std::ffi::{c_double, c_int, c_void};
use std::ptr::NonNull;

use objc2_core_foundation::{CFMutableArray, CFRetained};

use crate::devices::DeviceSource;
use crate::error::DaemonError;
use crate::gesture::CONTACTS;

/// One contact record inside a frame. The layout is reverse-engineered and we
/// never read past the pointer, so it stays opaque here.
#[repr(C)]
pub struct MTTouch {
    _opaque: [u8; 0],
}

pub type MTDeviceRef = *mut c_void;

pub type MTContactCallback =
    unsafe extern "C" fn(c_int, *mut MTTouch, c_int, c_double, c_int) -> c_int;

#[link(name = "MultitouchSupport", kind = "framework")]
unsafe extern "C" {
    fn MTDeviceCreateList() -> *mut CFMutableArray;
    fn MTRegisterContactFrameCallback(device: MTDeviceRef, callback: MTContactCallback);
    fn MTDeviceStart(device: MTDeviceRef, run_mode: c_int);
    fn MTDeviceStop(device: MTDeviceRef);
    fn MTUnregisterContactFrameCallback(device: MTDeviceRef, callback: MTContactCallback);
    fn MTDeviceRelease(device: MTDeviceRef);
}

/// Runs on the driver's schedule, concurrently with the run loop. Only the
/// contact count is consumed; everything else in the frame is ignored.
unsafe extern "C" fn contact_frame_callback(
    _device: c_int,
    _touches: *mut MTTouch,
    contacts: c_int,
    _timestamp: c_double,
    _frame: c_int,
) -> c_int {
    CONTACTS.record_frame(contacts.max(0) as u32);
    0
}

/// The real multitouch facility. Holds the retained CF array backing the most
/// recent enumeration so the device refs handed to the subscription set stay
/// valid until they are unsubscribed and released.
#[derive(Default)]
pub struct MultitouchSource {
    list: Option<CFRetained<CFMutableArray>>,
}

impl MultitouchSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceSource for MultitouchSource {
    type Device = MTDeviceRef;

    fn enumerate(&mut self) -> Result<Vec<MTDeviceRef>, DaemonError> {
        let raw = unsafe { MTDeviceCreateList() };
        let Some(raw) = NonNull::new(raw) else {
            return Err(DaemonError::NoDeviceFound);
        };
        // MTDeviceCreateList follows the create rule.
        let list = unsafe { CFRetained::from_raw(raw) };

        let count = list.count();
        let mut devices = Vec::with_capacity(count as usize);
        for index in 0..count {
            let device = unsafe { list.value_at_index(index) }.cast_mut();
            if !device.is_null() {
                devices.push(device);
            }
        }

        // The previous list, if any, was already drained by unsubscription.
        self.list = Some(list);
        Ok(devices)
    }

    fn subscribe(&mut self, device: &MTDeviceRef) {
        unsafe {
            MTRegisterContactFrameCallback(*device, contact_frame_callback);
            MTDeviceStart(*device, 0);
        }
    }

    fn unsubscribe(&mut self, device: &MTDeviceRef) {
        unsafe {
            MTUnregisterContactFrameCallback(*device, contact_frame_callback);
            MTDeviceStop(*device);
            MTDeviceRelease(*device);
        }
    }
}
