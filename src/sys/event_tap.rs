//! Thin RAII wrapper over a CGEvent tap. Dropping the wrapper disables the
//! tap and removes its run-loop source, so teardown happens on every exit
//! path out of the dispatch loop, including the unexpected ones.

use std::ffi::c_void;
use std::ptr::NonNull;

use objc2_core_foundation::{
    kCFRunLoopCommonModes, CFMachPort, CFRetained, CFRunLoop, CFRunLoopSource,
};
use objc2_core_graphics::{
    CGEvent, CGEventMask, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement,
    CGEventTapProxy, CGEventType,
};

use crate::error::DaemonError;

pub type TapCallback = unsafe extern "C-unwind" fn(
    CGEventTapProxy,
    CGEventType,
    NonNull<CGEvent>,
    *mut c_void,
) -> *mut CGEvent;

pub fn event_mask(types: &[CGEventType]) -> CGEventMask {
    types.iter().fold(0u64, |mask, ty| mask | (1u64 << (ty.0 as u64)))
}

pub struct EventTap {
    port: CFRetained<CFMachPort>,
    source: Option<CFRetained<CFRunLoopSource>>,
}

impl EventTap {
    /// Attempts to create a head-inserted active tap at the HID level.
    /// Returns `None` when the OS refuses, which usually means the process
    /// has no accessibility permission yet.
    ///
    /// # Safety
    ///
    /// `user_info` must stay valid for as long as the tap can fire, and
    /// `callback` must treat it as the type it was created from.
    pub unsafe fn create(
        mask: CGEventMask,
        callback: TapCallback,
        user_info: *mut c_void,
    ) -> Option<Self> {
        let port = unsafe {
            CGEvent::tap_create(
                CGEventTapLocation::HIDEventTap,
                CGEventTapPlacement::HeadInsertEventTap,
                CGEventTapOptions::Default,
                mask,
                Some(callback),
                user_info,
            )
        }?;
        Some(EventTap { port, source: None })
    }

    /// Attaches the tap to the current run loop and enables interception.
    pub fn install_on_current_run_loop(&mut self) -> Result<(), DaemonError> {
        let source = unsafe { CFMachPort::new_run_loop_source(None, Some(&self.port), 0) }
            .ok_or(DaemonError::DispatchSourceUnavailable)?;
        let run_loop = CFRunLoop::current().ok_or(DaemonError::DispatchSourceUnavailable)?;
        unsafe {
            run_loop.add_source(Some(&source), kCFRunLoopCommonModes);
            CGEvent::tap_enable(&self.port, true);
        }
        self.source = Some(source);
        Ok(())
    }
}

impl Drop for EventTap {
    fn drop(&mut self) {
        unsafe {
            CGEvent::tap_enable(&self.port, false);
        }
        if let Some(source) = self.source.take() {
            if let Some(run_loop) = CFRunLoop::current() {
                unsafe {
                    run_loop.remove_source(Some(&source), kCFRunLoopCommonModes);
                }
            }
        }
    }
}
