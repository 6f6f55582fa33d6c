//! The run controller: builds the device subscriptions, starts the hot-plug
//! watcher, then repeatedly acquires the event tap and drives the run loop.
//! A run loop that returns on its own is re-entered from scratch; only the
//! fatal acquisition and setup failures propagate out.

use std::cell::RefCell;
use std::ffi::c_void;
use std::ptr::NonNull;
use std::rc::Rc;

use objc2_core_foundation::CFRunLoop;
use objc2_core_graphics::{CGEvent, CGEventField, CGEventTapProxy, CGEventType, CGMouseButton};
use tracing::{info, warn};

use crate::devices::SubscriptionSet;
use crate::error::DaemonError;
use crate::gesture::{ClickPhase, ClickTransformer, Verdict, CONTACTS};
use crate::supervisor::{acquire_with_retry, RetryPolicy};
use crate::sys::event_tap::{event_mask, EventTap};
use crate::sys::iokit::{HotplugWatcher, Subscriptions};
use crate::sys::multitouch::MultitouchSource;

/// State reachable from the tap callback. The transformer lives behind a
/// `RefCell` because the callback only ever runs on the run-loop thread.
struct TapCtx {
    transformer: RefCell<ClickTransformer>,
}

/// Runs until a fatal error. Every resource acquired along the way (device
/// subscriptions, notification port, event tap) is torn down by its owner's
/// `Drop` on the way out, in reverse acquisition order.
pub fn run() -> Result<(), DaemonError> {
    let subscriptions: Subscriptions =
        Rc::new(RefCell::new(SubscriptionSet::new(MultitouchSource::new())?));
    subscriptions.borrow_mut().subscribe_all();
    info!(
        devices = subscriptions.borrow().len(),
        "subscribed to multitouch contact frames"
    );

    let _watcher = HotplugWatcher::start(Rc::clone(&subscriptions))?;

    let ctx = TapCtx { transformer: RefCell::new(ClickTransformer::new()) };
    let ctx_ptr = &ctx as *const TapCtx as *mut c_void;

    loop {
        run_tap_cycle(ctx_ptr)?;
        warn!("event tap run loop returned unexpectedly; re-acquiring");
    }
}

/// One acquire → dispatch → teardown cycle. The tap is dropped before this
/// returns, whatever the reason the run loop stopped.
fn run_tap_cycle(ctx: *mut c_void) -> Result<(), DaemonError> {
    let mask = event_mask(&[CGEventType::LeftMouseDown, CGEventType::LeftMouseUp]);
    let mut tap = acquire_with_retry(RetryPolicy::DEFAULT, || unsafe {
        EventTap::create(mask, tap_callback, ctx)
    })?;
    tap.install_on_current_run_loop()?;
    info!("event tap installed; intercepting primary clicks");

    CFRunLoop::run();
    Ok(())
}

unsafe extern "C-unwind" fn tap_callback(
    _proxy: CGEventTapProxy,
    event_type: CGEventType,
    event_ref: NonNull<CGEvent>,
    user_info: *mut c_void,
) -> *mut CGEvent {
    let ctx = unsafe { &*(user_info as *const TapCtx) };

    let phase = match event_type {
        CGEventType::LeftMouseDown => ClickPhase::Down,
        CGEventType::LeftMouseUp => ClickPhase::Up,
        // Anything else (including tap-status events outside our mask) goes
        // back untouched.
        _ => return event_ref.as_ptr(),
    };

    let verdict = ctx.transformer.borrow_mut().on_click(phase, CONTACTS.current());
    if verdict == Verdict::ConvertToSecondary {
        rewrite_to_secondary(unsafe { event_ref.as_ref() }, phase);
    }

    event_ref.as_ptr()
}

/// Rewrites the event in place into the center button's down/up, leaving
/// position and timing fields alone.
fn rewrite_to_secondary(event: &CGEvent, phase: ClickPhase) {
    let new_type = match phase {
        ClickPhase::Down => CGEventType::OtherMouseDown,
        ClickPhase::Up => CGEventType::OtherMouseUp,
    };
    unsafe {
        CGEvent::set_type(Some(event), new_type);
        CGEvent::set_integer_value_field(
            Some(event),
            CGEventField::MouseEventButtonNumber,
            i64::from(CGMouseButton::Center.0),
        );
    }
}
