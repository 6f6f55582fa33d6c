pub mod event_tap;
pub mod iokit;
pub mod multitouch;
