/// Number of simultaneous contacts that arms click conversion.
pub const GESTURE_CONTACTS: u32 = 3;

/// Half of a primary-button click, as delivered by the event tap. Every other
/// event type bypasses the transformer entirely.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ClickPhase {
    Down,
    Up,
}

/// What to do with the event: hand it back untouched, or rewrite it in place
/// into the secondary (middle) button's down/up. The transformer never drops
/// or synthesizes events; exactly one event out per event in.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Verdict {
    Pass,
    ConvertToSecondary,
}

/// The click-conversion state machine.
///
/// The single piece of state is the "mid conversion" flag: true only between
/// an emitted converted-down and its matching converted-up. Once set, the
/// matching up converts regardless of the contact count at that moment; the
/// fingers may well have lifted before the button is released. The flag is
/// only touched from the tap callback's execution context, so it needs no
/// synchronization.
#[derive(Debug, Default)]
pub struct ClickTransformer {
    converting: bool,
}

impl ClickTransformer {
    pub const fn new() -> Self {
        ClickTransformer { converting: false }
    }

    pub fn on_click(&mut self, phase: ClickPhase, contacts: u32) -> Verdict {
        match (phase, self.converting) {
            (ClickPhase::Down, false) if contacts >= GESTURE_CONTACTS => {
                self.converting = true;
                Verdict::ConvertToSecondary
            }
            (ClickPhase::Down, false) => Verdict::Pass,
            // A down while a conversion is still open means we never saw the
            // matching up. Not expected from real hardware; pass it through.
            (ClickPhase::Down, true) => Verdict::Pass,
            (ClickPhase::Up, true) => {
                self.converting = false;
                Verdict::ConvertToSecondary
            }
            (ClickPhase::Up, false) => Verdict::Pass,
        }
    }

    pub fn mid_conversion(&self) -> bool {
        self.converting
    }
}
