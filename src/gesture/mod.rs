//! Gesture state shared between the two OS callback sources: the multitouch
//! frame callback (writes the contact count) and the event tap callback
//! (reads it and drives the click-conversion state machine).

mod contacts;
mod transform;

pub use contacts::{ContactTracker, CONTACTS};
pub use transform::{ClickPhase, ClickTransformer, Verdict, GESTURE_CONTACTS};

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    /// Drives a full click through a local tracker + transformer pair and
    /// collects what the tap callback would have emitted.
    fn drive(
        tracker: &ContactTracker,
        transformer: &mut ClickTransformer,
        steps: &[Step],
    ) -> Vec<Verdict> {
        let mut out = Vec::new();
        for step in steps {
            match *step {
                Step::Frame(n) => tracker.record_frame(n),
                Step::Click(phase) => {
                    out.push(transformer.on_click(phase, tracker.current()));
                }
            }
        }
        out
    }

    enum Step {
        Frame(u32),
        Click(ClickPhase),
    }

    #[test]
    fn three_finger_click_becomes_middle_click() {
        let tracker = ContactTracker::new();
        let mut transformer = ClickTransformer::new();
        let out = drive(&tracker, &mut transformer, &[
            Step::Frame(3),
            Step::Click(ClickPhase::Down),
            Step::Click(ClickPhase::Up),
        ]);
        assert_eq!(out, vec![Verdict::ConvertToSecondary, Verdict::ConvertToSecondary]);
        assert!(!transformer.mid_conversion());
    }

    #[test]
    fn one_finger_click_passes_through() {
        let tracker = ContactTracker::new();
        let mut transformer = ClickTransformer::new();
        let out = drive(&tracker, &mut transformer, &[
            Step::Frame(1),
            Step::Click(ClickPhase::Down),
            Step::Click(ClickPhase::Up),
        ]);
        assert_eq!(out, vec![Verdict::Pass, Verdict::Pass]);
        assert!(!transformer.mid_conversion());
    }

    #[test]
    fn gesture_completes_after_fingers_lift_mid_click() {
        let tracker = ContactTracker::new();
        let mut transformer = ClickTransformer::new();
        let out = drive(&tracker, &mut transformer, &[
            Step::Frame(3),
            Step::Click(ClickPhase::Down),
            Step::Frame(0),
            Step::Click(ClickPhase::Up),
        ]);
        assert_eq!(out, vec![Verdict::ConvertToSecondary, Verdict::ConvertToSecondary]);
        assert!(!transformer.mid_conversion());
    }

    #[test]
    fn consecutive_clicks_do_not_leak_conversion_state() {
        let tracker = ContactTracker::new();
        let mut transformer = ClickTransformer::new();
        let out = drive(&tracker, &mut transformer, &[
            Step::Frame(3),
            Step::Click(ClickPhase::Down),
            Step::Click(ClickPhase::Up),
            Step::Frame(1),
            Step::Click(ClickPhase::Down),
            Step::Click(ClickPhase::Up),
        ]);
        assert_eq!(out, vec![
            Verdict::ConvertToSecondary,
            Verdict::ConvertToSecondary,
            Verdict::Pass,
            Verdict::Pass,
        ]);
    }
}
