//! Fault rendering with wrapper frames elided.
//!
//! Operators reading error logs care about which operations were on the call
//! chain, not about the retry/lease plumbing in between. Frames named with
//! the wrapper sentinel are dropped before rendering.

use std::fmt;

use super::call_trace::WRAPPER_FRAME;

/// Keeps only user frames, in original order.
pub fn clean<'a>(frames: &'a [String]) -> Vec<&'a str> {
    frames
        .iter()
        .map(String::as_str)
        .filter(|name| *name != WRAPPER_FRAME)
        .collect()
}

/// Renders the filtered frames followed by the fault message. When no frame
/// survives filtering the traceback header is omitted entirely.
pub fn render(frames: &[String], fault: &dyn fmt::Display) -> String {
    let kept = clean(frames);

    let mut out = String::new();
    if !kept.is_empty() {
        out.push_str("Traceback (most recent call last, wrappers elided):\n");
        for name in kept {
            out.push_str("  at ");
            out.push_str(name);
            out.push('\n');
        }
    }
    out.push_str(&fault.to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn drops_every_wrapper_frame() {
        let stack = frames(&["save_file", WRAPPER_FRAME, "upload_file", WRAPPER_FRAME]);
        assert_eq!(clean(&stack), vec!["save_file", "upload_file"]);
    }

    #[test]
    fn keeps_user_frames_in_order() {
        let stack = frames(&[WRAPPER_FRAME, "a", WRAPPER_FRAME, "b", "c"]);
        let rendered = render(&stack, &"boom");
        assert!(rendered.starts_with("Traceback (most recent call last, wrappers elided):\n"));
        let a = rendered.find("at a").unwrap();
        let b = rendered.find("at b").unwrap();
        let c = rendered.find("at c").unwrap();
        assert!(a < b && b < c);
        assert!(!rendered.contains(WRAPPER_FRAME));
        assert!(rendered.ends_with("boom"));
    }

    #[test]
    fn omits_header_when_nothing_survives() {
        let stack = frames(&[WRAPPER_FRAME, WRAPPER_FRAME]);
        let rendered = render(&stack, &"boom");
        assert_eq!(rendered, "boom");
    }

    #[test]
    fn empty_stack_renders_fault_only() {
        let rendered = render(&[], &"boom");
        assert_eq!(rendered, "boom");
    }
}
