/// Cursor movement requested by an annotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Forward,
    Back,
    /// Relative move, clamped to the queue.
    Advance(isize),
    /// Absolute position, clamped to the queue.
    GoTo(usize),
    FirstUnanswered,
}
