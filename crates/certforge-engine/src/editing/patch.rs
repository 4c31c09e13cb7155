use std::ops::Range;

/// Result of applying a command to a text layer
#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    /// Char range of the new text whose content or style changed
    pub changed: Range<usize>,
    /// Selection to restore on the editor surface
    pub new_selection: Range<usize>,
    pub version: u64,
}
