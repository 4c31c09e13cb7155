use std::ops::Range;

use crate::editing::Patch;
use crate::editing::range::{apply_style_to_range, changed_region, clamp_range, replace_range};
use crate::models::rich_text::RichText;
use crate::models::style::TextStyle;

/// Every mutation of a text layer's span model
#[derive(Clone, Debug, PartialEq)]
pub enum Cmd {
    /// Style the chars in `range`; an empty range styles the whole layer
    ApplyStyle { range: Range<usize>, patch: TextStyle },
    /// Replace the chars in `range` with `text`
    ReplaceRange { range: Range<usize>, text: String },
    /// Replace the whole text, as typing into the layer does
    SetText { text: String },
}

/// Run `cmd` against `model`, returning the new model and a patch describing
/// the edit. The patch version is left at zero for the caller to stamp.
pub fn apply_command(model: &RichText, cmd: &Cmd) -> (RichText, Patch) {
    match cmd {
        Cmd::ApplyStyle { range, patch } => {
            let styled = apply_style_to_range(model, range.clone(), patch);
            let changed = if range.start == range.end {
                0..styled.char_len()
            } else {
                clamp_range(range.clone(), model.char_len())
            };
            let new_selection = changed.clone();
            (styled, patch_for(changed, new_selection))
        }
        Cmd::ReplaceRange { range, text } => {
            let range = clamp_range(range.clone(), model.char_len());
            let edited = replace_range(model, range.clone(), text);
            let end = range.start + text.chars().count();
            (edited, patch_for(range.start..end, end..end))
        }
        Cmd::SetText { text } => match changed_region(model, text) {
            Some((range, middle)) => {
                let edited = replace_range(model, range.clone(), &middle);
                let end = range.start + middle.chars().count();
                (edited, patch_for(range.start..end, end..end))
            }
            None => {
                let len = model.char_len();
                (model.clone(), patch_for(len..len, len..len))
            }
        },
    }
}

fn patch_for(changed: Range<usize>, new_selection: Range<usize>) -> Patch {
    Patch {
        changed,
        new_selection,
        version: 0,
    }
}
