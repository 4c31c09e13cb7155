/*!
 * # Text Editing
 *
 * Operations over a text layer's span model ([`RichText`](crate::models::RichText)).
 *
 * ## Architecture Overview
 *
 * ### 1. Immutable in, immutable out
 * - Every operation takes a model by reference and returns a new one
 * - Outputs are always normalized: no empty spans, no equal-styled neighbours
 * - Styling never changes the plain text
 *
 * ### 2. Char offsets
 * - Ranges are half-open and counted in chars of the concatenated text
 * - Stale offsets are clamped, reversed ranges reordered
 * - An empty range passed to styling means "no selection, style everything"
 *
 * ### 3. Command-based editing
 * - Mutations owned by a layer flow through the [`Cmd`] enum
 * - Applying a command yields a [`Patch`] with the changed range and the
 *   selection to restore
 *
 * ### 4. Selection as a capability
 * - The editor surface implements [`SelectionQuery`]
 * - [`resolve_selection`] turns its UTF-16 offsets into char ranges, so the
 *   core never touches the presentation layer
 *
 * ## Module Structure
 *
 * - **`range`**: split/style/merge over char ranges, typing replacement
 * - **`commands`**: `Cmd` enum and its application
 * - **`selection`**: selection capability and offset translation
 * - **`patch`**: edit result metadata
 *
 * ## Usage Pattern
 *
 * ```rust
 * use certforge_engine::editing::*;
 * use certforge_engine::models::{FontWeight, RichText, TextStyle};
 *
 * let model = RichText::plain("Hello World");
 * let bold = TextStyle::new().with_font_weight(FontWeight::BOLD);
 *
 * let query = || Some(RawSelection::new(2, 5));
 * let target = style_target(resolve_selection(&query, &model.plain_text()));
 *
 * let styled = apply_style_to_range(&model, target, &bold);
 * assert_eq!(styled.spans().len(), 3);
 * assert_eq!(styled.plain_text(), "Hello World");
 * ```
 */

pub mod commands;
pub mod patch;
pub mod range;
pub mod selection;

pub use commands::{Cmd, apply_command};
pub use patch::Patch;
pub use range::{
    apply_style_to_range, changed_region, clamp_range, common_style_value_in_range, replace_range,
    replace_text, slice_spans,
};
pub use selection::{
    RawSelection, SelectionQuery, char_to_utf16_offset, resolve_selection, style_target,
    utf16_to_char_offset,
};
