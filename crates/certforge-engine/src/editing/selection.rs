use std::ops::Range;

/// A selection as reported by the editor surface, in UTF-16 code units of
/// the container's text content.
///
/// `anchor` is where the drag started and `focus` where it ended, so a
/// backwards selection has `focus < anchor`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RawSelection {
    pub anchor: usize,
    pub focus: usize,
}

impl RawSelection {
    pub fn new(anchor: usize, focus: usize) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// Capability supplied by the editor surface: the current selection inside
/// one text layer's rendered container.
///
/// Returns `None` when nothing is selected or the selection lies outside
/// the container.
pub trait SelectionQuery {
    fn current_selection(&self) -> Option<RawSelection>;
}

impl<F> SelectionQuery for F
where
    F: Fn() -> Option<RawSelection>,
{
    fn current_selection(&self) -> Option<RawSelection> {
        self()
    }
}

/// Translate the surface's selection into an ordered char range over `text`.
///
/// Offsets that fall inside a surrogate pair snap to the start of that char;
/// offsets past the end clamp to the text length.
pub fn resolve_selection(query: &dyn SelectionQuery, text: &str) -> Option<Range<usize>> {
    let raw = query.current_selection()?;
    let anchor = utf16_to_char_offset(text, raw.anchor);
    let focus = utf16_to_char_offset(text, raw.focus);
    Some(anchor.min(focus)..anchor.max(focus))
}

/// Range to hand to the range editor: the resolved selection, or `0..0`
/// when there is none. Any empty range, including a collapsed caret such as
/// `4..4`, makes the range editor style the whole layer.
pub fn style_target(selection: Option<Range<usize>>) -> Range<usize> {
    selection.unwrap_or(0..0)
}

/// Convert a UTF-16 code unit offset into a char offset
pub fn utf16_to_char_offset(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (index, c) in text.chars().enumerate() {
        let next = units + c.len_utf16();
        if next > utf16_offset {
            return index;
        }
        units = next;
    }
    text.chars().count()
}

/// Convert a char offset into a UTF-16 code unit offset, for handing a
/// selection back to the surface
pub fn char_to_utf16_offset(text: &str, char_offset: usize) -> usize {
    text.chars().take(char_offset).map(char::len_utf16).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::range::apply_style_to_range;
    use crate::models::rich_text::{RichText, TextSpan};
    use crate::models::style::{FontStyle, TextStyle};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Hello", 0, 0)]
    #[case("Hello", 3, 3)]
    #[case("Hello", 5, 5)]
    #[case("Hello", 50, 5)]
    #[case("a🎓b", 1, 1)]
    #[case("a🎓b", 2, 1)]
    #[case("a🎓b", 3, 2)]
    #[case("a🎓b", 4, 3)]
    fn test_utf16_to_char_offset(#[case] text: &str, #[case] utf16: usize, #[case] chars: usize) {
        assert_eq!(utf16_to_char_offset(text, utf16), chars);
    }

    #[test]
    fn test_char_to_utf16_offset_inverts() {
        let text = "Grüße 🎓 Anna";
        for offset in 0..=text.chars().count() {
            let utf16 = char_to_utf16_offset(text, offset);
            assert_eq!(utf16_to_char_offset(text, utf16), offset);
        }
    }

    #[test]
    fn test_resolve_orders_backwards_selection() {
        let query = || Some(RawSelection::new(5, 2));

        assert_eq!(resolve_selection(&query, "Hello World"), Some(2..5));
    }

    #[test]
    fn test_resolve_without_selection() {
        let query = || -> Option<RawSelection> { None };

        assert_eq!(resolve_selection(&query, "Hello World"), None);
        assert_eq!(style_target(resolve_selection(&query, "Hello World")), 0..0);
    }

    #[test]
    fn test_resolve_converts_astral_chars() {
        // "🎓 " is two UTF-16 units followed by a space
        let query = || Some(RawSelection::new(3, 7));

        assert_eq!(resolve_selection(&query, "🎓 Anna"), Some(2..6));
    }

    #[test]
    fn test_collapsed_selection_targets_whole_layer() {
        let query = || Some(RawSelection::new(4, 4));
        let resolved = resolve_selection(&query, "Hello");

        assert_eq!(resolved, Some(4..4));
        assert!(RawSelection::new(4, 4).is_collapsed());
        let target = style_target(resolved);
        assert_eq!(target, 4..4);

        let italic = TextStyle::new().with_font_style(FontStyle::Italic);
        let styled = apply_style_to_range(&RichText::plain("Hello"), target, &italic);
        assert_eq!(styled.spans(), &[TextSpan::styled("Hello", italic)]);
    }
}
