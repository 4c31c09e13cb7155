use std::ops::Range;

use crate::models::rich_text::{RichText, TextSpan, char_to_byte, common_value_of};
use crate::models::style::{CommonValue, StyleProperty, TextStyle};

/// Clamp a requested char range to `len` and put it in order.
///
/// Offsets from a stale selection may point past the end of text that was
/// just edited; they are clamped rather than rejected.
pub fn clamp_range(range: Range<usize>, len: usize) -> Range<usize> {
    let (a, b) = if range.start <= range.end {
        (range.start, range.end)
    } else {
        (range.end, range.start)
    };
    let clamped = a.min(len)..b.min(len);
    if clamped != (a..b) {
        log::debug!("clamped char range {a}..{b} to {clamped:?} (text length {len})");
    }
    clamped
}

/// Apply a style patch to the chars in `range`.
///
/// An empty requested range (`start == end`) is the "no selection" sentinel
/// and styles the whole text. A non-empty range that lies entirely past the
/// end of the text leaves the model unchanged. Spans straddling a range
/// boundary are split so the patch only reaches chars inside the range; the
/// result is normalized.
pub fn apply_style_to_range(model: &RichText, range: Range<usize>, patch: &TextStyle) -> RichText {
    if range.start == range.end {
        let spans = model
            .spans()
            .iter()
            .map(|span| TextSpan::styled(span.text.clone(), span.style.patched(patch)))
            .collect::<Vec<_>>();
        return RichText::from(spans);
    }

    let target = clamp_range(range, model.char_len());
    if target.is_empty() {
        return model.clone();
    }

    let mut spans = Vec::with_capacity(model.spans().len() + 2);
    for (span_range, span) in model.span_ranges() {
        if span_range.end <= target.start || span_range.start >= target.end {
            spans.push(span.clone());
            continue;
        }

        let local_start = target.start.saturating_sub(span_range.start);
        let local_end = target.end.min(span_range.end) - span_range.start;
        let (before, inside, after) = split_three(&span.text, local_start, local_end);

        spans.push(TextSpan::styled(before, span.style.clone()));
        spans.push(TextSpan::styled(inside, span.style.patched(patch)));
        spans.push(TextSpan::styled(after, span.style.clone()));
    }

    RichText::from(spans)
}

/// Split `text` at two char offsets, `first <= second`
fn split_three(text: &str, first: usize, second: usize) -> (&str, &str, &str) {
    let first = char_to_byte(text, first);
    let second = char_to_byte(text, second);
    (&text[..first], &text[first..second], &text[second..])
}

/// Spans covering the chars in `range`, cut at its boundaries
pub fn slice_spans(model: &RichText, range: Range<usize>) -> Vec<TextSpan> {
    let range = clamp_range(range, model.char_len());
    model
        .span_ranges()
        .filter(|(span_range, _)| span_range.start < range.end && span_range.end > range.start)
        .map(|(span_range, span)| {
            let local_start = range.start.saturating_sub(span_range.start);
            let local_end = range.end.min(span_range.end) - span_range.start;
            let (_, inside, _) = split_three(&span.text, local_start, local_end);
            TextSpan::styled(inside, span.style.clone())
        })
        .collect()
}

/// Replace the chars in `range` with `replacement`.
///
/// Inserted text takes the style of the char just before the insertion
/// point, or of the first span when inserting at the start. Formatting of
/// every char outside `range` is kept.
pub fn replace_range(model: &RichText, range: Range<usize>, replacement: &str) -> RichText {
    let len = model.char_len();
    let range = clamp_range(range, len);

    let inserted_style = if range.start == 0 {
        model.leading_style().clone()
    } else {
        model.style_at(range.start - 1).clone()
    };

    let mut spans = slice_spans(model, 0..range.start);
    spans.push(TextSpan::styled(replacement, inserted_style));
    spans.extend(slice_spans(model, range.end..len));

    RichText::from(spans)
}

/// The region that differs between the model's text and `new_text`: the
/// char range replaced in the old text and the text that replaces it.
///
/// Returns `None` when the texts are equal.
pub fn changed_region(model: &RichText, new_text: &str) -> Option<(Range<usize>, String)> {
    let old: Vec<char> = model.plain_text().chars().collect();
    let new: Vec<char> = new_text.chars().collect();

    let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
    if prefix == old.len() && prefix == new.len() {
        return None;
    }

    let max_suffix = old.len().min(new.len()) - prefix;
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let middle = new[prefix..new.len() - suffix].iter().collect();
    Some((prefix..old.len() - suffix, middle))
}

/// Replace the whole text, keeping formatting of the unchanged prefix and
/// suffix.
///
/// This is what typing into a layer does: the editor surface hands back the
/// complete new text and only the differing middle is re-styled.
pub fn replace_text(model: &RichText, new_text: &str) -> RichText {
    match changed_region(model, new_text) {
        Some((range, middle)) => replace_range(model, range, &middle),
        None => model.clone(),
    }
}

/// Common value of `property` across the spans overlapping `range`.
///
/// An empty range queries the whole model, matching the "no selection"
/// convention of [`apply_style_to_range`].
pub fn common_style_value_in_range(
    model: &RichText,
    range: Range<usize>,
    property: StyleProperty,
) -> CommonValue {
    if range.start == range.end {
        return model.common_value(property);
    }
    let range = clamp_range(range, model.char_len());
    common_value_of(
        model
            .span_ranges()
            .filter(|(span_range, _)| span_range.start < range.end && span_range.end > range.start)
            .map(|(_, span)| span),
        property,
    )
}
