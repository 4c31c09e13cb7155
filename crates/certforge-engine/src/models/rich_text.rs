use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::models::style::{CommonValue, StyleProperty, StyleValue, TextStyle};

/// A contiguous run of text sharing one style
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    #[serde(flatten)]
    pub style: TextStyle,
}

impl TextSpan {
    /// Span that inherits every style field from its layer
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Length in chars
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// The styled text of one text layer.
///
/// Always holds at least one span, and is kept in normalized form: no span
/// is empty (unless the whole text is empty, in which case there is exactly
/// one empty span carrying the style new typing inherits) and no two
/// adjacent spans share a style. Every constructor normalizes, including
/// deserialization, so legacy or hand-edited span lists are canonical
/// before any edit runs against them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TextSpan>", into = "Vec<TextSpan>")]
pub struct RichText {
    spans: Vec<TextSpan>,
}

impl RichText {
    /// Single span with no explicit style
    pub fn plain(text: &str) -> Self {
        Self {
            spans: vec![TextSpan::plain(text)],
        }
    }

    pub fn spans(&self) -> &[TextSpan] {
        &self.spans
    }

    pub fn into_spans(self) -> Vec<TextSpan> {
        self.spans
    }

    /// Concatenation of every span's text
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    /// Length of the plain text in chars
    pub fn char_len(&self) -> usize {
        self.spans.iter().map(TextSpan::char_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|span| span.text.is_empty())
    }

    /// Style carried by the first span
    pub fn leading_style(&self) -> &TextStyle {
        &self.spans[0].style
    }

    /// Style of the char at `offset`, or of the last char when `offset` is at
    /// or past the end
    pub fn style_at(&self, offset: usize) -> &TextStyle {
        let mut span_start = 0;
        for span in &self.spans {
            let span_end = span_start + span.char_len();
            if offset < span_end {
                return &span.style;
            }
            span_start = span_end;
        }
        &self.spans[self.spans.len() - 1].style
    }

    /// Char range of every span, in order
    pub fn span_ranges(&self) -> impl Iterator<Item = (Range<usize>, &TextSpan)> + '_ {
        let mut offset = 0;
        self.spans.iter().map(move |span| {
            let start = offset;
            offset += span.char_len();
            (start..offset, span)
        })
    }

    /// Common value of `property` across all spans
    pub fn common_value(&self, property: StyleProperty) -> CommonValue {
        common_style_value(&self.spans, property)
    }
}

impl Default for RichText {
    fn default() -> Self {
        Self::plain("")
    }
}

impl From<Vec<TextSpan>> for RichText {
    fn from(spans: Vec<TextSpan>) -> Self {
        Self {
            spans: merge_adjacent_spans(&spans),
        }
    }
}

impl From<RichText> for Vec<TextSpan> {
    fn from(text: RichText) -> Self {
        text.spans
    }
}

impl From<&str> for RichText {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

/// Build a single-span model with no explicit style
pub fn plain_text_to_rich_text(text: &str) -> RichText {
    RichText::plain(text)
}

/// Concatenate the text of every span
pub fn rich_text_to_plain_text(model: &RichText) -> String {
    model.plain_text()
}

/// Merge adjacent spans with identical style and drop empty spans.
///
/// A single left-to-right pass. Idempotent. If every span is empty the result
/// is one empty span carrying the first input span's style.
pub fn merge_adjacent_spans(spans: &[TextSpan]) -> Vec<TextSpan> {
    let mut merged: Vec<TextSpan> = Vec::with_capacity(spans.len());

    for span in spans.iter().filter(|span| !span.text.is_empty()) {
        let mut style = span.style.clone();
        style.drop_invalid_font_size();
        match merged.last_mut() {
            Some(current) if current.style == style => current.text.push_str(&span.text),
            _ => merged.push(TextSpan::styled(span.text.clone(), style)),
        }
    }

    if merged.is_empty() {
        let mut style = spans.first().map(|span| span.style.clone()).unwrap_or_default();
        style.drop_invalid_font_size();
        merged.push(TextSpan::styled(String::new(), style));
    }

    merged
}

/// Collect the distinct set values of `property` across `spans`.
///
/// No value set anywhere gives [`CommonValue::Unset`], exactly one distinct
/// value gives [`CommonValue::Uniform`], more gives [`CommonValue::Mixed`].
pub fn common_style_value(spans: &[TextSpan], property: StyleProperty) -> CommonValue {
    common_value_of(spans.iter(), property)
}

pub(crate) fn common_value_of<'a>(
    spans: impl Iterator<Item = &'a TextSpan>,
    property: StyleProperty,
) -> CommonValue {
    let mut distinct: Vec<StyleValue> = Vec::new();
    for value in spans.filter_map(|span| span.style.get(property)) {
        if !distinct.contains(&value) {
            distinct.push(value);
        }
    }

    match distinct.len() {
        0 => CommonValue::Unset,
        1 => CommonValue::Uniform(distinct.remove(0)),
        _ => CommonValue::Mixed,
    }
}

/// Byte index of the char at `char_offset`, or `text.len()` past the end
pub(crate) fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::style::FontWeight;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn bold(text: &str) -> TextSpan {
        TextSpan::styled(text, TextStyle::new().with_font_weight(FontWeight::BOLD))
    }

    fn weight(text: &str, weight: u16) -> TextSpan {
        TextSpan::styled(text, TextStyle::new().with_font_weight(FontWeight::new(weight)))
    }

    #[rstest]
    #[case("")]
    #[case("Hello World")]
    #[case("Zertifikat für Ärztinnen 🎓")]
    #[case("line one\nline two")]
    #[case("   ")]
    fn test_plain_round_trip(#[case] text: &str) {
        assert_eq!(rich_text_to_plain_text(&plain_text_to_rich_text(text)), text);
    }

    #[test]
    fn test_plain_text_is_single_unstyled_span() {
        let model = plain_text_to_rich_text("Certificate");
        assert_eq!(model.spans(), &[TextSpan::plain("Certificate")]);
    }

    #[test]
    fn test_merge_joins_identical_neighbours() {
        let spans = vec![
            bold("Cert"),
            bold("ificate"),
            TextSpan::plain(" of"),
            TextSpan::plain(" merit"),
        ];

        let merged = merge_adjacent_spans(&spans);

        assert_eq!(merged, vec![bold("Certificate"), TextSpan::plain(" of merit")]);
    }

    #[test]
    fn test_merge_drops_empty_spans_and_joins_across_them() {
        let spans = vec![bold("A"), TextSpan::plain(""), bold("B")];

        assert_eq!(merge_adjacent_spans(&spans), vec![bold("AB")]);
    }

    #[test]
    fn test_merge_of_all_empty_keeps_first_style() {
        let spans = vec![bold(""), TextSpan::plain("")];

        assert_eq!(merge_adjacent_spans(&spans), vec![bold("")]);
        assert_eq!(merge_adjacent_spans(&[]), vec![TextSpan::plain("")]);
    }

    #[test]
    fn test_merge_keeps_alternating_styles() {
        let spans = vec![bold("a"), TextSpan::plain("b"), bold("c")];

        assert_eq!(merge_adjacent_spans(&spans), spans);
    }

    #[test]
    fn test_merge_drops_unusable_font_size() {
        let nan = TextStyle {
            font_size: Some(f32::NAN),
            ..Default::default()
        };
        let spans = vec![
            TextSpan::styled("He", nan.clone()),
            TextSpan::styled("llo", nan),
        ];

        let once = merge_adjacent_spans(&spans);

        assert_eq!(once, vec![TextSpan::plain("Hello")]);
        assert_eq!(merge_adjacent_spans(&once), once);
    }

    #[test]
    fn test_common_value_uniform() {
        let spans = vec![weight("a", 700), weight("b", 700)];

        assert_eq!(
            common_style_value(&spans, StyleProperty::FontWeight),
            CommonValue::Uniform(StyleValue::FontWeight(FontWeight::BOLD))
        );
    }

    #[test]
    fn test_common_value_mixed() {
        let spans = vec![weight("a", 400), weight("b", 700)];

        assert_eq!(
            common_style_value(&spans, StyleProperty::FontWeight),
            CommonValue::Mixed
        );
    }

    #[test]
    fn test_common_value_ignores_inheriting_spans() {
        let spans = vec![TextSpan::plain("a"), weight("b", 700)];

        assert_eq!(
            common_style_value(&spans, StyleProperty::FontWeight),
            CommonValue::Uniform(StyleValue::FontWeight(FontWeight::BOLD))
        );
        assert_eq!(
            common_style_value(&spans, StyleProperty::Color),
            CommonValue::Unset
        );
    }

    #[test]
    fn test_deserialize_normalizes_legacy_spans() {
        let json = r#"[{"text":"Hi","fontWeight":400},{"text":" there","fontWeight":400},{"text":""}]"#;

        let model: RichText = serde_json::from_str(json).unwrap();

        assert_eq!(model.spans(), &[weight("Hi there", 400)]);
    }

    #[test]
    fn test_deserialize_empty_array_gives_empty_text() {
        let model: RichText = serde_json::from_str("[]").unwrap();

        assert_eq!(model.plain_text(), "");
        assert_eq!(model.spans().len(), 1);
    }

    #[test]
    fn test_serialized_spans_snapshot() {
        let model = RichText::from(vec![bold("Cert"), TextSpan::plain("ificate")]);
        insta::with_settings!({
            snapshot_path => concat!(env!("CARGO_MANIFEST_DIR"), "/src/models/snapshots"),
            prepend_module_to_snapshot => false,
        }, {
            insta::assert_yaml_snapshot!("serialized_spans", model);
        });
    }

    #[test]
    fn test_style_at_and_span_ranges() {
        let model = RichText::from(vec![TextSpan::plain("He"), bold("llo")]);

        let ranges: Vec<_> = model.span_ranges().map(|(range, _)| range).collect();
        assert_eq!(ranges, vec![0..2, 2..5]);
        assert_eq!(model.style_at(0), &TextStyle::default());
        assert_eq!(model.style_at(2).font_weight, Some(FontWeight::BOLD));
        assert_eq!(model.style_at(99).font_weight, Some(FontWeight::BOLD));
    }

    #[test]
    fn test_char_to_byte_handles_multibyte() {
        let text = "für";
        assert_eq!(char_to_byte(text, 0), 0);
        assert_eq!(char_to_byte(text, 2), 3);
        assert_eq!(char_to_byte(text, 3), text.len());
        assert_eq!(char_to_byte(text, 10), text.len());
    }
}
