pub mod layer;
pub mod rich_text;
pub mod style;

pub use layer::{
    ErrorCorrectionLevel, Extent, FitMode, Layer, LayerId, LayerKind, PhotoLayer, Position,
    QrCodeLayer, ResolvedSpan, TextLayer,
};
pub use rich_text::{
    RichText, TextSpan, common_style_value, merge_adjacent_spans, plain_text_to_rich_text,
    rich_text_to_plain_text,
};
pub use style::{
    CommonValue, FontStyle, FontWeight, ResolvedStyle, StyleProperty, StyleValue, TextDecoration,
    TextStyle, is_valid_font_size,
};
