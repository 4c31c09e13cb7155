use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

/// Visual weight of a font, on the CSS scale from 1 to 1000.
///
/// Serialized as a plain number. Deserialization also accepts the CSS
/// keywords `"normal"` and `"bold"` and numeric strings such as `"700"`,
/// since hand-edited templates use both forms.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct FontWeight(u16);

impl FontWeight {
    pub const LIGHT: Self = Self(300);
    pub const NORMAL: Self = Self(400);
    pub const MEDIUM: Self = Self(500);
    pub const SEMI_BOLD: Self = Self(600);
    pub const BOLD: Self = Self(700);
    pub const BLACK: Self = Self(900);

    pub fn new(weight: u16) -> Self {
        Self(weight)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Parses a CSS font weight: `normal`, `bold` or a number.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Some(match s {
            "normal" => Self::NORMAL,
            "bold" => Self::BOLD,
            _ => Self(s.parse::<u16>().ok()?),
        })
    }

    pub fn is_bold(self) -> bool {
        self >= Self::SEMI_BOLD
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u16),
            Keyword(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(weight) => Ok(Self(weight)),
            Raw::Keyword(keyword) => Self::parse(&keyword)
                .ok_or_else(|| de::Error::custom(format!("invalid font weight `{keyword}`"))),
        }
    }
}

/// Slope of a font
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "normal" => Some(Self::Normal),
            "italic" => Some(Self::Italic),
            _ => None,
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
        })
    }
}

/// Line drawn through, under or not at all
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

impl TextDecoration {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "none" => Some(Self::None),
            "underline" => Some(Self::Underline),
            "line-through" => Some(Self::LineThrough),
            _ => None,
        }
    }
}

impl fmt::Display for TextDecoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Underline => "underline",
            Self::LineThrough => "line-through",
        })
    }
}

/// Optional style fields carried by a span, or a patch applied to spans.
///
/// An unset field means "inherit from the owning layer's default style",
/// not "no style". When used as a patch, only the set fields overwrite.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecoration>,
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = Some(weight);
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// Sets the size; a size that is not a positive finite number is ignored
    pub fn with_font_size(mut self, size: f32) -> Self {
        if is_valid_font_size(size) {
            self.font_size = Some(size);
        }
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_font_style(mut self, style: FontStyle) -> Self {
        self.font_style = Some(style);
        self
    }

    pub fn with_text_decoration(mut self, decoration: TextDecoration) -> Self {
        self.text_decoration = Some(decoration);
        self
    }

    /// True if no field is set
    pub fn is_empty(&self) -> bool {
        self.font_weight.is_none()
            && self.font_family.is_none()
            && self.font_size.is_none()
            && self.color.is_none()
            && self.font_style.is_none()
            && self.text_decoration.is_none()
    }

    /// Overwrite every field that is set in `patch`
    pub fn apply(&mut self, patch: &TextStyle) {
        if let Some(weight) = patch.font_weight {
            self.font_weight = Some(weight);
        }
        if let Some(family) = &patch.font_family {
            self.font_family = Some(family.clone());
        }
        if let Some(size) = patch.font_size.filter(|size| is_valid_font_size(*size)) {
            self.font_size = Some(size);
        }
        if let Some(color) = &patch.color {
            self.color = Some(color.clone());
        }
        if let Some(style) = patch.font_style {
            self.font_style = Some(style);
        }
        if let Some(decoration) = patch.text_decoration {
            self.text_decoration = Some(decoration);
        }
    }

    /// Unset a font size no renderer can use. NaN never compares equal to
    /// itself, so spans carrying one could not merge.
    pub(crate) fn drop_invalid_font_size(&mut self) {
        self.font_size = self.font_size.filter(|size| is_valid_font_size(*size));
    }

    /// Copy of `self` with `patch` applied
    pub fn patched(&self, patch: &TextStyle) -> TextStyle {
        let mut style = self.clone();
        style.apply(patch);
        style
    }

    /// Read one property, `None` when it inherits
    pub fn get(&self, property: StyleProperty) -> Option<StyleValue> {
        match property {
            StyleProperty::FontWeight => self.font_weight.map(StyleValue::FontWeight),
            StyleProperty::FontFamily => self.font_family.clone().map(StyleValue::FontFamily),
            StyleProperty::FontSize => self.font_size.map(StyleValue::FontSize),
            StyleProperty::Color => self.color.clone().map(StyleValue::Color),
            StyleProperty::FontStyle => self.font_style.map(StyleValue::FontStyle),
            StyleProperty::TextDecoration => self.text_decoration.map(StyleValue::TextDecoration),
        }
    }

    /// Fill every unset field from the layer defaults
    pub fn resolve(&self, defaults: &ResolvedStyle) -> ResolvedStyle {
        ResolvedStyle {
            font_weight: self.font_weight.unwrap_or(defaults.font_weight),
            font_family: self
                .font_family
                .clone()
                .unwrap_or_else(|| defaults.font_family.clone()),
            font_size: self.font_size.unwrap_or(defaults.font_size),
            color: self.color.clone().unwrap_or_else(|| defaults.color.clone()),
            font_style: self.font_style.unwrap_or(defaults.font_style),
            text_decoration: self.text_decoration.unwrap_or(defaults.text_decoration),
        }
    }
}

/// Font sizes must be positive and finite
pub fn is_valid_font_size(size: f32) -> bool {
    size.is_finite() && size > 0.0
}

/// A fully specified style, as handed to the renderer
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    pub font_weight: FontWeight,
    pub font_family: String,
    pub font_size: f32,
    pub color: String,
    pub font_style: FontStyle,
    pub text_decoration: TextDecoration,
}

/// The style fields a span can carry
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum StyleProperty {
    FontWeight,
    FontFamily,
    FontSize,
    Color,
    FontStyle,
    TextDecoration,
}

impl StyleProperty {
    pub const ALL: [StyleProperty; 6] = [
        StyleProperty::FontWeight,
        StyleProperty::FontFamily,
        StyleProperty::FontSize,
        StyleProperty::Color,
        StyleProperty::FontStyle,
        StyleProperty::TextDecoration,
    ];

    /// Serialized field name of this property
    pub fn name(self) -> &'static str {
        match self {
            StyleProperty::FontWeight => "fontWeight",
            StyleProperty::FontFamily => "fontFamily",
            StyleProperty::FontSize => "fontSize",
            StyleProperty::Color => "color",
            StyleProperty::FontStyle => "fontStyle",
            StyleProperty::TextDecoration => "textDecoration",
        }
    }

    /// Parse a serialized field name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name.trim())
    }
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of a single [`StyleProperty`]
#[derive(Clone, Debug, PartialEq)]
pub enum StyleValue {
    FontWeight(FontWeight),
    FontFamily(String),
    FontSize(f32),
    Color(String),
    FontStyle(FontStyle),
    TextDecoration(TextDecoration),
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::FontWeight(v) => write!(f, "{v}"),
            StyleValue::FontFamily(v) => write!(f, "{v}"),
            StyleValue::FontSize(v) => write!(f, "{v}"),
            StyleValue::Color(v) => write!(f, "{v}"),
            StyleValue::FontStyle(v) => write!(f, "{v}"),
            StyleValue::TextDecoration(v) => write!(f, "{v}"),
        }
    }
}

/// Result of asking which value a property has across several spans.
///
/// Drives the "Mixed" state of style pickers.
#[derive(Clone, Debug, PartialEq)]
pub enum CommonValue {
    /// Every span inherits the layer default
    Unset,
    /// All spans that set the property agree
    Uniform(StyleValue),
    /// At least two distinct values are present
    Mixed,
}

impl CommonValue {
    pub fn is_mixed(&self) -> bool {
        matches!(self, CommonValue::Mixed)
    }

    pub fn uniform(&self) -> Option<&StyleValue> {
        match self {
            CommonValue::Uniform(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for CommonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommonValue::Unset => f.write_str("default"),
            CommonValue::Uniform(value) => write!(f, "{value}"),
            CommonValue::Mixed => f.write_str("mixed"),
        }
    }
}
