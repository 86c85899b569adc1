use serde::{Deserialize, Serialize};

/// Fill color in a normalized 0-1 RGB space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl FillColor {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Light gray that blends against white to a dark (~0.1) background.
    pub const fn light_gray() -> Self {
        Self::new(0.9, 0.9, 0.9)
    }

    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Components as an [r, g, b] array
    pub const fn components(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// PDF blend modes as defined for the `/BM` graphics state parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    /// The PDF name for this blend mode, without the leading slash.
    pub const fn pdf_name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Multiply => "Multiply",
            Self::Screen => "Screen",
            Self::Overlay => "Overlay",
            Self::Darken => "Darken",
            Self::Lighten => "Lighten",
            Self::ColorDodge => "ColorDodge",
            Self::ColorBurn => "ColorBurn",
            Self::HardLight => "HardLight",
            Self::SoftLight => "SoftLight",
            Self::Difference => "Difference",
            Self::Exclusion => "Exclusion",
            Self::Hue => "Hue",
            Self::Saturation => "Saturation",
            Self::Color => "Color",
            Self::Luminosity => "Luminosity",
        }
    }
}

/// Options for the per-page dark mode mutations.
///
/// The defaults reproduce the canonical effect: a white background underlay
/// and a full-page 0.9 gray annotation blended with `Difference`, which
/// renders as an approximately 0.1 gray page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DarkenOptions {
    /// Background fill painted underneath the existing page content
    #[serde(default = "default_background")]
    pub background: FillColor,
    /// Interior color of the full-page annotation
    #[serde(default = "default_annotation_fill")]
    pub annotation_fill: FillColor,
    /// Blend mode applied to the annotation
    #[serde(default = "default_blend_mode")]
    pub blend_mode: BlendMode,
    /// Annotation border width in points
    #[serde(default)]
    pub border_width: f32,
    /// Report progress every N pages (the last page is always reported)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

impl Default for DarkenOptions {
    fn default() -> Self {
        Self {
            background: default_background(),
            annotation_fill: default_annotation_fill(),
            blend_mode: default_blend_mode(),
            border_width: 0.0,
            progress_interval: default_progress_interval(),
        }
    }
}

const fn default_background() -> FillColor {
    FillColor::white()
}

const fn default_annotation_fill() -> FillColor {
    FillColor::light_gray()
}

const fn default_blend_mode() -> BlendMode {
    BlendMode::Difference
}

const fn default_progress_interval() -> usize {
    10
}
