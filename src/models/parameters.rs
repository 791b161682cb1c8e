use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Dithering variant. The set is closed; names match the capability's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    Threshold,
    FloydSteinberg,
    Bayer,
    #[default]
    Jarvis,
    Atkinson,
    Sierra,
    SierraTwoRow,
    SierraLite,
}

/// Which arguments and controls apply to a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantDescriptor {
    pub variant: Variant,
    pub name: &'static str,
    pub label: &'static str,
    /// Matrix width/height are passed to the capability
    pub takes_matrix: bool,
    /// Threshold control has a visible effect
    pub uses_threshold: bool,
    /// Block-scale control has a visible effect
    pub uses_block_scale: bool,
}

const fn descriptor(
    variant: Variant,
    name: &'static str,
    label: &'static str,
    takes_matrix: bool,
    uses_threshold: bool,
    uses_block_scale: bool,
) -> VariantDescriptor {
    VariantDescriptor {
        variant,
        name,
        label,
        takes_matrix,
        uses_threshold,
        uses_block_scale,
    }
}

/// Descriptor table, indexed by `Variant as usize`.
pub static VARIANT_TABLE: [VariantDescriptor; 8] = [
    descriptor(Variant::Threshold, "threshold", "Threshold", false, true, false),
    descriptor(Variant::FloydSteinberg, "floyd-steinberg", "Floyd-Steinberg", false, true, true),
    descriptor(Variant::Bayer, "bayer", "Ordered (Bayer)", true, false, true),
    descriptor(Variant::Jarvis, "jarvis", "Jarvis-Judice-Ninke", false, true, true),
    descriptor(Variant::Atkinson, "atkinson", "Atkinson", false, true, true),
    descriptor(Variant::Sierra, "sierra", "Sierra", false, false, true),
    descriptor(Variant::SierraTwoRow, "sierra-two-row", "Sierra Two-Row", false, false, true),
    descriptor(Variant::SierraLite, "sierra-lite", "Sierra Lite", false, false, true),
];

impl Variant {
    pub fn all() -> impl Iterator<Item = Variant> {
        VARIANT_TABLE.iter().map(|d| d.variant)
    }

    pub fn descriptor(self) -> &'static VariantDescriptor {
        &VARIANT_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        VARIANT_TABLE
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
            .map(|d| d.variant)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub const THRESHOLD_RANGE: RangeInclusive<f64> = 0.0..=255.0;
pub const CONTRAST_RANGE: RangeInclusive<f64> = -100.0..=300.0;
pub const GAMMA_RANGE: RangeInclusive<f64> = 0.1..=5.0;
pub const PIXELATION_RANGE: RangeInclusive<f64> = 0.0..=50.0;
pub const BLUR_RANGE: RangeInclusive<f64> = 0.0..=20.0;
pub const BLOCK_SCALE_RANGE: RangeInclusive<f64> = 1.0..=20.0;
pub const MATRIX_RANGE: RangeInclusive<f64> = 1.0..=8.0;

/// One immutable snapshot of everything a recomputation reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineParameters {
    pub variant: Variant,
    pub threshold: u8,
    pub contrast: f32,
    pub gamma: f32,
    pub pixelation: u32,
    pub blur: u32,
    pub block_scale: u32,
    pub matrix_width: u8,
    pub matrix_height: u8,
    pub invert: bool,
    /// Running signed angle in degrees, always a multiple of 90
    pub rotation: i32,
}

impl PipelineParameters {
    /// Rotation folded into 0, 90, 180 or 270.
    pub fn normalized_rotation(&self) -> u32 {
        self.rotation.rem_euclid(360) as u32
    }
}

impl Default for PipelineParameters {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            threshold: 124,
            contrast: 131.0,
            gamma: 0.9,
            pixelation: 5,
            blur: 0,
            block_scale: 5,
            matrix_width: 4,
            matrix_height: 4,
            invert: false,
            rotation: 0,
        }
    }
}

/// A settable parameter, named after the control that edits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamField {
    Variant,
    Threshold,
    Contrast,
    Gamma,
    Pixelation,
    Blur,
    BlockScale,
    MatrixWidth,
    MatrixHeight,
    Invert,
    Rotation,
}

impl ParamField {
    pub fn name(self) -> &'static str {
        match self {
            ParamField::Variant => "algorithm",
            ParamField::Threshold => "threshold",
            ParamField::Contrast => "contrast",
            ParamField::Gamma => "gamma",
            ParamField::Pixelation => "pixelation",
            ParamField::Blur => "blur",
            ParamField::BlockScale => "block-scale",
            ParamField::MatrixWidth => "bayer-width",
            ParamField::MatrixHeight => "bayer-height",
            ParamField::Invert => "invert",
            ParamField::Rotation => "rotation",
        }
    }

    /// Clamp range for numeric fields.
    pub fn range(self) -> Option<RangeInclusive<f64>> {
        match self {
            ParamField::Threshold => Some(THRESHOLD_RANGE),
            ParamField::Contrast => Some(CONTRAST_RANGE),
            ParamField::Gamma => Some(GAMMA_RANGE),
            ParamField::Pixelation => Some(PIXELATION_RANGE),
            ParamField::Blur => Some(BLUR_RANGE),
            ParamField::BlockScale => Some(BLOCK_SCALE_RANGE),
            ParamField::MatrixWidth | ParamField::MatrixHeight => Some(MATRIX_RANGE),
            ParamField::Variant | ParamField::Invert | ParamField::Rotation => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown parameter: {}", self.0)
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for ParamField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim().to_ascii_lowercase().as_str() {
            "algorithm" | "variant" => ParamField::Variant,
            "threshold" => ParamField::Threshold,
            "contrast" => ParamField::Contrast,
            "gamma" => ParamField::Gamma,
            "pixelation" => ParamField::Pixelation,
            "blur" => ParamField::Blur,
            "block-scale" | "block_scale" => ParamField::BlockScale,
            "bayer-width" | "matrix-width" => ParamField::MatrixWidth,
            "bayer-height" | "matrix-height" => ParamField::MatrixHeight,
            "invert" => ParamField::Invert,
            "rotation" => ParamField::Rotation,
            other => return Err(UnknownField(other.to_string())),
        };
        Ok(field)
    }
}

/// Value a field holds after a `set`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Variant(Variant),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Variant(v) => write!(f, "{v}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Bool(b) => write!(f, "{b}"),
        }
    }
}
