use crate::models::{ParamField, ParamValue, PipelineParameters, Variant};

/// Single writer of [`PipelineParameters`].
///
/// Raw control input is clamped into range; input that does not parse keeps
/// the last valid value. Nothing here returns an error.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    params: PipelineParameters,
    dirty: bool,
}

impl ParameterStore {
    pub fn new(params: PipelineParameters) -> Self {
        Self {
            params,
            dirty: false,
        }
    }

    /// Current snapshot.
    pub fn get(&self) -> PipelineParameters {
        self.params
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Return and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Set `field` from raw control text and return the value it now holds.
    pub fn set(&mut self, field: ParamField, raw: &str) -> ParamValue {
        let p = &mut self.params;
        let value = match field {
            ParamField::Variant => {
                if let Some(v) = Variant::from_name(raw) {
                    p.variant = v;
                }
                ParamValue::Variant(p.variant)
            }
            ParamField::Invert => {
                if let Some(b) = parse_bool(raw) {
                    p.invert = b;
                }
                ParamValue::Bool(p.invert)
            }
            ParamField::Rotation => {
                if let Some(x) = parse_number(raw) {
                    p.rotation = snap_rotation(x);
                }
                ParamValue::Int(p.rotation as i64)
            }
            ParamField::Contrast => {
                p.contrast = clamp_or(field, raw, p.contrast as f64) as f32;
                ParamValue::Float(p.contrast as f64)
            }
            ParamField::Gamma => {
                // two decimals, matching the control's step
                let g = clamp_or(field, raw, p.gamma as f64);
                p.gamma = ((g * 100.0).round() / 100.0) as f32;
                ParamValue::Float(p.gamma as f64)
            }
            ParamField::Threshold => {
                p.threshold = clamp_or(field, raw, p.threshold as f64).round() as u8;
                ParamValue::Int(p.threshold as i64)
            }
            ParamField::Pixelation => {
                p.pixelation = clamp_or(field, raw, p.pixelation as f64).round() as u32;
                ParamValue::Int(p.pixelation as i64)
            }
            ParamField::Blur => {
                p.blur = clamp_or(field, raw, p.blur as f64).round() as u32;
                ParamValue::Int(p.blur as i64)
            }
            ParamField::BlockScale => {
                p.block_scale = clamp_or(field, raw, p.block_scale as f64).round() as u32;
                ParamValue::Int(p.block_scale as i64)
            }
            ParamField::MatrixWidth => {
                p.matrix_width = clamp_or(field, raw, p.matrix_width as f64).round() as u8;
                ParamValue::Int(p.matrix_width as i64)
            }
            ParamField::MatrixHeight => {
                p.matrix_height = clamp_or(field, raw, p.matrix_height as f64).round() as u8;
                ParamValue::Int(p.matrix_height as i64)
            }
        };
        tracing::trace!(field = field.name(), raw, %value, "Parameter set");
        self.dirty = true;
        value
    }

    pub fn set_variant(&mut self, variant: Variant) {
        self.params.variant = variant;
        self.dirty = true;
    }

    /// Rotate 90 degrees counter-clockwise. The running angle keeps its sign.
    pub fn rotate_left(&mut self) -> i32 {
        self.params.rotation = (self.params.rotation - 90) % 360;
        self.dirty = true;
        self.params.rotation
    }

    /// Rotate 90 degrees clockwise.
    pub fn rotate_right(&mut self) -> i32 {
        self.params.rotation = (self.params.rotation + 90) % 360;
        self.dirty = true;
        self.params.rotation
    }

    /// Restore the tuning controls to defaults. Variant and rotation stay.
    pub fn reset_controls(&mut self) {
        let defaults = PipelineParameters::default();
        self.params = PipelineParameters {
            variant: self.params.variant,
            rotation: self.params.rotation,
            ..defaults
        };
        self.dirty = true;
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|x| x.is_finite())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Nearest multiple of 90, clamped into `i32`.
fn snap_rotation(degrees: f64) -> i32 {
    let quarters = (degrees / 90.0).round().clamp(-4.0e6, 4.0e6);
    (quarters as i32 * 90) % 360
}

fn clamp_or(field: ParamField, raw: &str, last: f64) -> f64 {
    let Some(range) = field.range() else {
        return last;
    };
    match parse_number(raw) {
        Some(x) => x.clamp(*range.start(), *range.end()),
        None => last,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_clean_with_defaults() {
        let store = ParameterStore::default();
        assert!(!store.is_dirty());
        assert_eq!(store.get(), PipelineParameters::default());
    }

    #[test]
    fn test_clamps_numeric_fields() {
        let mut store = ParameterStore::default();
        assert_eq!(store.set(ParamField::Threshold, "300"), ParamValue::Int(255));
        assert_eq!(store.set(ParamField::Threshold, "-4"), ParamValue::Int(0));
        assert_eq!(store.set(ParamField::Contrast, "-500"), ParamValue::Float(-100.0));
        assert_eq!(store.set(ParamField::BlockScale, "0"), ParamValue::Int(1));
        assert_eq!(store.set(ParamField::MatrixWidth, "12"), ParamValue::Int(8));
        assert_eq!(store.set(ParamField::Pixelation, "7.6"), ParamValue::Int(8));
    }

    #[test]
    fn test_gamma_stays_positive() {
        let mut store = ParameterStore::default();
        store.set(ParamField::Gamma, "0");
        assert!(store.get().gamma > 0.0);
        assert_eq!(store.set(ParamField::Gamma, "1.25"), ParamValue::Float(1.25));
    }

    #[test]
    fn test_non_numeric_keeps_last_value() {
        let mut store = ParameterStore::default();
        store.set(ParamField::Threshold, "90");
        assert_eq!(store.set(ParamField::Threshold, "abc"), ParamValue::Int(90));
        assert_eq!(store.set(ParamField::Blur, "NaN"), ParamValue::Int(0));
        assert_eq!(store.set(ParamField::Blur, ""), ParamValue::Int(0));
    }

    #[test]
    fn test_set_marks_dirty() {
        let mut store = ParameterStore::default();
        store.set(ParamField::Blur, "2");
        assert!(store.take_dirty());
        assert!(!store.take_dirty());
    }

    #[test]
    fn test_variant_by_name() {
        let mut store = ParameterStore::default();
        assert_eq!(
            store.set(ParamField::Variant, "bayer"),
            ParamValue::Variant(Variant::Bayer)
        );
        assert_eq!(
            store.set(ParamField::Variant, "voronoi"),
            ParamValue::Variant(Variant::Bayer)
        );
    }

    #[test]
    fn test_invert() {
        let mut store = ParameterStore::default();
        assert_eq!(store.set(ParamField::Invert, "on"), ParamValue::Bool(true));
        assert_eq!(store.set(ParamField::Invert, "maybe"), ParamValue::Bool(true));
        assert_eq!(store.set(ParamField::Invert, "false"), ParamValue::Bool(false));
    }

    #[test]
    fn test_rotation_keeps_sign() {
        let mut store = ParameterStore::default();
        assert_eq!(store.rotate_left(), -90);
        assert_eq!(store.rotate_left(), -180);
        assert_eq!(store.rotate_left(), -270);
        assert_eq!(store.rotate_left(), 0);
        assert_eq!(store.rotate_right(), 90);
        assert_eq!(store.get().normalized_rotation(), 90);
    }

    #[test]
    fn test_raw_rotation_snaps() {
        let mut store = ParameterStore::default();
        assert_eq!(store.set(ParamField::Rotation, "100"), ParamValue::Int(90));
        assert_eq!(store.set(ParamField::Rotation, "-130"), ParamValue::Int(-90));
        assert_eq!(store.set(ParamField::Rotation, "450"), ParamValue::Int(90));
        assert_eq!(store.set(ParamField::Rotation, "x"), ParamValue::Int(90));
    }

    #[test]
    fn test_reset_controls_keeps_variant_and_rotation() {
        let mut store = ParameterStore::default();
        store.set(ParamField::Variant, "atkinson");
        store.rotate_right();
        store.set(ParamField::Threshold, "10");
        store.set(ParamField::Invert, "true");
        store.set(ParamField::MatrixHeight, "2");
        store.take_dirty();

        store.reset_controls();
        let p = store.get();
        assert_eq!(p.variant, Variant::Atkinson);
        assert_eq!(p.rotation, 90);
        assert_eq!(p.threshold, 124);
        assert!(!p.invert);
        assert_eq!(p.matrix_height, 4);
        assert!(store.is_dirty());
    }
}
