use std::fmt;
use std::str::FromStr;

use crate::error::{PaletteError, ParseColorError};
use crate::models::PixelBuffer;

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse `#RGB` or `#RRGGBB`; the `#` is optional and case is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError::InvalidHex(hex.to_string()));
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(ParseColorError::InvalidLength),
        };
        // all ASCII hex digits, so slicing and parsing cannot fail
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).unwrap_or(0);
        Ok(Rgb::new(channel(0), channel(2), channel(4)))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Ordered custom palette plus its derived colour cache.
///
/// Entries define a luminance ramp: the first entry replaces the darkest
/// input, the last the brightest. An empty palette maps nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaletteMapper {
    entries: Vec<String>,
    cache: Vec<Rgb>,
}

impl PaletteMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Colours the next `apply` will use.
    pub fn cached_colors(&self) -> &[Rgb] {
        &self.cache
    }

    pub fn add(&mut self, hex: &str) -> Result<(), PaletteError> {
        let rgb = parse_entry(self.entries.len(), hex)?;
        self.entries.push(rgb.to_string());
        self.invalidate();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<String, PaletteError> {
        self.check_index(index)?;
        let removed = self.entries.remove(index);
        self.invalidate();
        Ok(removed)
    }

    pub fn replace(&mut self, index: usize, hex: &str) -> Result<(), PaletteError> {
        self.check_index(index)?;
        let rgb = parse_entry(index, hex)?;
        self.entries[index] = rgb.to_string();
        self.invalidate();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.invalidate();
    }

    /// Replace the palette with a JSON array of hex strings. On any error the
    /// current palette and cache are left as they were.
    pub fn import_json(&mut self, json: &str) -> Result<usize, PaletteError> {
        let raw: Vec<String> = serde_json::from_str(json)?;
        let entries = raw
            .iter()
            .enumerate()
            .map(|(i, hex)| parse_entry(i, hex).map(|rgb| rgb.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        self.entries = entries;
        self.invalidate();
        tracing::debug!(colors = self.entries.len(), "Imported palette");
        Ok(self.entries.len())
    }

    pub fn export_json(&self) -> String {
        serde_json::Value::from(self.entries.clone()).to_string()
    }

    /// Remap RGB of every pixel through the palette, keyed on the red channel.
    /// Alpha is untouched; an empty palette is a no-op.
    pub fn apply(&self, buffer: &mut PixelBuffer) {
        let Some(last) = self.cache.len().checked_sub(1) else {
            return;
        };
        let steps = last as f64;
        for px in buffer.data_mut().chunks_exact_mut(PixelBuffer::CHANNELS) {
            let idx = ((px[0] as f64 / 255.0) * steps).round() as usize;
            let color = self.cache[idx.min(last)];
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
        }
    }

    fn check_index(&self, index: usize) -> Result<(), PaletteError> {
        if index >= self.entries.len() {
            return Err(PaletteError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }

    /// Rebuild the colour cache from the current entries.
    fn invalidate(&mut self) {
        // entries are normalised on insert, so every one parses
        self.cache = self
            .entries
            .iter()
            .filter_map(|hex| hex.parse().ok())
            .collect();
    }
}

fn parse_entry(index: usize, hex: &str) -> Result<Rgb, PaletteError> {
    hex.parse()
        .map_err(|source| PaletteError::InvalidColor { index, source })
}
