use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::codec::{bits, flag, DecodeError, WordReader};

/// Longest name the 5-bit length field can describe, in UTF-16 units.
pub const MAX_NAME_LEN: usize = 31;

/// Reserved for separating records in concatenated buffers; never kept in names.
pub const RECORD_SEPARATOR: char = '\u{1e}';

const HEADER_WORDS: usize = 2;

/// Stable identifier of a persisted fluid.
///
/// Assigned once when the fluid is appended to the registry and written into
/// entry records in place of a storage position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FluidId(u16);

impl FluidId {
    pub fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for FluidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 12-bit display color, written as `#rgb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct Color(u16);

impl Color {
    pub const NEUTRAL_GRAY: Color = Color(0x888);

    /// Keeps only the low 12 bits.
    pub fn from_bits(bits: u16) -> Self {
        Self(bits & 0x0fff)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    /// Parses `#rgb` (hex digits, any case). Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#')?;
        if digits.len() != 3 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u16::from_str_radix(digits, 16).ok().map(Self)
    }

    pub fn to_hex(self) -> String {
        format!("#{:03x}", self.0)
    }

    /// Parses a color, substituting neutral gray and warning when invalid.
    pub fn parse_or_gray(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            tracing::warn!("Invalid color '{}', using {}", s, Self::NEUTRAL_GRAY);
            Self::NEUTRAL_GRAY
        })
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::NEUTRAL_GRAY
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid color '{}'. Use #rgb hex form.", s))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Something that can be drunk.
///
/// Immutable once built. Every field is normalized on construction, so two
/// fluids compare equal exactly when their encoded records are identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Fluid {
    name: String,
    color: Color,
    hydration_percent: u8,
    always_shown: bool,
}

impl Fluid {
    /// Builds a fluid from UI input.
    ///
    /// `hydration` is a 0.0-1.0 ratio. An invalid color becomes neutral gray.
    pub fn new(name: impl Into<String>, color: &str, hydration: f64, always_shown: bool) -> Self {
        Self::with_color(name, Color::parse_or_gray(color), hydration, always_shown)
    }

    pub fn with_color(
        name: impl Into<String>,
        color: Color,
        hydration: f64,
        always_shown: bool,
    ) -> Self {
        let percent = if hydration.is_nan() {
            0
        } else {
            (hydration * 100.0).round().clamp(0.0, 100.0) as u8
        };
        Self {
            name: normalize_name(&name.into()),
            color,
            hydration_percent: percent,
            always_shown,
        }
    }

    /// The built-in fluid offered on every start and used when an entry's
    /// fluid cannot be resolved.
    pub fn water() -> Self {
        Self {
            name: "water".to_string(),
            color: Color(0x39f),
            hydration_percent: 100,
            always_shown: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn hydration_percent(&self) -> u8 {
        self.hydration_percent
    }

    /// Share of the volume that counts as water.
    pub fn hydration(&self) -> f64 {
        f64::from(self.hydration_percent) / 100.0
    }

    pub fn always_shown(&self) -> bool {
        self.always_shown
    }

    /// Packs the fluid as `[shown:1][hydration:7][len:5]`, `[color:12]`,
    /// followed by one word per UTF-16 unit of the name.
    pub fn encode(&self) -> Vec<u16> {
        let name: Vec<u16> = self.name.encode_utf16().collect();
        let mut words = Vec::with_capacity(HEADER_WORDS + name.len());
        words.push(
            (u16::from(self.always_shown) << 15)
                | (u16::from(self.hydration_percent) << 8)
                | name.len() as u16,
        );
        words.push(self.color.bits());
        words.extend(name);
        words
    }

    /// Decodes the record starting at `offset`, returning the fluid and the
    /// offset of the word after it. Trailing words are left untouched.
    pub fn decode(words: &[u16], offset: usize) -> Result<(Fluid, usize), DecodeError> {
        let mut reader = WordReader::at(words, offset);
        let fluid = Self::read(&mut reader)?;
        Ok((fluid, reader.position()))
    }

    /// Reads one record from the cursor.
    pub fn read(reader: &mut WordReader<'_>) -> Result<Fluid, DecodeError> {
        let header = reader.read_word()?;
        let color = reader.read_word()?;
        let name_len = bits(header, 0, 5) as usize;
        let name = reader.read_words(name_len)?;

        Ok(Self {
            name: String::from_utf16_lossy(name),
            color: Color::from_bits(color),
            hydration_percent: bits(header, 8, 7).min(100) as u8,
            always_shown: flag(header, 15),
        })
    }

    /// Decodes a whole registry buffer. Each fluid's id is its position.
    pub fn decode_all(words: &[u16]) -> Result<Vec<(FluidId, Fluid)>, DecodeError> {
        let mut reader = WordReader::new(words);
        let mut fluids = Vec::new();
        while !reader.is_empty() {
            let id = FluidId(fluids.len() as u16);
            fluids.push((id, Self::read(&mut reader)?));
        }
        Ok(fluids)
    }
}

impl fmt::Display for Fluid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}%)", self.name, self.hydration_percent)
    }
}

fn normalize_name(raw: &str) -> String {
    let mut name = String::new();
    let mut units = 0;
    for c in raw.chars() {
        let c = if c == RECORD_SEPARATOR { ' ' } else { c };
        units += c.len_utf16();
        if units > MAX_NAME_LEN {
            tracing::warn!("Fluid name '{}' truncated to {} units", raw, MAX_NAME_LEN);
            break;
        }
        name.push(c);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fluid_new() {
        let fluid = Fluid::new("coffee", "#630", 0.8, false);
        assert_eq!(fluid.name(), "coffee");
        assert_eq!(fluid.color().to_hex(), "#630");
        assert_eq!(fluid.hydration_percent(), 80);
        assert!((fluid.hydration() - 0.8).abs() < 1e-12);
        assert!(!fluid.always_shown());
    }

    #[test]
    fn test_invalid_color_becomes_gray() {
        for bad in ["red", "#12", "#12345", "#ggg", "123", ""] {
            let fluid = Fluid::new("tea", bad, 1.0, false);
            assert_eq!(fluid.color(), Color::NEUTRAL_GRAY, "input {:?}", bad);
        }
    }

    #[test]
    fn test_color_case_insensitive() {
        assert_eq!(Color::parse("#AbC"), Some(Color::from_bits(0xabc)));
        assert_eq!(Color::from_bits(0x00f).to_hex(), "#00f");
    }

    #[test]
    fn test_hydration_clamps() {
        assert_eq!(Fluid::new("a", "#000", 1.7, false).hydration_percent(), 100);
        assert_eq!(Fluid::new("a", "#000", -0.2, false).hydration_percent(), 0);
        assert_eq!(Fluid::new("a", "#000", f64::NAN, false).hydration_percent(), 0);
    }

    #[test]
    fn test_name_truncated_and_separator_replaced() {
        let long = "x".repeat(40);
        assert_eq!(Fluid::new(long, "#000", 1.0, false).name().len(), MAX_NAME_LEN);

        let fluid = Fluid::new("lemon\u{1e}ade", "#ff0", 1.0, false);
        assert_eq!(fluid.name(), "lemon ade");
    }

    #[test]
    fn test_truncation_keeps_surrogate_pairs_whole() {
        let name = format!("{}\u{1F964}", "y".repeat(30));
        let fluid = Fluid::new(name, "#000", 1.0, false);
        assert_eq!(fluid.name(), "y".repeat(30));
    }

    #[test]
    fn test_encode_layout() {
        let fluid = Fluid::new("tea", "#4a2", 0.9, true);
        let words = fluid.encode();
        assert_eq!(words.len(), 2 + 3);
        assert_eq!(words[0], 0x8000 | (90 << 8) | 3);
        assert_eq!(words[1], 0x4a2);
        assert_eq!(&words[2..], &[b't' as u16, b'e' as u16, b'a' as u16]);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let fluids = [
            Fluid::water(),
            Fluid::new("orange juice", "#f80", 0.85, false),
            Fluid::new("", "#000", 0.0, true),
            Fluid::new("\u{1F375} matcha", "#5a3", 0.95, false),
        ];
        for fluid in fluids {
            let words = fluid.encode();
            let (decoded, next) = Fluid::decode(&words, 0).unwrap();
            assert_eq!(decoded, fluid);
            assert_eq!(next, words.len());
        }
    }

    #[test]
    fn test_decode_ignores_trailing_words() {
        let mut words = Fluid::new("milk", "#fff", 0.87, false).encode();
        let own_len = words.len();
        words.extend([0xdead, 0xbeef]);
        let (fluid, next) = Fluid::decode(&words, 0).unwrap();
        assert_eq!(fluid.name(), "milk");
        assert_eq!(next, own_len);
    }

    #[test]
    fn test_decode_at_offset() {
        let milk = Fluid::new("milk", "#fff", 0.87, false);
        let tea = Fluid::new("tea", "#4a2", 0.9, true);
        let mut buf = milk.encode();
        let tea_start = buf.len();
        buf.extend(tea.encode());

        let (decoded, next) = Fluid::decode(&buf, tea_start).unwrap();
        assert_eq!(decoded, tea);
        assert_eq!(next, buf.len());

        let (first, after_first) = Fluid::decode(&buf, 0).unwrap();
        assert_eq!(first, milk);
        assert_eq!(after_first, tea_start);

        buf.pop();
        assert!(matches!(
            Fluid::decode(&buf, tea_start),
            Err(DecodeError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_decode_clamps_hydration() {
        let words = [(127 << 8) | 1, 0x123, b'x' as u16];
        let (fluid, _) = Fluid::decode(&words, 0).unwrap();
        assert_eq!(fluid.hydration_percent(), 100);
    }

    #[test]
    fn test_decode_truncated_name_fails() {
        let mut words = Fluid::new("soda", "#f00", 0.9, false).encode();
        words.pop();
        assert!(matches!(
            Fluid::decode(&words, 0),
            Err(DecodeError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_decode_all_assigns_positions() {
        let a = Fluid::water();
        let b = Fluid::new("beer", "#ec3", 0.5, false);
        let mut buf = a.encode();
        buf.extend(b.encode());

        let decoded = Fluid::decode_all(&buf).unwrap();
        assert_eq!(decoded, vec![(FluidId::new(0), a), (FluidId::new(1), b)]);
        assert!(Fluid::decode_all(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_equality_matches_encoding() {
        let a = Fluid::new("tea", "#4a2", 0.9, false);
        let b = Fluid::new("tea", "#4A2", 0.904, false);
        let c = Fluid::new("tea", "#4a2", 0.9, true);
        assert_eq!(a, b);
        assert_eq!(a.encode(), b.encode());
        assert_ne!(a, c);
        assert_ne!(a.encode(), c.encode());
    }

    #[test]
    fn test_fluid_json() {
        let json = serde_json::to_value(Fluid::water()).unwrap();
        assert_eq!(json["name"], "water");
        assert_eq!(json["color"], "#39f");
        assert_eq!(json["hydration_percent"], 100);
    }
}
