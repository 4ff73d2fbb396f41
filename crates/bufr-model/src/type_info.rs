use serde::{Deserialize, Serialize};

/// Element type metadata for a value node, from BUFR Table B.
///
/// `scale`, `reference` and `bits` describe the packed encoding
/// (`decoded = (packed + reference) * 10^-scale`); `unit` is the Table B
/// unit string. Together they determine the natural element type of a
/// result array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub scale: i32,
    pub reference: i64,
    pub bits: usize,
    pub unit: String,
}

impl TypeInfo {
    /// Character data is marked with the CCITT IA5 unit in Table B.
    pub fn is_string(&self) -> bool {
        self.unit == "CCITT IA5"
    }

    /// A non-positive scale means no fractional digits survive decoding.
    pub fn is_integer(&self) -> bool {
        self.scale <= 0
    }

    /// Negative reference values can produce negative decoded values.
    pub fn is_signed(&self) -> bool {
        self.reference < 0
    }

    /// Whether decoded values can exceed a 32-bit representation.
    pub fn is_64bit(&self) -> bool {
        if self.is_string() {
            return false;
        }
        if self.is_integer() {
            let magnitude = (2f64.powi(self.bits as i32) - 1.0 + self.reference as f64)
                * 10f64.powi(-self.scale);
            let limit = if self.is_signed() { 31.0 } else { 32.0 };
            magnitude > 0.0 && magnitude.log2() > limit
        } else {
            self.bits > 32
        }
    }
}
