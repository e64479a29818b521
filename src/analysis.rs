//! Diagnostic interpretation of raw wire buffers.
//!
//! Nothing here touches a socket or prints anything; the probe client renders
//! an [`Analysis`] into its report sink, and tests can inspect the same value
//! directly.

use std::fmt::{self, Display};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use strum::IntoEnumIterator;

/// Width of the horizontal rules framing a rendered analysis.
const RULE_WIDTH: usize = 50;

/// A text encoding tried when interpreting a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
         strum::Display, strum::EnumIter)]
pub enum Codec {
    #[strum(serialize = "utf-8")]
    Utf8,
    #[strum(serialize = "ascii")]
    Ascii,
    #[strum(serialize = "iso-8859-1")]
    Latin1,
}

/// Failure to decode a buffer with one particular codec.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("'{codec}' codec can't decode byte {byte:#04x} in position {position}: {reason}")]
pub struct DecodeError {
    pub codec: Codec,
    pub byte: u8,
    pub position: usize,
    pub reason: &'static str,
}

impl Codec {
    /// Decode the whole buffer with this codec.
    pub fn decode(self, data: &[u8]) -> Result<String, DecodeError> {
        match self {
            Codec::Utf8 => match std::str::from_utf8(data) {
                Ok(s) => Ok(s.into()),
                Err(e) => {
                    let position = e.valid_up_to();
                    let byte = data[position];
                    let reason = match e.error_len() {
                        None => "unexpected end of data",
                        Some(_) if is_utf8_lead(byte) => "invalid continuation byte",
                        Some(_) => "invalid start byte",
                    };
                    Err(DecodeError { codec: self, byte, position, reason })
                }
            },
            Codec::Ascii => match data.iter().position(|b| !b.is_ascii()) {
                None => Ok(data.iter().map(|&b| b as char).collect()),
                Some(position) => Err(DecodeError {
                    codec: self,
                    byte: data[position],
                    position,
                    reason: "ordinal not in range(128)",
                }),
            },
            // ISO-8859-1 maps every byte to the code point of the same value.
            Codec::Latin1 => Ok(data.iter().map(|&b| b as char).collect()),
        }
    }
}

fn is_utf8_lead(byte: u8) -> bool {
    matches!(byte, 0xC2..=0xF4)
}

/// Try every known codec on the buffer, in a fixed order.
///
/// Each codec is reported independently, so a buffer can decode successfully
/// under several of them at once.
pub fn decode_all(data: &[u8]) -> Vec<(Codec, Result<String, DecodeError>)> {
    Codec::iter().map(|codec| (codec, codec.decode(data))).collect()
}

/// Fixed-width big-endian numbers read from the start of a buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NumberViews {
    /// First 4 bytes as a signed 32-bit integer.
    pub int32: Option<i32>,
    /// First 4 bytes as an IEEE-754 single.
    pub float32: Option<f32>,
    /// First 8 bytes as an IEEE-754 double.
    pub float64: Option<f64>,
}

impl NumberViews {
    /// Reinterpret the leading bytes.  Any bit pattern is a valid number, so
    /// the views only depend on the buffer length.
    pub fn of(data: &[u8]) -> Self {
        let mut views = Self::default();
        if data.len() >= 4 {
            views.int32 = Some(BigEndian::read_i32(&data[..4]));
            views.float32 = Some(BigEndian::read_f32(&data[..4]));
        }
        if data.len() >= 8 {
            views.float64 = Some(BigEndian::read_f64(&data[..8]));
        }
        views
    }
}

/// Encode an `f32` the way the probe sends numeric payloads (network order).
pub fn pack_f32(value: f32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4);
    buf.write_f32::<BigEndian>(value).expect("writing to Vec");
    buf
}

/// Encode an `i32` in network order.
pub fn pack_i32(value: i32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4);
    buf.write_i32::<BigEndian>(value).expect("writing to Vec");
    buf
}

/// Encode an `f64` in network order.
pub fn pack_f64(value: f64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8);
    buf.write_f64::<BigEndian>(value).expect("writing to Vec");
    buf
}

/// Everything the probe knows how to say about one buffer.
#[derive(Clone, Debug)]
pub struct Analysis {
    pub label: String,
    pub raw: Vec<u8>,
    pub hex: String,
    pub texts: Vec<(Codec, Result<String, DecodeError>)>,
    pub numbers: NumberViews,
}

impl Analysis {
    /// Analyse a buffer; `label` says where it came from ("Sent", "Received").
    pub fn of(data: &[u8], label: &str) -> Self {
        Analysis {
            label: label.into(),
            raw: data.to_vec(),
            hex: hex::encode(data),
            texts: decode_all(data),
            numbers: NumberViews::of(data),
        }
    }

    /// Length of the analysed buffer in bytes.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the analysed buffer had no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The decoded text for one codec, if that codec succeeded.
    pub fn text(&self, codec: Codec) -> Option<&str> {
        self.texts.iter()
                  .find(|(c, _)| *c == codec)
                  .and_then(|(_, res)| res.as_deref().ok())
    }
}

impl Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(f)?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Data Analysis ({}):", self.label)?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Raw data: {}", self.raw.escape_ascii())?;
        writeln!(f, "Length: {} bytes", self.len())?;
        writeln!(f)?;
        writeln!(f, "Hexadecimal: {}", self.hex)?;

        writeln!(f)?;
        writeln!(f, "Possible text representations:")?;
        for (codec, res) in &self.texts {
            match res {
                Ok(text) => writeln!(f, "{}: {}", codec, text)?,
                Err(e) => writeln!(f, "{}: Unable to decode - {}", codec, e)?,
            }
        }

        writeln!(f)?;
        writeln!(f, "Possible number interpretations:")?;
        if let Some(v) = self.numbers.int32 {
            writeln!(f, "As 32-bit int: {}", v)?;
        }
        if let Some(v) = self.numbers.float32 {
            writeln!(f, "As float: {}", v)?;
        }
        if let Some(v) = self.numbers.float64 {
            writeln!(f, "As double: {}", v)?;
        }
        writeln!(f, "{}", rule)
    }
}
