//! Canonical id encodings
//!
//! A canonical id is the text form of a token used for display, storage and
//! comparison: one numeral per byte in scan order, joined by `-`. Three
//! numeral schemes exist in the field:
//!
//! | Encoding        | `[4, 58, 255]` | `[10, 58]` |
//! |-----------------|----------------|------------|
//! | `UniformHex`    | `04-3a-ff`     | `0a-3a`    |
//! | `LegacyMixed`   | `04-58-255`    | `0a-58`    |
//! | `LegacyDecimal` | `4-58-255`     | `10-58`    |
//!
//! `UniformHex` is used for every newly enrolled credential. The legacy
//! schemes are only a read path for registries written by older lock
//! firmware. They are ambiguous without positional knowledge (`10-5` means
//! different tags under each scheme), so a registry always declares which
//! scheme its ids were written with and never guesses.
//!
//! Older firmware rendered a leading byte of 10..=15 as a single hex digit
//! (`a-58`). The legacy mixed decoder accepts that form; rendering always
//! pads to two digits.

use core::fmt::{self, Write};
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroize;

use crate::error::CodecError;
use crate::token::{IdentityToken, MAX_LENGTH};

/// Byte separator in canonical ids
pub const SEPARATOR: char = '-';

/// Longest possible canonical id (a full token under `LegacyDecimal`)
pub const CANONICAL_CAPACITY: usize = 4 * MAX_LENGTH;

/// Rendered canonical id, stored inline
pub type CanonicalId = heapless::String<CANONICAL_CAPACITY>;

/// Numeral scheme used to render a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Encoding {
    /// Every byte as two lowercase hex digits
    #[default]
    UniformHex,
    /// First byte as two hex digits, the rest unpadded decimal
    LegacyMixed,
    /// Every byte unpadded decimal
    LegacyDecimal,
}

impl Encoding {
    pub const ALL: [Encoding; 3] = [
        Encoding::UniformHex,
        Encoding::LegacyMixed,
        Encoding::LegacyDecimal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Encoding::UniformHex => "hex",
            Encoding::LegacyMixed => "legacy-mixed",
            Encoding::LegacyDecimal => "legacy-decimal",
        }
    }

    fn radix(self, position: usize) -> u32 {
        match (self, position) {
            (Encoding::UniformHex, _) | (Encoding::LegacyMixed, 0) => 16,
            _ => 10,
        }
    }

    /// Write the canonical id for `bytes`
    pub fn write_to<W: Write>(self, bytes: &[u8], out: &mut W) -> fmt::Result {
        for (position, byte) in bytes.iter().enumerate() {
            if position > 0 {
                out.write_char(SEPARATOR)?;
            }
            match self.radix(position) {
                16 => write!(out, "{:02x}", byte)?,
                _ => write!(out, "{}", byte)?,
            }
        }
        Ok(())
    }

    /// Render a token's canonical id
    pub fn render(self, token: &IdentityToken) -> CanonicalId {
        let mut out = CanonicalId::new();
        let written = self.write_to(token.as_bytes(), &mut out);
        debug_assert!(written.is_ok(), "canonical id overflowed its buffer");
        out
    }

    /// Parse a stored canonical id back into a token
    ///
    /// The empty string decodes to the empty token (an unbound slot).
    pub fn decode(self, canonical: &str) -> Result<IdentityToken, CodecError> {
        if canonical.is_empty() {
            return Ok(IdentityToken::empty());
        }

        let count = canonical.split(SEPARATOR).count();
        if count > MAX_LENGTH {
            return Err(CodecError::TooManySegments { count });
        }

        let mut bytes = [0u8; MAX_LENGTH];
        for (position, segment) in canonical.split(SEPARATOR).enumerate() {
            bytes[position] = self.decode_segment(position, segment)?;
        }

        let token = IdentityToken::new(&bytes[..count]);
        bytes.zeroize();
        Ok(token)
    }

    fn decode_segment(self, position: usize, segment: &str) -> Result<u8, CodecError> {
        if segment.is_empty() {
            return Err(CodecError::EmptySegment { position });
        }

        let radix = self.radix(position);
        let max_digits = if radix == 10 { 3 } else { 2 };
        let min_digits = match self {
            Encoding::UniformHex => 2,
            _ => 1,
        };
        let digits_ok = segment.bytes().all(|c| match radix {
            16 => matches!(c, b'0'..=b'9' | b'a'..=b'f'),
            _ => c.is_ascii_digit(),
        });

        if !digits_ok || segment.len() < min_digits || segment.len() > max_digits {
            return Err(CodecError::InvalidSegment { position });
        }

        u8::from_str_radix(segment, radix).map_err(|_| CodecError::InvalidSegment { position })
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encoding name not recognized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown encoding {0:?} (expected hex, legacy-mixed or legacy-decimal)")]
pub struct UnknownEncoding(pub String);

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Encoding::ALL
            .into_iter()
            .find(|encoding| encoding.name() == s)
            .ok_or_else(|| UnknownEncoding(s.to_owned()))
    }
}

/// Display adapter returned by [`IdentityToken::display`]
pub struct Canonical<'a> {
    token: &'a IdentityToken,
    encoding: Encoding,
}

impl<'a> Canonical<'a> {
    pub(crate) fn new(token: &'a IdentityToken, encoding: Encoding) -> Self {
        Self { token, encoding }
    }
}

impl fmt::Display for Canonical<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.encoding.write_to(self.token.as_bytes(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(encoding: Encoding, bytes: &[u8]) -> String {
        IdentityToken::new(bytes).canonical(encoding).as_str().to_owned()
    }

    #[test]
    fn test_uniform_hex() {
        assert_eq!(render(Encoding::UniformHex, &[4, 58, 255]), "04-3a-ff");
        assert_eq!(render(Encoding::UniformHex, &[0]), "00");
        assert_eq!(render(Encoding::UniformHex, &[]), "");
    }

    #[test]
    fn test_legacy_mixed() {
        assert_eq!(render(Encoding::LegacyMixed, &[4, 58]), "04-58");
        assert_eq!(render(Encoding::LegacyMixed, &[10, 58]), "0a-58");
        assert_eq!(render(Encoding::LegacyMixed, &[255, 0, 7]), "ff-0-7");
    }

    #[test]
    fn test_legacy_decimal() {
        assert_eq!(render(Encoding::LegacyDecimal, &[4, 58]), "4-58");
        assert_eq!(render(Encoding::LegacyDecimal, &[10, 58]), "10-58");
    }

    #[test]
    fn test_full_token_fits_capacity() {
        let full = [255u8; MAX_LENGTH];
        for encoding in Encoding::ALL {
            let rendered = render(encoding, &full);
            assert_eq!(rendered.split(SEPARATOR).count(), MAX_LENGTH);
            assert!(rendered.len() <= CANONICAL_CAPACITY);
        }
        assert_eq!(render(Encoding::UniformHex, &full).len(), 3 * MAX_LENGTH - 1);
    }

    #[test]
    fn test_display_matches_render() {
        let token = IdentityToken::new(&[0x12, 0x34, 0x56]);
        for encoding in Encoding::ALL {
            assert_eq!(
                token.display(encoding).to_string(),
                token.canonical(encoding).as_str()
            );
        }
    }

    #[test]
    fn test_ambiguous_across_encodings() {
        let hex = Encoding::UniformHex.decode("10-05").unwrap();
        let mixed = Encoding::LegacyMixed.decode("10-5").unwrap();
        let decimal = Encoding::LegacyDecimal.decode("10-5").unwrap();
        assert_eq!(hex.as_bytes(), &[16, 5]);
        assert_eq!(mixed.as_bytes(), &[16, 5]);
        assert_eq!(decimal.as_bytes(), &[10, 5]);
    }

    #[test]
    fn test_decode_unpadded_legacy_first_byte() {
        let token = Encoding::LegacyMixed.decode("a-58").unwrap();
        assert_eq!(token.as_bytes(), &[10, 58]);
        assert_eq!(token.canonical(Encoding::LegacyMixed).as_str(), "0a-58");
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(
            Encoding::UniformHex.decode("04--ff"),
            Err(CodecError::EmptySegment { position: 1 })
        );
        assert_eq!(
            Encoding::UniformHex.decode("4-3a"),
            Err(CodecError::InvalidSegment { position: 0 })
        );
        assert_eq!(
            Encoding::UniformHex.decode("04-3A"),
            Err(CodecError::InvalidSegment { position: 1 })
        );
        assert_eq!(
            Encoding::LegacyDecimal.decode("4-256"),
            Err(CodecError::InvalidSegment { position: 1 })
        );
        assert_eq!(
            Encoding::LegacyMixed.decode("04-3a"),
            Err(CodecError::InvalidSegment { position: 1 })
        );
        assert_eq!(
            Encoding::LegacyDecimal.decode("1-2-3-4-5-6-7-8-9-10-11"),
            Err(CodecError::TooManySegments { count: 11 })
        );
    }

    #[test]
    fn test_decode_empty_is_unbound() {
        for encoding in Encoding::ALL {
            assert!(encoding.decode("").unwrap().is_empty());
        }
    }

    #[test]
    fn test_encoding_names_round_trip() {
        for encoding in Encoding::ALL {
            assert_eq!(encoding.name().parse::<Encoding>(), Ok(encoding));
        }
        assert_eq!(
            "base64".parse::<Encoding>(),
            Err(UnknownEncoding("base64".to_owned()))
        );
    }
}
