//! Hex/ABI data-field codec.
//!
//! Smart contract calls and token transfers carry their payload in the
//! transaction data as `function@arg1@arg2...`, each argument lowercase hex of
//! whole bytes.

use alloy::primitives::U256;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::address::Address;
use crate::error::{Error, Result};

/// Separator between function name and arguments.
pub const ARG_SEPARATOR: char = '@';

/// UTF-8 text as lowercase hex.
#[must_use]
pub fn encode_text(text: &str) -> String {
    hex::encode(text.as_bytes())
}

/// Minimal big-endian hex, padded to an even length. Zero encodes as `""`.
#[must_use]
pub fn encode_biguint(value: &U256) -> String {
    if value.is_zero() {
        return String::new();
    }
    pad_even(format!("{value:x}"))
}

/// Minimal big-endian hex of a `u64`, padded to an even length. Zero encodes as `""`.
#[must_use]
pub fn encode_u64(value: u64) -> String {
    if value == 0 {
        return String::new();
    }
    pad_even(format!("{value:x}"))
}

/// Token nonce encoding used by purchase calls: at least two hex digits,
/// always even length, so a zero nonce still yields `"00"`.
#[must_use]
pub fn encode_nonce(nonce: u64) -> String {
    pad_even(format!("{nonce:02x}"))
}

/// Fixed-width 8-byte big-endian hex (16 digits).
#[must_use]
pub fn encode_fixed_u64(value: u64) -> String {
    format!("{value:016x}")
}

/// `01` for true, `00` for false.
#[must_use]
pub const fn encode_bool(value: bool) -> &'static str {
    if value { "01" } else { "00" }
}

/// Property flags in token issuance use the literal words.
#[must_use]
pub fn encode_flag(value: bool) -> String {
    encode_text(if value { "true" } else { "false" })
}

/// Address argument: hex of the 32 public key bytes.
#[must_use]
pub fn encode_address(address: &Address) -> String {
    address.to_hex()
}

fn pad_even(hex: String) -> String {
    if hex.len() % 2 == 1 {
        format!("0{hex}")
    } else {
        hex
    }
}

/// Decode a big-endian unsigned integer of any byte length up to 32.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the value does not fit in 256 bits.
pub fn decode_biguint(bytes: &[u8]) -> Result<U256> {
    U256::try_from_be_slice(bytes)
        .ok_or_else(|| Error::validation(format!("integer of {} bytes overflows", bytes.len())))
}

/// Decode one base64 VM return value into raw bytes.
///
/// # Errors
///
/// Returns [`Error::Validation`] on invalid base64.
pub fn decode_return_data(encoded: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(encoded)
        .map_err(|e| Error::validation(format!("invalid base64 return data: {e}")))
}

/// Builder for a `function@arg@arg` data field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataField {
    function: String,
    args: Vec<String>,
}

impl DataField {
    /// Start a call to `function`.
    #[must_use]
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            args: Vec::new(),
        }
    }

    /// Append an already hex-encoded argument.
    #[must_use]
    pub fn arg(mut self, hex: impl Into<String>) -> Self {
        self.args.push(hex.into());
        self
    }

    /// Append a text argument.
    #[must_use]
    pub fn text(self, text: &str) -> Self {
        self.arg(encode_text(text))
    }

    /// Append an integer argument.
    #[must_use]
    pub fn u64(self, value: u64) -> Self {
        self.arg(encode_u64(value))
    }

    /// Append a big integer argument.
    #[must_use]
    pub fn biguint(self, value: &U256) -> Self {
        self.arg(encode_biguint(value))
    }

    /// Append an address argument.
    #[must_use]
    pub fn address(self, address: &Address) -> Self {
        self.arg(encode_address(address))
    }

    /// Function name.
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Encoded arguments, in order.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Render `function@arg1@arg2...`; no trailing separator without arguments.
    #[must_use]
    pub fn build(&self) -> String {
        let mut out = self.function.clone();
        for arg in &self.args {
            out.push(ARG_SEPARATOR);
            out.push_str(arg);
        }
        out
    }
}

/// Split a data field back into function name and raw hex arguments.
#[must_use]
pub fn parse_data_field(data: &str) -> (String, Vec<String>) {
    let mut parts = data.split(ARG_SEPARATOR);
    let function = parts.next().unwrap_or_default().to_owned();
    (function, parts.map(str::to_owned).collect())
}

/// Decode a hex argument as UTF-8 text, lossily.
///
/// # Errors
///
/// Returns [`Error::Validation`] on invalid hex.
pub fn decode_text(hex_arg: &str) -> Result<String> {
    let bytes =
        hex::decode(hex_arg).map_err(|e| Error::validation(format!("invalid hex argument: {e}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse a base-10 unsigned big integer.
///
/// # Errors
///
/// Returns [`Error::Validation`] for negative, empty, non-decimal or
/// out-of-range input.
pub fn parse_biguint(field: &str, text: &str) -> Result<U256> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::validation(format!(
            "{field} must be a non-negative integer, got '{text}'"
        )));
    }
    U256::from_str_radix(trimmed, 10)
        .map_err(|e| Error::validation(format!("{field} is out of range: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod integers {
        use super::*;

        #[test]
        fn nonce_padding() {
            assert_eq!(encode_nonce(15), "0f");
            assert_eq!(encode_nonce(255), "ff");
            assert_eq!(encode_nonce(0), "00");
            assert_eq!(encode_nonce(1), "01");
            assert_eq!(encode_nonce(256), "0100");
        }

        #[test]
        fn quantity_even_length() {
            assert_eq!(encode_u64(16), "10");
            assert_eq!(encode_u64(256), "0100");
            assert_eq!(encode_u64(1), "01");
            assert_eq!(encode_u64(0), "");
        }

        #[test]
        fn even_length_and_value_preserved() {
            let samples = [1_u64, 9, 10, 15, 16, 255, 256, 4095, 4096, 65_535, 1 << 40, u64::MAX];
            for n in samples {
                let hex = encode_u64(n);
                assert_eq!(hex.len() % 2, 0, "odd length for {n}");
                assert_eq!(u64::from_str_radix(&hex, 16).unwrap(), n);

                let big = encode_biguint(&U256::from(n));
                assert_eq!(big, hex);
            }
        }

        #[test]
        fn biguint_beyond_u64() {
            let value = parse_biguint("amount", "1000000000000000000000").unwrap();
            assert_eq!(encode_biguint(&value), "3635c9adc5dea00000");
            assert_eq!(encode_biguint(&U256::ZERO), "");
        }

        #[test]
        fn fixed_width() {
            assert_eq!(encode_fixed_u64(42), "000000000000002a");
        }

        #[test]
        fn bools_and_flags() {
            assert_eq!(encode_bool(true), "01");
            assert_eq!(encode_bool(false), "00");
            assert_eq!(encode_flag(true), "74727565");
            assert_eq!(encode_flag(false), "66616c7365");
        }
    }

    mod decoding {
        use super::*;

        #[test]
        fn empty_bytes_are_zero() {
            assert_eq!(decode_biguint(&[]).unwrap(), U256::ZERO);
        }

        #[test]
        fn variable_width_big_endian() {
            assert_eq!(decode_biguint(&[0x01]).unwrap(), U256::from(1));
            assert_eq!(decode_biguint(&[0x21, 0x34]).unwrap(), U256::from(8500));
            assert_eq!(decode_biguint(&[0x01, 0x00, 0x00]).unwrap(), U256::from(65_536));
            assert_eq!(
                decode_biguint(&[0, 0, 0, 0, 0, 0, 0x21, 0x34]).unwrap(),
                U256::from(8500)
            );
        }

        #[test]
        fn overflow_is_rejected() {
            assert!(decode_biguint(&[1_u8; 33]).is_err());
        }

        #[test]
        fn base64_return_data() {
            assert_eq!(decode_return_data("ITQ=").unwrap(), vec![0x21, 0x34]);
            assert_eq!(decode_return_data("").unwrap(), Vec::<u8>::new());
            assert!(decode_return_data("***").is_err());
        }

        #[test]
        fn text_roundtrip() {
            assert_eq!(decode_text(&encode_text("TOK-1")).unwrap(), "TOK-1");
            assert!(decode_text("zz").is_err());
        }
    }

    mod data_field {
        use super::*;

        #[test]
        fn function_only_has_no_separator() {
            assert_eq!(DataField::new("claim").build(), "claim");
        }

        #[test]
        fn esdt_transfer_shape() {
            let data = DataField::new("ESDTTransfer")
                .text("USDC-c76f1f")
                .biguint(&U256::from(1_000_000_u64))
                .build();
            assert_eq!(data, "ESDTTransfer@555344432d633736663166@0f4240");
        }

        #[test]
        fn parse_splits_parts() {
            let (function, args) = parse_data_field("buy@544f4b2d31@01@01");
            assert_eq!(function, "buy");
            assert_eq!(args, vec!["544f4b2d31", "01", "01"]);

            let (function, args) = parse_data_field("claim");
            assert_eq!(function, "claim");
            assert!(args.is_empty());
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn rejects_negative_and_garbage() {
            assert!(parse_biguint("amount", "-1").is_err());
            assert!(parse_biguint("amount", "").is_err());
            assert!(parse_biguint("amount", "1.5").is_err());
            assert!(parse_biguint("amount", "0x10").is_err());
        }

        #[test]
        fn rejects_out_of_range() {
            let too_big = "9".repeat(90);
            let err = parse_biguint("value", &too_big).unwrap_err();
            assert!(err.to_string().contains("out of range"));
        }

        #[test]
        fn accepts_whitespace_padded() {
            assert_eq!(parse_biguint("amount", " 42 ").unwrap(), U256::from(42));
        }
    }
}
