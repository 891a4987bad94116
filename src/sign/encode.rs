//! RFC 5849 §3.6 percent-encoding.

// std
use std::str::Utf8Error;
// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Everything except the unreserved set `A-Z a-z 0-9 - . _ ~` is escaped.
const OAUTH_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes `input` with uppercase hex digits, leaving only unreserved characters intact.
pub fn percent_encode(input: &str) -> String {
	utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}

/// Reverses [`percent_encode`], failing when the decoded bytes are not UTF-8.
pub fn percent_decode(input: &str) -> Result<String, Utf8Error> {
	percent_decode_str(input).decode_utf8().map(|value| value.into_owned())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn unreserved_characters_pass_through() {
		assert_eq!(percent_encode("abcXYZ019"), "abcXYZ019");
		assert_eq!(percent_encode("-._~"), "-._~");
	}

	#[test]
	fn reserved_characters_use_uppercase_hex() {
		assert_eq!(percent_encode(" "), "%20");
		assert_eq!(percent_encode("&=+/"), "%26%3D%2B%2F");
		assert_eq!(percent_encode("*"), "%2A");
		assert_eq!(percent_encode("é"), "%C3%A9");
		assert_eq!(percent_encode("%3D"), "%253D");
	}

	#[test]
	fn decoding_recovers_printable_ascii_and_reserved_characters() {
		let printable: String = (0x20_u8..0x7f).map(char::from).collect();

		for sample in [printable.as_str(), "Ladies + Gentlemen", "a=b&c=d", "☃ snow", ""] {
			let encoded = percent_encode(sample);

			assert!(
				encoded.bytes().all(|b| b.is_ascii_alphanumeric() || b"-._~%".contains(&b)),
				"Encoded output must only contain unreserved characters and escapes: {encoded}."
			);
			assert_eq!(
				percent_decode(&encoded).expect("Encoded samples should decode as UTF-8."),
				sample
			);
		}
	}

	#[test]
	fn decoding_rejects_invalid_utf8() {
		assert!(percent_decode("%FF%FE").is_err());
	}
}
