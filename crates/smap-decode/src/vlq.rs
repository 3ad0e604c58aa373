// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Base64 VLQ (Variable-Length Quantity) decoder.
//!
//! Every base64 digit carries 6 bits: the low 5 are a magnitude chunk and
//! bit 5 says whether the next digit continues the same integer. Chunks are
//! least-significant first. Once a group ends, its lowest bit is the sign.

use crate::error::VlqError;

/// Base64 character set used in VLQ encoding.
const BASE64_CHARS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const INVALID: u8 = 0xff;

const CONTINUATION_BIT: u8 = 0b10_0000;
const CHUNK_MASK: u8 = 0b01_1111;

const DECODE_TABLE: [u8; 256] = build_decode_table();

const fn build_decode_table() -> [u8; 256] {
	let mut table = [INVALID; 256];
	let mut i = 0;
	while i < BASE64_CHARS.len() {
		table[BASE64_CHARS[i] as usize] = i as u8;
		i += 1;
	}
	table
}

/// Decode a Base64 character to its 6-bit value.
pub fn decode_char(ch: u8) -> Option<u8> {
	match DECODE_TABLE[ch as usize] {
		INVALID => None,
		digit => Some(digit),
	}
}

/// Decode a VLQ run into the signed integers it encodes.
///
/// Integers are packed back to back with no delimiter; a cleared
/// continuation bit ends each one. An empty run decodes to no values.
pub fn decode_segment(segment: &str) -> Result<Vec<i64>, VlqError> {
	let mut values = Vec::new();
	let mut value = 0u64;
	let mut shift = 0u32;

	for (offset, byte) in segment.bytes().enumerate() {
		let digit = decode_char(byte).ok_or_else(|| VlqError::InvalidChar {
			ch: segment[offset..].chars().next().unwrap_or(byte as char),
			offset,
		})?;

		// zero chunks past bit 64 are padding and lose nothing
		let chunk = u64::from(digit & CHUNK_MASK);
		if chunk != 0 {
			if shift >= u64::BITS || (shift > u64::BITS - 5 && chunk >> (u64::BITS - shift) != 0) {
				return Err(VlqError::Overflow);
			}
			value |= chunk << shift;
		}
		shift = shift.saturating_add(5);

		if digit & CONTINUATION_BIT == 0 {
			let negative = value & 1 != 0;
			let magnitude = (value >> 1) as i64;
			values.push(if negative { -magnitude } else { magnitude });
			value = 0;
			shift = 0;
		}
	}

	if shift != 0 {
		return Err(VlqError::Unterminated);
	}

	Ok(values)
}

#[cfg(test)]
pub(crate) fn encode_value(value: i64) -> String {
	let mut rest = if value < 0 {
		(value.unsigned_abs() << 1) | 1
	} else {
		(value as u64) << 1
	};
	let mut out = String::new();
	loop {
		let mut digit = (rest & u64::from(CHUNK_MASK)) as u8;
		rest >>= 5;
		if rest != 0 {
			digit |= CONTINUATION_BIT;
		}
		out.push(BASE64_CHARS[digit as usize] as char);
		if rest == 0 {
			return out;
		}
	}
}
