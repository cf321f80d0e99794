/*!
# DVD Rip: IFO Byte Primitives

IFO files are small (well under a megabyte), so the decoder slurps each one
into memory and picks it apart with the bounds-checked helpers below. All
multi-byte integers on a DVD are big-endian; durations are binary-coded
decimal with a frame-rate marker squirreled into the top bits of the frame
byte.
*/

use crate::{
	RipError,
	SECTOR_SIZE,
};
use std::time::Duration;



/// # Big-Endian u16.
///
/// ## Errors
///
/// Returns an error if the value extends past the end of the buffer.
pub(crate) fn u16_be(buf: &[u8], off: usize) -> Result<u16, RipError> {
	slice(buf, off, 2)
		.and_then(|b| b.try_into().ok())
		.map(u16::from_be_bytes)
		.ok_or(RipError::Truncated(off))
}

/// # Big-Endian u32.
///
/// ## Errors
///
/// Returns an error if the value extends past the end of the buffer.
pub(crate) fn u32_be(buf: &[u8], off: usize) -> Result<u32, RipError> {
	slice(buf, off, 4)
		.and_then(|b| b.try_into().ok())
		.map(u32::from_be_bytes)
		.ok_or(RipError::Truncated(off))
}

#[must_use]
/// # BCD Byte.
///
/// Decode two packed decimal digits. Out-of-range nibbles are decoded as-is,
/// same as the hardware.
pub(crate) const fn bcd_byte(b: u8) -> u8 { ((b >> 4) & 0xF) * 10 + (b & 0xF) }

/// # BCD Duration.
///
/// Decode a four-byte `HH MM SS FF` playback time. The frame byte carries the
/// frame count in its low six bits (BCD) and the frame rate in its top two:
/// `0b11` is 30fps NTSC; everything else, reserved patterns included, is
/// treated as 25fps PAL.
///
/// The result is truncated to whole milliseconds.
///
/// ## Errors
///
/// Returns an error if the four bytes extend past the end of the buffer.
pub(crate) fn bcd_duration(buf: &[u8], off: usize) -> Result<Duration, RipError> {
	let raw = slice(buf, off, 4).ok_or(RipError::Truncated(off))?;
	let hours = u64::from(bcd_byte(raw[0]));
	let minutes = u64::from(bcd_byte(raw[1]));
	let seconds = u64::from(bcd_byte(raw[2]));
	let frames = u64::from(bcd_byte(raw[3] & 0b0011_1111));
	let fps: u64 =
		if raw[3] >> 6 == 0b11 { 30 }
		else { 25 };

	Ok(Duration::from_millis(
		(hours * 3600 + minutes * 60 + seconds) * 1000 + frames * 1000 / fps
	))
}

/// # Fixed-Length ASCII Tag.
///
/// Read `len` bytes as printable ASCII, substituting `?` for anything that
/// isn't. (The magics this is used on are always clean; the substitution just
/// keeps garbage headers readable in error output.)
///
/// ## Errors
///
/// Returns an error if the tag extends past the end of the buffer.
pub(crate) fn ascii(buf: &[u8], off: usize, len: usize) -> Result<String, RipError> {
	let raw = slice(buf, off, len).ok_or(RipError::Truncated(off))?;
	Ok(
		raw.iter()
			.map(|&b|
				if b.is_ascii_graphic() || b == b' ' { char::from(b) }
				else { '?' }
			)
			.collect()
	)
}

/// # Checked Sub-Slice.
///
/// Corrupt sector pointers can push offsets clear past `usize` range, so
/// even the end-of-range arithmetic has to be overflow-proof.
fn slice(buf: &[u8], off: usize, len: usize) -> Option<&[u8]> {
	off.checked_add(len).and_then(|end| buf.get(off..end))
}

#[must_use]
/// # Sector Pointer to Byte Offset.
///
/// IFO tables are located by sector number within the same file; multiply to
/// get a byte offset. Corrupt pointers can overflow the math, in which case
/// the offset saturates and the next read fails its bounds check instead.
pub(crate) fn sector_to_byte(sector: u32) -> usize {
	usize::try_from(u64::from(sector) * u64::from(SECTOR_SIZE)).unwrap_or(usize::MAX)
}
