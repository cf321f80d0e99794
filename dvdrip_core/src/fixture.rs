/*!
# DVD Rip: Test Fixtures

Synthetic VIDEO_TS material for the unit tests: hand-assembled IFO images
with the same table layout the decoder expects from a real disc, and VOB
segments whose every sector is filled with a predictable byte so copy tests
can check exactly what landed where.
*/

use std::path::Path;



/// # A Synthetic TT_SRPT Row.
pub(crate) struct VmgTitle {
	/// # Angle Count.
	pub(crate) angles: u8,

	/// # Chapter Count.
	pub(crate) chapters: u16,

	/// # VTS Number.
	pub(crate) vts: u8,

	/// # Title Number Within the VTS.
	pub(crate) title_in_vts: u8,
}

/// # Build a `VIDEO_TS.IFO` Image.
///
/// The title table lands at sector one, directly after the header sector.
pub(crate) fn vmg_image(titles: &[VmgTitle]) -> Vec<u8> {
	let mut buf = vec![0_u8; 2048 + 8 + 12 * titles.len()];
	buf[..12].copy_from_slice(b"DVDVIDEO-VMG");
	buf[0xC4..0xC8].copy_from_slice(&1_u32.to_be_bytes());

	let count = u16::try_from(titles.len()).expect("Too many titles.");
	buf[2048..2050].copy_from_slice(&count.to_be_bytes());

	for (i, t) in titles.iter().enumerate() {
		let off = 2048 + 8 + 12 * i;
		buf[off + 1] = t.angles;
		buf[off + 2..off + 4].copy_from_slice(&t.chapters.to_be_bytes());
		buf[off + 6] = t.vts;
		buf[off + 7] = t.title_in_vts;
	}

	buf
}

/// # Build a `VTS_nn_0.IFO` Image.
///
/// Three sectors: the header (with one English AC-3 stream and one English
/// subtitle declared), the PGCI, and the C_ADT. Every cell gets two seconds
/// of PAL playback time and a matching address table row.
pub(crate) fn vts_image(cells: &[(u32, u32)], program_map: &[u8]) -> Vec<u8> {
	assert!(cells.len() < 64, "The one-sector PGC only fits so many cells.");
	let mut buf = vec![0_u8; 3 * 2048];
	buf[..12].copy_from_slice(b"DVDVIDEO-VTS");

	// Table pointers: PGCI at sector one, C_ADT at sector two.
	buf[0xCC..0xD0].copy_from_slice(&1_u32.to_be_bytes());
	buf[0xE0..0xE4].copy_from_slice(&2_u32.to_be_bytes());

	// One audio stream: AC-3, two channels, 48kHz, English.
	buf[0x200..0x202].copy_from_slice(&1_u16.to_be_bytes());
	buf[0x202] = 0x00;
	buf[0x203] = 0x01;
	buf[0x204] = b'e';
	buf[0x205] = b'n';

	// One subtitle stream: English.
	buf[0x254..0x256].copy_from_slice(&1_u16.to_be_bytes());
	buf[0x258] = b'e';
	buf[0x259] = b'n';

	// The PGCI: one program chain, sixteen bytes in.
	let pgci = 2048;
	buf[pgci..pgci + 2].copy_from_slice(&1_u16.to_be_bytes());
	buf[pgci + 12..pgci + 16].copy_from_slice(&16_u32.to_be_bytes());

	// The PGC block itself.
	let pgc = pgci + 16;
	buf[pgc + 2] = u8::try_from(program_map.len()).expect("Too many programs.");
	buf[pgc + 3] = u8::try_from(cells.len()).expect("Too many cells.");
	let total = u64::try_from(cells.len()).map_or(0, |n| n * 2);
	buf[pgc + 4..pgc + 8].copy_from_slice(&bcd_time(total));
	buf[pgc + 0xE6..pgc + 0xE8].copy_from_slice(&0x100_u16.to_be_bytes());
	buf[pgc + 0xE8..pgc + 0xEA].copy_from_slice(&0x120_u16.to_be_bytes());

	// The program map.
	buf[pgc + 0x100..pgc + 0x100 + program_map.len()].copy_from_slice(program_map);

	// The cell playback list.
	for (i, &(start, last)) in cells.iter().enumerate() {
		let off = pgc + 0x120 + 24 * i;
		buf[off + 4..off + 8].copy_from_slice(&bcd_time(2));
		buf[off + 8..off + 12].copy_from_slice(&start.to_be_bytes());
		buf[off + 20..off + 24].copy_from_slice(&last.to_be_bytes());
	}

	// The C_ADT.
	let cadt = 4096;
	let last_byte = u32::try_from(8 + 12 * cells.len() - 1).expect("Too many cells.");
	buf[cadt + 4..cadt + 8].copy_from_slice(&last_byte.to_be_bytes());
	for (i, &(start, last)) in cells.iter().enumerate() {
		let off = cadt + 8 + 12 * i;
		buf[off..off + 2].copy_from_slice(&1_u16.to_be_bytes());
		buf[off + 2] = u8::try_from(i + 1).expect("Too many cells.");
		buf[off + 4..off + 8].copy_from_slice(&start.to_be_bytes());
		buf[off + 8..off + 12].copy_from_slice(&last.to_be_bytes());
	}

	buf
}

/// # Write a Whole Synthetic VIDEO_TS Directory.
///
/// One title in VTS 01, with the given cells, program map, and VOB segment
/// sizes (in sectors).
pub(crate) fn write_video_ts(
	root: &Path,
	cells: &[(u32, u32)],
	program_map: &[u8],
	vob_sectors: &[u32],
) {
	let chapters = u16::try_from(program_map.len()).expect("Too many programs.");
	let vmg = vmg_image(&[VmgTitle { angles: 1, chapters, vts: 1, title_in_vts: 1 }]);
	std::fs::write(root.join("VIDEO_TS.IFO"), vmg).expect("Unable to write VIDEO_TS.IFO.");

	let vts = vts_image(cells, program_map);
	std::fs::write(root.join("VTS_01_0.IFO"), vts).expect("Unable to write VTS_01_0.IFO.");

	write_vobs(root, 1, vob_sectors);
}

/// # Write Patterned VOB Segments.
///
/// Sector numbering runs contiguously across the segments, and each sector
/// is filled with [`sector_byte`] of its own number.
pub(crate) fn write_vobs(root: &Path, vts: u8, vob_sectors: &[u32]) {
	let mut sector = 0_u32;
	for (i, &count) in vob_sectors.iter().enumerate() {
		let mut raw = Vec::with_capacity(usize::try_from(count).expect("VOB too big.") * 2048);
		for _ in 0..count {
			raw.extend(std::iter::repeat_n(sector_byte(sector), 2048));
			sector += 1;
		}
		std::fs::write(root.join(format!("VTS_{vts:02}_{}.VOB", i + 1)), raw)
			.expect("Unable to write VOB.");
	}
}

/// # Fill Byte for a Sector.
pub(crate) fn sector_byte(sector: u32) -> u8 {
	u8::try_from(sector % 251).expect("Unreachable.")
}

/// # Encode Seconds as a BCD Playback Time (PAL, Zero Frames).
fn bcd_time(total: u64) -> [u8; 4] {
	[
		bcd(total / 3600),
		bcd((total / 60) % 60),
		bcd(total % 60),
		0b1000_0000,
	]
}

/// # Encode Two Decimal Digits.
fn bcd(n: u64) -> u8 {
	assert!(n < 100, "BCD bytes hold two digits.");
	u8::try_from(((n / 10) << 4) | (n % 10)).expect("Unreachable.")
}
