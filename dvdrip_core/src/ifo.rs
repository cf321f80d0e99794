/*!
# DVD Rip: IFO Decoding

Byte-level parsing for the two IFO flavors the ripper cares about: the video
manager (`VIDEO_TS.IFO`) with its global title table, and the per-title-set
`VTS_nn_0.IFO` with stream attributes, program chains, and the cell address
table.

Offsets come straight from the DVD-Video layout: tables are located by
sector pointers stored at fixed header positions, and everything inside
them is big-endian.
*/

use crate::{
	AudioCodec,
	AudioStream,
	byte::{
		ascii,
		bcd_duration,
		sector_to_byte,
		u16_be,
		u32_be,
	},
	CellRef,
	Chapter,
	RipError,
	SubtitleStream,
	Title,
	VMG_MAGIC,
	VTS_MAGIC,
};
use fyi_msg::Msg;
use std::time::Duration;



/// # TT_SRPT Sector Pointer Offset.
const VMG_SRPT_PTR: usize = 0xC4;

/// # Audio Attribute Table Offset (VTS).
const VTS_AUDIO: usize = 0x200;

/// # Subtitle Attribute Table Offset (VTS).
const VTS_SUBS: usize = 0x254;

/// # VTS_PGCI Sector Pointer Offset.
const VTS_PGCI_PTR: usize = 0xCC;

/// # C_ADT Sector Pointer Offset.
const VTS_CADT_PTR: usize = 0xE0;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # A Global Title Table Entry.
///
/// One row of TT_SRPT: just enough to know which VTS to open and which
/// program chain to pull once there.
pub(crate) struct TitleEntry {
	/// # Title Number (1-based, disc-wide).
	pub(crate) title_number: u16,

	/// # Angle Count.
	pub(crate) angle_count: u8,

	/// # Declared Chapter Count.
	pub(crate) chapter_count: u16,

	/// # Video Title Set Number.
	pub(crate) vts_number: u8,

	/// # Title Number Within the VTS.
	pub(crate) title_in_vts: u8,

	/// # VTS Entry Sector (disc-absolute, informational).
	pub(crate) vts_entry_sector: u32,
}

/// # Parse the Video Manager IFO.
///
/// Validate the magic, locate TT_SRPT, and return its entries in table
/// order.
///
/// ## Errors
///
/// Returns an error if the magic is wrong or the table runs off the end of
/// the file.
pub(crate) fn parse_vmg(buf: &[u8]) -> Result<Vec<TitleEntry>, RipError> {
	if ascii(buf, 0, 12)? != VMG_MAGIC {
		return Err(RipError::CorruptIfo("VIDEO_TS.IFO".to_owned(), "bad magic"));
	}

	let srpt = sector_to_byte(u32_be(buf, VMG_SRPT_PTR)?);
	let count = u16_be(buf, srpt)?;

	// Each entry is twelve bytes, starting eight bytes into the table.
	let mut out = Vec::with_capacity(usize::from(count));
	for i in 0..count {
		let off = srpt + 8 + 12 * usize::from(i);
		let entry = buf.get(off..off + 12).ok_or(RipError::Truncated(off))?;
		out.push(TitleEntry {
			title_number: i + 1,
			angle_count: entry[1],
			chapter_count: u16::from_be_bytes([entry[2], entry[3]]),
			vts_number: entry[6],
			title_in_vts: entry[7],
			vts_entry_sector: u32::from_be_bytes([entry[8], entry[9], entry[10], entry[11]]),
		});
	}

	Ok(out)
}



/// # Parse a Title Set IFO.
///
/// Pull the stream attributes, the title's program chain, and the cell
/// address table, then join the lot into a [`Title`].
///
/// ## Errors
///
/// Returns an error if the magic is wrong, a table is internally
/// inconsistent, or anything runs off the end of the file.
pub(crate) fn parse_vts(buf: &[u8], entry: &TitleEntry, file: &str) -> Result<Title, RipError> {
	if ascii(buf, 0, 12)? != VTS_MAGIC {
		return Err(RipError::CorruptIfo(file.to_owned(), "bad magic"));
	}

	let audio = parse_audio(buf)?;
	let subtitles = parse_subtitles(buf)?;
	let pgc = parse_pgc(buf, entry.title_in_vts, file)?;
	let adt = parse_cell_addresses(buf)?;
	let cells = join_cells(&pgc.cells, &adt, file);
	let chapters = build_chapters(&pgc.program_map, &cells, file)?;

	Ok(Title {
		number: entry.title_number,
		vts: entry.vts_number,
		angles: entry.angle_count,
		duration: pgc.duration,
		chapters,
		audio,
		subtitles,
		cells,
	})
}

/// # Parse Audio Stream Attributes.
///
/// The table holds up to eight fixed-width entries; counts beyond that are
/// authoring noise and get clamped.
fn parse_audio(buf: &[u8]) -> Result<Vec<AudioStream>, RipError> {
	let count = u16_be(buf, VTS_AUDIO)?.min(8);

	let mut out = Vec::with_capacity(usize::from(count));
	for i in 0..count {
		let off = VTS_AUDIO + 2 + 8 * usize::from(i);
		let entry = buf.get(off..off + 8).ok_or(RipError::Truncated(off))?;
		out.push(AudioStream {
			index: u8::try_from(i).unwrap_or(u8::MAX),
			codec: match (entry[0] >> 5) & 0b0111 {
				0 => AudioCodec::Ac3,
				2 => AudioCodec::Mpeg1,
				3 => AudioCodec::Mpeg2,
				4 => AudioCodec::Lpcm,
				6 => AudioCodec::Dts,
				_ => AudioCodec::Unknown,
			},
			channels: (entry[1] & 0b0111) + 1,
			sample_rate:
				if (entry[1] >> 4) & 0b0011 == 0 { 48_000 }
				else { 96_000 },
			lang: parse_lang(entry[2], entry[3]),
		});
	}

	Ok(out)
}

/// # Parse Subtitle Stream Attributes.
///
/// Only the language survives; everything else about a subpicture stream is
/// irrelevant to a straight stream copy.
fn parse_subtitles(buf: &[u8]) -> Result<Vec<SubtitleStream>, RipError> {
	let count = u16_be(buf, VTS_SUBS)?.min(32);

	let mut out = Vec::with_capacity(usize::from(count));
	for i in 0..count {
		let off = VTS_SUBS + 2 + 6 * usize::from(i);
		let entry = buf.get(off..off + 6).ok_or(RipError::Truncated(off))?;
		out.push(SubtitleStream {
			index: u8::try_from(i).unwrap_or(u8::MAX),
			lang: parse_lang(entry[2], entry[3]),
		});
	}

	Ok(out)
}

/// # Language Code Bytes.
///
/// Either byte being null means the author never filled the field in.
const fn parse_lang(a: u8, b: u8) -> Option<[u8; 2]> {
	if a == 0 || b == 0 { None }
	else { Some([a, b]) }
}

/// # A Cell From the PGC Playback List.
struct PgcCell {
	/// # Playback Time.
	duration: Duration,

	/// # First VOBU Start Sector.
	start_sector: u32,

	/// # Last VOBU End Sector.
	last_sector: u32,
}

/// # A Parsed Program Chain.
struct Pgc {
	/// # Total Playback Time.
	duration: Duration,

	/// # Program Map: 1-based First Cell Per Program.
	program_map: Vec<u8>,

	/// # Cell Playback List.
	cells: Vec<PgcCell>,
}

/// # Parse the Title's Program Chain.
///
/// VTS_PGCI points at a list of program chains; the one to play is picked by
/// the title's position within the set (clamped, because discs lie). Inside
/// it: the program map and the cell playback list, both located by offsets
/// relative to the PGC block itself.
fn parse_pgc(buf: &[u8], title_in_vts: u8, file: &str) -> Result<Pgc, RipError> {
	let pgci = sector_to_byte(u32_be(buf, VTS_PGCI_PTR)?);
	let pgc_count = u16_be(buf, pgci)?;
	if pgc_count == 0 {
		return Err(RipError::CorruptIfo(file.to_owned(), "empty program chain table"));
	}

	// The search entry for this PGC, with the block offset relative to the
	// PGCI base.
	let index = u16::from(title_in_vts).clamp(1, pgc_count) - 1;
	let search = pgci + 8 + 8 * usize::from(index);
	let pgc = pgci.saturating_add(usize::try_from(u32_be(buf, search + 4)?).unwrap_or(usize::MAX));
	if buf.len() < pgc.saturating_add(0xEA) { return Err(RipError::Truncated(pgc)); }

	let header = &buf[pgc..pgc + 0xEA];
	let program_count = header[2];
	let cell_count = header[3];
	if program_count == 0 || cell_count == 0 || cell_count < program_count {
		return Err(RipError::CorruptIfo(file.to_owned(), "bad program/cell counts"));
	}
	let duration = bcd_duration(buf, pgc + 4)?;

	// The program map: one byte per program.
	let map_off = pgc + usize::from(u16::from_be_bytes([header[0xE6], header[0xE7]]));
	let program_map = buf.get(map_off..map_off + usize::from(program_count))
		.ok_or(RipError::Truncated(map_off))?
		.to_vec();

	// The cell playback list: 24 bytes per cell.
	let cell_off = pgc + usize::from(u16::from_be_bytes([header[0xE8], header[0xE9]]));
	let mut cells = Vec::with_capacity(usize::from(cell_count));
	for i in 0..usize::from(cell_count) {
		let off = cell_off + 24 * i;
		if buf.len() < off + 24 { return Err(RipError::Truncated(off)); }
		let start_sector = u32_be(buf, off + 8)?;
		let last_sector = u32_be(buf, off + 20)?;
		if last_sector < start_sector {
			return Err(RipError::CorruptIfo(file.to_owned(), "inverted cell sector range"));
		}
		cells.push(PgcCell {
			duration: bcd_duration(buf, off + 4)?,
			start_sector,
			last_sector,
		});
	}

	Ok(Pgc { duration, program_map, cells })
}



/// # A Cell Address Table Entry.
struct AdtCell {
	/// # VOB Id.
	vob_id: u16,

	/// # Cell Id.
	cell_id: u8,

	/// # Angle.
	angle: u8,

	/// # First Sector.
	start_sector: u32,

	/// # Last Sector (inclusive).
	last_sector: u32,
}

/// # Parse the Cell Address Table.
///
/// C_ADT sizes itself with a trailing byte offset rather than an entry
/// count, hence the little dance at the top.
fn parse_cell_addresses(buf: &[u8]) -> Result<Vec<AdtCell>, RipError> {
	let cadt = sector_to_byte(u32_be(buf, VTS_CADT_PTR)?);
	let last_byte = u32_be(buf, cadt.saturating_add(4))?;

	// The declared count can't exceed what the file could physically hold,
	// so clip it before trusting it with an allocation.
	let count = usize::try_from((u64::from(last_byte) + 1).saturating_sub(8) / 12)
		.unwrap_or(usize::MAX)
		.min(buf.len() / 12);

	let mut out = Vec::with_capacity(count);
	for i in 0..count {
		let off = cadt + 8 + 12 * i;
		let entry = buf.get(off..off + 12).ok_or(RipError::Truncated(off))?;
		out.push(AdtCell {
			vob_id: u16::from_be_bytes([entry[0], entry[1]]),
			cell_id: entry[2],
			angle: entry[3],
			start_sector: u32::from_be_bytes([entry[4], entry[5], entry[6], entry[7]]),
			last_sector: u32::from_be_bytes([entry[8], entry[9], entry[10], entry[11]]),
		});
	}

	Ok(out)
}

/// # Join PGC Cells With Their Addresses.
///
/// Match each playback cell to its address table entry, by exact sector
/// range first, then by containment. Cells that match nothing at all get a
/// synthesized identity so a sloppily-authored disc still plays; that case
/// is worth a warning.
fn join_cells(pgc: &[PgcCell], adt: &[AdtCell], file: &str) -> Vec<CellRef> {
	pgc.iter()
		.enumerate()
		.map(|(i, c)| {
			let found = adt.iter()
				.find(|a| a.start_sector == c.start_sector && a.last_sector == c.last_sector)
				.or_else(|| adt.iter().find(|a|
					a.start_sector <= c.start_sector && c.last_sector <= a.last_sector
				));

			found.map_or_else(
				|| {
					Msg::warning(format!(
						"{file}: cell #{} is missing from the address table.",
						i + 1,
					)).eprint();
					CellRef {
						vob_id: 1,
						cell_id: u8::try_from(i + 1).unwrap_or(u8::MAX),
						angle: 0,
						start_sector: c.start_sector,
						last_sector: c.last_sector,
						duration: c.duration,
					}
				},
				|a| CellRef {
					vob_id: a.vob_id,
					cell_id: a.cell_id,
					angle: a.angle,
					start_sector: c.start_sector,
					last_sector: c.last_sector,
					duration: c.duration,
				},
			)
		})
		.collect()
}

/// # Build Chapters From the Program Map.
///
/// Each program-map byte names the 1-based first cell of that chapter; the
/// last chapter runs to the end of the cell list. The map has to partition
/// the cells exactly, so anything non-monotonic or out of range is treated
/// as corruption rather than guessed around.
fn build_chapters(program_map: &[u8], cells: &[CellRef], file: &str) -> Result<Vec<Chapter>, RipError> {
	let cell_count = cells.len();
	let mut out = Vec::with_capacity(program_map.len());
	let mut offset = Duration::ZERO;
	let mut expected_first = 1_usize;

	for (k, &first) in program_map.iter().enumerate() {
		let first = usize::from(first);
		if first != expected_first || first > cell_count {
			return Err(RipError::CorruptIfo(file.to_owned(), "bad program map"));
		}

		let last = match program_map.get(k + 1) {
			Some(&next) if usize::from(next) <= first => {
				return Err(RipError::CorruptIfo(file.to_owned(), "bad program map"));
			},
			Some(&next) => usize::from(next) - 1,
			None => cell_count,
		};
		expected_first = last + 1;

		let duration = cells[first - 1..last]
			.iter()
			.map(CellRef::duration)
			.sum();
		out.push(Chapter {
			number: u16::try_from(k + 1).unwrap_or(u16::MAX),
			first_cell: u16::try_from(first).unwrap_or(u16::MAX),
			last_cell: u16::try_from(last).unwrap_or(u16::MAX),
			duration,
			start_offset: offset,
		});
		offset += duration;
	}

	Ok(out)
}
