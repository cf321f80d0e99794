/*!
# DVD Rip: Titles
*/

use crate::RipError;
use std::{
	fmt,
	time::Duration,
};



/// # A Parsed Title.
///
/// One playable title, fully joined: the TT_SRPT entry, its program chain,
/// and its cell addresses, snapshotted into an immutable value at parse time.
///
/// Cells are stored in playback order; chapters index into that list with
/// 1-based, inclusive bounds.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Title {
	/// # Title Number (1-based, disc-wide).
	pub(crate) number: u16,

	/// # Video Title Set Number.
	pub(crate) vts: u8,

	/// # Angle Count.
	pub(crate) angles: u8,

	/// # Total Playback Time.
	pub(crate) duration: Duration,

	/// # Chapters, In Order.
	pub(crate) chapters: Vec<Chapter>,

	/// # Audio Stream Descriptions.
	pub(crate) audio: Vec<AudioStream>,

	/// # Subtitle Stream Descriptions.
	pub(crate) subtitles: Vec<SubtitleStream>,

	/// # Cells, In Playback Order.
	pub(crate) cells: Vec<CellRef>,
}

impl Title {
	#[must_use]
	/// # Title Number.
	pub const fn number(&self) -> u16 { self.number }

	#[must_use]
	/// # Video Title Set Number.
	pub const fn vts(&self) -> u8 { self.vts }

	#[must_use]
	/// # Angle Count.
	pub const fn angles(&self) -> u8 { self.angles }

	#[must_use]
	/// # Total Playback Time.
	pub const fn duration(&self) -> Duration { self.duration }

	#[must_use]
	/// # Chapters.
	pub fn chapters(&self) -> &[Chapter] { &self.chapters }

	#[must_use]
	/// # Chapter Count.
	pub fn chapter_count(&self) -> u16 {
		u16::try_from(self.chapters.len()).unwrap_or(u16::MAX)
	}

	#[must_use]
	/// # Audio Streams.
	pub fn audio(&self) -> &[AudioStream] { &self.audio }

	#[must_use]
	/// # Subtitle Streams.
	pub fn subtitles(&self) -> &[SubtitleStream] { &self.subtitles }

	#[must_use]
	/// # Cells.
	pub fn cells(&self) -> &[CellRef] { &self.cells }
}

impl Title {
	/// # Resolve a Playlist.
	///
	/// Return the ordered sector ranges to read for this title, optionally
	/// narrowed to an inclusive 1-based chapter range.
	///
	/// One range is emitted per cell. Adjacent ranges are deliberately never
	/// merged: the CSS title key changes at cell boundaries, so each cell has
	/// to be entered through its own seek.
	///
	/// ## Errors
	///
	/// Returns an error if the chapter range is empty, inverted, or runs past
	/// the end of the title.
	pub fn playlist(&self, chapters: Option<(u16, u16)>) -> Result<Vec<SectorRange>, RipError> {
		let cells: &[CellRef] = match chapters {
			None => &self.cells,
			Some((a, b)) => {
				if a == 0 || b < a || usize::from(b) > self.chapters.len() {
					return Err(RipError::ChapterRange(a, b));
				}
				let first = usize::from(self.chapters[usize::from(a) - 1].first_cell);
				let last = usize::from(self.chapters[usize::from(b) - 1].last_cell);
				&self.cells[first - 1..last]
			},
		};

		Ok(cells.iter().map(|c| SectorRange { start: c.start_sector, last: c.last_sector }).collect())
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # A Chapter.
///
/// DVD "programs" are what players expose as chapters: a contiguous run of
/// cells. Chapters always partition a title's cell list, no gaps, no
/// overlaps.
pub struct Chapter {
	/// # Chapter Number (1-based).
	pub(crate) number: u16,

	/// # First Cell (1-based, inclusive).
	pub(crate) first_cell: u16,

	/// # Last Cell (1-based, inclusive).
	pub(crate) last_cell: u16,

	/// # Chapter Playback Time.
	pub(crate) duration: Duration,

	/// # Playback Offset From the Start of the Title.
	pub(crate) start_offset: Duration,
}

impl Chapter {
	#[must_use]
	/// # Chapter Number.
	pub const fn number(&self) -> u16 { self.number }

	#[must_use]
	/// # First Cell (1-based).
	pub const fn first_cell(&self) -> u16 { self.first_cell }

	#[must_use]
	/// # Last Cell (1-based).
	pub const fn last_cell(&self) -> u16 { self.last_cell }

	#[must_use]
	/// # Playback Time.
	pub const fn duration(&self) -> Duration { self.duration }

	#[must_use]
	/// # Offset From the Start of the Title.
	pub const fn start_offset(&self) -> Duration { self.start_offset }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # A Cell, Resolved to Sectors.
///
/// The smallest addressable unit of playback: a contiguous sector range
/// within the title set's VOB domain, tagged with the VOB/cell ids the
/// address table filed it under.
pub struct CellRef {
	/// # VOB Id.
	pub(crate) vob_id: u16,

	/// # Cell Id (within the VOB).
	pub(crate) cell_id: u8,

	/// # Angle (0 for none, otherwise 1-9).
	pub(crate) angle: u8,

	/// # First Sector.
	pub(crate) start_sector: u32,

	/// # Last Sector (inclusive).
	pub(crate) last_sector: u32,

	/// # Cell Playback Time.
	pub(crate) duration: Duration,
}

impl CellRef {
	#[must_use]
	/// # VOB Id.
	pub const fn vob_id(&self) -> u16 { self.vob_id }

	#[must_use]
	/// # Cell Id.
	pub const fn cell_id(&self) -> u8 { self.cell_id }

	#[must_use]
	/// # Angle.
	pub const fn angle(&self) -> u8 { self.angle }

	#[must_use]
	/// # First Sector.
	pub const fn start_sector(&self) -> u32 { self.start_sector }

	#[must_use]
	/// # Last Sector (inclusive).
	pub const fn last_sector(&self) -> u32 { self.last_sector }

	#[must_use]
	/// # Sector Count.
	pub const fn sectors(&self) -> u32 { self.last_sector - self.start_sector + 1 }

	#[must_use]
	/// # Playback Time.
	pub const fn duration(&self) -> Duration { self.duration }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # A Contiguous Sector Range.
///
/// What the playlist resolver hands the rip engine: start and last logical
/// sector numbers, both inclusive.
pub struct SectorRange {
	/// # First Sector.
	pub(crate) start: u32,

	/// # Last Sector (inclusive).
	pub(crate) last: u32,
}

impl SectorRange {
	#[must_use]
	/// # First Sector.
	pub const fn start(&self) -> u32 { self.start }

	#[must_use]
	/// # Last Sector (inclusive).
	pub const fn last(&self) -> u32 { self.last }

	#[must_use]
	/// # Sector Count.
	pub const fn sectors(&self) -> u32 { self.last - self.start + 1 }

	#[must_use]
	/// # Byte Count.
	pub const fn bytes(&self) -> u64 {
		(self.sectors() as u64) * (crate::SECTOR_SIZE as u64)
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Audio Coding Format.
pub enum AudioCodec {
	/// # Dolby AC-3.
	Ac3,

	/// # MPEG-1 Layer II.
	Mpeg1,

	/// # MPEG-2 Extended.
	Mpeg2,

	/// # Linear PCM.
	Lpcm,

	/// # DTS.
	Dts,

	/// # Something Else.
	Unknown,
}

impl fmt::Display for AudioCodec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Ac3 => "AC-3",
			Self::Mpeg1 => "MPEG-1",
			Self::Mpeg2 => "MPEG-2",
			Self::Lpcm => "LPCM",
			Self::Dts => "DTS",
			Self::Unknown => "???",
		})
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # An Audio Stream (Description Only).
///
/// Enumerated for display so users can see what they're ripping; the stream
/// itself travels inside the program stream untouched.
pub struct AudioStream {
	/// # Stream Index (0-based).
	pub(crate) index: u8,

	/// # Coding Format.
	pub(crate) codec: AudioCodec,

	/// # Channel Count (1-8).
	pub(crate) channels: u8,

	/// # Sample Rate in Hz.
	pub(crate) sample_rate: u32,

	/// # ISO-639 Language Code, If Declared.
	pub(crate) lang: Option<[u8; 2]>,
}

impl AudioStream {
	#[must_use]
	/// # Stream Index.
	pub const fn index(&self) -> u8 { self.index }

	#[must_use]
	/// # Coding Format.
	pub const fn codec(&self) -> AudioCodec { self.codec }

	#[must_use]
	/// # Channel Count.
	pub const fn channels(&self) -> u8 { self.channels }

	#[must_use]
	/// # Sample Rate in Hz.
	pub const fn sample_rate(&self) -> u32 { self.sample_rate }

	#[must_use]
	/// # Language Code.
	pub fn language(&self) -> &str { lang_str(self.lang.as_ref()) }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # A Subtitle Stream (Description Only).
pub struct SubtitleStream {
	/// # Stream Index (0-based).
	pub(crate) index: u8,

	/// # ISO-639 Language Code, If Declared.
	pub(crate) lang: Option<[u8; 2]>,
}

impl SubtitleStream {
	#[must_use]
	/// # Stream Index.
	pub const fn index(&self) -> u8 { self.index }

	#[must_use]
	/// # Language Code.
	pub fn language(&self) -> &str { lang_str(self.lang.as_ref()) }
}



/// # Language Bytes to Str.
///
/// Undeclared or unprintable codes come back as the ISO-639 "undetermined"
/// tag.
fn lang_str(lang: Option<&[u8; 2]>) -> &str {
	lang.and_then(|l| std::str::from_utf8(l).ok()).unwrap_or("und")
}
