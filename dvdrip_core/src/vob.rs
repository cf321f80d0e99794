/*!
# DVD Rip: VOB File Source

For unencrypted rips there's no need to involve a drive at all: the title
set's `VTS_nn_m.VOB` segments concatenate in logical-sector order, so a
"seek" is just arithmetic over a table of file extents and a "read" is a
plain file read that may hop a ~1GiB boundary partway through.

The menu VOB (`VTS_nn_0.VOB`) is not part of that address space and is
skipped entirely.
*/

use crate::{
	disc::{
		find_file,
		nice_path,
	},
	RipError,
	SECTOR_SIZE,
};
use std::{
	fs::File,
	io::{
		Read,
		Seek,
		SeekFrom,
	},
	path::{
		Path,
		PathBuf,
	},
};



#[derive(Debug)]
/// # One VOB Segment.
struct VobFile {
	/// # File Path.
	path: PathBuf,

	/// # First Logical Sector Covered.
	start: u32,

	/// # Sector Count.
	sectors: u32,
}

#[derive(Debug)]
/// # A Segmented VOB Set.
///
/// The ordered `VTS_nn_1.VOB`, `VTS_nn_2.VOB`, … segments of one title set,
/// addressed as a single run of logical sectors counted from zero.
///
/// At most one underlying file handle is held at a time; it's dropped when
/// a read crosses into the next segment.
pub(crate) struct VobSet {
	/// # The Segments, in Order.
	files: Vec<VobFile>,

	/// # Total Sector Count.
	total: u32,

	/// # Cursor (Logical Sector).
	pos: u32,

	/// # Open Segment, If Any.
	open: Option<(usize, File)>,
}

impl VobSet {
	/// # New.
	///
	/// Enumerate the title set's VOB segments and build the extent table.
	/// Segment numbering starts at one and stops at the first gap.
	///
	/// ## Errors
	///
	/// This will return an error if no segments exist or one can't be
	/// statted.
	pub(crate) fn new(video_ts: &Path, vts: u8) -> Result<Self, RipError> {
		let mut files = Vec::new();
		let mut start = 0_u32;

		for part in 1..=9_u8 {
			let name = format!("VTS_{vts:02}_{part}.VOB");
			let Some(path) = find_file(video_ts, &name) else { break; };

			// Trailing partial sectors (authoring junk) are ignored.
			let len = std::fs::metadata(&path)
				.map_err(|_| RipError::MissingFile(nice_path(&path)))?
				.len();
			let sectors = u32::try_from(len / u64::from(SECTOR_SIZE)).unwrap_or(u32::MAX);

			files.push(VobFile { path, start, sectors });
			start = start.saturating_add(sectors);
		}

		if files.is_empty() {
			return Err(RipError::MissingFile(nice_path(
				&video_ts.join(format!("VTS_{vts:02}_1.VOB"))
			)));
		}

		Ok(Self {
			files,
			total: start,
			pos: 0,
			open: None,
		})
	}
}

impl VobSet {
	/// # Seek.
	///
	/// Park the cursor at a logical sector. The actual file handle work
	/// happens lazily at the next read.
	///
	/// ## Errors
	///
	/// This will return an error if the sector is beyond the last segment.
	pub(crate) fn seek(&mut self, sector: u32) -> Result<u32, RipError> {
		if self.total <= sector { return Err(RipError::SectorSeek(sector)); }
		self.pos = sector;
		Ok(sector)
	}

	/// # Read Sectors.
	///
	/// Fill the front of the buffer with up to `sectors` sectors from the
	/// cursor, crossing segment boundaries as needed, and advance. Returns
	/// the number of sectors actually read, which is zero only when the
	/// cursor has run out of data entirely.
	///
	/// ## Errors
	///
	/// This will return an error if the buffer is too small for the request
	/// or any underlying file operation fails.
	pub(crate) fn read(&mut self, buf: &mut [u8], sectors: u16) -> Result<usize, RipError> {
		let want = usize::from(sectors);
		if buf.len() < want * usize::from(SECTOR_SIZE) {
			return Err(RipError::Bug("Invalid read buffer size (vob)."));
		}

		let mut done = 0_usize;
		while done < want && self.pos < self.total {
			let idx = self.files.iter()
				.position(|f| self.pos < f.start + f.sectors)
				.ok_or(RipError::Bug("VOB cursor out of range."))?;
			let within = self.pos - self.files[idx].start;
			let avail = self.files[idx].sectors - within;
			let take = usize::try_from(avail).map_or(want - done, |a| a.min(want - done));

			// (Re)open the segment if the last read left off elsewhere.
			if self.open.as_ref().is_none_or(|(i, _)| *i != idx) {
				let file = File::open(&self.files[idx].path)
					.map_err(|_| RipError::MissingFile(nice_path(&self.files[idx].path)))?;
				self.open.replace((idx, file));
			}
			let Some((_, file)) = self.open.as_mut() else {
				return Err(RipError::Bug("VOB handle vanished."));
			};

			file.seek(SeekFrom::Start(u64::from(within) * u64::from(SECTOR_SIZE)))
				.map_err(|_| RipError::SectorRead(self.pos))?;
			let a = done * usize::from(SECTOR_SIZE);
			let b = a + take * usize::from(SECTOR_SIZE);
			file.read_exact(&mut buf[a..b])
				.map_err(|_| RipError::SectorRead(self.pos))?;

			done += take;
			self.pos += u32::try_from(take).unwrap_or_default();

			// Done with this segment? Let the handle go.
			if avail == u32::try_from(take).unwrap_or_default() { self.open = None; }
		}

		Ok(done)
	}

	#[cfg(test)]
	/// # Total Sector Count.
	pub(crate) const fn total(&self) -> u32 { self.total }
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::fixture;

	#[test]
	fn t_vob_set() {
		let tmp = tempfile::tempdir().expect("Tempdir failed.");
		fixture::write_vobs(tmp.path(), 1, &[512, 512]);

		let set = VobSet::new(tmp.path(), 1).expect("VobSet failed.");
		assert_eq!(set.total(), 1024);
		assert_eq!(set.files.len(), 2);
		assert_eq!(set.files[1].start, 512);
	}

	#[test]
	fn t_vob_missing() {
		let tmp = tempfile::tempdir().expect("Tempdir failed.");
		assert!(matches!(
			VobSet::new(tmp.path(), 1),
			Err(RipError::MissingFile(_)),
		), "An empty directory has no VOBs to offer.");
	}

	#[test]
	fn t_vob_read_spans_files() {
		// Two 512-sector segments; a read of [500..=700] has to take its
		// first twelve sectors from the tail of one file and the rest from
		// the head of the next.
		let tmp = tempfile::tempdir().expect("Tempdir failed.");
		fixture::write_vobs(tmp.path(), 1, &[512, 512]);

		let mut set = VobSet::new(tmp.path(), 1).expect("VobSet failed.");
		assert_eq!(set.seek(500), Ok(500));

		let mut buf = vec![0_u8; 201 * usize::from(SECTOR_SIZE)];
		let got = set.read(&mut buf, 201).expect("Read failed.");
		assert_eq!(got, 201);

		// Every sector should carry its own fill byte, straight across the
		// boundary.
		for (i, chunk) in buf.chunks_exact(usize::from(SECTOR_SIZE)).enumerate() {
			let expected = fixture::sector_byte(500 + u32::try_from(i).unwrap_or_default());
			assert!(
				chunk.iter().all(|&b| b == expected),
				"Sector {} came back wrong.", 500 + i,
			);
		}
	}

	#[test]
	fn t_vob_read_eof() {
		let tmp = tempfile::tempdir().expect("Tempdir failed.");
		fixture::write_vobs(tmp.path(), 1, &[16]);

		let mut set = VobSet::new(tmp.path(), 1).expect("VobSet failed.");
		assert_eq!(set.seek(10), Ok(10));

		// Only six sectors remain; a bigger ask comes back short, then dry.
		let mut buf = vec![0_u8; 8 * usize::from(SECTOR_SIZE)];
		assert_eq!(set.read(&mut buf, 8), Ok(6));
		assert_eq!(set.read(&mut buf, 8), Ok(0));

		// And seeking past the end is refused outright.
		assert_eq!(set.seek(16), Err(RipError::SectorSeek(16)));
	}
}
