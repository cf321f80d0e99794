/*!
# DVD Rip: Sector Sources

The rip engine drinks sectors through one of two straws: a CSS session
against the raw device, or plain file reads over the title set's VOB
segments. Which one is fixed when the source is built and never changes
mid-rip.

There's no trait here on purpose; two variants plus a scripted test double
make an enum the simpler seam.
*/

use crate::{
	css::CssHandle,
	RipError,
	vob::VobSet,
};



#[derive(Debug)]
/// # A Sector Source.
pub(crate) enum SectorSource {
	/// # CSS Session (Raw Device; Can Decrypt).
	Css(CssHandle),

	/// # VOB Files (Plain Reads Only).
	Files(VobSet),

	#[cfg(test)]
	/// # Scripted Source For Tests.
	Mock(MockSource),
}

impl SectorSource {
	/// # Seek.
	///
	/// Position the source at a logical sector. For a CSS session,
	/// `request_key` additionally negotiates the title key for the cell
	/// starting there; the file variant has no keys and ignores it.
	///
	/// ## Errors
	///
	/// This will return an error if the position can't be reached or key
	/// negotiation fails.
	pub(crate) fn seek(&mut self, sector: u32, request_key: bool) -> Result<(), RipError> {
		match self {
			Self::Css(h) => h.seek(sector, request_key).map(|_| ()),
			Self::Files(v) => v.seek(sector).map(|_| ()),
			#[cfg(test)]
			Self::Mock(m) => m.seek(sector, request_key),
		}
	}

	/// # Read Sectors.
	///
	/// Fill the front of the buffer with up to `sectors` sectors from the
	/// current position and advance. Short reads are normal; zero means the
	/// source is out of data.
	///
	/// ## Errors
	///
	/// This will return an error on any underlying read failure, or if
	/// decryption is requested from a source that can't provide it.
	pub(crate) fn read(&mut self, buf: &mut [u8], sectors: u16, decrypt: bool)
	-> Result<usize, RipError> {
		match self {
			Self::Css(h) => h.read(buf, sectors, decrypt),
			Self::Files(v) =>
				if decrypt { Err(RipError::CapabilityViolation) }
				else { v.read(buf, sectors) },
			#[cfg(test)]
			Self::Mock(m) => m.read(buf, sectors, decrypt),
		}
	}
}



#[cfg(test)]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # A Recorded Source Operation.
pub(crate) enum MockOp {
	/// # A Seek.
	Seek {
		/// # Target Sector.
		sector: u32,

		/// # Key Requested?
		key: bool,
	},

	/// # A Read.
	Read {
		/// # Cursor at the Time.
		sector: u32,

		/// # Sectors Requested.
		sectors: u16,

		/// # Decryption Requested?
		decrypt: bool,
	},
}

#[cfg(test)]
#[derive(Debug, Default)]
/// # Scripted Sector Source.
///
/// Stands in for a CSS session during engine tests: serves deterministic
/// bytes (each sector filled with its own low byte), records every
/// operation, and optionally fails on cue.
pub(crate) struct MockSource {
	/// # Total Sector Count.
	pub(crate) total: u32,

	/// # Cursor.
	pub(crate) pos: u32,

	/// # Everything That Happened.
	pub(crate) ops: Vec<MockOp>,

	/// # Fail Reads From This Sector On.
	pub(crate) fail_at: Option<u32>,
}

#[cfg(test)]
impl MockSource {
	/// # New.
	pub(crate) fn new(total: u32) -> Self {
		Self { total, ..Self::default() }
	}

	/// # Fill Byte for a Sector.
	pub(crate) const fn sector_byte(sector: u32) -> u8 {
		(sector & 0xFF) as u8
	}

	/// # Seek (Scripted).
	fn seek(&mut self, sector: u32, key: bool) -> Result<(), RipError> {
		self.ops.push(MockOp::Seek { sector, key });
		if self.total <= sector { return Err(RipError::SectorSeek(sector)); }
		self.pos = sector;
		Ok(())
	}

	/// # Read (Scripted).
	fn read(&mut self, buf: &mut [u8], sectors: u16, decrypt: bool) -> Result<usize, RipError> {
		self.ops.push(MockOp::Read { sector: self.pos, sectors, decrypt });

		if self.fail_at.is_some_and(|f| f <= self.pos) {
			return Err(RipError::SectorRead(self.pos));
		}

		let take = usize::try_from(self.total - self.pos)
			.map_or(usize::from(sectors), |left| left.min(usize::from(sectors)));
		for (i, chunk) in buf.chunks_exact_mut(2048).take(take).enumerate() {
			let fill = Self::sector_byte(self.pos + u32::try_from(i).unwrap_or_default());
			chunk.fill(fill);
		}

		self.pos += u32::try_from(take).unwrap_or_default();
		Ok(take)
	}
}
