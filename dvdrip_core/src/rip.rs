/*!
# DVD Rip: The Engine
*/

use crate::{
	css::CssHandle,
	Disc,
	disc::nice_path,
	KillSwitch,
	READ_BATCH,
	RipError,
	SectorRange,
	SECTOR_SIZE,
	source::SectorSource,
	vob::VobSet,
};
use std::{
	fs::File,
	io::Write,
	path::{
		Path,
		PathBuf,
	},
};



#[derive(Debug, Clone, Eq, PartialEq)]
/// # A Rip Request.
///
/// Everything the engine needs, resolved ahead of time by the shell
/// wrapper: where the disc lives, what slice of it to pull, and where the
/// stream should land.
pub struct RipRequest {
	/// # The VIDEO_TS Directory.
	pub video_ts: PathBuf,

	/// # The Raw Device (Required For Decryption).
	pub raw_device: Option<PathBuf>,

	/// # Title Number (1-based).
	pub title: u16,

	/// # Chapter Range (1-based, Inclusive), If Narrowing.
	pub chapters: Option<(u16, u16)>,

	/// # Route Reads Through CSS?
	pub decrypt: bool,

	/// # Destination File.
	///
	/// Created (or truncated) by the engine, deleted again on failure. On
	/// success, ownership passes back to the caller, who unlinks it once the
	/// downstream transcoder is done with it.
	pub destination: PathBuf,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Rip Progress.
///
/// A snapshot emitted after every batch write. Values only ever move
/// forward, and the totals are known up front, so these plug straight into
/// a progress bar.
pub struct Progress {
	/// # Bytes Written So Far.
	bytes_written: u64,

	/// # Total Bytes Expected.
	bytes_total: u64,
}

impl Progress {
	#[must_use]
	/// # Bytes Written So Far.
	pub const fn bytes_written(&self) -> u64 { self.bytes_written }

	#[must_use]
	/// # Total Bytes Expected.
	pub const fn bytes_total(&self) -> u64 { self.bytes_total }
}



impl Disc {
	/// # Rip!
	///
	/// Stream the requested title (or chapter slice thereof) into the
	/// request's destination file as one concatenated MPEG program stream,
	/// emitting a [`Progress`] snapshot after each batch.
	///
	/// Reads go through CSS when decryption is requested, otherwise straight
	/// through the VOB files. Decryption is requested per-cell: the key seek
	/// happens at every cell boundary even when the ranges touch, because
	/// that is where the keys change.
	///
	/// On success, the destination path is returned. On any failure, or if
	/// the kill switch trips, the partial file is removed (best effort)
	/// before the error bubbles up.
	///
	/// ## Errors
	///
	/// This will return an error if the request doesn't match the disc, the
	/// source can't be opened, or any seek/read/write fails. A trip of the
	/// kill switch surfaces as [`RipError::Killed`].
	pub fn rip<F>(&self, req: &RipRequest, mut on_progress: F, killed: &KillSwitch)
	-> Result<PathBuf, RipError>
	where F: FnMut(Progress) {
		let title = self.title(req.title).ok_or(RipError::NoTitle(req.title))?;
		let playlist = title.playlist(req.chapters)?;

		// The source is built once and lives for the whole rip. When the
		// user asks for decryption we use CSS even if the disc turns out to
		// be unencrypted; the library just degrades to passthrough.
		let mut src =
			if req.decrypt {
				let dev = req.raw_device.as_deref().ok_or(RipError::NoDevice)?;
				SectorSource::Css(CssHandle::open(dev)?)
			}
			else {
				SectorSource::Files(VobSet::new(self.path(), title.vts())?)
			};

		write_stream(
			&mut src,
			&playlist,
			&req.destination,
			req.decrypt,
			&mut on_progress,
			killed,
		)?;

		Ok(req.destination.clone())
	}
}

/// # Drive the Playlist Into the Destination.
///
/// The copy loop proper, split from [`Disc::rip`] so tests can feed it a
/// scripted source. Cancellation is honored at every batch boundary: before
/// each cell seek, and before and after each read.
fn write_stream<F>(
	src: &mut SectorSource,
	playlist: &[SectorRange],
	dst: &Path,
	decrypt: bool,
	on_progress: &mut F,
	killed: &KillSwitch,
) -> Result<(), RipError>
where F: FnMut(Progress) {
	let bytes_total: u64 = playlist.iter().map(SectorRange::bytes).sum();

	// The guard owns cleanup from here on: any early return or panic below
	// unlinks the partial file. Success disarms it.
	let guard = DestGuard { dst, armed: true };
	let mut out = File::create(dst).map_err(|_| RipError::Write(nice_path(dst)))?;

	// One buffer for every read.
	let mut buf = vec![0_u8; usize::from(READ_BATCH) * usize::from(SECTOR_SIZE)];
	let mut bytes_written = 0_u64;

	for rng in playlist {
		if killed.killed() { return Err(RipError::Killed); }

		// Entering a new cell; this is where the title key changes.
		src.seek(rng.start(), decrypt)?;

		let mut remaining = rng.sectors();
		let mut at = rng.start();
		while remaining != 0 {
			if killed.killed() { return Err(RipError::Killed); }

			let want = READ_BATCH.min(u16::try_from(remaining).unwrap_or(u16::MAX));
			let got = src.read(
				&mut buf[..usize::from(want) * usize::from(SECTOR_SIZE)],
				want,
				decrypt,
			)?;
			let got = u16::try_from(got).map_err(|_| RipError::Bug("Sector source over-read."))?;
			if got == 0 { return Err(RipError::SectorRead(at)); }

			if killed.killed() { return Err(RipError::Killed); }

			out.write_all(&buf[..usize::from(got) * usize::from(SECTOR_SIZE)])
				.map_err(|_| RipError::Write(nice_path(dst)))?;

			remaining -= u32::from(got);
			at += u32::from(got);
			bytes_written += u64::from(got) * u64::from(SECTOR_SIZE);
			on_progress(Progress { bytes_written, bytes_total });
		}
	}

	out.flush().map_err(|_| RipError::Write(nice_path(dst)))?;
	drop(out);
	guard.disarm();
	Ok(())
}



/// # Partial-File Cleanup Guard.
///
/// Arms the moment the destination is created; unless explicitly disarmed
/// by a successful finish, dropping it unlinks the file. Unlink errors are
/// swallowed: the rip error already in flight is the one that matters.
struct DestGuard<'a> {
	/// # Destination Path.
	dst: &'a Path,

	/// # Still Armed?
	armed: bool,
}

impl DestGuard<'_> {
	/// # Stand Down.
	fn disarm(mut self) { self.armed = false; }
}

impl Drop for DestGuard<'_> {
	fn drop(&mut self) {
		if self.armed { let _res = std::fs::remove_file(self.dst); }
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		fixture,
		source::{
			MockOp,
			MockSource,
		},
	};

	#[test]
	fn t_rip_single_title() {
		// One title, one cell covering the whole (small) VOB domain.
		let tmp = tempfile::tempdir().expect("Tempdir failed.");
		fixture::write_video_ts(tmp.path(), &[(0, 1023)], &[1], &[1024]);

		let disc = Disc::open(tmp.path()).expect("Disc open failed.");
		let dst = tmp.path().join("rip.mpg");
		let req = RipRequest {
			video_ts: tmp.path().to_path_buf(),
			raw_device: None,
			title: 1,
			chapters: None,
			decrypt: false,
			destination: dst.clone(),
		};

		let mut events = Vec::new();
		let killed = KillSwitch::default();
		let out = disc.rip(&req, |p| events.push(p), &killed).expect("Rip failed.");
		assert_eq!(out, dst);

		// Expected size, and a 2048-aligned one at that.
		let len = std::fs::metadata(&dst).expect("Missing output.").len();
		assert_eq!(len, 1024 * 2048);
		assert_eq!(len % 2048, 0);

		// Progress never regresses and finishes exactly on total.
		assert!(! events.is_empty(), "No progress was reported.");
		for pair in events.windows(2) {
			assert!(
				pair[0].bytes_written() <= pair[1].bytes_written(),
				"Progress went backwards.",
			);
		}
		let last = events[events.len() - 1];
		assert_eq!(last.bytes_written(), last.bytes_total());
		assert_eq!(last.bytes_total(), 1024 * 2048);
	}

	#[test]
	fn t_rip_chapter_range() {
		// Five chapters, each one 100-sector cell; rip chapters 2-4.
		let tmp = tempfile::tempdir().expect("Tempdir failed.");
		fixture::write_video_ts(
			tmp.path(),
			&[(0, 99), (100, 199), (200, 299), (300, 399), (400, 499)],
			&[1, 2, 3, 4, 5],
			&[500],
		);

		let disc = Disc::open(tmp.path()).expect("Disc open failed.");
		let dst = tmp.path().join("rip.mpg");
		let req = RipRequest {
			video_ts: tmp.path().to_path_buf(),
			raw_device: None,
			title: 1,
			chapters: Some((2, 4)),
			decrypt: false,
			destination: dst.clone(),
		};

		let killed = KillSwitch::default();
		disc.rip(&req, |_| (), &killed).expect("Rip failed.");

		let raw = std::fs::read(&dst).expect("Missing output.");
		assert_eq!(raw.len(), 300 * 2048);

		// The stream should be sectors 100-399 and nothing else, in order;
		// that implies cells 1 and 5 never made it in.
		for (i, chunk) in raw.chunks_exact(2048).enumerate() {
			let expected = fixture::sector_byte(100 + u32::try_from(i).unwrap_or_default());
			assert!(
				chunk.iter().all(|&b| b == expected),
				"Sector {} of the output is wrong.", 100 + i,
			);
		}
	}

	#[test]
	fn t_rip_bad_requests() {
		let tmp = tempfile::tempdir().expect("Tempdir failed.");
		fixture::write_video_ts(tmp.path(), &[(0, 9)], &[1], &[10]);
		let disc = Disc::open(tmp.path()).expect("Disc open failed.");
		let killed = KillSwitch::default();

		let mut req = RipRequest {
			video_ts: tmp.path().to_path_buf(),
			raw_device: None,
			title: 9,
			chapters: None,
			decrypt: false,
			destination: tmp.path().join("rip.mpg"),
		};
		assert_eq!(
			disc.rip(&req, |_| (), &killed).expect_err("Bad title should fail."),
			RipError::NoTitle(9),
		);

		req.title = 1;
		req.chapters = Some((1, 2));
		assert_eq!(
			disc.rip(&req, |_| (), &killed).expect_err("Bad chapters should fail."),
			RipError::ChapterRange(1, 2),
		);

		// Decryption without a device is refused before any I/O.
		req.chapters = None;
		req.decrypt = true;
		assert_eq!(
			disc.rip(&req, |_| (), &killed).expect_err("No device should fail."),
			RipError::NoDevice,
		);
		assert!(
			! tmp.path().join("rip.mpg").exists(),
			"No destination should have been created.",
		);
	}

	#[test]
	fn t_rip_key_order() {
		// Three cells; with decryption on, every cell must be entered via a
		// key seek before any of its (decrypted) reads.
		let tmp = tempfile::tempdir().expect("Tempdir failed.");
		let playlist = [
			SectorRange { start: 0, last: 99 },
			SectorRange { start: 100, last: 149 },
			SectorRange { start: 150, last: 299 },
		];
		let dst = tmp.path().join("rip.mpg");
		let mut src = SectorSource::Mock(MockSource::new(300));
		let killed = KillSwitch::default();

		write_stream(&mut src, &playlist, &dst, true, &mut |_| (), &killed)
			.expect("Rip failed.");

		let SectorSource::Mock(mock) = src else { unreachable!(); };
		let mut cursor = 0_u32;
		for rng in &playlist {
			// First op for the cell: the key seek.
			let Some(pos) = mock.ops.iter().position(
				|op| *op == MockOp::Seek { sector: rng.start, key: true }
			) else { panic!("Missing key seek for sector {}.", rng.start); };

			// Every read of this cell's sectors must come after it.
			for (i, op) in mock.ops.iter().enumerate() {
				if let MockOp::Read { sector, decrypt, .. } = op {
					if rng.start <= *sector && *sector <= rng.last {
						assert!(*decrypt, "Read without decryption.");
						assert!(pos < i, "Read before the covering key seek.");
					}
				}
			}
			cursor += rng.sectors();
		}
		assert_eq!(cursor, 300);

		// And the output should be complete.
		assert_eq!(
			std::fs::metadata(&dst).expect("Missing output.").len(),
			300 * 2048,
		);
	}

	#[test]
	fn t_rip_cancel() {
		// Trip the kill switch from the progress callback after the second
		// batch; the file must be gone afterward.
		let tmp = tempfile::tempdir().expect("Tempdir failed.");
		let playlist = [SectorRange { start: 0, last: 499 }];
		let dst = tmp.path().join("rip.mpg");
		let mut src = SectorSource::Mock(MockSource::new(500));
		let killed = KillSwitch::default();

		let flag = killed.clone();
		let mut events = 0_u32;
		let res = write_stream(&mut src, &playlist, &dst, false, &mut |_| {
			events += 1;
			if events == 2 { flag.kill(); }
		}, &killed);

		assert_eq!(res.expect_err("The rip should have been cancelled."), RipError::Killed);
		assert!((2..=3).contains(&events), "Expected 2-3 progress events, got {events}.");
		assert!(! dst.exists(), "The partial file should have been removed.");
	}

	#[test]
	fn t_rip_read_error_cleanup() {
		// A mid-rip read failure also removes the partial file.
		let tmp = tempfile::tempdir().expect("Tempdir failed.");
		let playlist = [SectorRange { start: 0, last: 299 }];
		let dst = tmp.path().join("rip.mpg");

		let mut mock = MockSource::new(300);
		mock.fail_at = Some(128);
		let mut src = SectorSource::Mock(mock);
		let killed = KillSwitch::default();

		let res = write_stream(&mut src, &playlist, &dst, false, &mut |_| (), &killed);
		assert_eq!(res.expect_err("The rip should have failed."), RipError::SectorRead(128));
		assert!(! dst.exists(), "The partial file should have been removed.");
	}

	#[test]
	fn t_rip_capability_violation() {
		// Asking a file-backed source to decrypt is a caller bug, surfaced
		// loudly.
		let tmp = tempfile::tempdir().expect("Tempdir failed.");
		fixture::write_vobs(tmp.path(), 1, &[64]);

		let playlist = [SectorRange { start: 0, last: 63 }];
		let dst = tmp.path().join("rip.mpg");
		let mut src = SectorSource::Files(
			VobSet::new(tmp.path(), 1).expect("VobSet failed.")
		);
		let killed = KillSwitch::default();

		let res = write_stream(&mut src, &playlist, &dst, true, &mut |_| (), &killed);
		assert_eq!(
			res.expect_err("Decryption should have been refused."),
			RipError::CapabilityViolation,
		);
		assert!(! dst.exists(), "The partial file should have been removed.");
	}
}
