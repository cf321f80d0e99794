/*!
# DVD Rip: Disc
*/

use crate::{
	ifo,
	RipError,
	Title,
};
use fyi_msg::Msg;
use std::{
	fmt,
	path::{
		Path,
		PathBuf,
	},
};



#[derive(Debug)]
/// # Disc.
///
/// A loaded and parsed DVD-Video structure: the global title table joined
/// with every title set it references, read once up front and immutable
/// thereafter.
pub struct Disc {
	/// # The VIDEO_TS Directory.
	root: PathBuf,

	/// # Parsed Titles, in TT_SRPT Order.
	titles: Vec<Title>,
}

impl fmt::Display for Disc {
	/// # Summarize the Disc.
	///
	/// This prints the playable titles in a nice little table: number,
	/// length, chapter/angle counts, and the declared streams.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		const DIVIDER: &str = "\x1b[2m----------------------------------------------------------\x1b[0m\n";

		writeln!(f, "\x1b[2m##   LENGTH    CHAPTERS  ANGLES  AUDIO           SUBS\x1b[0m")?;
		f.write_str(DIVIDER)?;

		for t in &self.titles {
			let audio: Vec<String> = t.audio()
				.iter()
				.map(|a| format!("{} {}", a.language(), a.codec()))
				.collect();
			let subs: Vec<&str> = t.subtitles()
				.iter()
				.map(crate::SubtitleStream::language)
				.collect();

			writeln!(
				f,
				"{:02}  {}  {:>8}  {:>6}  {:<14}  {}",
				t.number(),
				nice_duration(t.duration()),
				t.chapter_count(),
				t.angles(),
				audio.join(", "),
				subs.join(" "),
			)?;
		}

		f.write_str(DIVIDER)?;
		writeln!(f)
	}
}

impl Disc {
	/// # Open.
	///
	/// Read and parse the disc structure from a `VIDEO_TS` directory,
	/// mounted disc and hard copy alike.
	///
	/// Titles whose title set is missing or unparseable are dropped with a
	/// warning rather than sinking the whole disc; anything wrong with the
	/// video manager itself is fatal.
	///
	/// ## Errors
	///
	/// This will return an error if `VIDEO_TS.IFO` is absent, unreadable,
	/// or corrupt.
	pub fn open<P>(video_ts: P) -> Result<Self, RipError>
	where P: AsRef<Path> {
		let root = video_ts.as_ref().to_path_buf();
		let main = find_file(&root, "VIDEO_TS.IFO")
			.ok_or_else(|| RipError::MissingFile(nice_path(&root.join("VIDEO_TS.IFO"))))?;
		let buf = std::fs::read(&main)
			.map_err(|_| RipError::MissingFile(nice_path(&main)))?;
		let entries = ifo::parse_vmg(&buf)?;

		let mut titles = Vec::with_capacity(entries.len());
		for entry in entries {
			let name = format!("VTS_{:02}_0.IFO", entry.vts_number);
			let Some(path) = find_file(&root, &name) else {
				Msg::warning(format!(
					"Title #{} references a missing {name}; skipping.",
					entry.title_number,
				)).eprint();
				continue;
			};

			// A per-title failure from here on is logged and swallowed; the
			// rest of the disc is usually fine.
			let parsed = std::fs::read(&path)
				.map_err(|_| RipError::MissingFile(nice_path(&path)))
				.and_then(|buf| ifo::parse_vts(&buf, &entry, &name));
			match parsed {
				Ok(t) => titles.push(t),
				Err(e) => Msg::warning(format!(
					"Title #{} could not be parsed: {e}",
					entry.title_number,
				)).eprint(),
			}
		}

		Ok(Self { root, titles })
	}
}

impl Disc {
	#[must_use]
	/// # The VIDEO_TS Directory.
	pub fn path(&self) -> &Path { &self.root }

	#[must_use]
	/// # The Playable Titles.
	pub fn titles(&self) -> &[Title] { &self.titles }

	#[must_use]
	/// # A Specific Title.
	pub fn title(&self, number: u16) -> Option<&Title> {
		self.titles.iter().find(|t| t.number() == number)
	}
}



/// # Case-Insensitive File Lookup.
///
/// Try the name as given first, then fall back to scanning the directory for
/// a case-insensitive match. DVD file names are upper-case on the disc
/// itself, but hard copies passed through other tooling don't always stay
/// that way.
pub(crate) fn find_file(dir: &Path, name: &str) -> Option<PathBuf> {
	let direct = dir.join(name);
	if direct.is_file() { return Some(direct); }

	for e in std::fs::read_dir(dir).ok()?.flatten() {
		if e.file_name().to_str().is_some_and(|s| s.eq_ignore_ascii_case(name)) {
			let path = e.path();
			if path.is_file() { return Some(path); }
		}
	}

	None
}

#[must_use]
/// # Path to Display String.
pub(crate) fn nice_path(path: &Path) -> String {
	path.to_string_lossy().into_owned()
}

#[must_use]
/// # Duration as `HH:MM:SS`.
fn nice_duration(d: std::time::Duration) -> String {
	let s = d.as_secs();
	format!("{:02}:{:02}:{:02}", s / 3600, (s / 60) % 60, s % 60)
}
