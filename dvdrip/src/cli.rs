/*!
# DVD Rip: CLI
*/

use argyle::Argument;
use dactyl::traits::BytesToUnsigned;
use dvdrip_core::RipError;
use std::path::PathBuf;



/// # Parsed CLI Arguments.
///
/// Raw settings only; the disc itself is opened (and the request assembled)
/// back in `main` where the pieces come together.
pub(super) struct Parsed {
	/// # The VIDEO_TS Directory.
	pub(super) input: PathBuf,

	/// # The Raw Device, If Decrypting.
	pub(super) dev: Option<PathBuf>,

	/// # Title Number.
	pub(super) title: u16,

	/// # Chapter Range.
	pub(super) chapters: Option<(u16, u16)>,

	/// # Decrypt?
	pub(super) decrypt: bool,

	/// # Output Path Override.
	pub(super) output: Option<PathBuf>,

	/// # Summary Only?
	pub(super) no_rip: bool,

	/// # Skip the Summary?
	pub(super) no_summary: bool,
}



/// # Parse Options.
pub(super) fn parse() -> Result<Parsed, RipError> {
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut out = Parsed {
		input: PathBuf::from("./VIDEO_TS"),
		dev: None,
		title: 1,
		chapters: None,
		decrypt: false,
		output: None,
		no_rip: false,
		no_summary: false,
	};

	for arg in args {
		match arg {
			Argument::Key("--decrypt") => { out.decrypt = true; },
			Argument::Key("-h" | "--help") => return Err(RipError::PrintHelp),
			Argument::Key("--no-rip") => { out.no_rip = true; },
			Argument::Key("--no-summary") => { out.no_summary = true; },
			Argument::Key("-V" | "--version") => return Err(RipError::PrintVersion),

			Argument::KeyWithValue("-c" | "--chapters", s) => {
				out.chapters.replace(parse_chapters(s.as_bytes())?);
			},
			Argument::KeyWithValue("-d" | "--dev", s) => {
				out.dev.replace(PathBuf::from(s));
			},
			Argument::KeyWithValue("-i" | "--input", s) => {
				out.input = PathBuf::from(s);
			},
			Argument::KeyWithValue("-o" | "--output", s) => {
				out.output.replace(PathBuf::from(s));
			},
			Argument::KeyWithValue("-t" | "--title", s) => {
				out.title = u16::btou(s.trim().as_bytes())
					.filter(|&t| t != 0)
					.ok_or(RipError::CliParse("-t/--title"))?;
			},

			_ => {},
		}
	}

	// Decryption needs somewhere to point its CSS session.
	if out.decrypt && out.dev.is_none() { return Err(RipError::NoDevice); }

	Ok(out)
}

/// # Parse a Chapter Range.
///
/// A single number selects one chapter; `A-B` selects an inclusive run.
fn parse_chapters(v: &[u8]) -> Result<(u16, u16), RipError> {
	let v = v.trim_ascii();
	if let Some(pos) = v.iter().position(|b| b'-'.eq(b)) {
		// Split.
		let a = v[..pos].trim_ascii();
		let b = v[pos + 1..].trim_ascii();
		if a.is_empty() || b.is_empty() {
			return Err(RipError::CliParse("-c/--chapters"));
		}

		// Decode.
		let a = u16::btou(a).ok_or(RipError::CliParse("-c/--chapters"))?;
		let b = u16::btou(b).ok_or(RipError::CliParse("-c/--chapters"))?;

		// Inverted and zero-based ranges get caught against the actual disc
		// later, but they can't possibly be right, so fail fast.
		if a == 0 || b < a { return Err(RipError::CliParse("-c/--chapters")); }
		Ok((a, b))
	}
	// Otherwise it should be a single chapter.
	else {
		let a = u16::btou(v).ok_or(RipError::CliParse("-c/--chapters"))?;
		if a == 0 { return Err(RipError::CliParse("-c/--chapters")); }
		Ok((a, a))
	}
}
