/*!
# DVD Rip: Errors
*/

use fyi_msg::Msg;
use std::{
	error::Error,
	fmt,
};



#[cfg(feature = "bin")]
/// # Help Text.
const HELP: &str = concat!(r#"
      ______
    /  __  \     "#, "\x1b[38;5;199mDVD Rip\x1b[0;38;5;69m v", env!("CARGO_PKG_VERSION"), "\x1b[0m", r#"
   /  /  \  \    Title-at-a-time DVD-Video
  |  | () |  |   ripping for the impatient.
   \  \__/  /
    \______/

USAGE:
    dvdrip [OPTIONS]

BASIC SETTINGS:
    -i, --input <PATH>
                      Path to a readable VIDEO_TS directory, mounted disc and
                      hard copy alike. [default: ./VIDEO_TS]
    -t, --title <NUM> The title to rip, per the disc's own numbering. Run with
                      --no-rip first if you aren't sure which one you want.
                      [default: 1]
    -c, --chapters <NUM|RNG>
                      Restrict the rip to a single chapter (3) or an inclusive
                      chapter range (3-7). [default: the whole title]
    -o, --output <PATH>
                      Destination for the finished MPEG program stream.
                      [default: ./title_##.mpg]

DECRYPTION:
        --decrypt     Route reads through libdvdcss, negotiating title keys
                      cell-by-cell. Requires -d/--dev.
    -d, --dev <PATH>  The raw device hosting the disc, like /dev/sr0. Only
                      used (and required) with --decrypt.

MISCELLANEOUS:
    -h, --help        Print help information to STDOUT and exit.
    -V, --version     Print version information to STDOUT and exit.
        --no-rip      Print the disc summary to STDERR and exit (without
                      ripping anything).
        --no-summary  Skip the disc summary and jump straight to ripping.

EARLY EXIT:
    Press "#, "\x1b[38;5;208mCTRL\x1b[0m+\x1b[38;5;208mC\x1b[0m to abandon a rip early. The partial file is removed; run
    again when you have more time.
");



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
pub enum RipError {
	/// # Bug!
	Bug(&'static str),

	/// # Decryption Requested From the Wrong Source.
	CapabilityViolation,

	/// # Invalid Chapter Range.
	ChapterRange(u16, u16),

	/// # Corrupt IFO (file, reason).
	CorruptIfo(String, &'static str),

	/// # CSS Library Unavailable.
	DecryptionUnavailable(String),

	/// # Invalid Device Path.
	Device(String),

	/// # User Abort.
	Killed,

	/// # Referenced File Is Absent.
	MissingFile(String),

	/// # Decryption Without a Device.
	NoDevice,

	/// # Invalid Title Number.
	NoTitle(u16),

	/// # Sector Read Failure.
	SectorRead(u32),

	/// # Sector Seek Failure.
	SectorSeek(u32),

	/// # IFO Access Out of Bounds.
	Truncated(usize),

	/// # Writing to Disk.
	Write(String),

	#[cfg(feature = "bin")]
	/// # CLI Parsing Failure.
	CliParse(&'static str),

	#[cfg(feature = "bin")]
	/// # Print Help (Not an Error).
	PrintHelp,

	#[cfg(feature = "bin")]
	/// # Print Version (Not an Error).
	PrintVersion,
}

impl Error for RipError {}

impl From<RipError> for Msg {
	#[inline]
	fn from(src: RipError) -> Self { Self::error(src.to_string()) }
}

impl fmt::Display for RipError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bug(s) => write!(f, "Bug: {s}."),
			Self::CapabilityViolation => f.write_str("Decryption was requested from a source that cannot decrypt."),
			Self::ChapterRange(a, b) => write!(f, "Invalid chapter range ({a}-{b})."),
			Self::CorruptIfo(file, reason) => write!(f, "Corrupt {file}: {reason}."),
			Self::DecryptionUnavailable(s) => f.write_str(s),
			Self::Device(s) => write!(f, "Invalid device path {s}."),
			Self::Killed => f.write_str("User abort."),
			Self::MissingFile(s) => write!(f, "Missing file {s}."),
			Self::NoDevice => f.write_str("Decryption requires a raw device path (-d/--dev)."),
			Self::NoTitle(n) => write!(f, "There is no title #{n} on this disc."),
			Self::SectorRead(lsn) => write!(f, "Read error at sector {lsn}."),
			Self::SectorSeek(lsn) => write!(f, "Seek error at sector {lsn}."),
			Self::Truncated(off) => write!(f, "IFO data ended unexpectedly (offset {off})."),
			Self::Write(s) => write!(f, "Unable to write to {s}."),

			#[cfg(feature = "bin")]
			Self::CliParse(s) => write!(f, "Unable to parse {s}."),

			#[cfg(feature = "bin")]
			Self::PrintHelp => f.write_str(HELP),

			#[cfg(feature = "bin")]
			Self::PrintVersion => f.write_str(concat!("DVD Rip v", env!("CARGO_PKG_VERSION"))),
		}
	}
}
