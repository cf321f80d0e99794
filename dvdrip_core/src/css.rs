/*!
# DVD Rip: `libdvdcss` Wrapper

The CSS side of the house rides on libdvdcss, loaded at runtime rather than
linked: most systems won't have it, and the tool has to keep working (in
passthrough mode) when it's absent. All five entry points are resolved up
front so a broken install fails loudly at open rather than mid-rip.

Somewhat useful documentation:
<https://www.videolan.org/developers/libdvdcss.html>
*/

use crate::{
	RipError,
	SECTOR_SIZE,
};
use fyi_msg::Msg;
use std::{
	ffi::{
		c_char,
		c_int,
		c_void,
		CStr,
		CString,
	},
	path::Path,
};



/// # Flag: Plain Read.
const DVDCSS_NOFLAGS: c_int = 0;

/// # Flag: Descramble While Reading.
const DVDCSS_READ_DECRYPT: c_int = 1;

/// # Flag: Plain MPEG Seek.
const DVDCSS_SEEK_MPEG: c_int = 1;

/// # Flag: Seek and Negotiate the Title Key.
const DVDCSS_SEEK_KEY: c_int = 2;

#[cfg(target_os = "windows")]
/// # Candidate Library Names.
const CSS_NAMES: [&str; 2] = ["libdvdcss.dll", "dvdcss.dll"];

#[cfg(target_os = "macos")]
/// # Candidate Library Names.
const CSS_NAMES: [&str; 2] = ["libdvdcss.2.dylib", "libdvdcss.dylib"];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
/// # Candidate Library Names.
const CSS_NAMES: [&str; 2] = ["libdvdcss.so.2", "libdvdcss.so"];



/// # `dvdcss_open`.
type CssOpen = unsafe extern "C" fn(*const c_char) -> *mut c_void;

/// # `dvdcss_close`.
type CssClose = unsafe extern "C" fn(*mut c_void) -> c_int;

/// # `dvdcss_seek`.
type CssSeek = unsafe extern "C" fn(*mut c_void, c_int, c_int) -> c_int;

/// # `dvdcss_read`.
type CssRead = unsafe extern "C" fn(*mut c_void, *mut c_void, c_int, c_int) -> c_int;

/// # `dvdcss_error`.
type CssError = unsafe extern "C" fn(*mut c_void) -> *const c_char;



#[derive(Debug)]
/// # CSS Handle.
///
/// A live libdvdcss session against a raw device. Every interface on the
/// other side is unsafe and awkward, so this struct exists to abstract away
/// the noise and handle cleanup.
///
/// The library itself has to outlive the resolved entry points, so it rides
/// along for the duration.
pub(crate) struct CssHandle {
	/// # The Loaded Library (kept alive for the function pointers).
	_lib: libloading::Library,

	/// # The Session Handle.
	handle: *mut c_void,

	/// # Cursor (Logical Sector), For Error Reporting.
	pos: u32,

	/// # Close.
	close: CssClose,

	/// # Seek.
	seek: CssSeek,

	/// # Read.
	read: CssRead,

	/// # Last Error Message.
	error: CssError,
}

impl Drop for CssHandle {
	#[allow(unsafe_code, reason = "FFI.")]
	fn drop(&mut self) {
		// Release the C memory!
		if ! self.handle.is_null() {
			unsafe { (self.close)(self.handle); }
			self.handle = std::ptr::null_mut();
		}
	}
}

impl CssHandle {
	#[allow(unsafe_code, reason = "FFI.")]
	/// # Open a Device.
	///
	/// Load libdvdcss, resolve its entry points, and open a session against
	/// the raw device.
	///
	/// ## Errors
	///
	/// This will return an error if the library can't be found, is missing an
	/// entry point, or refuses the device. Each case carries a message naming
	/// the artifact so the user knows what to install or fix.
	pub(crate) fn open(dev: &Path) -> Result<Self, RipError> {
		let (lib, name) = load_library()?;

		let open: CssOpen = symbol(&lib, name, b"dvdcss_open\0", "dvdcss_open")?;
		let close: CssClose = symbol(&lib, name, b"dvdcss_close\0", "dvdcss_close")?;
		let seek: CssSeek = symbol(&lib, name, b"dvdcss_seek\0", "dvdcss_seek")?;
		let read: CssRead = symbol(&lib, name, b"dvdcss_read\0", "dvdcss_read")?;
		let error: CssError = symbol(&lib, name, b"dvdcss_error\0", "dvdcss_error")?;

		let original = dev.to_string_lossy().into_owned();
		let cdev = CString::new(original.as_bytes())
			.map_err(|_| RipError::Device(original.clone()))?;

		let handle = unsafe { open(cdev.as_ptr()) };
		if handle.is_null() {
			Err(RipError::DecryptionUnavailable(format!(
				"{name} could not open {original}; check the path points at the raw optical device."
			)))
		}
		else {
			Ok(Self {
				_lib: lib,
				handle,
				pos: 0,
				close,
				seek,
				read,
				error,
			})
		}
	}
}

impl CssHandle {
	#[allow(unsafe_code, reason = "FFI.")]
	/// # Seek to a Sector.
	///
	/// Position the session at a logical sector. With `key` set, the library
	/// also negotiates the title key for the cell starting there; every new
	/// cell must be entered this way or subsequent decrypted reads come back
	/// scrambled.
	///
	/// ## Errors
	///
	/// This will return an error if the drive refuses the position or key
	/// negotiation fails.
	pub(crate) fn seek(&mut self, sector: u32, key: bool) -> Result<u32, RipError> {
		let flags = if key { DVDCSS_SEEK_KEY } else { DVDCSS_SEEK_MPEG };
		let lsn = i32::try_from(sector).map_err(|_| RipError::SectorSeek(sector))?;

		let res = unsafe { (self.seek)(self.handle, lsn, flags) };
		if res < 0 {
			self.print_last_error();
			Err(RipError::SectorSeek(sector))
		}
		else {
			self.pos = res.abs_diff(0);
			Ok(self.pos)
		}
	}

	#[allow(unsafe_code, reason = "FFI.")]
	/// # Read Sectors.
	///
	/// Fill the front of the buffer with up to `sectors` sectors from the
	/// current position, descrambling if asked. Short reads are fine; the
	/// caller loops.
	///
	/// ## Errors
	///
	/// This will return an error if the buffer is too small for the request
	/// or the library reports a read failure.
	pub(crate) fn read(&mut self, buf: &mut [u8], sectors: u16, decrypt: bool)
	-> Result<usize, RipError> {
		if buf.len() < usize::from(sectors) * usize::from(SECTOR_SIZE) {
			return Err(RipError::Bug("Invalid read buffer size (css)."));
		}

		let flags = if decrypt { DVDCSS_READ_DECRYPT } else { DVDCSS_NOFLAGS };
		let res = unsafe {
			(self.read)(
				self.handle,
				buf.as_mut_ptr().cast(),
				c_int::from(sectors),
				flags,
			)
		};

		if res < 0 {
			self.print_last_error();
			Err(RipError::SectorRead(self.pos))
		}
		else {
			let got = res.abs_diff(0);
			self.pos = self.pos.saturating_add(got);
			Ok(usize::try_from(got).unwrap_or_default())
		}
	}

	#[allow(unsafe_code, reason = "FFI.")]
	/// # Surface the Library's Complaint.
	///
	/// The engine aborts on the first seek/read failure either way, but the
	/// library usually knows _why_ it failed, and that's worth a line on
	/// stderr before the typed error bubbles up.
	fn print_last_error(&self) {
		let ptr = unsafe { (self.error)(self.handle) };
		if ! ptr.is_null() {
			if let Ok(s) = unsafe { CStr::from_ptr(ptr) }.to_str() {
				let s = s.trim();
				if ! s.is_empty() {
					Msg::warning(format!("dvdcss: {s}")).eprint();
				}
			}
		}
	}
}



#[allow(unsafe_code, reason = "FFI.")]
/// # Load the Library.
///
/// Try the platform's usual names in order.
///
/// ## Errors
///
/// This will return an error naming the preferred artifact if nothing can be
/// loaded.
fn load_library() -> Result<(libloading::Library, &'static str), RipError> {
	for name in CSS_NAMES {
		if let Ok(lib) = unsafe { libloading::Library::new(name) } {
			return Ok((lib, name));
		}
	}

	Err(RipError::DecryptionUnavailable(format!(
		"Unable to load {}; install libdvdcss 1.2+ or drop a copy somewhere the dynamic linker looks.",
		CSS_NAMES[0],
	)))
}

#[allow(unsafe_code, reason = "FFI.")]
/// # Resolve an Entry Point.
///
/// Function pointers are plain values once dereferenced, so the symbols can
/// be copied out and the `Symbol` wrappers discarded; the caller keeps the
/// library itself alive.
///
/// ## Errors
///
/// This will return an error naming the missing symbol if resolution fails.
fn symbol<T: Copy>(
	lib: &libloading::Library,
	lib_name: &str,
	sym: &[u8],
	sym_name: &'static str,
) -> Result<T, RipError> {
	unsafe { lib.get::<T>(sym) }
		.map(|s| *s)
		.map_err(|_| RipError::DecryptionUnavailable(format!(
			"{lib_name} is missing the {sym_name} entry point; the install looks broken."
		)))
}
