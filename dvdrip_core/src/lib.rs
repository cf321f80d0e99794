/*!
# DVD Rip: Library
*/

#![deny(
	clippy::allow_attributes_without_reason,
	clippy::correctness,
	unreachable_pub,
	unsafe_code,
)]

#![warn(
	clippy::complexity,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::style,

	clippy::allow_attributes,
	clippy::clone_on_ref_ptr,
	clippy::create_dir,
	clippy::filetype_is_file,
	clippy::format_push_string,
	clippy::get_unwrap,
	clippy::impl_trait_in_params,
	clippy::lossy_float_literal,
	clippy::missing_assert_message,
	clippy::missing_docs_in_private_items,
	clippy::needless_raw_strings,
	clippy::panic_in_result_fn,
	clippy::pub_without_shorthand,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::semicolon_inside_block,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::todo,
	clippy::undocumented_unsafe_blocks,
	clippy::unneeded_field_pattern,
	clippy::unseparated_literal_suffix,
	clippy::unwrap_in_result,

	macro_use_extern_crate,
	missing_copy_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![expect(clippy::doc_markdown, reason = "DVD-Video nomenclature makes this annoying.")]
#![expect(clippy::redundant_pub_crate, reason = "Unresolvable.")]

mod abort;
mod byte;
mod css;
mod disc;
mod error;
mod ifo;
mod rip;
mod source;
mod title;
mod vob;

#[cfg(test)]
/// # Synthetic Disc Material for Tests.
pub(crate) mod fixture;

pub use abort::KillSwitch;
pub use disc::Disc;
pub use error::RipError;
pub use rip::{
	Progress,
	RipRequest,
};
pub use title::{
	AudioCodec,
	AudioStream,
	CellRef,
	Chapter,
	SectorRange,
	SubtitleStream,
	Title,
};



// Geometry
// ---------------

/// # Bytes Per Sector.
///
/// DVD addressing never deviates from 2048-byte logical sectors; every table
/// offset and every byte total in this crate hangs off this number.
pub(crate) const SECTOR_SIZE: u16 = 2048;

/// # Sectors Per Read Batch.
///
/// 128KiB per read: big enough that syscall overhead disappears into the
/// noise, small enough that progress updates and cancellation checks stay
/// snappy.
pub(crate) const READ_BATCH: u16 = 64;



// Magic
// ---------------

/// # Video Manager Magic.
pub(crate) const VMG_MAGIC: &str = "DVDVIDEO-VMG";

/// # Title Set Magic.
pub(crate) const VTS_MAGIC: &str = "DVDVIDEO-VTS";
