/*!
# DVD Rip!
*/

#![forbid(unsafe_code)]

#![deny(
	clippy::allow_attributes_without_reason,
	clippy::correctness,
	unreachable_pub,
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

mod cli;

use dactyl::{
	NiceElapsed,
	NiceU64,
};
use dvdrip_core::{
	Disc,
	KillSwitch,
	Progress,
	RipError,
	RipRequest,
};
use fyi_msg::{
	Msg,
	Progless,
};
use std::{
	num::NonZeroU32,
	path::PathBuf,
	time::Instant,
};



/// # Main.
///
/// This lets us bubble up startup errors so they can be pretty-printed.
fn main() {
	match _main() {
		Ok(()) => {},
		Err(e @ (RipError::PrintHelp | RipError::PrintVersion)) => {
			println!("{e}");
		},
		Err(e) => {
			Msg::from(e).eprint();
			std::process::exit(1);
		},
	}
}

#[inline]
/// # Actual Main.
///
/// This does all the stuff.
fn _main() -> Result<(), RipError> {
	// Load CLI arguments, if any.
	let opts = cli::parse()?;

	// Crack open the disc structure.
	let disc = Disc::open(&opts.input)?;

	// Quiet?
	if ! opts.no_summary { eprintln!("{disc}"); }

	// Go ahead and leave if there's no ripping to do.
	if opts.no_rip { return Ok(()); }

	// Set up the progress bar and killswitch, and wire CTRL-C to the pair
	// of them so an abort also tidies up the bar.
	let progress = Progless::default();
	let killed = KillSwitch::default();
	{
		let killed = killed.clone();
		let progress = progress.clone();
		let _res = ctrlc::set_handler(move ||
			// Repeat signals are stale by definition; one cleanup is plenty.
			if killed.kill() { progress.sigint(); }
		);
	}

	// Size the bar from the playlist, which conveniently also verifies the
	// title and chapter range before any files get touched.
	let title = disc.title(opts.title).ok_or(RipError::NoTitle(opts.title))?;
	let total_sectors: u32 = title.playlist(opts.chapters)?
		.iter()
		.map(dvdrip_core::SectorRange::sectors)
		.sum();
	if let Some(steps) = NonZeroU32::new(total_sectors) { progress.reset(steps.into()); }
	progress.set_title(Some(Msg::custom(
		"Ripping",
		199,
		&format!("Title #{:02}…", opts.title),
	)));

	// The stream lands beside its final home first so a half-finished rip
	// can never be mistaken for a good one.
	let output = opts.output.unwrap_or_else(||
		PathBuf::from(format!("title_{:02}.mpg", opts.title))
	);
	let parent = output.parent().filter(|p| ! p.as_os_str().is_empty());
	let tmp = tempfile::Builder::new()
		.prefix(".dvdrip-")
		.suffix(".mpg")
		.tempfile_in(parent.unwrap_or_else(|| std::path::Path::new(".")))
		.map_err(|_| RipError::Write(output.to_string_lossy().into_owned()))?
		.into_temp_path();

	let req = RipRequest {
		video_ts: opts.input,
		raw_device: opts.dev,
		title: opts.title,
		chapters: opts.chapters,
		decrypt: opts.decrypt,
		destination: tmp.to_path_buf(),
	};

	// Rip and rip and rip!
	let now = Instant::now();
	let mut last = 0_u64;
	let res = disc.rip(
		&req,
		|p: Progress| {
			let done = p.bytes_written() / 2048;
			progress.increment_n(u32::try_from(done - last).unwrap_or_default());
			last = done;
		},
		&killed,
	);
	progress.finish();
	res?;
	let bytes = last * 2048;

	// Move the finished stream into place and brag a little.
	tmp.persist(&output)
		.map_err(|_| RipError::Write(output.to_string_lossy().into_owned()))?;
	Msg::custom(
		"Ripped",
		10,
		&format!(
			"Title #{:02} \x1b[2m→\x1b[0m {} \x1b[2m({} bytes, {})\x1b[0m",
			req.title,
			output.to_string_lossy(),
			NiceU64::from(bytes),
			NiceElapsed::from(now.elapsed()),
		),
	)
		.with_newline(true)
		.eprint();

	if killed.killed() { Err(RipError::Killed) }
	else { Ok(()) }
}
