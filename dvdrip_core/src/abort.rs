/*!
# DVD Rip: Kill Switch
*/

use std::sync::{
	Arc,
	atomic::{
		AtomicBool,
		Ordering::{
			Relaxed,
			SeqCst,
		},
	},
};



#[derive(Debug, Clone, Default)]
/// # Kill Switch.
///
/// A rip is one long forward pass over the playlist, and the only things
/// slower than the loop are the disc reads themselves, so cancellation just
/// needs a flag that is dirt cheap to poll between batches. Clones share
/// the flag: the shell wrapper parks one in its CTRL-C handler and the
/// engine polls another.
///
/// Polls use a relaxed load on purpose. The engine never touches data owned
/// by the signal handler; a batch of slack in noticing the flag costs
/// nothing, because the partial file gets unlinked either way.
pub struct KillSwitch(Arc<AtomicBool>);

impl KillSwitch {
	#[must_use]
	/// # Time to Stop?
	pub fn killed(&self) -> bool { self.0.load(Relaxed) }

	/// # Pull the Plug.
	///
	/// Returns `true` for the first caller only; a second CTRL-C while the
	/// engine is still winding down shouldn't re-trigger the teardown
	/// messaging.
	pub fn kill(&self) -> bool { ! self.0.swap(true, SeqCst) }
}
