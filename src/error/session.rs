//! Session errors.

//---------------------------------------------------------------------------------------------------- use
use std::borrow::Cow;

//---------------------------------------------------------------------------------------------------- SessionError
/// A request to the shared audio session failed.
///
/// These are never fatal, the configurator only logs them.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
	#[error("the session rejected the request: {0}")]
	/// The session refused the requested value.
	Rejected(Cow<'static, str>),

	#[error("the audio session is unavailable")]
	/// The session (or the media services behind it) is unavailable.
	Unavailable,
}
