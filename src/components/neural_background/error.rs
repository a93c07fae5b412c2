use thiserror::Error;

/// Reasons the background cannot attach to its host page.
#[derive(Debug, Error)]
pub enum MountError {
	#[error("no browser window available")]
	NoWindow,
	#[error("canvas has no parent region to fill")]
	NoParent,
	#[error("2d context request was rejected: {0}")]
	ContextRejected(String),
	#[error("canvas returned no 2d context")]
	NoContext,
	#[error("2d context has an unexpected type")]
	WrongContextType,
	#[error("intersection observer unavailable: {0}")]
	Observer(String),
}
