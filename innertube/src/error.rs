#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
	#[error("messaging was destroyed")]
	Destroyed,

	#[error("channel '{0}' is not part of the local interface")]
	UnknownChannel(String),

	#[error("callback for '{0}' is not callable")]
	InvalidCallback(String),
}

pub type Result<T> = std::result::Result<T, Error>;
