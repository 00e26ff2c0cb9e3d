use wasm_bindgen::prelude::*;

#[derive(Debug, thiserror::Error, Clone)]
pub enum Error {
	#[error("remote channel '{0}' is missing")]
	MissingChannel(String),

	#[error("invalid option '{0}'")]
	InvalidOption(&'static str),

	#[error(transparent)]
	Messaging(#[from] innertube::Error),

	#[error("unknown error: {0:?}")]
	Unknown(JsValue),
}

impl From<JsValue> for Error {
	fn from(e: JsValue) -> Self {
		Self::Unknown(e)
	}
}

impl From<Error> for JsValue {
	fn from(e: Error) -> Self {
		match e {
			Error::Unknown(value) => value,
			other => web_sys::js_sys::Error::new(&other.to_string()).into(),
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
