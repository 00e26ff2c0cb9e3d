use std::cell::RefCell;

use innertube::{Endpoint, Handlers, Innertube, Interface, Registry};
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::js_sys;

use crate::{Connector, Error, Result};

thread_local! {
	static INSTANCES: RefCell<Registry<String, JsValue>> = RefCell::new(Registry::new());
}

/// The messaging facade, exported to JavaScript as `Innertube`.
///
/// Every method except `destroy` returns the instance for chaining.
#[wasm_bindgen(js_name = Innertube)]
#[derive(Clone)]
pub struct JsInnertube {
	inner: Innertube<JsValue>,
}

#[wasm_bindgen(js_class = Innertube)]
impl JsInnertube {
	/// Options: `remote`, `container`, `scrolling` and `interface`
	/// (`"message"`, `"widget"` or `"dashboard"`). All optional.
	#[wasm_bindgen(constructor)]
	pub fn new(options: JsValue) -> std::result::Result<JsInnertube, JsValue> {
		Ok(Self::connect(&endpoint(&options)?)?)
	}

	/// The shared instance for `key`, created from `options` on first use.
	///
	/// Later options for the same key are ignored.
	pub fn instance(key: String, options: JsValue) -> std::result::Result<JsInnertube, JsValue> {
		let endpoint = endpoint(&options)?;
		let inner = INSTANCES.with(|instances| instances.borrow_mut().get_or_connect(key, &endpoint, Connector))?;
		Ok(Self {
			inner: inner.with_version_shim(),
		})
	}

	#[wasm_bindgen(js_name = isReady)]
	pub fn is_ready(&self) -> bool {
		self.inner.is_ready()
	}

	pub fn ready(&self, callback: JsValue) -> JsInnertube {
		if let Some(callback) = function("ready", callback) {
			self.inner.ready(move || {
				if let Err(err) = callback.call0(&JsValue::NULL) {
					tracing::debug!(?err, "ready callback threw");
				}
			});
		}
		self.clone()
	}

	/// Call `method` remotely with the positional `args`.
	pub fn send(&self, method: &str, args: Option<Array>) -> JsInnertube {
		self.inner.send(method, positional(args));
		self.clone()
	}

	/// Like `send`, with a `{ success, error }` object.
	#[wasm_bindgen(js_name = sendWith)]
	pub fn send_with(&self, method: &str, args: Option<Array>, handlers: JsValue) -> JsInnertube {
		self.inner.send_with(method, positional(args), handlers_from(&handlers));
		self.clone()
	}

	/// Call `method` remotely; its result reaches the receivers of `method`.
	pub fn request(&self, method: &str, args: Option<Array>) -> JsInnertube {
		self.inner.request(method, positional(args));
		self.clone()
	}

	pub fn receive(&self, method: &str, callback: JsValue) -> JsInnertube {
		if let Some(callback) = function(method, callback) {
			self.inner.receive(method, move |args: &[JsValue]| {
				let args: Array = args.iter().collect();
				if let Err(err) = callback.apply(&JsValue::NULL, &args) {
					tracing::debug!(?err, "receive callback threw");
				}
			});
		}
		self.clone()
	}

	/// Reply to inbound `method` calls with the callback's return value.
	/// Returning `undefined` sends no reply.
	pub fn answer(&self, method: &str, callback: JsValue) -> JsInnertube {
		if let Some(callback) = function(method, callback) {
			self.inner.answer(method, move |args: &[JsValue]| {
				let args: Array = args.iter().collect();
				match callback.apply(&JsValue::NULL, &args) {
					Ok(value) if value.is_undefined() => None,
					Ok(value) => Some(value),
					Err(err) => {
						tracing::debug!(?err, "answer callback threw");
						None
					}
				}
			});
		}
		self.clone()
	}

	#[wasm_bindgen(js_name = methodMissing)]
	pub fn method_missing(&self, callback: JsValue) -> JsInnertube {
		if let Some(callback) = function("methodMissing", callback) {
			self.inner.method_missing(move || {
				if let Err(err) = callback.call0(&JsValue::NULL) {
					tracing::debug!(?err, "methodMissing callback threw");
				}
			});
		}
		self.clone()
	}

	pub fn destroy(&self) {
		self.inner.destroy();
	}
}

impl JsInnertube {
	pub fn connect(endpoint: &Endpoint) -> Result<Self> {
		let inner = Innertube::new(endpoint, Connector)?.with_version_shim();
		Ok(Self { inner })
	}

	pub fn messaging(&self) -> &Innertube<JsValue> {
		&self.inner
	}
}

fn endpoint(options: &JsValue) -> Result<Endpoint> {
	let mut endpoint = Endpoint::new();
	if options.is_undefined() || options.is_null() {
		return Ok(endpoint);
	}

	endpoint.remote = string(options, "remote")?;
	endpoint.container = string(options, "container")?;
	endpoint.scrolling = Reflect::get(options, &"scrolling".into())?.is_truthy();

	if let Some(interface) = string(options, "interface")? {
		endpoint.interface = match interface.as_str() {
			"message" => Interface::messaging(),
			"widget" => Interface::widget(),
			"dashboard" => Interface::dashboard(),
			_ => return Err(Error::InvalidOption("interface")),
		};
	}

	Ok(endpoint)
}

fn string(options: &JsValue, key: &'static str) -> Result<Option<String>> {
	let value = Reflect::get(options, &key.into())?;
	if value.is_undefined() || value.is_null() {
		return Ok(None);
	}

	value.as_string().map(Some).ok_or(Error::InvalidOption(key))
}

fn positional(args: Option<Array>) -> Vec<JsValue> {
	args.map(|args| args.iter().collect()).unwrap_or_default()
}

// Non-callable callbacks are ignored, never thrown.
fn function(method: &str, callback: JsValue) -> Option<Function> {
	match callback.dyn_into::<Function>() {
		Ok(callback) => Some(callback),
		Err(_) => {
			let err = innertube::Error::InvalidCallback(method.to_string());
			tracing::warn!(%err, "ignoring callback");
			None
		}
	}
}

fn handlers_from(handlers: &JsValue) -> Handlers<JsValue> {
	let mut out = Handlers::new();
	if handlers.is_undefined() || handlers.is_null() {
		return out;
	}

	let field = |key: &str| Reflect::get(handlers, &key.into()).ok().and_then(|value| value.dyn_into::<Function>().ok());

	if let Some(success) = field("success") {
		out = out.success(move |values: Vec<JsValue>| {
			let values: Array = values.into_iter().collect();
			if let Err(err) = success.apply(&JsValue::NULL, &values) {
				tracing::debug!(?err, "success handler threw");
			}
		});
	}

	if let Some(error) = field("error") {
		out = out.error(move |value: JsValue| {
			if let Err(err) = error.call1(&JsValue::NULL, &value) {
				tracing::debug!(?err, "error handler threw");
			}
		});
	}

	out
}
