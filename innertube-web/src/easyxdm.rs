use innertube::{Completion, Connect, Endpoint, Link, Transport};
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::js_sys;

use crate::pending::Pending;
use crate::{Error, Result};

#[wasm_bindgen(js_namespace = easyXDM)]
extern "C" {
	/// `easyXDM.Rpc`, loaded by the embedding page.
	type Rpc;

	#[wasm_bindgen(constructor, catch)]
	fn new(config: &Object, interface: &Object) -> std::result::Result<Rpc, JsValue>;

	#[wasm_bindgen(method)]
	fn destroy(this: &Rpc);
}

type ChannelFn = dyn FnMut(JsValue, JsValue, JsValue, JsValue);
type HandlerFn = dyn FnMut(JsValue);

/// A [Transport] backed by an `easyXDM.Rpc` instance.
pub struct EasyXdm {
	rpc: Rpc,

	// Referenced by the Rpc until it is destroyed.
	_on_ready: Closure<dyn FnMut()>,
	_channels: Vec<Closure<ChannelFn>>,

	// The success/error closures of calls the remote has not settled yet.
	pending: Pending<JsValue, [Closure<HandlerFn>; 2]>,
}

/// Connects an [EasyXdm] transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct Connector;

impl Connect<JsValue> for Connector {
	type Transport = EasyXdm;
	type Error = Error;

	fn connect(self, endpoint: &Endpoint, link: Link<JsValue>) -> Result<EasyXdm> {
		let config = Object::new();
		set(&config, "remote", &optional(&endpoint.remote))?;
		set(&config, "container", &optional(&endpoint.container))?;

		let props = Object::new();
		let scrolling = match endpoint.scrolling {
			true => "yes",
			false => "no",
		};
		set(&props, "scrolling", &scrolling.into())?;
		set(&config, "props", &props)?;

		let ready = link.clone();
		let on_ready = Closure::wrap(Box::new(move || ready.ready()) as Box<dyn FnMut()>);
		set(&config, "onReady", on_ready.as_ref())?;

		let local = Object::new();
		let mut channels = Vec::with_capacity(endpoint.interface.local.len());

		for channel in &endpoint.interface.local {
			let link = link.clone();
			let name = channel.clone();

			let closure = Closure::wrap(Box::new(move |method: JsValue, args: JsValue, success: JsValue, error: JsValue| {
				let Some(method) = method.as_string() else {
					tracing::warn!(channel = %name, "inbound call without a method name");
					return;
				};

				link.deliver(&name, &method, unpack(args), reply(success, error));
			}) as Box<ChannelFn>);

			set(&local, channel, closure.as_ref())?;
			channels.push(closure);
		}

		let remote = Object::new();
		set(&remote, &endpoint.interface.remote, &Object::new())?;

		let interface = Object::new();
		set(&interface, "local", &local)?;
		set(&interface, "remote", &remote)?;

		let rpc = Rpc::new(&config, &interface)?;

		Ok(EasyXdm {
			rpc,
			_on_ready: on_ready,
			_channels: channels,
			pending: Pending::new(),
		})
	}
}

impl EasyXdm {
	fn invoke(&self, channel: &str, method: &str, args: Vec<JsValue>, completion: Option<Completion<JsValue>>) -> Result<()> {
		let stub: Function = Reflect::get(&self.rpc, &channel.into())?
			.dyn_into()
			.map_err(|_| Error::MissingChannel(channel.to_string()))?;

		let params = Array::new();
		params.push(&method.into());
		params.push(&args.into_iter().collect::<Array>());

		let settle = match completion {
			Some(completion) => {
				let settle = self.pending.reserve();

				let on_success = settle.clone();
				let on_success = Closure::wrap(Box::new(move |value: JsValue| on_success.succeed(vec![value])) as Box<HandlerFn>);
				let on_error = settle.clone();
				let on_error = Closure::wrap(Box::new(move |value: JsValue| on_error.fail(value)) as Box<HandlerFn>);

				params.push(on_success.as_ref());
				params.push(on_error.as_ref());

				// Inserted before the call, the remote may answer synchronously.
				self.pending.insert(&settle, completion, [on_success, on_error]);
				Some(settle)
			}
			None => None,
		};

		if let Err(err) = stub.apply(&self.rpc, &params) {
			if let Some(settle) = settle {
				self.pending.cancel(&settle);
			}
			return Err(err.into());
		}

		tracing::trace!(pending = self.pending.len(), "remote call sent");
		Ok(())
	}
}

impl Transport<JsValue> for EasyXdm {
	fn call(&self, channel: &str, method: &str, args: Vec<JsValue>, completion: Option<Completion<JsValue>>) {
		if let Err(err) = self.invoke(channel, method, args, completion) {
			tracing::warn!(%err, channel, method, "remote call failed");
		}
	}

	fn destroy(&self) {
		self.rpc.destroy();
		self.pending.clear();
	}
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<()> {
	Reflect::set(target, &key.into(), value)?;
	Ok(())
}

fn optional(value: &Option<String>) -> JsValue {
	match value {
		Some(value) => JsValue::from_str(value),
		None => JsValue::NULL,
	}
}

// easyXDM hands over the caller's argument list as a single array.
fn unpack(args: JsValue) -> Vec<JsValue> {
	if args.is_undefined() || args.is_null() {
		return Vec::new();
	}

	match args.dyn_into::<Array>() {
		Ok(array) => array.iter().collect(),
		Err(value) => vec![value],
	}
}

fn reply(success: JsValue, error: JsValue) -> Option<Completion<JsValue>> {
	let success = success.dyn_into::<Function>().ok()?;
	let error = error.dyn_into::<Function>().ok();

	Some(Completion::new(
		move |values: Vec<JsValue>| {
			let values: Array = values.into_iter().collect();
			if let Err(err) = success.apply(&JsValue::NULL, &values) {
				tracing::debug!(?err, "success handler threw");
			}
		},
		move |value: JsValue| {
			if let Some(error) = error {
				if let Err(err) = error.call1(&JsValue::NULL, &value) {
					tracing::debug!(?err, "error handler threw");
				}
			}
		},
	))
}
