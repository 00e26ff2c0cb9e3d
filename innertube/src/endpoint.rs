/// The call channels exposed locally and invoked remotely.
///
/// Every local channel funnels into the same receive table, so the layout only
/// matters to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
	/// Channels the remote side may call on us.
	pub local: Vec<String>,

	/// The channel we call on the remote side.
	pub remote: String,
}

impl Interface {
	/// A single `message` channel in both directions.
	pub fn messaging() -> Self {
		Self {
			local: vec!["message".to_string()],
			remote: "message".to_string(),
		}
	}

	/// The widget half of the widget/dashboard layout.
	pub fn widget() -> Self {
		Self {
			local: vec!["widget".to_string()],
			remote: "dashboard".to_string(),
		}
	}

	/// The dashboard half of the widget/dashboard layout.
	pub fn dashboard() -> Self {
		Self {
			local: vec!["dashboard".to_string()],
			remote: "widget".to_string(),
		}
	}

	pub fn exposes(&self, channel: &str) -> bool {
		self.local.iter().any(|local| local == channel)
	}
}

impl Default for Interface {
	fn default() -> Self {
		Self::messaging()
	}
}

/// Where the transport should connect.
///
/// Both `remote` and `container` are handed to the transport untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Endpoint {
	/// The remote document, usually a URL.
	pub remote: Option<String>,

	/// The element that hosts the frame created by the transport.
	pub container: Option<String>,

	/// Allow scrolling on the created frame.
	pub scrolling: bool,

	pub interface: Interface,
}

impl Endpoint {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_remote<T: Into<String>>(mut self, remote: T) -> Self {
		self.remote = Some(remote.into());
		self
	}

	pub fn with_container<T: Into<String>>(mut self, container: T) -> Self {
		self.container = Some(container.into());
		self
	}

	pub fn with_interface(mut self, interface: Interface) -> Self {
		self.interface = interface;
		self
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn defaults() {
		let endpoint = Endpoint::new();
		assert_eq!(endpoint.remote, None);
		assert_eq!(endpoint.container, None);
		assert!(!endpoint.scrolling);
		assert_eq!(endpoint.interface, Interface::messaging());
	}

	#[test]
	fn widget_layout() {
		let widget = Interface::widget();
		assert!(widget.exposes("widget"));
		assert!(!widget.exposes("dashboard"));
		assert_eq!(widget.remote, "dashboard");

		let dashboard = Interface::dashboard();
		assert!(dashboard.exposes("dashboard"));
		assert_eq!(dashboard.remote, "widget");
	}
}
