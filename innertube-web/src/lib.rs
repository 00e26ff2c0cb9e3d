//! Innertube for the browser, on top of [easyXDM](http://easyxdm.net/).
//!
//! [Connector] adapts an `easyXDM.Rpc` into an [innertube::Transport], so the
//! page must load easyXDM before connecting. [JsInnertube] exports the
//! messaging facade to JavaScript as `Innertube`:
//!
//! ```js
//! const dashboard = new Innertube({ remote: "https://example.com/widget.html", container: "widget" });
//!
//! dashboard
//!     .receive("date", (year, month, day) => console.log(year, month, day))
//!     .ready(() => dashboard.send("date", [2012, 0, 1]));
//! ```
mod easyxdm;
mod error;
mod messaging;
mod pending;

pub use easyxdm::*;
pub use error::*;
pub use messaging::*;
