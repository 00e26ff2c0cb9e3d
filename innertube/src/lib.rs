//! A method-call convention for messaging between two windows.
//!
//! [Innertube] layers named calls with positional arguments, and an optional
//! success/error pair, on top of a [Transport] it does not implement. The
//! transport (usually an iframe messaging library such as easyXDM) handles the
//! handshake, framing and serialization; this crate only decides what to call
//! and who receives what.
//!
//! ```rs
//! let messaging = Innertube::new(&Endpoint::new().with_remote(url), connector)?;
//!
//! messaging.receive("date", |args| println!("{args:?}"));
//! messaging.ready(|| println!("connected"));
//!
//! // Push without a reply.
//! messaging.send("date", (2012, 0, 1));
//!
//! // Pull: the reply reaches the `date` receivers, same as a push.
//! messaging.request("date", ());
//! ```
//!
//! Requests carry no correlation id. A reply to `request("x")` and an
//! unrelated inbound `x` are dispatched the same way, in delivery order.
//!
//! Everything is single-threaded; callbacks run on the turn that triggered
//! them.

mod args;
mod endpoint;
mod error;
mod messaging;
mod registry;
mod transport;

#[cfg(test)]
mod mock;

pub use args::*;
pub use endpoint::*;
pub use error::*;
pub use messaging::{Innertube, VERSION, VERSION_METHOD};
pub use registry::*;
pub use transport::*;
