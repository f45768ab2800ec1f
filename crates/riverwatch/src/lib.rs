//! Event-driven client for the river compositor's status protocol.
//!
//! riverwatch connects to a running river compositor, binds the
//! `river-status-unstable-v1` extension for every output and the seat, and
//! republishes decoded state (focused/view/urgent tag sets, focused view
//! title, output lifecycle) as typed [`StatusEvent`]s on a thread-safe
//! [`EventBus`]. A narrow [`CommandSink`] seam lets consumers push state
//! changes back through `riverctl`.
//!
//! ```no_run
//! use riverwatch::{EventFilter, RiverStatusClient};
//!
//! let client = RiverStatusClient::new();
//! let events = client.subscribe(EventFilter::all());
//! client.start();
//! for event in events {
//!     println!("{event:?}");
//! }
//! ```

pub mod bus;
pub mod client;
pub mod control;
pub mod error;
pub mod event;
pub mod protocol;
pub mod state;
pub mod tags;

pub use bus::{EventBus, SubscriberId, Subscription};
pub use client::{ClientPhase, RiverStatusClient};
pub use control::CommandSink;
pub use error::{Result, StatusError};
pub use event::{EventFilter, EventKind, StatusEvent};
pub use state::{OutputState, SeatState, StatusSnapshot};
