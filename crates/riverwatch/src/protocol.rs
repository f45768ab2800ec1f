//! Wayland protocol bindings for river-status-unstable-v1.
//!
//! This module provides Rust bindings for the `zriver_status_manager_v1`,
//! `zriver_output_status_v1` and `zriver_seat_status_v1` Wayland protocol
//! interfaces exposed by the river compositor.
//!
//! The bindings are generated from the protocol XML file at compile time.

#![allow(dead_code, non_camel_case_types, unused_unsafe, unused_variables)]
#![allow(non_upper_case_globals, non_snake_case, unused_imports)]
#![allow(missing_docs, clippy::all)]

use wayland_client;
use wayland_client::protocol::*;

pub mod __interfaces {
    use wayland_client::protocol::__interfaces::*;
    wayland_scanner::generate_interfaces!("protocols/river-status-unstable-v1.xml");
}

use self::__interfaces::*;

wayland_scanner::generate_client_code!("protocols/river-status-unstable-v1.xml");

// Re-export the protocol types with convenient names
pub use zriver_output_status_v1::ZriverOutputStatusV1;
pub use zriver_seat_status_v1::ZriverSeatStatusV1;
pub use zriver_status_manager_v1::ZriverStatusManagerV1;
