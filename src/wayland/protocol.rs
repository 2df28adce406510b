//! Generated client bindings for the z11 protocol subset in `protocols/z11.xml`.

#![allow(
    dead_code,
    non_camel_case_types,
    non_upper_case_globals,
    non_snake_case,
    unused_imports,
    unused_unsafe,
    unused_variables,
    clippy::all
)]

use wayland_client;
use wayland_client::protocol::*;

pub mod __interfaces {
    use wayland_client::protocol::__interfaces::*;
    wayland_scanner::generate_interfaces!("protocols/z11.xml");
}
use self::__interfaces::*;

wayland_scanner::generate_client_code!("protocols/z11.xml");
