//! Command line front end wiring configuration, device backend, gateway and
//! agent loop together.

pub mod backend;
pub mod cli;
pub mod commands;
pub mod confirm;
pub mod debug;
