// src/lib.rs — Library root for pixshop

pub mod cli;
pub mod core;
pub mod infra;
pub mod provider;
pub mod util;
