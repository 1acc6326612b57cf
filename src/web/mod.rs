//! Interactive web shell.
//!
//! Serves a form page with three input modes (text upload, pasted text,
//! JSON triples), runs generation on submit and embeds the resulting
//! artifact in the page.

pub mod page;
pub mod routes;
pub mod server;

pub use server::{AppState, ShellServer};
