//! Incremental synchronisation for a `name -> spec` service directory.
//!
//! The directory owns a [`ServiceMapHistory`]; mirrors ask it for the
//! changes since the [`Generation`] they already hold and get back a
//! [`MapDiff`], either incremental or a full snapshot once their
//! generation has aged out of the bounded history.

pub mod change_log;
pub mod config;
pub mod diff;
pub mod generation;
pub mod history;
pub mod mirror;
pub mod registrar;
pub mod types;
pub mod watch;

pub use generation::Generation;
pub use history::{RequestId, ServiceMapHistory};
pub use types::{MapChange, MapDiff, ServiceMapping, Update};
