//! Care Assistant - guided conversational flow engine
//!
//! A menu-driven dialogue that walks a user through a fixed decision tree
//! (appointment, symptoms, medicine, routine), collects their answers and
//! closes with a star rating.

pub mod catalog;
pub mod config;
pub mod resolver;
pub mod runtime;
pub mod session;

pub use config::EngineConfig;
pub use runtime::{spawn, RuntimeError, WidgetHandle};
