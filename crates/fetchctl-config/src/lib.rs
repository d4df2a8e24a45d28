#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, unused)]

//! Typed configuration for the fetchctl control panel.
//!
//! Layout: `model.rs` (typed sections and their defaults), `defaults.rs`
//! (constants shared by the sections), `validate.rs` (parsing and validation
//! helpers), `loader.rs` (`ConfigLoader`: defaults, JSON file, environment).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use model::{
    ApiConfig, LinkConfig, MotionConfig, PanelConfig, PollingConfig, ResolvedLinks,
    SubmissionDefaults, UrlValidation,
};
