//! # paramify — schema-driven runtime parameters
//!
//! `paramify` turns a declarative schema (name, type, default, constraints)
//! into a typed, validated, mutable parameter store. Fields are updated one
//! at a time; every update revalidates the whole record and swaps it in
//! atomically, and each parameter can carry a change hook.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Schema (JSON/YAML)                                 │
//! │  └── ordered Vec<Declaration>                       │
//! ├─────────────────────────────────────────────────────┤
//! │  ParameterStore                                     │
//! │  ├── record: validated values, replaced on write    │
//! │  ├── set(name, value) → validate → swap → notify    │
//! │  └── hooks: name → Fn(&ParamValue)                  │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Getting started
//!
//! ```rust
//! use paramify::{ParameterStore, Schema, SchemaFormat};
//!
//! let schema = Schema::from_document(
//!     r#"
//! parameters:
//!   - name: volume
//!     type: int
//!     default: 5
//!     min: 0
//!     max: 10
//! "#,
//!     SchemaFormat::Yaml,
//! )?;
//! let mut store = ParameterStore::new(schema)?;
//!
//! store.on_set("volume", |value| println!("volume is now {:?}", value))?;
//! store.set("volume", 7)?;
//! assert!(store.set("volume", 11).is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The store is synchronous and single-threaded by design; `paramify-web`
//! shows the lock-per-store pattern for exposing it over HTTP.

pub mod error;
pub mod schema;
pub mod store;
pub mod types;

pub use error::{
    BuildError, ConfigFormatError, SetError, UnknownParameterError, ValidationError, Violation,
};
pub use schema::{Schema, SchemaFormat};
pub use store::ParameterStore;
pub use types::{Declaration, FloatRange, IntRange, ParamValue, TypeTag};
