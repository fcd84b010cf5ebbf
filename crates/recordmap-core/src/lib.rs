//! Recordmap Core - Typed, identity-mapped models for API payloads
//!
//! This crate turns raw key/value payloads fetched from a record-based API
//! into model instances:
//! - Dynamic payload values (`Value`, `ValueMap`)
//! - Per-kind attribute schemas with coercion and read-only flags (`ModelDef`)
//! - Identity rules, including composite identities (`IdentityRule`)
//! - A per-session identity map keeping one live instance per record
//! - The `Client` session whose `model` call creates or merges instances
//!
//! ## Example
//!
//! ```
//! use recordmap_core::{payload, Client, Coercion, ModelDef, Registry};
//!
//! let registry = Registry::new()
//!     .with(
//!         ModelDef::new("Person")
//!             .attr("first_name")
//!             .and_then(|d| d.read_only_typed("created_at", Coercion::Time))
//!             .unwrap(),
//!     )
//!     .unwrap();
//! let client = Client::new(registry);
//!
//! let person = client.model("Person", &payload! { "id" => 1, "first_name" => "Ada" }).unwrap();
//! let again = client.model("Person", &payload! { "id" => 1, "first_name" => "Augusta" }).unwrap();
//!
//! assert!(person.ptr_eq(&again));
//! assert_eq!(person.get_str("first_name").as_deref(), Some("Augusta"));
//! ```
//!
//! ## JSON Feature
//!
//! Enable the `json` feature to build payloads from `serde_json` values:
//! ```toml
//! recordmap-core = { version = "0.1", features = ["json"] }
//! ```

mod attr;
mod client;
mod config;
mod error;
mod identity;
mod identity_map;
mod instance;
mod registry;
mod schema;
mod value;

pub use attr::{Attr, Symbol};
pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use identity::{lookup_path, Identity, IdentityFn, IdentityRule, IdentityValue, KindId};
pub use identity_map::{IdentityMap, Lookup};
pub use instance::{ModelInstance, ModelRef};
pub use registry::{KindRef, Registry};
pub use schema::{AttributeDef, Coercion, ModelDef};
pub use value::{Value, ValueMap};

#[cfg(feature = "json")]
pub use value::payload_from_json;
