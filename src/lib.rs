//! Thing Model Code Generator
//!
//! Compiles W3C WoT Thing Models into a typed, conflict-free object model
//! for a statically typed host language.
//!
//! ## Pipeline
//!
//! ```text
//! loader ──▶ references ──▶ model ──▶ resolver ──▶ codegen::Emitter
//!  (load)     (inline tm:ref)  (merge     (classes, enums,   (Kotlin sources)
//!                              tm:extends) aliases)
//! ```
//!
//! - **Structural deduplication**: identical shapes share one class; names
//!   held by a different shape are renamed deterministically
//! - **Two naming policies**: always-compound or original-then-compound
//! - **Enum placement**: nested in the owning class or top-level
//! - **Per-run registries**: every run owns its [`registry::TypeRegistries`]
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use thingmodel_codegen::{FsLoader, GenerationOptions, Generator, KotlinEmitter};
//!
//! # async fn run() -> thingmodel_codegen::Result<()> {
//! let options = GenerationOptions::default();
//! let emitter = KotlinEmitter::from_options(&options);
//! let generator = Generator::new(FsLoader::new("models"), options);
//! generator
//!     .generate("lamp.tm.json", "org.example.lamp", Path::new("generated"), &emitter)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod grouping;
pub mod loader;
pub mod model;
pub mod naming;
pub mod references;
pub mod registry;
pub mod resolver;
pub mod schema;

pub use codegen::{
    Emitter, GeneratedModel, GenerationOptions, GenerationReport, Generator, KotlinEmitter,
    SourceFile,
};
pub use config::CodegenConfig;
pub use error::{CodegenError, Result};
pub use fingerprint::Fingerprint;
pub use loader::{FsLoader, InMemoryLoader, ModelLoader};
pub use naming::ClassNamingPolicy;
pub use registry::{EnumPlacement, TypeRegistries};
pub use resolver::{NamingContext, TypeRef, TypeResolver};
pub use schema::SchemaNode;
