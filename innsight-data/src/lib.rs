//! Network adapters for the Innsight engine.
//!
//! Responsibilities:
//! - Call the routing service for isochrones.
//! - Recover from transient routing failures by retrying and by serving
//!   cached polygons.
//!
//! Boundaries:
//! - Do not encode domain rules (live in `innsight-core`).
//! - Expose synchronous traits; async HTTP stays internal.
//!
//! Invariants:
//! - No global mutable state; caches belong to the provider that owns them.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod routing;
