//! Recipe Box Core - Shared types library.
//!
//! This crate provides the domain types exchanged with the recipe backend:
//! - recipes, their ingredients, comments and likes
//! - user profiles and roles
//! - storefronts (support links and products)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no caching, no actor calls.
//! The backend is the source of truth for every value defined here; the sync
//! layer only holds transient copies.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, principals and timestamps, plus the
//!   entity structs built on top of them

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
