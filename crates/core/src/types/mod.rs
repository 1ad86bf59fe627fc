//! Core types for Recipe Box.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod photo;
pub mod principal;
pub mod profile;
pub mod recipe;
pub mod storefront;
pub mod time;

pub use id::RecipeId;
pub use photo::PhotoBlob;
pub use principal::{Principal, PrincipalError};
pub use profile::{UserProfile, UserRole};
pub use recipe::{Comment, Ingredient, Recipe, RecipeInput};
pub use storefront::{Product, Storefront, SupportLink};
pub use time::Timestamp;
