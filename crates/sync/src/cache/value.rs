//! Cached value types.

use recipe_box_core::{Product, Recipe, Storefront, SupportLink, UserProfile, UserRole};

/// A resolved read result, as stored in the cache.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Recipes(Vec<Recipe>),
    Recipe(Option<Box<Recipe>>),
    Profile(Option<UserProfile>),
    Flag(bool),
    Storefront(Option<Storefront>),
    Products(Vec<Product>),
    SupportLinks(Vec<SupportLink>),
    Role(UserRole),
}

/// Conversion between a read's result type and its cached form.
pub trait Cached: Sized {
    fn into_cache_value(self) -> CacheValue;
    fn from_cache_value(value: CacheValue) -> Option<Self>;
}

macro_rules! impl_cached {
    ($ty:ty, $variant:ident) => {
        impl Cached for $ty {
            fn into_cache_value(self) -> CacheValue {
                CacheValue::$variant(self)
            }

            fn from_cache_value(value: CacheValue) -> Option<Self> {
                match value {
                    CacheValue::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_cached!(Vec<Recipe>, Recipes);
impl_cached!(Option<UserProfile>, Profile);
impl_cached!(bool, Flag);
impl_cached!(Option<Storefront>, Storefront);
impl_cached!(Vec<Product>, Products);
impl_cached!(Vec<SupportLink>, SupportLinks);
impl_cached!(UserRole, Role);

impl Cached for Option<Recipe> {
    fn into_cache_value(self) -> CacheValue {
        CacheValue::Recipe(self.map(Box::new))
    }

    fn from_cache_value(value: CacheValue) -> Option<Self> {
        match value {
            CacheValue::Recipe(recipe) => Some(recipe.map(|boxed| *boxed)),
            _ => None,
        }
    }
}
