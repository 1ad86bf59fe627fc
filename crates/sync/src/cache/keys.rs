//! Cache key taxonomy.
//!
//! Every cached read is addressed by a [`QueryKey`]: an operation tag plus the
//! stringified parameters of the read. Writes name the entries they make stale
//! with [`Invalidation`] targets, which match keys by segment prefix.

use core::fmt;

use recipe_box_core::{Principal, RecipeId};

/// Key of a cached read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Every recipe.
    AllRecipes,
    /// Newest recipes, optionally without the caller's own.
    RecentRecipes { exclude_own: bool },
    /// A single recipe.
    Recipe(RecipeId),
    /// The caller's own profile.
    CallerProfile,
    /// Another user's profile.
    UserProfile(Principal),
    /// Whether `caller` has liked `recipe`.
    HasLiked { recipe: RecipeId, caller: Principal },
    /// The caller's own storefront.
    CallerStorefront,
    /// Another user's storefront.
    UserStorefront(Principal),
    /// Another user's product listings.
    UserProducts(Principal),
    /// Another user's support links.
    UserSupportLinks(Principal),
    /// The caller's backend role.
    CallerRole,
    /// Whether the caller is an admin.
    IsCallerAdmin,
}

impl QueryKey {
    /// Operation tag, the first key segment.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::AllRecipes => "recipes",
            Self::RecentRecipes { .. } => "recentRecipes",
            Self::Recipe(_) => "recipe",
            Self::CallerProfile => "currentUserProfile",
            Self::UserProfile(_) => "userProfile",
            Self::HasLiked { .. } => "hasLiked",
            Self::CallerStorefront => "callerStorefront",
            Self::UserStorefront(_) => "userStorefront",
            Self::UserProducts(_) => "userProducts",
            Self::UserSupportLinks(_) => "userSupportLinks",
            Self::CallerRole => "callerUserRole",
            Self::IsCallerAdmin => "isCallerAdmin",
        }
    }

    /// Tag followed by the stringified parameters.
    #[must_use]
    pub fn segments(&self) -> Vec<String> {
        let mut segments = vec![self.tag().to_string()];
        match self {
            Self::RecentRecipes { exclude_own } => segments.push(exclude_own.to_string()),
            Self::Recipe(id) => segments.push(id.to_string()),
            Self::HasLiked { recipe, caller } => {
                segments.push(recipe.to_string());
                segments.push(caller.to_string());
            }
            Self::UserProfile(user)
            | Self::UserStorefront(user)
            | Self::UserProducts(user)
            | Self::UserSupportLinks(user) => segments.push(user.to_string()),
            Self::AllRecipes
            | Self::CallerProfile
            | Self::CallerStorefront
            | Self::CallerRole
            | Self::IsCallerAdmin => {}
        }
        segments
    }

    /// Entries whose value depends on who the caller is.
    #[must_use]
    pub const fn is_caller_scoped(&self) -> bool {
        matches!(
            self,
            Self::RecentRecipes { .. }
                | Self::CallerProfile
                | Self::HasLiked { .. }
                | Self::CallerStorefront
                | Self::CallerRole
                | Self::IsCallerAdmin
        )
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments().join(":"))
    }
}

/// A set of cache entries to mark stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Invalidation {
    /// `recipes`
    AllRecipes,
    /// `recentRecipes`, both `exclude_own` variants.
    RecentRecipes,
    /// `recipe:<id>`
    Recipe(RecipeId),
    /// `hasLiked:<id>`, for every caller.
    HasLiked(RecipeId),
    /// `currentUserProfile`
    CallerProfile,
    /// `callerStorefront`
    CallerStorefront,
    /// `callerUserRole`
    CallerRole,
    /// `isCallerAdmin`
    IsCallerAdmin,
    /// Every caller-scoped entry. Used when the identity changes.
    CallerScoped,
}

impl Invalidation {
    /// Key prefix this target covers. `None` for [`Self::CallerScoped`],
    /// which matches by category instead.
    #[must_use]
    pub fn prefix(&self) -> Option<Vec<String>> {
        let prefix = match self {
            Self::AllRecipes => vec!["recipes".to_string()],
            Self::RecentRecipes => vec!["recentRecipes".to_string()],
            Self::Recipe(id) => vec!["recipe".to_string(), id.to_string()],
            Self::HasLiked(id) => vec!["hasLiked".to_string(), id.to_string()],
            Self::CallerProfile => vec!["currentUserProfile".to_string()],
            Self::CallerStorefront => vec!["callerStorefront".to_string()],
            Self::CallerRole => vec!["callerUserRole".to_string()],
            Self::IsCallerAdmin => vec!["isCallerAdmin".to_string()],
            Self::CallerScoped => return None,
        };
        Some(prefix)
    }

    /// Whether `key` is covered by this target.
    #[must_use]
    pub fn matches(&self, key: &QueryKey) -> bool {
        self.prefix().map_or_else(
            || key.is_caller_scoped(),
            |prefix| key.segments().starts_with(&prefix),
        )
    }
}

impl fmt::Display for Invalidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix() {
            Some(prefix) => f.write_str(&prefix.join(":")),
            None => f.write_str("<caller-scoped>"),
        }
    }
}
