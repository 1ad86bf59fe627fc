//! End-to-end recipe flows against the in-memory backend.

use recipe_box_core::RecipeId;
use recipe_box_integration_tests::{TestContext, principal, recipe_input};
use recipe_box_sync::{ActorError, NotificationLevel, SyncError};

#[tokio::test]
async fn test_create_pancakes_appears_once_in_all_recipes() {
    let ctx = TestContext::connected(Some("alice")).await;

    // Warm the listing so the create has something to invalidate.
    assert!(ctx.client.all_recipes().await.is_empty());

    let id = ctx
        .client
        .create_recipe(recipe_input("Pancakes", 2, 3))
        .await
        .expect("create recipe");

    let recipes = ctx.client.all_recipes().await;
    let matching: Vec<_> = recipes.iter().filter(|r| r.id == id).collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].title, "Pancakes");
    assert_eq!(matching[0].ingredients.len(), 2);
    assert_eq!(matching[0].steps.len(), 3);
    assert_eq!(
        ctx.notifications.messages(),
        vec!["Recipe created successfully!".to_string()]
    );
}

#[tokio::test]
async fn test_update_title_visible_in_detail_and_listing() {
    let ctx = TestContext::connected(Some("alice")).await;
    let alice = principal("alice");
    for n in 1..=7 {
        ctx.backend
            .seed_recipe(&alice, recipe_input(&format!("Recipe {n}"), 1, 1));
    }
    let id = RecipeId::new(7);

    assert_eq!(ctx.client.recipe(id).await.map(|r| r.title), Some("Recipe 7".to_string()));
    ctx.client.all_recipes().await;

    ctx.client
        .update_recipe(id, recipe_input("Sourdough", 3, 5))
        .await
        .expect("update recipe");

    let detail = ctx.client.recipe(id).await.expect("recipe 7");
    assert_eq!(detail.title, "Sourdough");
    let listed = ctx.client.all_recipes().await;
    let entry = listed.iter().find(|r| r.id == id).expect("listed");
    assert_eq!(entry.title, "Sourdough");
}

#[tokio::test]
async fn test_update_by_non_owner_reports_backend_message() {
    let ctx = TestContext::connected(Some("bob")).await;
    let id = ctx
        .backend
        .seed_recipe(&principal("alice"), recipe_input("Soup", 1, 1));

    let err = ctx
        .client
        .update_recipe(id, recipe_input("Bob's soup", 1, 1))
        .await
        .expect_err("bob does not own the recipe");

    assert!(matches!(err, SyncError::Remote { .. }));
    let seen = ctx.notifications.all();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].level, NotificationLevel::Error);
    assert_eq!(seen[0].message, "Unauthorized: Only the owner can update this recipe");
    assert_eq!(ctx.backend.stored_recipe(id).map(|r| r.title), Some("Soup".to_string()));
}

#[tokio::test]
async fn test_delete_removes_from_listings() {
    let ctx = TestContext::connected(Some("alice")).await;
    let alice = principal("alice");
    let keep = ctx.backend.seed_recipe(&alice, recipe_input("Keep", 1, 1));
    let gone = ctx.backend.seed_recipe(&alice, recipe_input("Gone", 1, 1));

    assert_eq!(ctx.client.all_recipes().await.len(), 2);
    assert_eq!(ctx.client.recent_recipes(false).await.len(), 2);

    ctx.client.delete_recipe(gone).await.expect("delete recipe");

    let ids: Vec<_> = ctx.client.all_recipes().await.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![keep]);
    assert_eq!(ctx.client.recent_recipes(false).await.len(), 1);
    assert_eq!(
        ctx.notifications.messages(),
        vec!["Recipe deleted successfully!".to_string()]
    );
}

#[tokio::test]
async fn test_comment_refetches_only_its_recipe() {
    let ctx = TestContext::connected(Some("alice")).await;
    let alice = principal("alice");
    for n in 1..=3 {
        ctx.backend
            .seed_recipe(&alice, recipe_input(&format!("Recipe {n}"), 1, 1));
    }
    let id = RecipeId::new(3);
    ctx.client.all_recipes().await;
    ctx.client.recipe(RecipeId::new(1)).await;
    ctx.client.recipe(id).await;
    ctx.backend.reset_calls();

    ctx.client.add_comment(id, "Lovely").await.expect("add comment");

    ctx.client.all_recipes().await;
    ctx.client.recipe(RecipeId::new(1)).await;
    let detail = ctx.client.recipe(id).await.expect("recipe 3");

    assert_eq!(ctx.backend.calls("get_all_recipes"), 0);
    assert_eq!(ctx.backend.calls("get_recipe"), 1);
    assert_eq!(detail.comments.len(), 1);
    assert_eq!(detail.comments[0].content, "Lovely");
    assert_eq!(detail.comments[0].author, alice);
}

#[tokio::test]
async fn test_missing_recipe_resolves_to_none_silently() {
    let ctx = TestContext::connected(Some("alice")).await;

    assert!(ctx.client.recipe(RecipeId::new(99)).await.is_none());
    assert!(ctx.client.recipe(RecipeId::new(99)).await.is_none());

    assert_eq!(ctx.backend.calls("get_recipe"), 1);
    assert!(ctx.notifications.all().is_empty());
}

#[tokio::test]
async fn test_transport_failure_on_listing_resolves_to_empty() {
    let ctx = TestContext::connected(Some("alice")).await;
    ctx.backend
        .seed_recipe(&principal("alice"), recipe_input("Soup", 1, 1));
    ctx.backend.fail(
        "get_all_recipes",
        ActorError::Transport("connection reset".to_string()),
    );

    assert!(ctx.client.all_recipes().await.is_empty());
    assert!(ctx.notifications.all().is_empty());
}

#[tokio::test]
async fn test_recent_recipes_can_exclude_own() {
    let ctx = TestContext::connected(Some("alice")).await;
    ctx.backend
        .seed_recipe(&principal("alice"), recipe_input("Mine", 1, 1));
    ctx.backend
        .seed_recipe(&principal("bob"), recipe_input("Theirs", 1, 1));

    let everything = ctx.client.recent_recipes(false).await;
    let others = ctx.client.recent_recipes(true).await;

    assert_eq!(everything.len(), 2);
    assert_eq!(everything[0].title, "Theirs");
    assert_eq!(others.len(), 1);
    assert_eq!(others[0].title, "Theirs");
    assert_eq!(ctx.backend.calls("get_recent_recipes"), 2);
}
