// tests/locations.rs

mod common;

use backend_clubgear::common::error::AppError;
use backend_clubgear::models::location::LocationKind;
use backend_clubgear::services::equipment_service::NewItemInput;

use common::{seed_catalog, setup};

#[tokio::test]
async fn slug_collisions_get_numeric_suffixes() {
    let ctx = setup().await;

    let first = ctx
        .locations
        .create_location("Equipment Room", None, LocationKind::Storage, None, None, None)
        .await
        .expect("first");
    let second = ctx
        .locations
        .create_location("Equipment Room", None, LocationKind::Storage, None, None, None)
        .await
        .expect("second");
    let third = ctx
        .locations
        .create_location("Equipment Room", None, LocationKind::Storage, None, None, None)
        .await
        .expect("third");

    assert_eq!(first.slug, "equipment-room");
    assert_eq!(second.slug, "equipment-room-2");
    assert_eq!(third.slug, "equipment-room-3");
}

#[tokio::test]
async fn a_location_cannot_parent_itself() {
    let ctx = setup().await;
    let location = ctx
        .locations
        .create_location("Garage", None, LocationKind::Warehouse, None, None, None)
        .await
        .expect("location");

    let err = ctx
        .locations
        .update_location(location.id, None, Some(Some(location.id)), None, None, None, None, None)
        .await
        .expect_err("must fail");
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn delete_is_blocked_while_referenced() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;

    let parent = ctx
        .locations
        .create_location("Clubhouse", None, LocationKind::Storage, None, None, None)
        .await
        .expect("parent");
    let child = ctx
        .locations
        .create_location("Locker 3", Some(parent.id), LocationKind::Locker, None, None, None)
        .await
        .expect("child");

    let err = ctx.locations.delete_location(parent.id).await.expect_err("has children");
    assert!(matches!(err, AppError::Conflict(_)));

    let item = ctx
        .equipment
        .create_item(
            &ctx.pool,
            ctx.admin.id,
            NewItemInput {
                title: "Stored Helmet".to_string(),
                manufacturer_id: manufacturer.id,
                equipment_type_id: equipment_type.id,
                identifier: None,
                size: None,
                condition: None,
                location_id: Some(child.id),
                metadata: None,
                notes: None,
            },
        )
        .await
        .expect("item");

    let err = ctx.locations.delete_location(child.id).await.expect_err("has items");
    assert!(matches!(err, AppError::Conflict(_)));

    // Sem referências, a exclusão passa, de baixo para cima.
    ctx.equipment.delete_item(&ctx.pool, item.id, ctx.admin.id).await.expect("delete item");
    ctx.locations.delete_location(child.id).await.expect("delete child");
    ctx.locations.delete_location(parent.id).await.expect("delete parent");
}

#[tokio::test]
async fn inactive_locations_are_hidden_by_default() {
    let ctx = setup().await;
    let location = ctx
        .locations
        .create_location("Old Shed", None, LocationKind::Other, None, None, None)
        .await
        .expect("location");

    ctx.locations
        .update_location(location.id, None, None, None, None, None, None, Some(false))
        .await
        .expect("deactivate");

    let active = ctx.locations.list_locations(false).await.expect("active list");
    assert!(active.iter().all(|l| l.id != location.id));

    let all = ctx.locations.list_locations(true).await.expect("full list");
    assert!(all.iter().any(|l| l.id == location.id));
}

#[tokio::test]
async fn ensure_default_is_idempotent() {
    let ctx = setup().await;
    let again = ctx
        .location_repo
        .ensure_default("main-storage", "Main Storage")
        .await
        .expect("ensure default");
    assert_eq!(again, ctx.default_location_id);
}
