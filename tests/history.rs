// tests/history.rs

mod common;

use backend_clubgear::common::error::AppError;
use backend_clubgear::db::history_repo::HistoryFilters;
use backend_clubgear::models::assignment::Assignee;
use backend_clubgear::models::history::HistoryAction;
use backend_clubgear::services::equipment_service::ItemUpdate;
use chrono::{Duration, Utc};

use common::{member_user, quick_item, seed_catalog, setup};

#[tokio::test]
async fn mutations_append_newest_first() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;
    let player = member_user(&ctx, "player@club.test", "Player").await;
    let item = quick_item(&ctx, "Helmet", manufacturer.id, equipment_type.id).await;

    ctx.assignments
        .assign(&ctx.pool, item.id, Assignee::Individual(player.id), ctx.admin.id)
        .await
        .expect("assign");
    ctx.equipment
        .update_item(
            &ctx.pool,
            item.id,
            ctx.admin.id,
            ItemUpdate { title: Some("Game Helmet".to_string()), ..Default::default() },
        )
        .await
        .expect("update");

    let entries = ctx.history.item_history(item.id).await.expect("history");
    let actions: Vec<HistoryAction> = entries.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![HistoryAction::Updated, HistoryAction::AssignmentChanged, HistoryAction::Created]
    );
    for entry in &entries {
        assert_eq!(entry.user_display_name.as_deref(), Some("Admin"));
    }
}

#[tokio::test]
async fn recent_history_applies_filters() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;
    let player = member_user(&ctx, "player@club.test", "Player").await;
    let first = quick_item(&ctx, "Helmet A", manufacturer.id, equipment_type.id).await;
    let _second = quick_item(&ctx, "Helmet B", manufacturer.id, equipment_type.id).await;

    ctx.equipment
        .update_item(
            &ctx.pool,
            first.id,
            player.id,
            ItemUpdate { title: Some("Helmet A1".to_string()), ..Default::default() },
        )
        .await
        .expect("update as player");

    let updated = ctx
        .history
        .recent_history(HistoryFilters {
            action: Some(HistoryAction::Updated),
            ..Default::default()
        })
        .await
        .expect("filter by action");
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].item_id, first.id);
    assert_eq!(updated[0].user_id, Some(player.id));
    assert_eq!(updated[0].user_display_name.as_deref(), Some("Player"));

    let by_admin = ctx
        .history
        .recent_history(HistoryFilters { user_id: Some(ctx.admin.id), ..Default::default() })
        .await
        .expect("filter by user");
    assert_eq!(by_admin.len(), 2);
    assert!(by_admin.iter().all(|e| e.action == HistoryAction::Created));

    let for_item = ctx
        .history
        .recent_history(HistoryFilters { item_id: Some(first.id), ..Default::default() })
        .await
        .expect("filter by item");
    assert_eq!(for_item.len(), 2);

    // O limite corta a partir do mais recente.
    let newest = ctx
        .history
        .recent_history(HistoryFilters { limit: 1, ..Default::default() })
        .await
        .expect("limit");
    assert_eq!(newest.len(), 1);
    assert_eq!(newest[0].action, HistoryAction::Updated);
}

#[tokio::test]
async fn clean_removes_only_stale_entries() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;
    let item = quick_item(&ctx, "Helmet", manufacturer.id, equipment_type.id).await;

    ctx.history_repo
        .insert(
            &ctx.pool,
            item.id,
            HistoryAction::Updated,
            Some(ctx.admin.id),
            &serde_json::json!({ "note": "stale" }),
            Utc::now() - Duration::days(40),
        )
        .await
        .expect("backdated entry");

    let removed = ctx.history.clean_old_history(30).await.expect("clean");
    assert_eq!(removed, 1);

    let entries = ctx.history.item_history(item.id).await.expect("history");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, HistoryAction::Created);

    let removed = ctx.history.clean_old_history(30).await.expect("second clean");
    assert_eq!(removed, 0);
}

#[tokio::test]
async fn clean_rejects_zero_retention() {
    let ctx = setup().await;
    let err = ctx.history.clean_old_history(0).await.expect_err("must fail");
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn history_for_missing_item_is_not_found() {
    let ctx = setup().await;
    let err = ctx.history.item_history(9999).await.expect_err("must fail");
    assert!(matches!(err, AppError::NotFound(_)));
}
