// tests/equipment.rs

mod common;

use backend_clubgear::common::error::AppError;
use backend_clubgear::db::equipment_repo::ItemSearchFilters;
use backend_clubgear::models::assignment::Assignee;
use backend_clubgear::models::equipment::ItemCondition;
use backend_clubgear::models::history::HistoryAction;
use backend_clubgear::services::equipment_service::{ItemUpdate, NewItemInput};

use common::{member_user, quick_item, seed_catalog, setup};

#[tokio::test]
async fn identifiers_are_sequential_without_gaps() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;

    for expected in 1..=3i64 {
        let item = quick_item(
            &ctx,
            &format!("Helmet {}", expected),
            manufacturer.id,
            equipment_type.id,
        )
        .await;
        assert_eq!(item.serial_no, expected);
        assert_eq!(item.identifier, format!("0001-0001-{:05}", expected));
    }
}

#[tokio::test]
async fn serial_sequences_are_independent_per_pair() {
    let ctx = setup().await;
    let (manufacturer, helmet) = seed_catalog(&ctx).await;
    let pads = ctx.equipment.create_type("Shoulder Pads", None).await.expect("second type");
    let other = ctx
        .equipment
        .create_manufacturer("Schutt", None)
        .await
        .expect("second manufacturer");

    let first = quick_item(&ctx, "Helmet A", manufacturer.id, helmet.id).await;
    let second = quick_item(&ctx, "Helmet B", manufacturer.id, helmet.id).await;
    // Outro tipo e outro fabricante recomeçam do 1
    let pads_item = quick_item(&ctx, "Pads A", manufacturer.id, pads.id).await;
    let other_item = quick_item(&ctx, "Helmet C", other.id, helmet.id).await;

    assert_eq!(first.identifier, "0001-0001-00001");
    assert_eq!(second.identifier, "0001-0001-00002");
    assert_eq!(pads_item.identifier, "0001-0002-00001");
    assert_eq!(other_item.identifier, "0002-0001-00001");
}

#[tokio::test]
async fn supplied_identifier_reserves_the_serial() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;

    let input = |identifier: Option<&str>| NewItemInput {
        title: "Helmet".to_string(),
        manufacturer_id: manufacturer.id,
        equipment_type_id: equipment_type.id,
        identifier: identifier.map(str::to_string),
        size: None,
        condition: None,
        location_id: None,
        metadata: None,
        notes: None,
    };

    let supplied = ctx
        .equipment
        .create_item(&ctx.pool, ctx.admin.id, input(Some("0001-0001-00042")))
        .await
        .expect("supplied identifier");
    assert_eq!(supplied.serial_no, 42);

    // O próximo sequencial automático continua depois do maior em uso
    let next = ctx
        .equipment
        .create_item(&ctx.pool, ctx.admin.id, input(None))
        .await
        .expect("auto identifier");
    assert_eq!(next.identifier, "0001-0001-00043");

    // Identificador repetido é rejeitado com conflito
    let duplicate = ctx
        .equipment
        .create_item(&ctx.pool, ctx.admin.id, input(Some("0001-0001-00042")))
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // Códigos que não batem com o catálogo são rejeitados
    let mismatched = ctx
        .equipment
        .create_item(&ctx.pool, ctx.admin.id, input(Some("0002-0001-00099")))
        .await;
    assert!(matches!(mismatched, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn items_resolve_by_id_or_identifier() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;
    let item = quick_item(&ctx, "Helmet", manufacturer.id, equipment_type.id).await;

    let by_id = ctx.equipment.get_item(&item.id.to_string()).await.expect("by id");
    let by_identifier = ctx.equipment.get_item(&item.identifier).await.expect("by identifier");
    assert_eq!(by_id.id, item.id);
    assert_eq!(by_identifier.id, item.id);

    let missing = ctx.equipment.get_item("0009-0009-00009").await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn update_writes_a_single_diff_entry() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;
    let item = quick_item(&ctx, "Helmet", manufacturer.id, equipment_type.id).await;

    let updated = ctx
        .equipment
        .update_item(
            &ctx.pool,
            item.id,
            ctx.admin.id,
            ItemUpdate {
                title: Some("Game Helmet".to_string()),
                condition: Some(ItemCondition::NeedsRepair),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.title, "Game Helmet");
    assert_eq!(updated.condition, ItemCondition::NeedsRepair);

    let entries = ctx.history.item_history(item.id).await.expect("history");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, HistoryAction::Updated);
    assert_eq!(entries[1].action, HistoryAction::Created);

    // Uma única entrada carrega o diff dos dois campos
    let diff = entries[0].data.as_object().expect("diff map");
    assert!(diff.contains_key("title"));
    assert!(diff.contains_key("condition"));
    assert_eq!(diff["title"]["old"], "Helmet");
    assert_eq!(diff["title"]["new"], "Game Helmet");

    // Atualização sem mudança não gera entrada nova
    ctx.equipment
        .update_item(
            &ctx.pool,
            item.id,
            ctx.admin.id,
            ItemUpdate { title: Some("Game Helmet".to_string()), ..Default::default() },
        )
        .await
        .expect("no-op update");
    let entries = ctx.history.item_history(item.id).await.expect("history after no-op");
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn delete_purges_ledger_and_history() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;
    let item = quick_item(&ctx, "Helmet", manufacturer.id, equipment_type.id).await;
    let player = member_user(&ctx, "player@club.test", "Player").await;

    ctx.assignments
        .assign(&ctx.pool, item.id, Assignee::Individual(player.id), ctx.admin.id)
        .await
        .expect("assign");

    ctx.equipment.delete_item(&ctx.pool, item.id, ctx.admin.id).await.expect("delete");

    let missing = ctx.equipment.get_item_by_id(item.id).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let assignments: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM assignments WHERE item_id = ?")
            .bind(item.id)
            .fetch_one(&ctx.pool)
            .await
            .expect("assignment count");
    let history: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM item_history WHERE item_id = ?")
        .bind(item.id)
        .fetch_one(&ctx.pool)
        .await
        .expect("history count");
    assert_eq!(assignments, 0);
    assert_eq!(history, 0);
}

#[tokio::test]
async fn referenced_catalog_entries_cannot_be_deleted() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;
    let item = quick_item(&ctx, "Helmet", manufacturer.id, equipment_type.id).await;

    let blocked = ctx.equipment.delete_manufacturer(manufacturer.id).await;
    assert!(matches!(blocked, Err(AppError::Conflict(_))));
    let blocked = ctx.equipment.delete_type(equipment_type.id).await;
    assert!(matches!(blocked, Err(AppError::Conflict(_))));

    ctx.equipment.delete_item(&ctx.pool, item.id, ctx.admin.id).await.expect("delete item");
    ctx.equipment.delete_manufacturer(manufacturer.id).await.expect("delete manufacturer");
    ctx.equipment.delete_type(equipment_type.id).await.expect("delete type");
}

#[tokio::test]
async fn search_matches_text_and_filters() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;

    quick_item(&ctx, "Game Helmet", manufacturer.id, equipment_type.id).await;
    let spare = ctx
        .equipment
        .create_item(
            &ctx.pool,
            ctx.admin.id,
            NewItemInput {
                title: "Practice Helmet".to_string(),
                manufacturer_id: manufacturer.id,
                equipment_type_id: equipment_type.id,
                identifier: None,
                size: Some("L".to_string()),
                condition: Some(ItemCondition::NeedsRepair),
                location_id: None,
                metadata: None,
                notes: Some("goalie spare".to_string()),
            },
        )
        .await
        .expect("item with notes");

    let filters = |text: Option<&str>, condition: Option<ItemCondition>| ItemSearchFilters {
        text: text.map(str::to_string),
        manufacturer_id: None,
        equipment_type_id: None,
        condition,
        location_id: None,
        limit: 0,
        offset: 0,
    };

    let by_notes = ctx.equipment.search_items(filters(Some("goalie"), None)).await.expect("search");
    assert_eq!(by_notes.len(), 1);
    assert_eq!(by_notes[0].id, spare.id);

    let by_identifier = ctx
        .equipment
        .search_items(filters(Some(&spare.identifier), None))
        .await
        .expect("search by identifier");
    assert_eq!(by_identifier.len(), 1);

    let damaged = ctx
        .equipment
        .search_items(filters(None, Some(ItemCondition::NeedsRepair)))
        .await
        .expect("search by condition");
    assert_eq!(damaged.len(), 1);
    assert_eq!(damaged[0].id, spare.id);

    let everything = ctx.equipment.search_items(filters(None, None)).await.expect("unfiltered");
    assert_eq!(everything.len(), 2);
}
