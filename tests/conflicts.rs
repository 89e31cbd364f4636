// tests/conflicts.rs

mod common;

use backend_clubgear::models::assignment::{AlertKind, Assignee, AssigneeKind};
use backend_clubgear::models::equipment::ItemCondition;
use backend_clubgear::services::equipment_service::ItemUpdate;
use chrono::{Duration, Utc};

use common::{member_user, quick_item, seed_catalog, setup};

#[tokio::test]
async fn duplicate_types_flagged_for_individuals_only() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;
    let player = member_user(&ctx, "player@club.test", "Player").await;
    let team = ctx.directory.create_team("Juniors").await.expect("team");

    let first = quick_item(&ctx, "Game Helmet", manufacturer.id, equipment_type.id).await;
    let second = quick_item(&ctx, "Practice Helmet", manufacturer.id, equipment_type.id).await;
    for item in [&first, &second] {
        ctx.assignments
            .assign(&ctx.pool, item.id, Assignee::Individual(player.id), ctx.admin.id)
            .await
            .expect("assign to player");
    }

    let report = ctx
        .conflicts
        .check_assignment_conflicts(Assignee::Individual(player.id), &[])
        .await
        .expect("individual report");
    assert_eq!(report.existing_assignments, 2);
    assert_eq!(report.duplicate_types.len(), 1);
    assert_eq!(report.duplicate_types[0].equipment_type_id, equipment_type.id);
    assert_eq!(report.duplicate_types[0].equipment_type_name, "Helmet");
    assert_eq!(report.duplicate_types[0].count, 2);
    assert!(!report.has_errors());

    // Um time com dois capacetes é estoque normal, não duplicata.
    let third = quick_item(&ctx, "Team Helmet A", manufacturer.id, equipment_type.id).await;
    let fourth = quick_item(&ctx, "Team Helmet B", manufacturer.id, equipment_type.id).await;
    for item in [&third, &fourth] {
        ctx.assignments
            .assign(&ctx.pool, item.id, Assignee::Team(team.id), ctx.admin.id)
            .await
            .expect("assign to team");
    }

    let report = ctx
        .conflicts
        .check_assignment_conflicts(Assignee::Team(team.id), &[])
        .await
        .expect("team report");
    assert_eq!(report.existing_assignments, 2);
    assert!(report.duplicate_types.is_empty());
}

#[tokio::test]
async fn damaged_equipment_is_an_error_level_conflict() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;
    let player = member_user(&ctx, "player@club.test", "Player").await;
    let item = quick_item(&ctx, "Cracked Helmet", manufacturer.id, equipment_type.id).await;

    ctx.assignments
        .assign(&ctx.pool, item.id, Assignee::Individual(player.id), ctx.admin.id)
        .await
        .expect("assign");
    ctx.equipment
        .update_item(
            &ctx.pool,
            item.id,
            ctx.admin.id,
            ItemUpdate { condition: Some(ItemCondition::NeedsRepair), ..Default::default() },
        )
        .await
        .expect("mark damaged");

    let report = ctx
        .conflicts
        .check_assignment_conflicts(Assignee::Individual(player.id), &[])
        .await
        .expect("report");
    assert_eq!(report.damaged_equipment.len(), 1);
    assert_eq!(report.damaged_equipment[0].item_id, item.id);
    assert_eq!(report.damaged_equipment[0].identifier, item.identifier);
    assert_eq!(report.damaged_equipment[0].condition, ItemCondition::NeedsRepair);
    assert!(report.has_errors());
}

#[tokio::test]
async fn validation_blocks_items_assigned_elsewhere() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;
    let holder = member_user(&ctx, "holder@club.test", "Holder").await;
    let candidate = member_user(&ctx, "candidate@club.test", "Candidate").await;
    let item = quick_item(&ctx, "Helmet", manufacturer.id, equipment_type.id).await;

    ctx.assignments
        .assign(&ctx.pool, item.id, Assignee::Individual(holder.id), ctx.admin.id)
        .await
        .expect("assign to holder");

    let report = ctx
        .conflicts
        .validate_assignment(&[item.id], Assignee::Individual(candidate.id))
        .await
        .expect("validation");
    assert!(!report.valid);
    assert_eq!(
        report.errors,
        vec![format!("Item {} is already actively assigned elsewhere", item.identifier)]
    );
}

#[tokio::test]
async fn reassignment_to_the_same_assignee_is_only_a_warning() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;
    let player = member_user(&ctx, "player@club.test", "Player").await;
    let item = quick_item(&ctx, "Helmet", manufacturer.id, equipment_type.id).await;

    ctx.assignments
        .assign(&ctx.pool, item.id, Assignee::Individual(player.id), ctx.admin.id)
        .await
        .expect("assign");

    let report = ctx
        .conflicts
        .validate_assignment(&[item.id], Assignee::Individual(player.id))
        .await
        .expect("validation");
    assert!(report.valid);
    assert!(report.errors.is_empty());
    assert_eq!(
        report.warnings,
        vec![format!("Item {} is already assigned to this assignee", item.identifier)]
    );
}

#[tokio::test]
async fn validation_reports_missing_items() {
    let ctx = setup().await;
    let player = member_user(&ctx, "player@club.test", "Player").await;

    let report = ctx
        .conflicts
        .validate_assignment(&[9999], Assignee::Individual(player.id))
        .await
        .expect("validation");
    assert!(!report.valid);
    assert_eq!(report.errors, vec!["Equipment item not found: 9999".to_string()]);
}

#[tokio::test]
async fn system_alerts_cover_conditions_and_low_stock() {
    let ctx = setup().await;
    let (manufacturer, helmet_type) = seed_catalog(&ctx).await;
    let pads_type = ctx.equipment.create_type("Shoulder Pads", None).await.expect("type");
    let player = member_user(&ctx, "player@club.test", "Player").await;

    // Atribuição ativa com mais de 180 dias.
    let overdue_item = quick_item(&ctx, "Old Helmet", manufacturer.id, helmet_type.id).await;
    ctx.assignment_repo
        .insert(
            &ctx.pool,
            overdue_item.id,
            AssigneeKind::Individual,
            player.id,
            ctx.admin.id,
            Utc::now() - Duration::days(200),
        )
        .await
        .expect("backdated assignment");

    let repair_item = quick_item(&ctx, "Dented Helmet", manufacturer.id, helmet_type.id).await;
    ctx.equipment
        .update_item(
            &ctx.pool,
            repair_item.id,
            ctx.admin.id,
            ItemUpdate { condition: Some(ItemCondition::NeedsRepair), ..Default::default() },
        )
        .await
        .expect("needs repair");

    let lost_item = quick_item(&ctx, "Missing Helmet", manufacturer.id, helmet_type.id).await;
    ctx.equipment
        .update_item(
            &ctx.pool,
            lost_item.id,
            ctx.admin.id,
            ItemUpdate { condition: Some(ItemCondition::ReportedLost), ..Default::default() },
        )
        .await
        .expect("reported lost");

    // Capacetes: 3 unidades, 1 ativa = 2 livres (sem alerta de estoque).
    // Ombreiras: 1 unidade, 1 ativa = 0 livres.
    let pads = quick_item(&ctx, "Shoulder Pads", manufacturer.id, pads_type.id).await;
    ctx.assignments
        .assign(&ctx.pool, pads.id, Assignee::Individual(player.id), ctx.admin.id)
        .await
        .expect("assign pads");

    let alerts = ctx.conflicts.system_alerts().await.expect("alerts");
    assert_eq!(alerts.len(), 4);

    let overdue = alerts
        .iter()
        .find(|a| a.kind == AlertKind::OverdueAssignment)
        .expect("overdue alert");
    assert_eq!(overdue.item_id, Some(overdue_item.id));

    let repair = alerts
        .iter()
        .find(|a| a.kind == AlertKind::NeedsRepair)
        .expect("repair alert");
    assert_eq!(repair.item_id, Some(repair_item.id));

    let lost = alerts
        .iter()
        .find(|a| a.kind == AlertKind::ReportedLost)
        .expect("lost alert");
    assert_eq!(lost.item_id, Some(lost_item.id));

    let low_stock = alerts
        .iter()
        .find(|a| a.kind == AlertKind::LowStock)
        .expect("low stock alert");
    assert_eq!(low_stock.equipment_type_id, Some(pads_type.id));
    assert!(low_stock.message.contains("Only 0 unassigned units"));
}
