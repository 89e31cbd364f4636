// tests/analytics.rs

mod common;

use backend_clubgear::models::analytics::ConfidenceLevel;
use backend_clubgear::models::assignment::Assignee;

use common::{member_user, quick_item, seed_catalog, setup};

#[tokio::test]
async fn stock_without_history_recommends_keeping_it() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;
    quick_item(&ctx, "Helmet A", manufacturer.id, equipment_type.id).await;
    quick_item(&ctx, "Helmet B", manufacturer.id, equipment_type.id).await;

    let recommendations =
        ctx.analytics.quantity_recommendations(None).await.expect("recommendations");
    assert_eq!(recommendations.len(), 1);

    let rec = &recommendations[0];
    assert_eq!(rec.equipment_type_id, equipment_type.id);
    assert_eq!(rec.current_stock, 2);
    assert_eq!(rec.active_assignments, 0);
    assert_eq!(rec.base_quantity, 0.0);
    assert_eq!(rec.seasonal_multiplier, 1.0);
    // Sem elenco e sem histórico: elenco padrão.
    assert_eq!(rec.estimated_team_size, 25);
    // Estoque parado não vira recomendação de compra.
    assert_eq!(rec.recommended_quantity, 2);
    assert_eq!(rec.confidence_level, ConfidenceLevel::VeryLow);
}

#[tokio::test]
async fn recommendations_scale_with_observed_usage() {
    let ctx = setup().await;
    let (manufacturer, equipment_type) = seed_catalog(&ctx).await;
    let player = member_user(&ctx, "player@club.test", "Player").await;

    for n in 0..11 {
        let item =
            quick_item(&ctx, &format!("Helmet {}", n), manufacturer.id, equipment_type.id).await;
        ctx.assignments
            .assign(&ctx.pool, item.id, Assignee::Individual(player.id), ctx.admin.id)
            .await
            .expect("assign");
    }

    let recommendations =
        ctx.analytics.quantity_recommendations(None).await.expect("recommendations");
    assert_eq!(recommendations.len(), 1);

    let rec = &recommendations[0];
    assert_eq!(rec.current_stock, 11);
    assert_eq!(rec.active_assignments, 11);
    // Um destinatário distinto por mês fica abaixo do piso de elenco.
    assert_eq!(rec.estimated_team_size, 10);
    // 11 atribuições / 11 itens × 12 meses → base 12.
    assert!((rec.base_quantity - 12.0).abs() < 1e-9);
    assert_eq!(rec.seasonal_multiplier, 1.0);
    // round(12 × 1.2) = 14, acima do estoque atual.
    assert_eq!(rec.recommended_quantity, 14);
    assert_eq!(rec.confidence_level, ConfidenceLevel::Low);
}

#[tokio::test]
async fn recommendations_can_target_a_single_type() {
    let ctx = setup().await;
    let (manufacturer, helmet_type) = seed_catalog(&ctx).await;
    let pads_type = ctx.equipment.create_type("Shoulder Pads", None).await.expect("type");
    quick_item(&ctx, "Helmet", manufacturer.id, helmet_type.id).await;

    let all = ctx.analytics.quantity_recommendations(None).await.expect("all types");
    assert_eq!(all.len(), 2);

    let single = ctx
        .analytics
        .quantity_recommendations(Some(helmet_type.id))
        .await
        .expect("single type");
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].equipment_type_id, helmet_type.id);
    assert_ne!(single[0].equipment_type_id, pads_type.id);
}
