// src/services/conflict_service.rs

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{assignment_repo::ActiveItemRow, AssignmentRepository, EquipmentRepository},
    models::{
        assignment::{
            AlertKind, Assignee, AssigneeKind, ConflictReport, DamagedItemEntry,
            DuplicateTypeEntry, SystemAlert, ValidationReport,
        },
        equipment::ItemCondition,
    },
};

// Atribuições ativas além deste prazo entram no alerta de atraso.
const OVERDUE_AFTER_DAYS: i64 = 180;
// Mínimo de unidades livres por tipo antes do alerta de estoque.
const LOW_STOCK_MINIMUM: i64 = 2;

#[derive(Clone)]
pub struct ConflictService {
    assignment_repo: AssignmentRepository,
    equipment_repo: EquipmentRepository,
    default_storage_location_id: i64,
    pool: SqlitePool,
}

impl ConflictService {
    pub fn new(
        assignment_repo: AssignmentRepository,
        equipment_repo: EquipmentRepository,
        default_storage_location_id: i64,
        pool: SqlitePool,
    ) -> Self {
        Self { assignment_repo, equipment_repo, default_storage_location_id, pool }
    }

    fn resolve_assignee_id(&self, assignee: Assignee) -> i64 {
        match assignee {
            Assignee::Club => self.default_storage_location_id,
            Assignee::Team(id) | Assignee::Individual(id) => id,
        }
    }

    // --- CONFLICT REPORT ---
    // Varredura somente-leitura sobre o ledger, com severidades
    // independentes: contagem (info), tipos duplicados (warning, só
    // para indivíduos) e equipamento danificado (error).
    pub async fn check_assignment_conflicts(
        &self,
        assignee: Assignee,
        exclude_item_ids: &[i64],
    ) -> Result<ConflictReport, AppError> {
        let assignee_id = self.resolve_assignee_id(assignee);
        let rows: Vec<ActiveItemRow> = self
            .assignment_repo
            .active_items_for_assignee(assignee.kind(), assignee_id)
            .await?
            .into_iter()
            .filter(|r| !exclude_item_ids.contains(&r.item_id))
            .collect();

        let duplicate_types = if assignee.kind() == AssigneeKind::Individual {
            duplicate_type_entries(&rows)
        } else {
            Vec::new()
        };

        let damaged_equipment = rows
            .iter()
            .filter(|r| r.condition.is_damaged())
            .map(|r| DamagedItemEntry {
                item_id: r.item_id,
                identifier: r.identifier.clone(),
                title: r.title.clone(),
                condition: r.condition,
            })
            .collect();

        Ok(ConflictReport {
            existing_assignments: rows.len() as i64,
            duplicate_types,
            damaged_equipment,
        })
    }

    // --- PRE-FLIGHT VALIDATION ---
    // Erros bloqueiam (item inexistente, item ativo em outro lugar);
    // warnings vêm do relatório de conflitos e são consultivos.
    pub async fn validate_assignment(
        &self,
        item_ids: &[i64],
        assignee: Assignee,
    ) -> Result<ValidationReport, AppError> {
        let assignee_id = self.resolve_assignee_id(assignee);
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for &item_id in item_ids {
            let item = self.equipment_repo.find_item_by_id(&self.pool, item_id).await?;
            let Some(item) = item else {
                errors.push(format!("Equipment item not found: {}", item_id));
                continue;
            };

            if let Some(active) =
                self.assignment_repo.active_for_item(&self.pool, item_id).await?
            {
                if active.assignee_kind == assignee.kind() && active.assignee_id == assignee_id {
                    warnings.push(format!(
                        "Item {} is already assigned to this assignee",
                        item.identifier
                    ));
                } else {
                    errors.push(format!(
                        "Item {} is already actively assigned elsewhere",
                        item.identifier
                    ));
                }
            }
        }

        let report = self.check_assignment_conflicts(assignee, item_ids).await?;
        for dup in &report.duplicate_types {
            warnings.push(format!(
                "Assignee already holds {} items of type {}",
                dup.count, dup.equipment_type_name
            ));
        }
        for damaged in &report.damaged_equipment {
            warnings.push(format!(
                "Assignee holds damaged item {} ({})",
                damaged.identifier, damaged.title
            ));
        }

        Ok(ValidationReport { valid: errors.is_empty(), errors, warnings })
    }

    // --- DASHBOARD ALERTS ---
    pub async fn system_alerts(&self) -> Result<Vec<SystemAlert>, AppError> {
        let mut alerts = Vec::new();

        let cutoff = Utc::now() - Duration::days(OVERDUE_AFTER_DAYS);
        for row in self.assignment_repo.overdue_active(cutoff).await? {
            alerts.push(SystemAlert {
                kind: AlertKind::OverdueAssignment,
                message: format!(
                    "Item {} ({}) has been assigned since {}",
                    row.identifier,
                    row.title,
                    row.assigned_at.format("%Y-%m-%d")
                ),
                item_id: Some(row.item_id),
                equipment_type_id: None,
            });
        }

        for row in self
            .assignment_repo
            .items_in_condition(ItemCondition::NeedsRepair)
            .await?
        {
            alerts.push(SystemAlert {
                kind: AlertKind::NeedsRepair,
                message: format!("Item {} ({}) needs repair", row.identifier, row.title),
                item_id: Some(row.item_id),
                equipment_type_id: None,
            });
        }

        for row in self
            .assignment_repo
            .items_in_condition(ItemCondition::ReportedLost)
            .await?
        {
            alerts.push(SystemAlert {
                kind: AlertKind::ReportedLost,
                message: format!("Item {} ({}) was reported lost", row.identifier, row.title),
                item_id: Some(row.item_id),
                equipment_type_id: None,
            });
        }

        for row in self.assignment_repo.low_stock_types(LOW_STOCK_MINIMUM).await? {
            alerts.push(SystemAlert {
                kind: AlertKind::LowStock,
                message: format!(
                    "Only {} unassigned units of {} remain",
                    row.unassigned_count, row.type_name
                ),
                item_id: None,
                equipment_type_id: Some(row.equipment_type_id),
            });
        }

        Ok(alerts)
    }
}

// Agrupa itens ativos por tipo; grupos com mais de um item indicam
// duplicata (ex.: dois capacetes para o mesmo jogador).
fn duplicate_type_entries(rows: &[ActiveItemRow]) -> Vec<DuplicateTypeEntry> {
    let mut counts: BTreeMap<i64, (String, i64)> = BTreeMap::new();
    for row in rows {
        let entry = counts
            .entry(row.equipment_type_id)
            .or_insert_with(|| (row.type_name.clone(), 0));
        entry.1 += 1;
    }
    counts
        .into_iter()
        .filter(|(_, (_, count))| *count > 1)
        .map(|(equipment_type_id, (equipment_type_name, count))| DuplicateTypeEntry {
            equipment_type_id,
            equipment_type_name,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::duplicate_type_entries;
    use crate::db::assignment_repo::ActiveItemRow;
    use crate::models::equipment::ItemCondition;

    fn row(item_id: i64, type_id: i64, type_name: &str) -> ActiveItemRow {
        ActiveItemRow {
            item_id,
            identifier: format!("0001-0001-{:05}", item_id),
            title: format!("Item {}", item_id),
            equipment_type_id: type_id,
            type_name: type_name.to_string(),
            condition: ItemCondition::Normal,
        }
    }

    #[test]
    fn flags_only_types_held_more_than_once() {
        let rows = vec![
            row(1, 10, "Helmet"),
            row(2, 10, "Helmet"),
            row(3, 20, "Shoulder Pads"),
        ];
        let dups = duplicate_type_entries(&rows);
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].equipment_type_id, 10);
        assert_eq!(dups[0].equipment_type_name, "Helmet");
        assert_eq!(dups[0].count, 2);
    }

    #[test]
    fn empty_ledger_produces_no_duplicates() {
        assert!(duplicate_type_entries(&[]).is_empty());
    }
}
