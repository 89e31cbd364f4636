// src/services/report_service.rs

use chrono::Utc;
use genpdf::{elements, style, Element};

use crate::common::error::AppError;
use crate::db::equipment_repo::EquipmentRepository;
use crate::models::equipment::ItemCondition;

fn condition_label(condition: &ItemCondition) -> &'static str {
    match condition {
        ItemCondition::Normal => "Normal",
        ItemCondition::NeedsRepair => "Needs repair",
        ItemCondition::Repaired => "Repaired",
        ItemCondition::ReportedLost => "Reported lost",
        ItemCondition::Scrapped => "Scrapped",
    }
}

#[derive(Clone)]
pub struct ReportService {
    equipment_repo: EquipmentRepository,
}

impl ReportService {
    pub fn new(equipment_repo: EquipmentRepository) -> Self {
        Self { equipment_repo }
    }

    // Gera o resumo do estoque em PDF, agrupado por tipo e condição.
    pub async fn equipment_summary_pdf(&self) -> Result<Vec<u8>, AppError> {
        // 1. Busca os dados agregados.
        let counts = self.equipment_repo.counts_by_type_and_condition().await?;
        let total_items = self.equipment_repo.count_items().await?;

        // 2. Carrega a fonte. O diretório ./fonts precisa existir no deploy.
        let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
            .map_err(|_| AppError::FontNotFound("Font 'Roboto' not found in ./fonts".to_string()))?;

        // 3. Cria o documento.
        let mut doc = genpdf::Document::new(font_family);
        doc.set_title("Equipment Summary");

        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // 4. Cabeçalho.
        doc.push(
            elements::Paragraph::new("Equipment Summary")
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Break::new(0.5));
        doc.push(elements::Paragraph::new(format!(
            "Generated: {}",
            Utc::now().format("%Y-%m-%d %H:%M UTC")
        )));
        doc.push(elements::Break::new(1.5));

        // 5. Tabela de contagens.
        let mut table = elements::TableLayout::new(vec![4, 3, 1]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        table
            .row()
            .element(
                elements::Paragraph::new("Type")
                    .styled(style::Style::new().bold())
                    .padded(1),
            )
            .element(
                elements::Paragraph::new("Condition")
                    .styled(style::Style::new().bold())
                    .padded(1),
            )
            .element(
                elements::Paragraph::new("Count")
                    .styled(style::Style::new().bold())
                    .padded(1),
            )
            .push()
            .expect("Table error");

        for row in &counts {
            table
                .row()
                .element(elements::Paragraph::new(row.type_name.clone()).padded(1))
                .element(elements::Paragraph::new(condition_label(&row.condition)).padded(1))
                .element(elements::Paragraph::new(row.count.to_string()).padded(1))
                .push()
                .expect("Table error");
        }

        doc.push(table);
        doc.push(elements::Break::new(1.5));

        doc.push(
            elements::Paragraph::new(format!("Total items: {}", total_items))
                .aligned(genpdf::Alignment::Right)
                .styled(style::Style::new().bold()),
        );

        // 6. Renderiza em memória.
        let mut buffer: Vec<u8> = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        Ok(buffer)
    }
}
