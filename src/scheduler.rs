// src/scheduler.rs

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::AppState;
use crate::models::document::ScrapeTrigger;

// Registra a raspagem diária de documentos no horário configurado e inicia o
// agendador. As tarefas continuam rodando em background após o retorno.
pub async fn start_scheduler(app_state: AppState) -> anyhow::Result<()> {
    let sched = JobScheduler::new().await?;

    let cron = format!(
        "0 {} {} * * *",
        app_state.scraper_config.schedule_minute, app_state.scraper_config.schedule_hour
    );

    let state = app_state.clone();
    sched
        .add(Job::new_async(cron.as_str(), move |_, _| {
            let state = state.clone();

            Box::pin(async move {
                match state.scraper_service.run_scrape(ScrapeTrigger::Scheduled).await {
                    Ok(run) => info!(
                        "✅ Raspagem agendada concluída: {} documento(s) encontrados, {} atualizado(s), {} falha(s)",
                        run.documents_found, run.documents_updated, run.documents_failed
                    ),
                    Err(e) => error!("🚨 Raspagem agendada falhou: {:?}", e),
                }
            })
        })?)
        .await?;

    sched.start().await?;
    info!(
        "🚀 Agendador iniciado: raspagem diária às {:02}:{:02} UTC",
        app_state.scraper_config.schedule_hour, app_state.scraper_config.schedule_minute
    );

    Ok(())
}
