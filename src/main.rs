//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Importações principais
use backend_clubgear::config::AppState;
use backend_clubgear::docs::ApiDoc;
use backend_clubgear::middleware::auth::auth_guard;
use backend_clubgear::{handlers, scheduler};

#[tokio::main]
async fn main() {
    // Inicializa o logger antes de qualquer outra coisa.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    // As migrações e o local de armazenamento padrão são resolvidos dentro de new().
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas do usuário autenticado
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Catálogo: fabricantes e tipos de equipamento
    let catalog_routes = Router::new()
        .route(
            "/manufacturers",
            post(handlers::equipment::create_manufacturer)
                .get(handlers::equipment::list_manufacturers),
        )
        .route(
            "/manufacturers/{id}",
            delete(handlers::equipment::delete_manufacturer),
        )
        .route(
            "/equipment-types",
            post(handlers::equipment::create_equipment_type)
                .get(handlers::equipment::list_equipment_types),
        )
        .route(
            "/equipment-types/{id}",
            delete(handlers::equipment::delete_equipment_type),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Itens de equipamento e tudo que é escopado por item
    let equipment_routes = Router::new()
        .route(
            "/",
            post(handlers::equipment::create_item).get(handlers::equipment::search_items),
        )
        .route("/bulk", post(handlers::assignments::bulk_assign))
        .route(
            "/{id}",
            get(handlers::equipment::get_item)
                .put(handlers::equipment::update_item)
                .delete(handlers::equipment::delete_item),
        )
        .route(
            "/{id}/assignment",
            get(handlers::assignments::get_assignment)
                .post(handlers::assignments::assign_item)
                .delete(handlers::assignments::unassign_item),
        )
        .route(
            "/{id}/assignments",
            get(handlers::assignments::assignment_history),
        )
        .route("/{id}/history", get(handlers::history::item_history))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Ferramentas de empréstimo que não são escopadas por item
    let assignment_routes = Router::new()
        .route(
            "/assignments/conflicts",
            get(handlers::assignments::check_conflicts),
        )
        .route(
            "/assignments/validate",
            post(handlers::assignments::validate_assignment),
        )
        .route("/alerts", get(handlers::assignments::system_alerts))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let location_routes = Router::new()
        .route(
            "/",
            get(handlers::locations::list_locations).post(handlers::locations::create_location),
        )
        .route(
            "/{id}",
            put(handlers::locations::update_location)
                .delete(handlers::locations::delete_location),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let team_routes = Router::new()
        .route(
            "/",
            get(handlers::directory::list_teams).post(handlers::directory::create_team),
        )
        .route("/{id}/members", post(handlers::directory::add_team_member))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let history_routes = Router::new()
        .route("/", get(handlers::history::recent_history))
        .route("/clean", post(handlers::history::clean_history))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let analytics_routes = Router::new()
        .route(
            "/recommendations",
            get(handlers::analytics::quantity_recommendations),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let document_routes = Router::new()
        .route("/", get(handlers::documents::list_documents))
        .route("/runs", get(handlers::documents::list_runs))
        .route("/scrape", post(handlers::documents::trigger_scrape))
        .route("/{id}", get(handlers::documents::get_document))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let report_routes = Router::new()
        .route("/equipment", get(handlers::reports::equipment_report))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/auth", user_routes)
        .nest("/api", catalog_routes)
        .nest("/api/equipment", equipment_routes)
        .nest("/api", assignment_routes)
        .nest("/api/locations", location_routes)
        .nest("/api/teams", team_routes)
        .nest("/api/history", history_routes)
        .nest("/api/analytics", analytics_routes)
        .nest("/api/documents", document_routes)
        .nest("/api/reports", report_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state.clone());

    // Dispara a raspagem diária de documentos, se habilitada.
    if app_state.scraper_config.enabled {
        if let Err(e) = scheduler::start_scheduler(app_state.clone()).await {
            tracing::warn!("⚠️ Falha ao iniciar o agendador de raspagem: {:?}", e);
        }
    } else {
        tracing::info!("⚠️ Agendador de raspagem desabilitado via SCRAPER_ENABLED.");
    }

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
