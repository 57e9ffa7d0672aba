use liju_backend_rust::config::Config;
use liju_backend_rust::db::Database;
use liju_backend_rust::generation::orchestrator::GenerationService;
use liju_backend_rust::logging;
use liju_backend_rust::services::llm_provider::LLMProvider;
use liju_backend_rust::workers::GenerationScheduler;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log_level);

    let db = match Database::from_env().await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(error = %err, "database not available, exiting");
            std::process::exit(1);
        }
    };

    if let Err(err) = db.migrate().await {
        tracing::error!(error = %err, "migrations failed, exiting");
        std::process::exit(1);
    }

    let oracle = LLMProvider::from_env();
    if !oracle.is_available() {
        tracing::warn!("LLM not configured, generation cycles will fail until LLM_API_KEY is set");
    }

    let service = GenerationService::new(db.clone(), oracle, db.clone());
    let scheduler = GenerationScheduler::new(service, config.generation_schedule.clone());

    if let Err(e) = scheduler.start().await {
        tracing::error!(error = %e, "failed to start generation scheduler");
        std::process::exit(1);
    }

    if config.generate_on_startup {
        if let Err(e) = scheduler.trigger_generation().await {
            tracing::error!(error = %e, "startup generation cycle failed");
        }
    }

    tracing::info!("sentence generation service running");

    shutdown_signal().await;

    tracing::info!("Shutdown signal received, stopping scheduler");
    scheduler.stop().await;
    tracing::info!("Graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
