use std::{future::IntoFuture, process, sync::Arc};

use apalis::{
    layers::WorkerBuilderExt,
    prelude::{Monitor, WorkerBuilder, WorkerFactoryFn},
};
use apalis_sql::{Config as ApalisSqlConfig, postgres::PostgresStorage};
use menu_catalog::{
    application::{
        catalog::CatalogService,
        error::AppError,
        jobs::{ReportWorkerContext, process_menu_report_job},
        report::ReportService,
        seed::load_seed_file,
    },
    cache::{CacheConfig, CacheStore, MemoryCache, NoopCache, RedisCache, SnapshotCache},
    config,
    domain::types::JobType,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        reports::ReportStorage,
        telemetry,
    },
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
        config::Command::Seed(_) => run_seed(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let (http_repositories, job_repositories) = init_repositories(&settings).await?;
    let app = build_application_context(http_repositories, &settings).await?;

    let worker_context = ReportWorkerContext {
        reports: job_repositories.clone(),
        storage: app.storage.clone(),
    };
    let monitor_handle = spawn_job_monitor(job_repositories, worker_context, &settings.reports);

    let state = ApiState {
        catalog: app.catalog,
        reports: app.reports,
        seed_file: Arc::new(settings.seed.file.clone()),
        download_name: Arc::from(settings.reports.download_name.as_str()),
    };
    let result = serve_http(&settings, state).await;

    monitor_handle.abort();
    result
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let database_url = database_url(&settings)?;
    let pool = PostgresRepositories::connect(database_url, 1)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!("migrations applied");
    Ok(())
}

async fn run_seed(settings: config::Settings) -> Result<(), AppError> {
    let (repositories, _) = init_repositories(&settings).await?;
    let app = build_application_context(repositories, &settings).await?;
    let summary = load_seed_file(&app.catalog, &settings.seed.file).await?;
    println!(
        "Seeded {} menus, {} submenus and {} dishes from {}",
        summary.menus,
        summary.submenus,
        summary.dishes,
        settings.seed.file.display()
    );
    Ok(())
}

fn database_url(settings: &config::Settings) -> Result<&str, AppError> {
    settings
        .database
        .url
        .as_deref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<(Arc<PostgresRepositories>, Arc<PostgresRepositories>), AppError> {
    let database_url = database_url(settings)?;

    let http_pool =
        PostgresRepositories::connect(database_url, settings.database.http_max_connections.get())
            .await
            .map_err(|err| AppError::from(InfraError::from(err)))?;

    PostgresRepositories::run_migrations(&http_pool)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    let jobs_pool =
        PostgresRepositories::connect(database_url, settings.database.jobs_max_connections.get())
            .await
            .map_err(|err| AppError::from(InfraError::from(err)))?;

    let http_repositories = PostgresRepositories::new(http_pool);
    http_repositories
        .health_check()
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    Ok((
        Arc::new(http_repositories),
        Arc::new(PostgresRepositories::new(jobs_pool)),
    ))
}

struct ApplicationContext {
    catalog: Arc<CatalogService>,
    reports: Arc<ReportService>,
    storage: Arc<ReportStorage>,
}

async fn build_application_context(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<ApplicationContext, AppError> {
    let store = build_cache_store(&settings.cache).await;
    let cache = SnapshotCache::new(store, CacheConfig::from(&settings.cache));
    let store_timeout = settings.database.store_timeout;

    let catalog = Arc::new(CatalogService::new(
        repositories.clone(),
        repositories.clone(),
        repositories.clone(),
        cache,
        store_timeout,
    ));

    let storage = Arc::new(
        ReportStorage::new(settings.reports.directory.clone())
            .map_err(|err| AppError::from(InfraError::from(err)))?,
    );
    let reports = Arc::new(ReportService::new(
        repositories.clone(),
        repositories.clone(),
        repositories,
        storage.clone(),
        store_timeout,
    ));

    Ok(ApplicationContext {
        catalog,
        reports,
        storage,
    })
}

async fn build_cache_store(settings: &config::CacheSettings) -> Arc<dyn CacheStore> {
    match settings.backend {
        config::CacheBackend::Memory => Arc::new(MemoryCache::new(&CacheConfig::from(settings))),
        config::CacheBackend::Redis => match RedisCache::connect(&settings.url).await {
            Ok(cache) => Arc::new(cache),
            Err(err) => {
                warn!(
                    target = "menu_catalog::cache",
                    url = %settings.url,
                    error = %err,
                    "cache backend unavailable, serving every read from the store"
                );
                Arc::new(NoopCache)
            }
        },
    }
}

fn spawn_job_monitor(
    repositories: Arc<PostgresRepositories>,
    context: ReportWorkerContext,
    reports: &config::ReportSettings,
) -> tokio::task::JoinHandle<()> {
    let export_storage = PostgresStorage::new_with_config(
        repositories.pool().clone(),
        ApalisSqlConfig::new(JobType::ExportMenuReport.as_str()),
    );

    let export_worker = WorkerBuilder::new("export-menu-report-worker")
        .concurrency(reports.worker_concurrency.get() as usize)
        .data(context)
        .backend(export_storage)
        .build_fn(process_menu_report_job);

    let monitor = Monitor::new().register(export_worker);

    tokio::spawn(async move {
        if let Err(err) = monitor.run().await {
            error!(error = %err, "job monitor stopped");
        }
    })
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, "listening");

    let shutdown = Arc::new(Notify::new());
    let signal = {
        let shutdown = shutdown.clone();
        async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(error = %err, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown requested");
            shutdown.notify_one();
        }
    };

    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(signal)
        .into_future();
    let grace = settings.server.graceful_shutdown;
    let drain_deadline = async move {
        shutdown.notified().await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))
        }
        _ = drain_deadline => {
            warn!(grace_seconds = grace.as_secs(), "in-flight requests did not drain in time");
            Ok(())
        }
    }
}
