use std::{future::IntoFuture, process, sync::Arc};

use blogcraft::{
    application::{
        admin::{
            editor::{EditorService, EditorSessions},
            posts::AdminPostService,
        },
        error::AppError,
        feed::FeedService,
        query::QueryCache,
    },
    config,
    domain::slug::derive_slug,
    infra::{
        auth::build_session_provider,
        error::InfraError,
        http::{self, AdminState, AuthState, HttpState, RouterState, SessionCookie},
        store::build_post_store,
        telemetry,
    },
    presentation::views::SiteChrome,
};
use tokio::sync::oneshot;
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
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    match command {
        config::Command::Serve(_) => {
            telemetry::init(&settings.logging)?;
            run_serve(settings).await
        }
        config::Command::Slug(args) => {
            println!("{}", derive_slug(&args.joined()));
            Ok(())
        }
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let router_state = build_router_state(&settings)?;
    serve_http(&settings, router_state).await
}

fn build_router_state(settings: &config::Settings) -> Result<RouterState, AppError> {
    let store = build_post_store(&settings.store)?;
    let provider = build_session_provider(&settings.auth)?;

    let cache = Arc::new(QueryCache::new(settings.cache.enabled, settings.cache.ttl));
    // Idle editors are pruned whenever a new one is opened.
    let sessions = Arc::new(EditorSessions::new(settings.editor.idle_timeout));
    let site = SiteChrome::from(&settings.site);

    let feed = Arc::new(FeedService::new(Arc::clone(&store), Arc::clone(&cache)));
    let posts = Arc::new(AdminPostService::new(Arc::clone(&store), Arc::clone(&cache)));
    let editor = Arc::new(EditorService::new(store, cache, sessions));

    Ok(RouterState {
        http: HttpState {
            feed,
            site: site.clone(),
        },
        admin: AdminState {
            posts,
            editor,
            site: site.clone(),
        },
        auth: AuthState {
            provider,
            cookie: SessionCookie::from(&settings.auth),
            site,
        },
    })
}

async fn serve_http(settings: &config::Settings, state: RouterState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target: "blogcraft::server",
        addr = %settings.server.addr,
        "listening"
    );

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = stop_rx.await;
        })
        .into_future();
    let mut server = tokio::spawn(server);

    tokio::select! {
        joined = &mut server => return flatten_server_result(joined),
        () = shutdown_signal() => {}
    }

    info!(
        target: "blogcraft::server",
        grace_secs = settings.server.graceful_shutdown.as_secs(),
        "shutdown signal received, draining connections"
    );
    let _ = stop_tx.send(());

    match tokio::time::timeout(settings.server.graceful_shutdown, server).await {
        Ok(joined) => flatten_server_result(joined),
        Err(_) => {
            warn!(
                target: "blogcraft::server",
                "graceful shutdown timed out; dropping remaining connections"
            );
            Ok(())
        }
    }
}

fn flatten_server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(AppError::unexpected(format!("server error: {err}"))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target: "blogcraft::server", error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(target: "blogcraft::server", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
