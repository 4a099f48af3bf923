//! Serve command - HTTP API.

use crate::config::Settings;

/// Run the serve command. `bind` overrides `server.bind`.
#[cfg(feature = "http-server")]
pub async fn run(mut settings: Settings, bind: Option<String>) -> anyhow::Result<()> {
    use std::sync::Arc;

    if let Some(bind) = bind {
        settings.server.bind = bind;
    }
    let bind = settings.server.bind.clone();

    let ctx = crate::context::AppContext::from_settings(settings)?;
    crate::log_event!(
        "serve",
        "ready",
        "{} documents, uploads in {}",
        ctx.store.count()?,
        ctx.ingestor.upload_dir().display()
    );

    crate::http::serve(Arc::new(ctx), &bind).await
}

#[cfg(not(feature = "http-server"))]
pub async fn run(_settings: Settings, _bind: Option<String>) -> anyhow::Result<()> {
    anyhow::bail!(
        "HTTP server support is not compiled in.\nPlease rebuild with: cargo build --features http-server"
    )
}
