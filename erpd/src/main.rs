use std::fs::File;

use erp_axum::{router, start_server};
use erp_sqlite::Db;
use erpd::{
    AppConfig, AuthConfig, Cli,
    impls::{ErpApp, LogMailer},
};
use jwt_simple::prelude::HS256Key;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::import()?;
    let key = HS256Key::from_bytes(cli.secret.as_bytes());

    let AppConfig {
        server,
        database,
        auth: AuthConfig { token_lifetime },
    } = AppConfig::load(&cli)?;

    let db = Db::open(&database).await?;
    let app = ErpApp {
        db,
        key,
        token_lifetime,
        mailer: LogMailer,
    };

    // If requested, dump the schema and exit.
    if let Some(path) = cli.schema {
        let schema = router(app, server).1;
        serde_json::to_writer_pretty(File::create(path)?, &schema)?;
        return Ok(());
    }

    start_server(server, app).await?;
    Ok(())
}
