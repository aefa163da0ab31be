//! Serve command handler.

use std::path::PathBuf;

use lostboard::LostboardConfig;

use super::CmdResult;

/// Serve command.
///
/// `port` and `db` override the configured server settings.
pub async fn cmd_serve(config: LostboardConfig, port: Option<u16>, db: Option<PathBuf>) -> CmdResult {
    let mut config = config;
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(db) = db {
        config.server.db_path = Some(db);
    }

    println!(
        "Serving report API on http://{}:{}/api (Ctrl-C to stop)",
        config.server.host, config.server.port
    );
    lostboard::server::serve(&config).await?;
    Ok(())
}
