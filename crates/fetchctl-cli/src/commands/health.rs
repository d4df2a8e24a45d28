//! Backend probes and deep links.

use fetchctl_config::ResolvedLinks;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::client::{AppContext, CliError, CliResult, classify_api_error};
use crate::output::render_json;

pub(crate) async fn handle_health(ctx: &AppContext) -> CliResult<()> {
    let body = ctx.api().health().await.map_err(classify_api_error)?;
    render_json(&body)
}

pub(crate) async fn handle_ready(ctx: &AppContext) -> CliResult<()> {
    let body = ctx.api().ready().await.map_err(classify_api_error)?;
    render_json(&body)
}

pub(crate) fn handle_links(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let links = resolve_links(ctx)?;
    match format {
        OutputFormat::Json => render_json(&json!({
            "media_server": links.media_server.as_str(),
            "download_manager": links.download_manager.as_str(),
        })),
        OutputFormat::Table => {
            println!("media server      {}", links.media_server);
            println!("download manager  {}", links.download_manager);
            Ok(())
        }
    }
}

fn resolve_links(ctx: &AppContext) -> CliResult<ResolvedLinks> {
    ctx.config
        .links
        .resolve(&ctx.base_url)
        .map_err(|err| CliError::validation(err.to_string()))
}
