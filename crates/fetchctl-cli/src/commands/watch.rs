//! Live torrent list driven by the polling reconciler.

use std::future::{Future, pending};
use std::io::{self, Write};

use anyhow::anyhow;
use fetchctl_panel::{ControlPanel, ListView};
use tracing::warn;

use crate::cli::WatchArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{table_header, watch_row};

pub(crate) async fn handle_watch(ctx: &AppContext, args: WatchArgs) -> CliResult<()> {
    let panel = ControlPanel::mount(&ctx.config, ctx.api());
    let mut stdout = io::stdout();
    let result = follow(&panel, args.updates, &mut stdout, shutdown_signal()).await;
    panel.teardown();
    result
}

/// Print every loaded list view until `shutdown` resolves or `limit` views
/// have been shown.
async fn follow<W, S>(
    panel: &ControlPanel,
    limit: Option<usize>,
    out: &mut W,
    shutdown: S,
) -> CliResult<()>
where
    W: Write,
    S: Future<Output = ()>,
{
    let mut views = panel.list().subscribe();
    views.mark_changed();
    let mut shown = 0_usize;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => break,
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if !view.loaded {
                    continue;
                }
                write_view(out, &view)
                    .map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))?;
                shown += 1;
                if limit.is_some_and(|limit| shown >= limit) {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn write_view<W: Write>(out: &mut W, view: &ListView) -> io::Result<()> {
    writeln!(out, "  {}", table_header())?;
    for row in &view.items {
        writeln!(out, "{}", watch_row(row))?;
    }
    if view.items.is_empty() {
        writeln!(out, "  (no torrents)")?;
    }
    writeln!(
        out,
        "-- next poll in {}s\n",
        view.next_interval.as_secs_f64()
    )?;
    out.flush()
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "ctrl-c handler unavailable; use --updates to bound the watch");
        pending::<()>().await;
    }
}
