//! Torrent submission and listing commands.

use anyhow::anyhow;
use fetchctl_config::MotionConfig;
use fetchctl_panel::{SubmissionController, SubmissionForm, SubmitOutcome, TimerRegistry};

use crate::cli::{AddArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult, classify_api_error};
use crate::output::{render_json, render_torrent_list};

pub(crate) async fn handle_add(
    ctx: &AppContext,
    args: AddArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let mut defaults = ctx.config.submission.clone();
    if let Some(mode) = args.url_validation {
        defaults.url_validation = mode;
    }

    let timers = TimerRegistry::new();
    let controller =
        SubmissionController::new(ctx.api(), timers.clone(), MotionConfig::instant(), defaults);
    controller.edit_form(|form| fill_form(form, args));

    let outcome = controller.submit().await;
    let rendered = controller.output().text();
    timers.dispose();

    match outcome {
        SubmitOutcome::Succeeded(body) => match format {
            OutputFormat::Json => render_json(&body),
            OutputFormat::Table => {
                println!("{rendered}");
                Ok(())
            }
        },
        SubmitOutcome::Rejected(err) => Err(CliError::validation(err.to_string())),
        SubmitOutcome::Failed(message) => Err(CliError::failure(anyhow!(message))),
        SubmitOutcome::Ignored | SubmitOutcome::Cancelled => {
            Err(CliError::failure(anyhow!("submission did not complete")))
        }
    }
}

fn fill_form(form: &mut SubmissionForm, args: AddArgs) {
    form.url = args.url;
    if let Some(save_path) = args.save_path {
        form.save_path = save_path;
    }
    if let Some(category) = args.category {
        form.category = category;
    }
    if let Some(tags) = args.tags {
        form.tags = tags;
    }
    form.manage &= !args.no_manage;
    form.notify &= !args.no_notify;
    form.find_subs |= args.find_subs;
}

pub(crate) async fn handle_list(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let list = ctx
        .api()
        .list_torrents()
        .await
        .map_err(classify_api_error)?;
    render_torrent_list(&list, format)
}
