use serde::Serialize;
use volscan_core::{ProviderId, SessionSnapshot};

use crate::cli::{Cli, SessionArgs};
use crate::error::CliError;

use super::{resolve_now, CommandResult, CommandView};

#[derive(Debug, Serialize)]
struct SessionResponseData {
    #[serde(flatten)]
    snapshot: SessionSnapshot,
    open: String,
    length_minutes: u32,
    market_open: bool,
}

pub fn run(cli: &Cli, args: &SessionArgs) -> Result<CommandResult, CliError> {
    let session = cli.session()?;
    let now = resolve_now(args.at.as_deref())?;
    let snapshot = session.snapshot(now);

    let data = SessionResponseData {
        market_open: snapshot.phase.is_open(),
        snapshot,
        open: session.open().format("%H:%M").to_string(),
        length_minutes: session.length_minutes(),
    };

    Ok(CommandResult::ok(
        CommandView::Record(serde_json::to_value(&data)?),
        vec![ProviderId::Local],
    ))
}
