pub mod args;
pub mod output;

use transfer_tray::board::TransferBoard;
use transfer_tray::config::TrayConfig;
use transfer_tray::dispatch;
use transfer_tray::error::TrayError;
use transfer_tray::replay;
use transfer_tray::transfer::{ChangeLog, StaticBackend, TransferFilter, TransferSnapshot};

use self::args::{ReplayArgs, ShowArgs, ViewArg};

/// Replace the configured views with the ones given on the command line.
fn apply_views(config: &mut TrayConfig, views: &[ViewArg]) {
    if !views.is_empty() {
        config.views = views.iter().map(|&v| TransferFilter::from(v)).collect();
    }
}

/// Attach a change recorder to every view of the board.
fn record_changes(board: &mut TransferBoard) -> Vec<(TransferFilter, ChangeLog)> {
    let filters: Vec<TransferFilter> = board.views().iter().map(|v| v.filter()).collect();
    let mut logs = Vec::new();
    for filter in filters {
        if let Some(view) = board.view_mut(filter) {
            let log = ChangeLog::new();
            view.subscribe(log.clone());
            logs.push((filter, log));
        }
    }
    logs
}

fn build_board(snapshot: Vec<TransferSnapshot>, config: &TrayConfig) -> TransferBoard {
    TransferBoard::new(StaticBackend::new(snapshot).handle(), config)
}

/// Entry point for `ttray replay`.
///
/// Loads the optional snapshot and the event log, pushes every event through
/// the dispatcher task, and prints the resulting views.
pub fn execute_replay(args: ReplayArgs, mut config: TrayConfig, quiet: bool) -> Result<(), TrayError> {
    apply_views(&mut config, &args.view);

    let snapshot = match args.snapshot.as_deref() {
        Some(path) => replay::load_snapshot(path)?,
        None => Vec::new(),
    };
    let events = replay::load_events(&args.events)?;

    let mut board = build_board(snapshot, &config);
    let logs = if args.changes {
        record_changes(&mut board)
    } else {
        Vec::new()
    };
    board.load_snapshot();

    tracing::info!(events = events.len(), "replaying transfer events");
    let rt = tokio::runtime::Runtime::new()?;
    let replayed: Result<TransferBoard, TrayError> = rt.block_on(async move {
        let (sender, dispatcher) = dispatch::spawn(board);
        for event in events {
            sender.send(event)?;
        }
        drop(sender);
        dispatcher.join().await
    });
    let board = replayed?;

    output::print_board(&board);
    for (filter, log) in &logs {
        output::print_changes(*filter, &log.take());
    }
    if !quiet {
        eprintln!("{}", board.totals().summary_line());
    }
    Ok(())
}

/// Entry point for `ttray show`.
pub fn execute_show(args: ShowArgs, mut config: TrayConfig, quiet: bool) -> Result<(), TrayError> {
    apply_views(&mut config, &args.view);

    let snapshot = replay::load_snapshot(&args.snapshot)?;
    let mut board = build_board(snapshot, &config);
    board.load_snapshot();

    output::print_board(&board);
    if !quiet {
        eprintln!("{}", board.totals().summary_line());
    }
    Ok(())
}
