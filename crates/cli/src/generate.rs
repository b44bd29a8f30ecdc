//! Live terminal view of one generation run.

use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use timetabler_client::progress::{GenerationHandle, ProgressClient};
use timetabler_core::generation::GenerationSnapshot;
use timetabler_core::types::DbId;

use crate::render;

/// Start generation for `timetable_id` and draw its progress until the run
/// ends. Ctrl-C cancels the run, or cuts short the pause after its outcome.
pub async fn follow(client: &ProgressClient, timetable_id: DbId) -> anyhow::Result<GenerationSnapshot> {
    let style = ProgressStyle::with_template("{spinner:.green} {prefix} {bar:40.cyan/blue} {pos:>3}% {wide_msg}")?
        .progress_chars("=> ");
    let bar = ProgressBar::new(100);
    bar.set_style(style);
    bar.set_prefix(format!("[timetable {timetable_id}]"));
    bar.enable_steady_tick(Duration::from_millis(120));

    let handle = client.start(timetable_id);
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    let snapshot = watch_run(handle, &bar, interrupt).await;

    bar.finish_with_message(render::outcome(&snapshot));
    Ok(snapshot)
}

/// Redraw `bar` on every published snapshot until the run task exits.
///
/// The task keeps the connection open for a while after a terminal event,
/// so `interrupt` is watched for that whole time, not just until the
/// outcome is known.
async fn watch_run(
    handle: GenerationHandle,
    bar: &ProgressBar,
    interrupt: impl Future<Output = ()>,
) -> GenerationSnapshot {
    let mut progress = handle.subscribe();
    tokio::pin!(interrupt);

    loop {
        let snapshot = progress.borrow_and_update().clone();
        draw(bar, &snapshot);

        tokio::select! {
            changed = progress.changed() => {
                // Err once the run task has exited and dropped its sender.
                if changed.is_err() {
                    break;
                }
            }
            _ = &mut interrupt => {
                if snapshot.status.is_terminal() {
                    bar.println("Closing generation connection...");
                } else {
                    bar.println("Cancelling generation...");
                }
                handle.cancel();
                break;
            }
        }
    }

    let snapshot = handle.finished().await;
    draw(bar, &snapshot);
    snapshot
}

fn draw(bar: &ProgressBar, snapshot: &GenerationSnapshot) {
    if let Some(current) = &snapshot.current {
        bar.set_position(current.percentage.round() as u64);
    }
    bar.set_message(render::progress_message(snapshot));
}
