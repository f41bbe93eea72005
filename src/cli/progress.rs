//! Progress bar fed by session events.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::services::SessionEvent;

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg:<14} [{bar:30.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// Drain session events into a progress bar until the session is dropped.
///
/// With `visible` false events are still drained but nothing is drawn.
pub fn spawn_progress(
    mut rx: mpsc::UnboundedReceiver<SessionEvent>,
    visible: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut bar: Option<ProgressBar> = None;

        while let Some(event) = rx.recv().await {
            match event {
                SessionEvent::IdentifyStarted { total } => {
                    bar = Some(new_bar(total, "Identifying", visible));
                }
                SessionEvent::AnalysisStarted { total } => {
                    if let Some(old) = bar.take() {
                        old.finish_and_clear();
                    }
                    bar = Some(new_bar(total, "Analyzing", visible));
                }
                SessionEvent::Identified { .. } | SessionEvent::Analyzed { .. } => {
                    if let Some(pb) = &bar {
                        pb.inc(1);
                    }
                }
                SessionEvent::IdentifyFailed { url, kind, error } => {
                    report(bar.as_ref(), visible, &format!("{url}: {kind:?}: {error}"));
                    if let Some(pb) = &bar {
                        pb.inc(1);
                    }
                }
                SessionEvent::AnalysisFailed { id, kind, error } => {
                    report(bar.as_ref(), visible, &format!("{id}: {kind:?}: {error}"));
                    if let Some(pb) = &bar {
                        pb.inc(1);
                    }
                }
                SessionEvent::Summarized { .. } => {}
                SessionEvent::SummarizeFailed { kind, error } => {
                    report(bar.as_ref(), visible, &format!("summarize: {kind:?}: {error}"));
                }
            }
        }

        if let Some(pb) = bar {
            pb.finish_and_clear();
        }
    })
}

fn new_bar(total: usize, message: &'static str, visible: bool) -> ProgressBar {
    let pb = if visible {
        ProgressBar::new(total as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(bar_style());
    pb.set_message(message);
    pb
}

fn report(bar: Option<&ProgressBar>, visible: bool, line: &str) {
    if !visible {
        return;
    }
    let line = format!("{} {}", style("✗").red(), line);
    match bar {
        Some(pb) => pb.println(line),
        None => eprintln!("{line}"),
    }
}
