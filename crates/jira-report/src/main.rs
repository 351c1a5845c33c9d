mod bootstrap;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use report_core::settings::Settings;
use report_data::ingest::{ingest_file, ReportSnapshot};
use report_data::normalizer::RecordNormalizer;
use report_runtime::server::ReportServer;
use report_ui::console::{render_console, ConsoleOptions};
use report_ui::html::render_html;
use report_ui::json::render_json;
use report_ui::view::ReportView;

/// What a run produced once ingest finished.
#[derive(Debug)]
enum Outcome {
    /// The file parsed but held no tasks.
    NoTasks,
    /// Reports were written; the snapshot is kept for serve mode.
    Reported(ReportSnapshot),
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Jira report v{} starting", env!("CARGO_PKG_VERSION"));

    match run(&settings)? {
        Outcome::NoTasks => println!("No relevant tasks found."),
        Outcome::Reported(snapshot) if settings.serve => serve(&settings, snapshot).await?,
        Outcome::Reported(_) => {}
    }

    Ok(())
}

/// Ingest the selected CSV and write every requested report.
///
/// Ingest completes fully before anything is rendered, so a malformed file
/// never produces partial output.
fn run(settings: &Settings) -> Result<Outcome> {
    let Ok(path) = settings.input_path() else {
        bail!("No file selected.");
    };

    let normalizer = RecordNormalizer::new(settings.issue_base_url.as_str());
    let snapshot = ingest_file(path, &normalizer)
        .with_context(|| format!("Error reading file {}", path.display()))?;

    if snapshot.is_empty() {
        return Ok(Outcome::NoTasks);
    }

    let view = ReportView::build(&snapshot.aggregate)?;
    write_reports(settings, &snapshot, &view)?;
    Ok(Outcome::Reported(snapshot))
}

/// Serve `snapshot` until Ctrl+C.
async fn serve(settings: &Settings, snapshot: ReportSnapshot) -> Result<()> {
    let listener = ReportServer::bind(&settings.bind_address())
        .await
        .with_context(|| format!("cannot bind {}", settings.bind_address()))?;
    let addr = listener.local_addr()?;
    eprintln!("Serving report on http://{addr}/ (Ctrl+C to stop)");

    ReportServer::new(Arc::new(snapshot))
        .serve(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Ctrl+C handler failed: {}", e);
            }
            tracing::info!("Ctrl+C received; stopping server");
        })
        .await?;
    Ok(())
}

/// Console text plus any requested HTML / JSON files.
///
/// `--json -` sends JSON to stdout in place of the console text.
fn write_reports(settings: &Settings, snapshot: &ReportSnapshot, view: &ReportView) -> Result<()> {
    let json_to_stdout = settings.json.as_deref() == Some("-");

    if !json_to_stdout {
        let options = ConsoleOptions {
            assignee_width: usize::from(settings.assignee_width),
        };
        print!("{}", render_console(view, &options));
    }

    if let Some(target) = settings.json.as_deref() {
        let body = render_json(snapshot)?;
        if json_to_stdout {
            println!("{body}");
        } else {
            write_file(Path::new(target), &body)?;
            tracing::info!("JSON report written to {}", target);
        }
    }

    if let Some(target) = settings.html.as_deref() {
        write_file(target, &render_html(view, &snapshot.metadata))?;
        tracing::info!("HTML report written to {}", target.display());
    }

    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("cannot write {}", path.display()))
}
