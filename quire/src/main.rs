//! Quire - Render a markdown chapter the way the editor preview shows it

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use quire_core::{Config, PreviewType, ViewFlags};
use quire_preview::{EditorSession, HeadlessHost, LocalTaskQueue, PreviewEngine, SessionEvent};
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

/// Host loop turns before giving up on a render settling
const MAX_TURNS: usize = 64;

/// Render a markdown file through the editor preview pipeline
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the document
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Preview to produce (defaults to the configured view flags)
    #[arg(long, value_enum)]
    view: Option<View>,

    /// Directory holding preview.css, preview.js and the prism files
    #[arg(long, value_name = "DIR")]
    assets: Option<PathBuf>,

    /// Extra CSS to inline into the web preview
    #[arg(long, value_name = "FILE")]
    css: Option<PathBuf>,

    /// Write the preview here instead of stdout
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum View {
    Web,
    Source,
    Ast,
}

impl From<View> for PreviewType {
    fn from(view: View) -> Self {
        match view {
            View::Web => PreviewType::Web,
            View::Source => PreviewType::Source,
            View::Ast => PreviewType::Ast,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    apply_args(&mut config, &args)?;

    let queue = Rc::new(LocalTaskQueue::new());
    let engine = Rc::new(PreviewEngine::new(
        config,
        queue.clone(),
        Rc::new(HeadlessHost::new()),
    ));

    let mut session = engine
        .open(&args.file)
        .with_context(|| format!("Failed to load document: {}", args.file.display()))?;
    session.handle(SessionEvent::Activated)?;
    settle(&mut session, &queue)?;

    let output = match session.preview_text() {
        Some(text) => text,
        None => {
            info!("No preview for {}, printing the document", args.file.display());
            session.with_document(|doc| doc.text())
        }
    };

    match &args.output {
        Some(path) => std::fs::write(path, &output)
            .with_context(|| format!("Failed to write preview: {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .context("Failed to write preview to stdout")?;
            stdout.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}

fn apply_args(config: &mut Config, args: &Args) -> Result<()> {
    if let Some(view) = args.view {
        let flags = ViewFlags::only(view.into());
        config.preview.web = flags.web;
        config.preview.source = flags.source;
        config.preview.ast = flags.ast;
        config.preview.external = flags.external;
    }
    if let Some(dir) = &args.assets {
        config.assets.dir = Some(dir.clone());
    }
    if let Some(css) = &args.css {
        config.preview.additional_css = std::fs::read_to_string(css)
            .with_context(|| format!("Failed to read CSS file: {}", css.display()))?;
    }

    // One-shot render, nothing to watch
    #[cfg(feature = "watch")]
    {
        config.watch.enabled = false;
    }

    Ok(())
}

/// Run the host loop until no events or tasks remain
fn settle(session: &mut EditorSession, queue: &LocalTaskQueue) -> Result<()> {
    for turn in 0..MAX_TURNS {
        let events = session.process_events()?;
        let tasks = queue.run_tick();
        if events == 0 && tasks == 0 {
            debug!("Preview settled after {} turns", turn);
            return Ok(());
        }
    }
    anyhow::bail!("Preview did not settle after {} turns", MAX_TURNS)
}
