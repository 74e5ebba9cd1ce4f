mod commands;
mod error_reporter;
mod file_source;
mod preview_sink;
mod processor;

use crate::{cli::Cli, config};
use anyhow::{Context, Result, anyhow};
use commands::{Command, HELP};
use error_reporter::LogErrorSink;
use file_source::FileCursor;
use image_filter::{ColorRange, ConfigSource, ErrorSink, PreviewSink};
use preview_sink::DirPreviewSink;
use processor::{Processor, SharedConfig, UiBridge, UiEvent};
use std::sync::Arc;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

/// The real collaborators. Only the UI loop touches them.
struct Ui {
    previews: DirPreviewSink,
    errors: LogErrorSink,
}

impl Ui {
    fn handle(&self, event: UiEvent) {
        match event {
            UiEvent::Preview(preview) => self.previews.show(preview),
            UiEvent::Error(kind, message) => self.errors.report(kind, &message),
        }
    }
}

fn apply_cli_overrides(cli: &Cli, config: &mut config::Config) -> Result<()> {
    let filter = &mut config.filter;

    if let Some(mode) = cli.mode {
        filter.mode = mode;
    }
    if let Some(intensity) = cli.intensity {
        filter.grayscale_intensity = intensity;
    }
    if let Some(blur) = cli.blur {
        filter.blur_intensity = blur;
    }
    if let Some(threshold) = cli.threshold {
        filter.edge_threshold = threshold;
    }
    if let Some(color) = &cli.color {
        filter.color = ColorRange::parse_selection(color).map_err(|e| anyhow!(e))?;
    }
    if let Some(output) = &cli.output {
        config.preview.output_dir = output.clone();
    }

    Ok(())
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = config::all();
    apply_cli_overrides(&cli, &mut config)?;

    if cli.save_config {
        config::save(config.clone())?;
        log::info!("settings saved to {}", config.config_path.display());
    }

    let files = file_source::collect(&cli.path)?;
    if files.is_empty() {
        log::warn!("no image found in {}", cli.path.display());
        return Ok(());
    }

    let ui = Ui {
        previews: DirPreviewSink::new(&config.preview)?,
        errors: LogErrorSink::default(),
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let processor = Processor::new(
        Arc::new(UiBridge::new(tx)),
        SharedConfig::new(config.filter.clone()),
    );

    log::info!(
        "mode: {}, previews in {}",
        config.filter.mode,
        ui.previews.dir().display()
    );

    if cli.interactive {
        interactive(&ui, processor, rx, FileCursor::new(files)).await?;
    } else {
        batch(&ui, processor, rx, files).await?;
    }

    log::info!(
        "{} preview(s) shown, {} error(s)",
        ui.previews.shown(),
        ui.errors.count()
    );
    if let Some((kind, message)) = ui.errors.last() {
        log::info!("last error: [{kind}] {message}");
    }

    Ok(())
}

async fn batch(
    ui: &Ui,
    processor: Processor,
    mut rx: mpsc::UnboundedReceiver<UiEvent>,
    files: Vec<std::path::PathBuf>,
) -> Result<()> {
    // the channel closes once the worker task drops the processor
    let worker = tokio::spawn(async move {
        for path in files {
            log::info!("processing {}", path.display());
            if processor.load(path).await {
                processor.apply().await;
            }
        }
    });

    while let Some(event) = rx.recv().await {
        ui.handle(event);
    }

    worker.await.with_context(|| "batch worker failed")
}

async fn interactive(
    ui: &Ui,
    processor: Processor,
    mut rx: mpsc::UnboundedReceiver<UiEvent>,
    mut cursor: FileCursor,
) -> Result<()> {
    if let Some(path) = cursor.current() {
        processor.trigger_load(path.clone());
    }

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(event) = rx.recv() => ui.handle(event),
            line = lines.next_line() => {
                let Some(line) = line.with_context(|| "read stdin failed")? else {
                    break;
                };

                if line.trim().is_empty() {
                    continue;
                }

                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };

                match command {
                    Command::Quit => break,
                    Command::Help => println!("{HELP}"),
                    Command::Show => println!("{:#?}", processor.config().snapshot()),
                    Command::Load(path) => {
                        processor.trigger_load(path);
                    }
                    Command::Next => {
                        let next = (cursor.len() > 1).then(|| cursor.advance().cloned()).flatten();
                        match next {
                            Some(path) => {
                                processor.trigger_load(path);
                            }
                            None => println!("no other image to switch to"),
                        }
                    }
                    command => {
                        let mut changed = false;
                        processor.config().update(|c| changed = command.apply_to(c));
                        if changed {
                            processor.trigger_apply();
                        }
                    }
                }
            }
        }
    }

    // present what already arrived, in-flight runs are abandoned
    while let Ok(event) = rx.try_recv() {
        ui.handle(event);
    }

    if processor.pipeline().has_source() {
        log::debug!("{} image(s) held on exit", processor.pipeline().live_images());
    }
    processor.pipeline().release();

    Ok(())
}
