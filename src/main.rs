use std::{env, path::PathBuf, sync::Arc};

use anyhow::Context;
use log::{error, info, warn};
use tokio::{signal, sync::mpsc};
use tokio_util::sync::CancellationToken;

use cifar_pipeline::{
    Corpus, PipelineConfig, PreparedDataset, TrainingEvent, TrainingSession,
    baseline::ClassPriorTrainer,
};

const EVENT_BUFFER: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut cfg = match env::args().nth(1) {
        Some(path) => PipelineConfig::from_json_file(&PathBuf::from(path))?,
        None => PipelineConfig::default(),
    };
    cfg.apply_env()?;
    cfg.validate()?;
    info!("config: {cfg:?}");

    let corpus = Corpus::load(&cfg.paths()).context("loading the CIFAR-10 batches")?;
    let dataset = Arc::new(PreparedDataset::prepare(&corpus, cfg.seed)?);

    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let session = TrainingSession::new(
        dataset,
        cfg.batch_size,
        Box::new(ClassPriorTrainer::new()),
        cfg.max_steps,
    )
    .with_events(events_tx)
    .with_preview(cfg.preview_count);

    let reporter = tokio::spawn(report(events_rx, cfg.preview_dir.clone()));

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("received SIGINT, stopping after the current step");
            on_signal.cancel();
        }
    });

    let summary = session.run(cancel).await?;
    reporter.await?;

    info!(
        "{} after {} step(s), {} epoch(s), last loss {:?}",
        summary.outcome.name(),
        summary.metrics.steps,
        summary.metrics.epochs,
        summary.metrics.last_loss()
    );

    Ok(())
}

/// Logs progress and writes preview images until the session hangs up.
async fn report(mut events: mpsc::Receiver<TrainingEvent>, preview_dir: Option<PathBuf>) {
    if let Some(dir) = &preview_dir {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!("cannot create preview dir {}: {e}", dir.display());
        }
    }

    while let Some(event) = events.recv().await {
        match event {
            TrainingEvent::StepCompleted {
                step, epoch, loss, ..
            } => info!(step = step, epoch = epoch; "loss {loss:.4}"),
            TrainingEvent::EpochCompleted { epoch } => info!("epoch {epoch} done"),
            TrainingEvent::Preview { step, images } => {
                let Some(dir) = &preview_dir else { continue };
                for (i, image) in images.iter().enumerate() {
                    let path = dir.join(format!("step{step:06}_{i}.ppm"));
                    if let Err(e) = image.write_ppm(&path) {
                        error!("{e}");
                    }
                }
            }
            TrainingEvent::Finished { steps, cancelled } => {
                info!(steps = steps, cancelled = cancelled; "session closed");
            }
        }
    }
}
