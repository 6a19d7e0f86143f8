use std::path::{Path, PathBuf};

use progress_strip::{
    EngineConfig, ExportMode, ExportObserver, ExportOptions, ExportPhase, ExportState, Exporter,
    GifSequenceEncoder, Session, SourceFile,
};

struct LogProgress;

impl ExportObserver for LogProgress {
    fn on_state(&mut self, state: ExportState) {
        tracing::info!(?state, "export state");
    }

    fn on_progress(&mut self, phase: ExportPhase, fraction: f64) {
        tracing::info!(?phase, percent = (fraction * 100.0).round(), "export progress");
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut title = String::new();
    let mut paths = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.strip_prefix("--title=") {
            Some(t) => title = t.to_string(),
            None => paths.push(PathBuf::from(arg)),
        }
    }
    if paths.is_empty() {
        eprintln!("usage: export_strip [--title=TEXT] <photo>...");
        return Ok(());
    }

    let config = EngineConfig::from_env()?;
    let files = paths
        .iter()
        .map(SourceFile::read)
        .collect::<Result<Vec<_>, _>>()?;

    let mut session = Session::new(config.clone());
    let loaded = session.load_batch(files)?;
    for skipped in &loaded.skipped {
        eprintln!("export_strip: skipped {skipped}");
    }

    let out_dir = Path::new("target").join("progress-strip");
    std::fs::create_dir_all(&out_dir)?;

    let mut exporter = Exporter::new(config)?;
    let snapshot = session.snapshot();
    for mode in [ExportMode::Animate, ExportMode::Composite] {
        let options = ExportOptions {
            mode,
            title: title.clone(),
            ..ExportOptions::default()
        };
        let Some(artifact) = exporter.export(
            &snapshot,
            &options,
            &mut GifSequenceEncoder::new(),
            &mut LogProgress,
        )?
        else {
            continue;
        };
        let path = out_dir.join(&artifact.file_name);
        std::fs::write(&path, &artifact.bytes)?;
        println!(
            "wrote {} ({}x{}, {} bytes)",
            path.display(),
            artifact.width,
            artifact.height,
            artifact.bytes.len()
        );
    }
    Ok(())
}
