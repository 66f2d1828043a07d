//! ShotScope command-line front end.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shotscope_client::HttpJobClient;
use shotscope_models::{format_ms, FeatureCategory, JobRequest, VideoSource};
use shotscope_session::render::{describe_playhead, render_playhead, render_tracks};
use shotscope_session::{EngineConfig, SessionController, ViewState};
use shotscope_timeline::ManualClock;

const RENDER_COLUMNS: usize = 60;

#[derive(Parser)]
#[command(name = "shotscope")]
#[command(about = "Shot-level video analysis on a multi-track timeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a video and follow the analysis until it finishes
    Analyze {
        /// Video path visible to the backend, or a URL with --url
        source: String,

        /// Treat the source as a URL
        #[arg(long)]
        url: bool,

        /// Frames sampled per second (0.1-10)
        #[arg(long, default_value = "2.0")]
        fps: f64,

        /// Upper bound on sampled frames (10-1000)
        #[arg(long, default_value = "240")]
        max_frames: u32,

        /// Compare against this video of your own
        #[arg(long)]
        compare: Option<String>,

        /// Feature categories to run (default: all)
        #[arg(long, value_enum, value_delimiter = ',')]
        modules: Vec<Module>,

        /// Write analysis_{job_id}.json into this directory when done
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// List past analyses
    History {
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Replay a finished analysis
    Show {
        job_id: String,

        /// Place the playhead at this time (ms)
        #[arg(long)]
        at: Option<f64>,

        /// Zoom the track content (0.5-3.0) before placing the playhead
        #[arg(long, default_value = "1.0")]
        zoom: f64,

        /// Write analysis_{job_id}.json into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Delete an analysis
    Delete { job_id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum Module {
    CameraMotion,
    Lighting,
    ColorGrading,
}

impl From<Module> for FeatureCategory {
    fn from(module: Module) -> Self {
        match module {
            Module::CameraMotion => FeatureCategory::CameraMotion,
            Module::Lighting => FeatureCategory::Lighting,
            Module::ColorGrading => FeatureCategory::ColorGrading,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    let config = EngineConfig::from_env()?;
    let api = Arc::new(HttpJobClient::new(config.client.clone())?);
    let mut controller = SessionController::from_config(api, &config);

    match cli.command {
        Commands::Analyze {
            source,
            url,
            fps,
            max_frames,
            compare,
            modules,
            export,
        } => {
            let target = video_source(&source, url)?;
            let mut request = match compare {
                Some(user) => JobRequest::compare(target, video_source(&user, url)?),
                None => JobRequest::learn(target),
            }
            .with_frames(fps, max_frames);
            if !modules.is_empty() {
                request = request.with_modules(modules.into_iter().map(Into::into).collect());
            }
            analyze(&mut controller, request, export).await?
        }

        Commands::History { limit } => {
            let items = controller
                .history(limit.unwrap_or(config.history_limit))
                .await?;
            if items.is_empty() {
                println!("No analyses yet");
            }
            for item in items {
                println!(
                    "{}  {:<9}  {}  {}",
                    item.created_at.format("%Y-%m-%d %H:%M"),
                    item.status.as_str(),
                    item.job_id,
                    item.display_title()
                );
                for point in &item.learning_points {
                    println!("    - {}", point);
                }
            }
        }

        Commands::Show {
            job_id,
            at,
            zoom,
            export,
        } => {
            controller.load_history(&job_id).await?;
            print_timeline(&controller);

            if let Some(at) = at {
                let duration = controller
                    .session()
                    .model
                    .as_ref()
                    .map(|m| m.total_duration_ms)
                    .unwrap_or(0.0);
                let mut clock = ManualClock::new(duration);
                controller.playhead_mut().zoom_by(zoom);
                let geometry = *controller.playhead().geometry();
                match controller.playhead_mut().seek_to(at, &mut clock) {
                    Some(position) => {
                        println!("{}", render_playhead(&position, RENDER_COLUMNS));
                        println!(
                            "{} {}",
                            format_ms(position.time_ms),
                            describe_playhead(&position, &geometry)
                        );
                        let shot = controller
                            .session()
                            .model
                            .as_ref()
                            .and_then(|m| m.segment_at(position.time_ms));
                        match shot {
                            Some(segment) => println!("shot {}", segment.id),
                            None => println!("no shot under the playhead"),
                        }
                    }
                    None => println!("Timeline is empty; nothing to seek"),
                }
            }

            if let Some(dir) = export {
                let path = controller.export()?.write_to(&dir)?;
                println!("Exported {}", path.display());
            }
        }

        Commands::Delete { job_id } => {
            let ack = controller.delete_job(&job_id).await?;
            match ack.message {
                Some(message) => println!("{}", message),
                None if ack.success => println!("Deleted {}", job_id),
                None => bail!("Backend refused to delete {}", job_id),
            }
        }
    }

    Ok(())
}

async fn analyze(
    controller: &mut SessionController<HttpJobClient>,
    request: JobRequest,
    export: Option<PathBuf>,
) -> Result<()> {
    let handle = controller.submit(request).await?;
    println!("Submitted job {}", handle.id);

    let mut shown_segments = None;
    while controller.next_event().await {
        match controller.view_state() {
            ViewState::Loading {
                progress: Some(progress),
            } => println!("  {}", progress.label()),
            ViewState::Timeline => {
                let session = controller.session();
                if let Some(model) = session.model.as_ref().filter(|m| m.streaming) {
                    let count = model.segment_count();
                    if shown_segments != Some(count) {
                        println!(
                            "  streaming: {} ({} still analyzing)",
                            model.summary(),
                            model.analyzing_count()
                        );
                        shown_segments = Some(count);
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(error) = controller.last_error() {
        bail!("{}", error);
    }

    print_timeline(controller);

    if let Some(dir) = export {
        let path = controller.export()?.write_to(&dir)?;
        println!("Exported {}", path.display());
    }

    info!(job_id = %handle.id, "Analysis session finished");
    Ok(())
}

fn print_timeline(controller: &SessionController<HttpJobClient>) {
    let Some(model) = controller.session().model.as_ref() else {
        println!("No timeline");
        return;
    };
    println!("{}", model.summary());

    if let Some(layout) = controller.layout() {
        print!("{}", render_tracks(&layout, RENDER_COLUMNS));
    }

    for segment in &model.segments {
        println!(
            "{} - {}  {}",
            format_ms(segment.start_ms),
            format_ms(segment.end_ms),
            segment.id
        );
        for feature in segment.features.iter().filter(|f| f.category.is_known()) {
            println!(
                "    [{}] {}: {} ({:.0}%)",
                feature.category.display_name(),
                feature.feature_type,
                feature.value,
                feature.clamped_confidence() * 100.0
            );
        }
    }
}

/// Absolute paths pass through untouched; relative ones resolve locally.
fn video_source(raw: &str, url: bool) -> Result<VideoSource> {
    if url {
        return Ok(VideoSource::url(raw));
    }
    if Path::new(raw).is_absolute() {
        return Ok(VideoSource::file(raw));
    }
    let path = std::fs::canonicalize(raw).with_context(|| format!("Cannot resolve {}", raw))?;
    Ok(VideoSource::file(path.to_string_lossy()))
}

fn init_tracing() -> Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"))
        .add_directive("shotscope_client=info".parse()?)
        .add_directive("shotscope_session=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shotscope_models::SourceKind;

    #[test]
    fn test_video_source_keeps_absolute_path() {
        let source = video_source("/srv/videos/does-not-exist-here.mp4", false).unwrap();
        assert_eq!(source.kind, SourceKind::File);
        assert_eq!(source.path, "/srv/videos/does-not-exist-here.mp4");
    }

    #[test]
    fn test_video_source_resolves_relative_path() {
        let source = video_source("Cargo.toml", false).unwrap();
        assert!(Path::new(&source.path).is_absolute());
        assert!(source.path.ends_with("Cargo.toml"));
    }

    #[test]
    fn test_video_source_missing_relative_path() {
        assert!(video_source("no/such/clip.mp4", false).is_err());
    }

    #[test]
    fn test_video_source_url_untouched() {
        let source = video_source("https://example.com/clip.mp4", true).unwrap();
        assert_eq!(source.kind, SourceKind::Url);
        assert_eq!(source.path, "https://example.com/clip.mp4");
    }
}
