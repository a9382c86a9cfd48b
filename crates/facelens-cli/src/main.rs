use anyhow::Result;
use clap::{Parser, Subcommand};
use facelens_api::ApiClient;
use facelens_core::{
    AnalysisMode, Backend, CheckSet, Model, Session, SimulatedBackend, StatusView,
};
use facelens_hw::Camera;
use facelens_rt::RealtimeLoop;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

mod capture;
mod config;
mod render;

use config::Config;

#[derive(Parser)]
#[command(name = "facelens", about = "Face-analysis backend demo client")]
struct Cli {
    /// Backend base URL (overrides FACELENS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Use randomized simulated results instead of the backend
    #[arg(long, global = true)]
    simulate: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two face images
    Compare {
        /// First image file (captured from the camera when omitted)
        image1: Option<PathBuf>,
        /// Second image file (captured from the camera when omitted)
        image2: Option<PathBuf>,
        /// Override one model weight, e.g. -w arcface=0.5 (repeatable;
        /// weights are renormalized to sum 1.0)
        #[arg(short = 'w', long = "weight", value_parser = parse_weight)]
        weights: Vec<(Model, f64)>,
    },
    /// Run liveness/deepfake/spoofing checks on one image
    Check {
        /// Image file (captured from the camera when omitted)
        image: Option<PathBuf>,
        /// Comma-separated subset of liveness,deepfake,spoofing
        #[arg(long, default_value = "liveness,deepfake,spoofing")]
        checks: CheckSet,
    },
    /// Detect faces in one image
    Detect {
        /// Image file (captured from the camera when omitted)
        image: Option<PathBuf>,
        /// Request gender/age attributes per face
        #[arg(long)]
        attributes: bool,
    },
    /// Poll backend service status
    Status,
    /// Realtime webcam analysis
    Realtime {
        /// Stop after this many seconds (runs until Ctrl-C otherwise)
        #[arg(long)]
        duration: Option<u64>,
        /// Write annotated frames to this directory
        #[arg(long)]
        save_dir: Option<PathBuf>,
    },
    /// Camera diagnostics
    Camera,
}

fn parse_weight(s: &str) -> Result<(Model, f64), String> {
    let (model, value) = s
        .split_once('=')
        .ok_or_else(|| "expected model=value".to_string())?;
    let model = model.parse::<Model>().map_err(|e| e.to_string())?;
    let value = value.parse::<f64>().map_err(|e| e.to_string())?;
    if !(0.0..=1.0).contains(&value) {
        return Err("weight must be within 0..=1".to_string());
    }
    Ok((model, value))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let api_url = cli.api_url.unwrap_or_else(|| config.api_url.clone());

    if cli.simulate {
        tracing::info!("simulation mode: results are randomized, no backend contacted");
        run(SimulatedBackend, &config, cli.command).await
    } else {
        let client = ApiClient::new(api_url, config.request_timeout())?;
        run(client, &config, cli.command).await
    }
}

async fn run<B: Backend>(backend: B, config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Compare {
            image1,
            image2,
            weights,
        } => {
            let mut session = Session::new(AnalysisMode::Compare);
            session.set_first(capture::image_from(image1.as_deref(), config, "first image")?);
            session.set_second(capture::image_from(
                image2.as_deref(),
                config,
                "second image",
            )?);
            for (model, value) in weights {
                session.set_weight(model, value);
            }
            let outcome = session.analyze(&backend).await?;
            render::print_outcome(&outcome);
        }
        Commands::Check { image, checks } => {
            let mut session = Session::new(AnalysisMode::Security);
            session.set_first(capture::image_from(image.as_deref(), config, "image")?);
            session.set_checks(checks);
            let outcome = session.analyze(&backend).await?;
            render::print_outcome(&outcome);
        }
        Commands::Detect { image, attributes } => {
            let mut session = Session::new(AnalysisMode::Detection);
            session.set_first(capture::image_from(image.as_deref(), config, "image")?);
            session.set_include_attributes(attributes);
            let outcome = session.analyze(&backend).await?;
            render::print_outcome(&outcome);
        }
        Commands::Status => {
            let view = match backend.status().await {
                Ok(snapshot) => StatusView::Live(snapshot),
                Err(err) => StatusView::from_failure(err),
            };
            render::print_status(&view);
        }
        Commands::Realtime { duration, save_dir } => {
            run_realtime(backend, config, duration, save_dir).await?;
        }
        Commands::Camera => {
            camera_diagnostics(config)?;
        }
    }

    Ok(())
}

async fn run_realtime<B: Backend>(
    backend: B,
    config: &Config,
    duration: Option<u64>,
    save_dir: Option<PathBuf>,
) -> Result<()> {
    let source = capture::CameraSource::open(config)?;
    let mut rt = RealtimeLoop::new(backend, source, config.realtime());

    if let Some(dir) = save_dir {
        std::fs::create_dir_all(&dir)?;
        let mut frame_no = 0u64;
        rt = rt.with_sink(move |img| {
            let path = dir.join(format!("frame_{frame_no:05}.png"));
            frame_no += 1;
            if let Err(err) = img.save(&path) {
                tracing::warn!(error = %err, path = %path.display(), "failed to save frame");
            }
        });
    }

    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
        let _ = tx.send(true);
    });

    match duration {
        Some(secs) => println!("Realtime analysis running for {secs}s..."),
        None => println!("Realtime analysis running, press Ctrl-C to stop..."),
    }
    rt.run(rx).await;
    println!("Realtime analysis stopped.");
    Ok(())
}

fn camera_diagnostics(config: &Config) -> Result<()> {
    let devices = Camera::list_devices();
    if devices.is_empty() {
        println!("No video capture devices found.");
    } else {
        println!("Video capture devices:");
        for dev in &devices {
            println!("  {} — {} ({})", dev.path, dev.name, dev.driver);
        }
    }

    println!("\nOpening {}...", config.camera_device);
    let camera = Camera::open(&config.camera_device)?;
    let frame = camera.capture_still(config.warmup_frames)?;
    println!(
        "Captured {}x{} frame, brightness {:.1}, format {:?}",
        frame.width,
        frame.height,
        frame.avg_brightness(),
        camera.fourcc
    );
    Ok(())
}
