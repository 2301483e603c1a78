//! Prompt-to-video pipeline binary.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reelforge_gen::{MockGenerator, VeoClient};
use reelforge_pipeline::{load_script, run_pipeline, PipelineConfig};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("reelforge_pipeline=info".parse().unwrap())
        .add_directive("reelforge_gen=info".parse().unwrap())
        .add_directive("reelforge_media=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let script_path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: reelforge-pipeline <script.json>");
            std::process::exit(2);
        }
    };

    let script = match load_script(&script_path) {
        Ok(script) => script,
        Err(e) => {
            error!("Failed to load script {}: {}", script_path, e);
            std::process::exit(1);
        }
    };

    let config = PipelineConfig::from_env();
    info!("Pipeline config: {:?}", config);

    let result = if config.mock_mode {
        info!("Mock mode enabled, synthesizing clips locally");
        match MockGenerator::new() {
            Ok(generator) => run_pipeline(generator, &script, &config).await,
            Err(e) => {
                error!("Failed to create mock generator: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match VeoClient::from_env() {
            Ok(client) => run_pipeline(client, &script, &config).await,
            Err(e) => {
                error!("Failed to create generation client: {}", e);
                std::process::exit(1);
            }
        }
    };

    match result {
        Ok(report) => {
            info!(
                "Pipeline finished: {}/{} clips, {} renditions, {:.1}s final duration",
                report.generation.successful_shots,
                report.generation.total_shots,
                report.assembly.rendition_count(),
                report.assembly.metadata.final_duration_seconds
            );
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            std::process::exit(1);
        }
    }
}
