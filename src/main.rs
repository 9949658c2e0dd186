// src/main.rs
use anyhow::Context;
use clap::Parser;
use content2notion::api::{AudioClip, Transcriber};
use content2notion::config::{
    Command, CommandLineInput, PipelineConfig, ServeArgs, TranscribeArgs, GENERATION_API_KEY_VAR,
};
use content2notion::pipeline::{PipelineOutcome, PipelineRequest};
use content2notion::server::{self, AppState};
use content2notion::types::GenerationApiKey;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use serde_json::json;
use std::io::Read;
use std::sync::Arc;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("content2notion.log");

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    // stderr keeps `--json` output on stdout machine-readable
    let stderr_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}",
        )))
        .build(&log_file_path)
        .with_context(|| format!("cannot open log file {}", log_file_path.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Reads the content argument; `-` means stdin.
fn read_content(arg: &str) -> anyhow::Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("cannot read content from stdin")?;
    Ok(text)
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Runs the pipeline once with the environment's credentials.
async fn run_pipeline(
    config: &PipelineConfig,
    content: String,
    json_output: bool,
) -> anyhow::Result<()> {
    let pipeline = config.build_pipeline()?;
    let request = PipelineRequest::new(content, config.credentials.clone());

    match pipeline.run(&request).await {
        Ok(outcome) => {
            if json_output {
                print_json(&json!({
                    "message": "Processed successfully",
                    "data": outcome.record,
                }))?;
            } else {
                report_saved(&outcome);
            }
            Ok(())
        }
        Err(err) => {
            if json_output {
                print_json(&json!({ "error": err.detail() }))?;
            }
            let stage = err.stage();
            Err(err).with_context(|| format!("pipeline stopped at stage {}", stage))
        }
    }
}

fn report_saved(outcome: &PipelineOutcome) {
    let title = match outcome.record.title.as_str() {
        "" => "Untitled",
        title => title,
    };
    println!("✓ Saved \"{}\" to Notion (page {})", title, outcome.page.id);
    if let Some(url) = &outcome.page.url {
        println!("  {}", url);
    }
}

async fn run_transcribe(config: &PipelineConfig, args: &TranscribeArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.audio_file)
        .with_context(|| format!("cannot read {}", args.audio_file.display()))?;

    let mime = args.mime.as_deref().or_else(|| {
        args.audio_file
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(AudioClip::mime_type_for_extension)
    });
    let audio = AudioClip::new(bytes, mime)?;

    let api_key = GenerationApiKey::new(
        config.credentials.generation_api_key.as_str(),
        "generationApiKey",
    )
    .with_context(|| format!("{} must be set", GENERATION_API_KEY_VAR))?;

    let transcript = config
        .generation_client()?
        .transcribe(&audio, &config.default_model, &api_key)
        .await
        .context("transcription failed")?;

    if args.process {
        return run_pipeline(config, transcript.into_string(), args.json).await;
    }

    if args.json {
        print_json(&json!({ "transcription": transcript }))?;
    } else {
        println!("{}", transcript.as_str());
    }
    Ok(())
}

async fn run_server(config: &PipelineConfig, args: &ServeArgs) -> anyhow::Result<()> {
    let state = AppState {
        pipeline: config.build_pipeline()?,
        transcriber: Arc::new(config.generation_client()?),
    };

    println!("Serving on http://{}", args.bind);
    server::serve(state, args.bind)
        .await
        .with_context(|| format!("server on {} stopped", args.bind))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    let config = PipelineConfig::resolve(&cli)?;

    match &cli.command {
        Command::Process(args) => {
            let content = read_content(&args.content)?;
            run_pipeline(&config, content, args.json).await
        }
        Command::Transcribe(args) => run_transcribe(&config, args).await,
        Command::Serve(args) => run_server(&config, args).await,
    }
}
