use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use promptsmith::{
    build_instruction_with_system, AspectRatio, CandidateFile, Consistency, FacialExpression,
    FocalLength, ModificationRequest, Promptsmith, Provider, QualityOption, RecordState,
    Settings, VisualStyle,
};

#[derive(Parser, Debug)]
#[command(name = "promptsmith", version, about)]
struct Cli {
    /// TOML config file (defaults to ./promptsmith.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    provider: Option<Provider>,

    #[arg(long, global = true)]
    model: Option<String>,

    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a reverse prompt for each image
    Reverse {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Print the records as JSON
        #[arg(long)]
        json: bool,

        /// Keep the base64 image content in the JSON output
        #[arg(long, requires = "json")]
        include_content: bool,
    },
    /// Rewrite a prompt with optional style toggles
    Modify {
        #[arg(value_name = "PROMPT")]
        prompt: String,

        /// Explicit modification instruction
        #[arg(short, long)]
        instruction: Option<String>,

        #[arg(long)]
        quality: Option<QualityOption>,

        #[arg(long)]
        aspect_ratio: Option<AspectRatio>,

        #[arg(long)]
        style: Option<VisualStyle>,

        #[arg(long)]
        focal_length: Option<FocalLength>,

        #[arg(long)]
        expression: Option<FacialExpression>,

        /// Keep characters and scenes consistent across shots
        #[arg(long)]
        consistency: bool,

        /// Print the constructed instruction instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("promptsmith=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(provider) = cli.provider {
        settings.set_provider(provider);
    }
    if let Some(model) = cli.model {
        settings.model = Some(model);
    }
    if let Some(key) = cli.api_key {
        settings.api_key = Some(key);
    }

    match cli.command {
        Command::Reverse {
            files,
            json,
            include_content,
        } => reverse(&settings, files, json, include_content).await,
        Command::Modify {
            prompt,
            instruction,
            quality,
            aspect_ratio,
            style,
            focal_length,
            expression,
            consistency,
            dry_run,
        } => {
            let mut request = ModificationRequest::new(prompt)
                .with_quality(quality)
                .with_aspect_ratio(aspect_ratio)
                .with_style(style)
                .with_focal_length(focal_length)
                .with_facial_expression(expression)
                .with_consistency(consistency.then_some(Consistency::Absolute));
            if let Some(instruction) = instruction {
                request = request.with_instruction(instruction);
            }

            if dry_run {
                let instruction =
                    build_instruction_with_system(&request, &settings.oracle.system_instruction)?;
                println!("{}\n\n{}", instruction.system, instruction.user);
                return Ok(());
            }

            let app = Promptsmith::from_settings(&settings)?;
            let rewritten = app.modify(&request).await?;
            println!("{}", rewritten);
            Ok(())
        }
    }
}

async fn reverse(
    settings: &Settings,
    files: Vec<PathBuf>,
    json: bool,
    include_content: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = Promptsmith::from_settings(settings)?;

    let report = app
        .ingest_files(files.into_iter().map(CandidateFile::from_path))
        .await;
    for skipped in &report.skipped {
        eprintln!("Skipped '{}': {}", skipped.name, skipped.reason);
    }
    if report.images.is_empty() {
        return Err("No image files to process".into());
    }

    let batch = app.workflow().generate_all().await?;
    let mut views = app.workflow().views().await;
    if !include_content {
        views.iter_mut().for_each(|view| view.base64.clear());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        for view in &views {
            println!("## {}", view.filename);
            match view.state {
                RecordState::Succeeded => println!("{}\n", view.prompt),
                _ => println!(
                    "Error: {}\n",
                    view.error.as_deref().unwrap_or("no prompt generated")
                ),
            }
        }
    }

    eprintln!(
        "Generated {} prompt(s), {} failed",
        batch.succeeded, batch.failed
    );
    if batch.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
