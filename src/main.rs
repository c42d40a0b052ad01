use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use resume_critic::adk::model::{self, Provider};
use resume_critic::critic::{intent, ConfigLoader, CriticConfig, Document, ExecutionMode};
use resume_critic::critic::{ReviewPipeline, Strategy};
use std::io::Read;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Review a resume as the instruction asks
    Review {
        /// What to do, e.g. "roast then feedback"
        #[arg(short, long)]
        instruction: String,

        /// Path to the resume text, or "-" for stdin
        #[arg(short, long)]
        resume: String,

        /// Area of the resume to focus on
        #[arg(short, long)]
        focus: Option<String>,

        /// YAML config file
        #[arg(short, long)]
        config: Option<String>,

        /// The model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Model provider (gemini or openai)
        #[arg(long)]
        provider: Option<String>,

        /// Task selection: keywords or tool-calls
        #[arg(long)]
        strategy: Option<String>,

        /// Maximum number of decide/act cycles
        #[arg(long)]
        cycle_budget: Option<u32>,

        /// Run the requested tasks concurrently
        #[arg(long)]
        concurrent: bool,
    },
    /// Show which tasks an instruction selects, without calling a model
    Plan {
        #[arg(short, long)]
        instruction: String,
    },
}

fn read_resume(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read resume from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read resume from {}", path))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Plan { instruction } => {
            let tasks = intent::detect(&instruction);
            for (i, task) in tasks.iter().enumerate() {
                println!("{}. {} ({})", i + 1, task, task.tool_name());
            }
        }
        Commands::Review {
            instruction,
            resume,
            focus,
            config,
            model: model_name,
            provider,
            strategy,
            cycle_budget,
            concurrent,
        } => {
            let mut config = match config {
                Some(path) => ConfigLoader::load(&path)?,
                None => CriticConfig::default(),
            };

            if let Some(name) = model_name {
                config.model = name;
            }
            let provider = provider.or_else(|| std::env::var("MODEL_PROVIDER").ok());
            if let Some(p) = provider {
                config.provider = Some(p.parse::<Provider>()?);
            }
            if let Some(s) = strategy {
                config.strategy = s.parse::<Strategy>()?;
            }
            if let Some(budget) = cycle_budget {
                config.cycle_budget = budget;
            }
            if concurrent {
                config.execution = ExecutionMode::Concurrent;
            }
            config.validate()?;

            let document = Document::new(read_resume(&resume)?, focus);
            // Reject bad input before provider credentials are even looked at
            config.document.validate(&document)?;
            let model = model::create_model(config.resolved_provider(), &config.model)?;
            let pipeline = ReviewPipeline::from_config(&config, model)?;

            let review = pipeline.review(&instruction, document).await?;
            if review.failures() > 0 {
                log::warn!("{} of {} tasks failed", review.failures(), review.results.len());
            }
            println!("Final Analysis:\n{}", review.report);
        }
    }

    Ok(())
}
