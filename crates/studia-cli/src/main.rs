use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use studia_cli::{Facade, OpOutput};
use studia_core::Config;
use studia_courses::{
    CacheStore, CourseApiClient, CourseCache, CourseQueryService, MemoryStore, RedisStore,
};

#[derive(Parser)]
#[command(name = "studia", about = "Student course query and calendar export", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Query courses, optionally filtered by course code and week
    GetCourses {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        course_code: Option<String>,
        #[arg(long)]
        week: Option<String>,
    },
    /// Export assignments as an ICS calendar
    ExportIcs {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        course_code: Option<String>,
        #[arg(long)]
        week: Option<String>,
        /// Write the calendar to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List course name/code summaries for a student
    Summaries {
        #[arg(long)]
        student_id: String,
    },
    /// Invoke an operation by name with raw JSON arguments
    Call {
        name: String,
        args: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    studia_core::init()?;

    let cli = Cli::parse();
    let config = Config::from_env();

    let validation = config.validate();
    for warning in &validation.warnings {
        tracing::warn!(field = %warning.field, "config warning: {}", warning.message);
    }
    if !validation.is_valid() {
        anyhow::bail!("invalid configuration: {}", validation.error_summary());
    }

    let store: Arc<dyn CacheStore> = match RedisStore::connect(&config.cache.connection_url()).await
    {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "cache backend unreachable, falling back to in-process cache");
            Arc::new(MemoryStore::new())
        }
    };

    let client = CourseApiClient::new(
        &config.courses_api_url,
        Duration::from_secs(config.http_timeout_secs),
    )?;
    let cache = CourseCache::new(store, config.cache.ttl_secs);
    let facade = Facade::new(CourseQueryService::new(client, cache));

    match cli.command {
        Command::GetCourses {
            student_id,
            course_code,
            week,
        } => {
            let response = facade
                .get_filtered_courses(&student_id, course_code.as_deref(), week.as_deref())
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::ExportIcs {
            student_id,
            course_code,
            week,
            output,
        } => {
            let ics = facade
                .build_calendar_export(&student_id, course_code.as_deref(), week.as_deref())
                .await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &ics)?;
                    tracing::info!(path = %path.display(), "calendar written");
                }
                None => println!("{ics}"),
            }
        }
        Command::Summaries { student_id } => {
            let response = facade.read_student_courses(&student_id).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Call { name, args } => {
            let args: serde_json::Value = serde_json::from_str(&args)?;
            match facade.dispatch(&name, &args).await? {
                OpOutput::Json(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                OpOutput::Text(text) => println!("{text}"),
            }
        }
    }

    Ok(())
}
