use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

use siakad_server::backend::{BackendFactory, RecordsBackend};
use siakad_server::config::AppConfig;
use siakad_server::error::{AppError, AppResult};
use siakad_server::models::{Major, RecordId, RecordQuery};
use siakad_server::parser::{EntityKind, FieldMap};
use siakad_server::{logging, resource};

const DEFAULT_CONFIG: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(name = "siakad")]
#[command(about = "University records administration: students, lecturers and courses")]
struct Args {
    /// Configuration file path (default: config.yaml)
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database schema if it does not exist yet
    Init,
    /// Validate a JSON object of fields and store a new record
    Create {
        kind: EntityKind,
        /// JSON object, e.g. '{"name": "Budi Santoso", ...}'
        #[arg(short, long)]
        data: String,
    },
    /// Apply a JSON object of changed fields to a stored record
    Update {
        kind: EntityKind,
        id: RecordId,
        #[arg(short, long)]
        data: String,
    },
    Delete {
        kind: EntityKind,
        id: RecordId,
    },
    Show {
        kind: EntityKind,
        id: RecordId,
    },
    List {
        kind: EntityKind,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print the export table for a record kind
    Export {
        kind: EntityKind,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Enroll a student in a course
    Enroll {
        student_id: RecordId,
        course_id: RecordId,
    },
    /// Withdraw a student from a course
    Withdraw {
        student_id: RecordId,
        course_id: RecordId,
    },
    /// Dashboard totals
    Stats,
}

#[derive(clap::Args, Debug)]
struct FilterArgs {
    /// Case-insensitive search over name and number or code
    #[arg(short, long)]
    search: Option<String>,
    /// Exact major label, students only
    #[arg(short, long)]
    major: Option<String>,
}

impl FilterArgs {
    fn to_query(&self) -> AppResult<RecordQuery> {
        let major = match self.major.as_deref() {
            Some(label) => Some(Major::from_label(label).ok_or_else(|| {
                AppError::MalformedRequest(format!("Unknown major '{}'", label))
            })?),
            None => None,
        };
        Ok(RecordQuery {
            search: self.search.clone(),
            major,
        })
    }
}

fn load_config(path: &str) -> AppResult<AppConfig> {
    if path == DEFAULT_CONFIG && !Path::new(DEFAULT_CONFIG).exists() {
        return Ok(AppConfig::default_config());
    }
    AppConfig::load_from_file(path)
}

async fn run(command: Command, backend: &dyn RecordsBackend) -> AppResult<Value> {
    let output = match command {
        Command::Init => {
            backend.health_check().await?;
            json!({ "success": true })
        }
        Command::Create { kind, data } => {
            let fields = FieldMap::from_json_slice(kind, data.as_bytes())?;
            let record = resource::create_record(backend, &fields).await?;
            json!({ "success": true, "data": record })
        }
        Command::Update { kind, id, data } => {
            let record = resource::update_record(backend, kind, id, data.as_bytes()).await?;
            json!({ "success": true, "data": record })
        }
        Command::Delete { kind, id } => {
            resource::delete_record(backend, kind, id).await?;
            json!({ "success": true })
        }
        Command::Show { kind, id } => {
            let record = resource::get_record(backend, kind, id).await?;
            let mut output = json!({ "success": true, "data": record });
            if let Some(courses) = resource::related_courses(backend, kind, id).await? {
                output["courses"] = json!(courses);
            }
            output
        }
        Command::List { kind, filter } => {
            let records = resource::list_records(backend, kind, &filter.to_query()?).await?;
            json!({ "success": true, "count": records.len(), "data": records })
        }
        Command::Export { kind, filter } => {
            let table = resource::export_records(backend, kind, &filter.to_query()?).await?;
            json!({
                "success": true,
                "file_stem": resource::export_file_stem(kind, chrono::Utc::now()),
                "data": table,
            })
        }
        Command::Enroll {
            student_id,
            course_id,
        } => {
            let changed = resource::student::enroll(backend, student_id, course_id).await?;
            json!({ "success": true, "changed": changed })
        }
        Command::Withdraw {
            student_id,
            course_id,
        } => {
            let changed = resource::student::withdraw(backend, student_id, course_id).await?;
            json!({ "success": true, "changed": changed })
        }
        Command::Stats => {
            let stats = resource::dashboard(backend).await?;
            json!({ "success": true, "data": stats })
        }
    };
    Ok(output)
}

async fn setup_backend(app_config: &AppConfig) -> AppResult<Arc<dyn RecordsBackend>> {
    info!(
        "Setting up {} backend at {}",
        app_config.database.db_type, app_config.database.url
    );
    BackendFactory::create(&app_config.backend_config()).await
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to render output: {}", e),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let app_config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_tracing(&app_config.logging) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let backend = match setup_backend(&app_config).await {
        Ok(backend) => backend,
        Err(e) => {
            print_json(&e.to_json());
            return ExitCode::FAILURE;
        }
    };

    let outcome = run(args.command, backend.as_ref()).await;

    if let Err(e) = backend.cleanup().await {
        warn!("Failed to close backend: {}", e);
    }

    match outcome {
        Ok(output) => {
            print_json(&output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_json(&e.to_json());
            ExitCode::FAILURE
        }
    }
}
