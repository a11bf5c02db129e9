use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pubtally_core::{
    AppConfig, ExitCode, ExportFile, PubtallyError, Report, UploadOptions, count_by_type,
    parse_upload,
};
use pubtally_science::{IngestSummary, ScienceError, Workspace};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "pubtally",
    about = "Faculty publication reports from spreadsheets and BibTeX files",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format. Also enabled by setting PUBTALLY_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Config file to use instead of the default location.
    #[arg(long, global = true, env = "PUBTALLY_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file, look up every faculty member and print the report.
    Report {
        file: PathBuf,
        /// Faculty name for BibTeX entries without a `faculty` field.
        #[arg(long)]
        as_faculty: Option<String>,
    },

    /// Upload a file and write an Excel or Word export.
    Export {
        file: PathBuf,
        /// `excel` (default) or `word`.
        #[arg(long)]
        format: Option<String>,
        /// Only rows for this faculty member.
        #[arg(long, conflicts_with_all = ["start_year", "end_year"])]
        faculty: Option<String>,
        #[arg(long)]
        start_year: Option<String>,
        #[arg(long)]
        end_year: Option<String>,
        /// Output directory (defaults to the configured one, then the working directory).
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        as_faculty: Option<String>,
    },

    /// Parse a file locally, without remote lookups.
    Parse {
        file: PathBuf,
        #[arg(long)]
        as_faculty: Option<String>,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all config values.
    List,
    /// Print the config file location.
    Path,
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let json_output = cli.json || std::env::var("PUBTALLY_JSON").as_deref() == Ok("1");

    if let Err(err) = run(cli, json_output).await {
        let code = exit_code(&err);
        if json_output {
            print_json(&serde_json::json!({
                "status": "error",
                "error": error_label(code),
                "message": err.to_string(),
            }))?;
        } else if code == ExitCode::NoData {
            println!("{err}");
        } else {
            eprintln!("Error: {err}");
        }
        std::process::exit(code as i32);
    }
    Ok(())
}

async fn run(cli: Cli, json_output: bool) -> Result<()> {
    let start = Instant::now();
    let config_path = cli.config.unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_from(&config_path)?;
    debug!(path = %config_path.display(), "config loaded");

    match cli.command {
        Commands::Report { file, as_faculty } => {
            let workspace = Workspace::from_config(&config)?;
            let summary = workspace.upload(&file, as_faculty.as_deref()).await?;
            let report = workspace.report().await?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "report": report, "ingest": summary },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                print_ingest(&summary);
                print_report(&report);
            }
        }

        Commands::Export {
            file,
            format,
            faculty,
            start_year,
            end_year,
            out,
            as_faculty,
        } => {
            let workspace = Workspace::from_config(&config)?;
            let summary = workspace.upload(&file, as_faculty.as_deref()).await?;

            let export = if faculty.is_some() {
                workspace
                    .export_faculty(faculty.as_deref(), format.as_deref())
                    .await?
            } else if start_year.is_some() || end_year.is_some() {
                workspace
                    .export_years(start_year.as_deref(), end_year.as_deref(), format.as_deref())
                    .await?
            } else {
                workspace.export_all(format.as_deref()).await?
            };

            let dir = out.unwrap_or_else(|| config.output_dir());
            let path = write_export(&dir, &export)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": {
                        "path": path,
                        "mime_type": export.mime_type,
                        "bytes": export.bytes.len(),
                        "ingest": summary,
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                print_ingest(&summary);
                println!("Wrote {}", path.display());
            }
        }

        Commands::Parse { file, as_faculty } => {
            let options = UploadOptions {
                faculty_column: config.upload.faculty_column.clone(),
                default_faculty: as_faculty,
            };
            let parsed = parse_upload(&file, &options)?;
            let names = parsed.faculty_names();
            let types = count_by_type(&parsed.table);
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": {
                        "columns": parsed.table.columns(),
                        "rows": parsed.table.rows(),
                        "faculties": names,
                        "by_type": types,
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("{} rows, columns: {}", parsed.table.len(), parsed.table.columns().join(", "));
                println!("Faculty: {}", names.join("; "));
                for entry in &types {
                    println!("  {:<12} {}", entry.key, entry.count);
                }
            }
        }

        Commands::Config { action } => {
            let dur = start.elapsed().as_millis();
            match action {
                ConfigAction::List => {
                    let kv = config_key_values(&config);
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":kv,"meta":{"duration_ms":dur}}))?;
                    } else {
                        for (k, v) in &kv {
                            println!("{k} = {v}");
                        }
                    }
                }
                ConfigAction::Path => {
                    if json_output {
                        print_json(&serde_json::json!({
                            "status": "ok",
                            "data": { "path": config_path, "exists": config_path.exists() },
                            "meta": { "duration_ms": dur }
                        }))?;
                    } else {
                        println!("{}", config_path.display());
                    }
                }
            }
        }
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pubtally_core=info,pubtally_science=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn exit_code(err: &anyhow::Error) -> ExitCode {
    if let Some(e) = err.downcast_ref::<ScienceError>() {
        e.exit_code()
    } else if let Some(e) = err.downcast_ref::<PubtallyError>() {
        e.kind().into()
    } else if err.downcast_ref::<std::io::Error>().is_some() {
        ExitCode::FileSystemError
    } else {
        ExitCode::GeneralError
    }
}

fn error_label(code: ExitCode) -> &'static str {
    match code {
        ExitCode::NoData => "no_data",
        ExitCode::InvalidInput => "invalid_input",
        ExitCode::FileSystemError => "filesystem",
        ExitCode::NetworkError => "network",
        ExitCode::GeneralError => "error",
    }
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn print_ingest(summary: &IngestSummary) {
    for name in &summary.names {
        match &name.error {
            Some(err) => eprintln!("  {:<30} lookup failed: {err}", name.faculty_name),
            None => eprintln!("  {:<30} {} records", name.faculty_name, name.records),
        }
    }
    if summary.used_fallback() {
        eprintln!("No remote records found; using the uploaded rows as-is.");
    }
}

fn print_report(report: &Report) {
    println!("Publications: {}", report.total);

    println!("\nBy year:");
    for (year, count) in &report.by_year {
        println!("  {year}  {count}");
    }

    println!("\nBy type:");
    for entry in &report.by_type {
        println!("  {:<12} {}", entry.key, entry.count);
    }

    println!("\nBy faculty:");
    for entry in &report.by_faculty {
        println!("  {:<30} {}", entry.key, entry.count);
    }
}

fn write_export(dir: &Path, export: &ExportFile) -> Result<PathBuf> {
    let name = Path::new(&export.file_name);
    if name.file_name() != Some(name.as_os_str()) {
        anyhow::bail!("refusing to write export with unsafe file name {:?}", export.file_name);
    }
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, &export.bytes)?;
    Ok(path)
}

fn config_key_values(config: &AppConfig) -> std::collections::BTreeMap<&'static str, String> {
    let mut map = std::collections::BTreeMap::new();
    map.insert("upload.faculty_column", config.upload.faculty_column.clone());
    map.insert("remote.base_url", config.remote.base_url.clone());
    map.insert("remote.api_key_env", config.remote.api_key_env.clone());
    map.insert(
        "remote.api_key_set",
        config.remote_api_key().is_some().to_string(),
    );
    map.insert("remote.user_agent", config.remote.user_agent.clone());
    map.insert("remote.page_size", config.remote.page_size.to_string());
    map.insert(
        "remote.max_publications",
        config.remote.max_publications.to_string(),
    );
    map.insert(
        "remote.request_timeout_secs",
        config
            .remote
            .request_timeout_secs
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".to_string()),
    );
    map.insert("export.sheet_name", config.export.sheet_name.clone());
    map.insert("export.heading", config.export.heading.clone());
    map.insert(
        "export.output_directory",
        config.output_dir().to_string_lossy().to_string(),
    );
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn export_named(file_name: &str) -> ExportFile {
        ExportFile {
            file_name: file_name.to_string(),
            mime_type: "application/octet-stream",
            bytes: b"PK".to_vec(),
        }
    }

    #[test]
    fn test_write_export_stays_in_output_dir() {
        let dir = TempDir::new().unwrap();
        let path = write_export(dir.path(), &export_named("publication_records_Dept_Ada.xlsx")).unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(std::fs::read(&path).unwrap(), b"PK");
    }

    #[test]
    fn test_write_export_rejects_path_like_names() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        for name in ["../escape.xlsx", "sub/name.xlsx", ".."] {
            assert!(write_export(&out, &export_named(name)).is_err(), "{name}");
        }
        assert!(!dir.path().join("escape.xlsx").exists());
    }
}
