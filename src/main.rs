use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::llm::config::{DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_SITE_NAME, DEFAULT_SITE_URL, DEFAULT_TIMEOUT_SECS};
use crate::llm::transport::LogStatus;
use crate::llm::{AnalysisIntent, AnalysisService, Credentials, HttpTransport, LLMConfig};
use crate::ui::render;

mod llm;
mod sql;
mod ui;

/// Formatea consultas SQL y las analiza con IA
#[derive(Parser, Debug)]
#[command(name = "grow-sql", author, version, about = "Herramienta profesional para formatear y analizar consultas SQL", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Token de OpenRouter
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Modelo de IA a utilizar
    #[arg(long, env = "AI_MODEL", default_value = DEFAULT_MODEL, global = true)]
    model: String,

    /// URL base de la API compatible con OpenAI
    #[arg(long, env = "OPENROUTER_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// URL del sitio (cabecera HTTP-Referer)
    #[arg(long, env = "SITE_URL", default_value = DEFAULT_SITE_URL, global = true)]
    site_url: String,

    /// Nombre del sitio (cabecera X-Title)
    #[arg(long, env = "SITE_NAME", default_value = DEFAULT_SITE_NAME, global = true)]
    site_name: String,

    /// Tiempo máximo de espera de la API, en segundos
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout: u64,

    /// Nivel de log (debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Formatea una consulta SQL (lee stdin si no se indica)
    Format {
        query: Option<String>,
    },

    /// Analiza una consulta SQL con IA
    Analyze {
        /// recommendations | explanation
        #[arg(short, long, default_value = "recommendations")]
        intent: String,

        /// Imprime el resultado como JSON
        #[arg(long)]
        json: bool,

        query: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // El archivo .env es opcional
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    setup_logging(&args.log_level)?;

    let (llm_config, credentials) = setup_llm_config(&args);
    info!(
        "Using model {} at {} (timeout {}s, api key {})",
        llm_config.model,
        llm_config.api_url,
        llm_config.timeout_seconds,
        if credentials.has_api_key() { "set" } else { "missing" }
    );

    match args.command {
        None => {
            let service = setup_service(llm_config, credentials)?;
            ui::Menu::new(service).run().await
        }
        Some(Command::Format { query }) => {
            let Some(query) = read_query(query)? else {
                std::process::exit(2);
            };
            println!("{}", sql::format_query(&query));
            Ok(())
        }
        Some(Command::Analyze { intent, json, query }) => {
            let Some(query) = read_query(query)? else {
                std::process::exit(2);
            };
            let service = setup_service(llm_config, credentials)?.with_status_sink(Arc::new(LogStatus));
            if !analyze_once(&service, &query, &intent, json).await? {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn setup_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_names(false)
        .with_ansi(true)
        .with_timer(tracing_subscriber::fmt::time::LocalTime::rfc_3339())
        .with_level(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to install log subscriber")?;
    Ok(())
}

fn setup_llm_config(args: &Args) -> (LLMConfig, Credentials) {
    let config = LLMConfig::new(args.api_url.clone(), args.model.clone(), args.timeout);
    let credentials = Credentials::new(
        args.api_key.clone(),
        Some(args.site_url.clone()),
        Some(args.site_name.clone()),
    );
    (config, credentials)
}

fn setup_service(config: LLMConfig, credentials: Credentials) -> Result<AnalysisService<HttpTransport>> {
    let transport = HttpTransport::new().context("Failed to create HTTP client")?;
    Ok(AnalysisService::new(transport, config, credentials))
}

/// Take the query from the argument, or from stdin when it is missing or `-`.
/// Returns `None` (after warning) for blank input.
fn read_query(arg: Option<String>) -> Result<Option<String>> {
    let query = match arg {
        Some(query) if query != "-" => query,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read query from stdin")?;
            buf
        }
    };

    if query.trim().is_empty() {
        eprintln!("{} Consulta vacía.", "Advertencia:".yellow());
        return Ok(None);
    }
    Ok(Some(query))
}

async fn analyze_once(
    service: &AnalysisService<HttpTransport>,
    query: &str,
    intent: &str,
    json: bool,
) -> Result<bool> {
    if json {
        let guard = ui::InterruptGuard::install();
        let result = service.analyze_named(query, intent, guard.signal()).await;
        println!("{}", serde_json::to_string_pretty(&result).context("Failed to serialize result")?);
        return Ok(result.success());
    }

    let intent = match intent.parse::<AnalysisIntent>() {
        Ok(intent) => intent,
        Err(err) => {
            eprintln!("{} {}", "Error:".red().bold(), err);
            return Ok(false);
        }
    };

    if intent == AnalysisIntent::Recommendations {
        render::print_formatted_query(&sql::format_query(query));
    }
    let result = ui::run_analysis(service, query, intent).await;
    render::print_analysis(&result, ui::menu::labels_for(intent));
    Ok(result.success())
}
