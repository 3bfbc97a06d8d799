use std::sync::Arc;

use anyhow::Result;
use colored::{Color, Colorize};
use dialoguer::{Confirm, Input, Select};
use tracing::debug;

use super::render::{self, ResultLabels};
use super::{run_analysis, SpinnerStatus};
use crate::llm::{AnalysisError, AnalysisIntent, AnalysisService, ChatTransport};
use crate::sql::format_query;

const MENU_ITEMS: [&str; 4] = [
    "1. Formatear consulta SQL",
    "2. Formatear y obtener recomendaciones de IA",
    "3. Explicar consulta SQL con IA",
    "4. Salir",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    FormatOnly,
    FormatAndRecommend,
    Explain,
    Exit,
}

impl MenuAction {
    fn from_index(index: usize) -> Self {
        match index {
            0 => Self::FormatOnly,
            1 => Self::FormatAndRecommend,
            2 => Self::Explain,
            _ => Self::Exit,
        }
    }
}

static RECOMMENDATION_LABELS: ResultLabels<'static> = ResultLabels {
    heading: "Recomendaciones de IA:",
    title: "Análisis IA",
    failure: "Error al obtener recomendaciones",
    color: Color::Magenta,
};

static EXPLANATION_LABELS: ResultLabels<'static> = ResultLabels {
    heading: "Explicación de la Consulta:",
    title: "Explicación IA",
    failure: "Error al obtener explicación",
    color: Color::Cyan,
};

pub fn labels_for(intent: AnalysisIntent) -> &'static ResultLabels<'static> {
    match intent {
        AnalysisIntent::Recommendations => &RECOMMENDATION_LABELS,
        AnalysisIntent::Explanation => &EXPLANATION_LABELS,
    }
}

/// Interactive main menu.
pub struct Menu<T> {
    service: AnalysisService<T>,
    spinner: Arc<SpinnerStatus>,
}

impl<T: ChatTransport> Menu<T> {
    pub fn new(service: AnalysisService<T>) -> Self {
        let spinner = Arc::new(SpinnerStatus::new());
        Self {
            service: service.with_status_sink(spinner.clone()),
            spinner,
        }
    }

    pub async fn run(&self) -> Result<()> {
        print!("\x1b[2J\x1b[1;1H");
        let credentials = self.service.credentials();
        println!(
            "{}",
            render::banner(
                credentials.display_name(),
                credentials.site_url.as_deref().unwrap_or(crate::llm::config::DEFAULT_SITE_URL),
            )
        );

        loop {
            println!("\n{}", "=".repeat(30));
            println!("{}", "  Menú Principal".blue().bold());
            println!("{}", "=".repeat(30));

            let choice = match Select::new()
                .with_prompt("Selecciona una opción")
                .items(&MENU_ITEMS)
                .default(3)
                .interact()
            {
                Ok(choice) => choice,
                Err(e) => {
                    debug!("Menu prompt closed: {}", e);
                    break;
                }
            };

            let action = MenuAction::from_index(choice);
            if action == MenuAction::Exit {
                break;
            }

            if let Err(e) = self.handle(action).await {
                debug!("Menu action aborted: {}", e);
                println!("\n{}", "Operación cancelada.".red().bold());
            }

            if !ask_to_continue() {
                break;
            }
        }

        println!("\n{}", format!("¡Gracias por usar {}!", self.service.credentials().display_name()).blue().bold());
        Ok(())
    }

    async fn handle(&self, action: MenuAction) -> Result<()> {
        let intent = match action {
            MenuAction::FormatOnly => {
                if let Some(query) = ask_query()? {
                    render::print_formatted_query(&format_query(&query));
                }
                return Ok(());
            }
            MenuAction::FormatAndRecommend => AnalysisIntent::Recommendations,
            MenuAction::Explain => AnalysisIntent::Explanation,
            MenuAction::Exit => return Ok(()),
        };

        if !self.service.credentials().has_api_key() {
            println!("{} {}", "Error:".red().bold(), AnalysisError::MissingCredentials);
            return Ok(());
        }

        let Some(query) = ask_query()? else {
            return Ok(());
        };

        match intent {
            AnalysisIntent::Recommendations => {
                render::print_formatted_query(&format_query(&query));
                println!("\n{}", "Obteniendo recomendaciones de IA...".blue().bold());
            }
            AnalysisIntent::Explanation => {
                println!("\n{}", "Obteniendo explicación de la IA...".blue().bold());
            }
        }

        let result = run_analysis(&self.service, &query, intent).await;
        self.spinner.clear();
        render::print_analysis(&result, labels_for(intent));
        Ok(())
    }
}

/// Prompt for a query. Blank input is rejected here, before the core sees it.
fn ask_query() -> Result<Option<String>> {
    let query: String = Input::new()
        .with_prompt("Ingresa tu consulta SQL")
        .allow_empty(true)
        .interact_text()?;

    if query.trim().is_empty() {
        println!("{} Consulta vacía.", "Advertencia:".yellow());
        return Ok(None);
    }
    Ok(Some(query))
}

fn ask_to_continue() -> bool {
    Confirm::new()
        .with_prompt("¿Deseas realizar otra operación?")
        .default(true)
        .interact()
        .unwrap_or(false)
}
