//! Console rendering: banner, panels and result blocks.

use colored::{Color, Colorize};
use unicode_width::UnicodeWidthStr;

use crate::llm::AnalysisResult;

const BANNER_ART: &str = r"  ____                      ____   ___  _
 / ___|_ __ _____      __  / ___| / _ \| |
| |  _| '__/ _ \ \ /\ / /  \___ \| | | | |
| |_| | | | (_) \ V  V /    ___) | |_| | |___
 \____|_|  \___/ \_/\_/    |____/ \__\_\_____|";

const TAGLINE: &str = "Herramienta profesional para formatear y analizar consultas SQL";

/// Draw `body` inside a rounded box, with an optional title in the top border.
pub fn panel(body: &str, title: Option<&str>, color: Color) -> String {
    panel_with(body, title, color, |_, line| line.to_string())
}

/// Like [`panel`], styling each body line through `paint` after the layout
/// has been measured on the plain text.
fn panel_with(body: &str, title: Option<&str>, color: Color, paint: impl Fn(usize, &str) -> String) -> String {
    let lines: Vec<&str> = if body.is_empty() { vec![""] } else { body.lines().collect() };
    let title_width = title.map(|t| t.width() + 2).unwrap_or(0);
    let inner = lines
        .iter()
        .map(|line| line.width())
        .max()
        .unwrap_or(0)
        .max(title_width);

    let mut out = match title {
        Some(title) => {
            let fill = inner + 2 - title_width;
            let left = fill / 2;
            format!(
                "{} {} {}",
                format!("╭{}", "─".repeat(left)).color(color),
                title.bold(),
                format!("{}╮", "─".repeat(fill - left)).color(color)
            )
        }
        None => format!("╭{}╮", "─".repeat(inner + 2)).color(color).to_string(),
    };
    out.push('\n');

    for (index, line) in lines.iter().enumerate() {
        let pad = inner - line.width();
        out.push_str(&format!(
            "{} {}{} {}\n",
            "│".color(color),
            paint(index, line),
            " ".repeat(pad),
            "│".color(color)
        ));
    }
    out.push_str(&format!("╰{}╯", "─".repeat(inner + 2)).color(color).to_string());
    out
}

pub fn banner(site_name: &str, site_url: &str) -> String {
    let art = if site_name == crate::llm::config::DEFAULT_SITE_NAME {
        BANNER_ART
    } else {
        site_name
    };
    let art_lines = art.lines().count();

    let body = format!("{}\n\n{}\nby @Nair-Villagran ({})", art, TAGLINE, site_url);
    let version = format!("v{}", env!("CARGO_PKG_VERSION"));

    panel_with(&body, Some(version.as_str()), Color::BrightBlue, |index, line| {
        if index < art_lines {
            line.cyan().bold().to_string()
        } else if line == TAGLINE {
            line.italic().yellow().to_string()
        } else {
            line.green().to_string()
        }
    })
}

/// `75.5` seconds becomes `1m 15.50s`.
pub fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor();
    format!("{}m {:.2}s", minutes as u64, seconds - minutes * 60.0)
}

pub fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

pub fn print_formatted_query(formatted: &str) {
    println!("\n{}", "Consulta formateada:".green().bold());
    println!("{}", panel(formatted, None, Color::BrightBlack));
}

/// Labels used when printing an analysis outcome.
pub struct ResultLabels<'a> {
    pub heading: &'a str,
    pub title: &'a str,
    pub failure: &'a str,
    pub color: Color,
}

pub fn print_analysis(result: &AnalysisResult, labels: &ResultLabels<'_>) {
    match (result.content(), result.error()) {
        (Some(content), _) => {
            println!("\n{}", labels.heading.color(labels.color).bold());
            let body = if content.is_empty() { "(la IA no devolvió contenido)" } else { content };
            println!("{}", panel(body, Some(labels.title), labels.color));
            println!(
                "\n{}",
                format!("Tiempo de análisis IA: {}", format_duration(result.duration_seconds())).dimmed()
            );
        }
        (None, Some(err)) => {
            println!("{} {}", format!("{}:", labels.failure).red().bold(), err);
        }
        (None, None) => {}
    }
}
