pub mod menu;
pub mod render;
pub mod status;

pub use menu::Menu;
pub use status::SpinnerStatus;

use colored::Colorize;
use tokio::task::JoinHandle;

use crate::llm::{AnalysisIntent, AnalysisResult, AnalysisService, CancelSignal, ChatTransport, ErrorKind};

/// Raises a [`CancelSignal`] on Ctrl+C for as long as the guard is alive.
pub struct InterruptGuard {
    signal: CancelSignal,
    watcher: JoinHandle<()>,
}

impl InterruptGuard {
    pub fn install() -> Self {
        let signal = CancelSignal::new();
        let trigger = signal.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                trigger.cancel();
            }
        });
        Self { signal, watcher }
    }

    pub fn signal(&self) -> &CancelSignal {
        &self.signal
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

/// Run one analysis with the usual console chatter around it.
pub async fn run_analysis<T: ChatTransport>(
    service: &AnalysisService<T>,
    query: &str,
    intent: AnalysisIntent,
) -> AnalysisResult {
    println!(
        "\n{}",
        format!("[{}] Iniciando solicitud a la IA ({})...", render::timestamp(), intent).yellow()
    );
    println!(
        "{} La API puede tardar hasta {} segundos o más en responder...",
        "Nota:".yellow(),
        service.config().timeout_seconds
    );

    let guard = InterruptGuard::install();
    let result = service.analyze(query, intent, guard.signal()).await;
    drop(guard);

    if result.error().map(|e| e.kind()) == Some(ErrorKind::Cancelled) {
        println!("\n{}", "Operación cancelada por el usuario.".red().bold());
    } else {
        println!(
            "{}",
            format!(
                "[{}] Solicitud completada en {:.2}s",
                render::timestamp(),
                result.duration_seconds()
            )
            .yellow()
        );
    }

    result
}
