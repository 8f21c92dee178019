use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use gitpanel::AppError;
use gitpanel::cli::{self, Cli};
use gitpanel::config::Config;
use gitpanel::error_translation::ErrorTranslator;
use gitpanel::logging::{self, LogTarget};
use gitpanel::session::Session;
use gitpanel::ui::App;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::panic;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

fn report_error(error: &AppError) {
    let friendly = ErrorTranslator::translate_app_error(error);
    eprintln!("Error: {}", friendly.simple_message);
    if let Some(suggestion) = friendly.suggestion {
        eprintln!("  hint: {}", suggestion);
    }
    log::debug!("{}", friendly.raw_error);
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let target = if args.wants_tui() {
        match Config::config_dir() {
            Ok(dir) => LogTarget::File(dir.join("gitpanel.log")),
            Err(_) => LogTarget::Stderr,
        }
    } else {
        LogTarget::Stderr
    };
    if let Err(e) = logging::init_logger(target, args.global.verbose) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let config = match Config::load_or_default() {
        Ok(config) => config,
        Err(e) => {
            report_error(&e.into());
            return ExitCode::FAILURE;
        }
    };

    match args.command {
        Some(command) if !matches!(command, cli::Commands::Tui) => {
            match cli::run_command(command, &args.global, &config).await {
                Ok(true) => ExitCode::SUCCESS,
                Ok(false) => ExitCode::FAILURE,
                Err(e) => {
                    report_error(&e);
                    ExitCode::FAILURE
                }
            }
        }
        _ => {
            let mut session = match cli::open_session(&args.global, &config).await {
                Ok(session) => session,
                Err(e) => {
                    report_error(&e);
                    return ExitCode::FAILURE;
                }
            };
            if let Err(e) = session.select_current_branch(&CancellationToken::new()).await {
                log::warn!("could not read the current branch: {}", e);
            }

            match run_tui(session, &config).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

async fn run_tui(session: Session, config: &Config) -> io::Result<()> {
    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, &config.ui);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}
