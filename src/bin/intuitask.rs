use anyhow::Result;
use intuitask::cli::{self, Command};
use intuitask::config::Config;
use intuitask::context::StandardContext;
use intuitask::storage::LocalFileStore;
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::env;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let parsed = match cli::parse_args(&args) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run 'intuitask --help' for usage.");
            std::process::exit(2);
        }
    };

    if parsed.command == Command::Help {
        cli::print_help("intuitask");
        return Ok(());
    }

    let ctx = StandardContext::new(parsed.root.clone());
    let config = Config::load_or_default(&ctx)?;

    let level = if parsed.verbose {
        log::LevelFilter::Debug
    } else {
        config.log_level.to_filter()
    };
    // Only fails if a logger is already installed.
    let _ = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let vault = config.vault_dir(&ctx)?;
    let store = LocalFileStore::new(&vault);
    let path = parsed.file.clone().unwrap_or_else(|| config.inbox_path());
    log::debug!("Vault: {}, file: {}", vault.display(), path.display());

    cli::run(
        &parsed.command,
        &store,
        &path,
        config.show_completed,
        &mut std::io::stdout(),
    )
}
