use clap::Parser;
use filechat::core::config;
use filechat::tui;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "filechat", about = "Chat with your spreadsheets from the terminal")]
struct Args {
    /// Base URL of the file chat server (overrides config and FILECHAT_BASE_URL)
    #[arg(short, long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Config errors are reported on stderr: the logger isn't up yet
    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}; falling back to defaults");
            config::FileChatConfig::default()
        }
    };
    let resolved = config::resolve(&file_config, args.base_url.as_deref());

    // Initialize file logger; the terminal belongs to the UI
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    log::info!("File Chat starting up against {}", resolved.base_url);

    tui::run(resolved)
}
