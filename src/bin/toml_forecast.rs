use clap::Parser;
use covid_forecast::app::runner::{self, RunRequest};
use covid_forecast::core::ConfigProvider;
use covid_forecast::utils::{logger, validation::Validate};
use covid_forecast::TomlConfig;

#[derive(Parser)]
#[command(name = "toml-forecast")]
#[command(about = "COVID-19 forecast driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "forecast.toml")]
    config: String,

    /// Region to forecast; unknown or absent means World
    #[arg(short, long)]
    region: Option<String>,

    /// Print the selectable regions and exit
    #[arg(long)]
    list_regions: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show the resolved configuration without loading any data
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting {}", config.app.name);
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // 摘要寫到 stdout，只在 dry run 或 verbose 時顯示
    if args.dry_run || args.verbose {
        display_config_summary(&config, &args);
    }

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no data will be loaded");
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let request = RunRequest {
        region: args.region.clone(),
        list_regions: args.list_regions,
        pretty: config.pretty_output(),
        monitor: monitor_enabled,
    };

    match runner::run(&config, &request).await {
        Ok(outcome) => match outcome.written_to {
            Some(path) => println!("📁 Output saved to: {}", path),
            None => println!("{}", outcome.body),
        },
        Err(e) => {
            tracing::error!(
                "❌ Forecast failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  App: {}", config.app.name);
    println!("  Source ({:?}): {}", config.source_kind(), config.confirmed_location());
    match config.deaths_location() {
        Some(deaths) => println!("  Deaths: {}", deaths),
        None => println!(
            "  Deaths: none (default mortality {})",
            config.default_mortality()
        ),
    }
    println!("  Curve: {}", config.curve());
    println!("  Region: {}", args.region.as_deref().unwrap_or("World"));
    if let Some(path) = config.output_path() {
        println!("  Output: {}", path);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
