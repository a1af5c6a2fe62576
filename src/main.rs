use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::process::exit;

use certsweep::config::Config;
use certsweep::display::StatusDisplay;
use certsweep::metrics::prom::prometheus_metrics;
use certsweep::pool::Dispatcher;
use certsweep::report;

const SAMPLE_FILE: &str = "domains.txt";
const DEFAULT_CONFIG_FILE: &str = "certsweep.toml";

#[derive(Parser)]
#[command(name = "certsweep")]
#[command(version)]
#[command(about = "Concurrent TLS certificate expiry checker for batches of domains")]
struct Cli {
    /// File containing list of domains (one per line)
    #[arg(short, long)]
    file: Option<String>,

    /// Days threshold to consider as expiring soon
    #[arg(short, long)]
    threshold: Option<i64>,

    /// TLS port to check
    #[arg(short, long)]
    port: Option<u16>,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Output format (summary or json)
    #[arg(short, long)]
    output: Option<String>,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Write one structured log line per domain to this file
    #[arg(long)]
    log_file: Option<String>,

    /// Create a sample 'domains.txt' file and exit
    #[arg(long)]
    create_sample: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Push metrics to a Prometheus push gateway
    #[arg(long)]
    prometheus: bool,

    /// Prometheus push gateway address
    #[arg(long)]
    prometheus_address: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if cli.create_sample {
        create_sample_domains_file(SAMPLE_FILE);
        return;
    }

    let config = load_config(&cli);
    let threshold = config.threshold.unwrap_or(certsweep::DEFAULT_THRESHOLD);
    let port = config.port.unwrap_or(certsweep::DEFAULT_PORT);
    let workers = config.workers.unwrap_or(certsweep::DEFAULT_WORKERS);

    let domains = collect_domains(&config);
    if domains.is_empty() {
        eprintln!(
            "{} You must specify a domains file using -f/--file",
            "Error:".red()
        );
        eprintln!("{} Use --help to see available options", "Tip:".yellow());
        eprintln!(
            "{} Use --create-sample to create an example file",
            "Tip:".yellow()
        );
        exit(1);
    }

    println!("{}", "TLS Certificate Checker".bold().blue());
    println!(
        "{}",
        format!("Checking {} domain(s) on port {}", domains.len(), port).cyan()
    );
    println!("{}", format!("Warning threshold: {} days", threshold).yellow());
    println!("{}", format!("Using {} concurrent workers", workers).magenta());
    println!("{}", "═".repeat(80));
    println!("{}", "Starting certificate checks...".cyan());
    println!();

    let display = StatusDisplay::stdout();
    let dispatcher = Dispatcher::new(port, workers);
    let results = dispatcher.run(&domains, &display);
    display.clear();

    println!("{}", "═".repeat(80));
    match config.output.as_deref() {
        Some("json") => {
            let mut sorted = results.clone();
            report::sort_results(&mut sorted);
            match serde_json::to_string_pretty(&sorted) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("{} failed to serialize results: {}", "Error:".red(), e);
                    exit(1);
                }
            }
        }
        _ => print!("{}", report::render_report(&results, threshold)),
    }

    if let Some(path) = config.log_file.as_deref() {
        write_log_file(path, &results, threshold);
    }

    if let Some(prom) = config.prometheus.as_ref() {
        if prom.enabled == Some(true) {
            let address = prom
                .address
                .clone()
                .unwrap_or_else(|| "http://localhost:9091".to_string());
            prometheus_metrics(&results, threshold, &address);
        }
    }

    // Exit reflects whether the run completed, not whether every domain was
    // healthy. Callers wanting an unhealthy-exit-code can layer that on top.
    exit(0);
}

fn load_config(cli: &Cli) -> Config {
    let mut config = Config::default();

    let config_path = cli
        .config
        .clone()
        .or_else(|| Path::new(DEFAULT_CONFIG_FILE).exists().then(|| DEFAULT_CONFIG_FILE.to_string()));
    if let Some(path) = config_path {
        match Config::from_file(&path) {
            Ok(file_config) => config = config.merge_with(file_config),
            Err(e) => {
                eprintln!("{} reading config '{}': {}", "Error:".red(), path.cyan(), e);
                exit(1);
            }
        }
    }

    config.merge_with(Config::from_cli_args(
        cli.file.clone(),
        cli.threshold,
        cli.port,
        cli.workers,
        cli.output.clone(),
        cli.log_file.clone(),
        cli.prometheus.then_some(true),
        cli.prometheus_address.clone(),
    ))
}

/// Inline config domains plus the domains file, if one was given.
fn collect_domains(config: &Config) -> Vec<String> {
    let mut domains = config.domains.clone().unwrap_or_default();
    if let Some(path) = config.domains_file.as_deref() {
        domains.extend(read_domains_file(path));
    }
    domains
}

/// One domain per line, surrounding whitespace trimmed, blank lines ignored.
fn read_domains_file(path: &str) -> Vec<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{} reading file '{}': {}", "Error:".red(), path.cyan(), e);
            exit(1);
        }
    };
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn create_sample_domains_file(filename: &str) {
    let sample_domains = [
        "google.com",
        "github.com",
        "stackoverflow.com",
        "cloudflare.com",
        "mozilla.org",
    ];
    let content = sample_domains.join("\n") + "\n";
    match fs::write(filename, content) {
        Ok(()) => println!(
            "{} Sample domains file created: {}",
            "✓".green(),
            filename.cyan()
        ),
        Err(e) => {
            eprintln!("{} creating '{}': {}", "Error:".red(), filename.cyan(), e);
            exit(1);
        }
    }
}

fn write_log_file(path: &str, results: &[certsweep::ProbeResult], threshold: i64) {
    let lines = report::log_lines(results, threshold);
    if let Err(e) = fs::write(path, lines.join("\n") + "\n") {
        eprintln!("{} writing log file '{}': {}", "Error:".red(), path.cyan(), e);
    }
}
