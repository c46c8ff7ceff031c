use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use securescan::config::{Config, CONFIG_FILE_NAME};
use securescan::error::ScanError;
use securescan::ir::Language;
use securescan::output::OutputFormat;
use securescan::rules::{RuleEngine, Severity};
use securescan::ScanOptions;

/// Exit code when the policy verdict fails.
const EXIT_POLICY_FAILED: i32 = 2;

#[derive(Parser)]
#[command(
    name = "securescan",
    about = "Static vulnerability scanner for JavaScript, TypeScript, Python and Go",
    version,
    author
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a source tree for vulnerabilities
    Scan {
        /// Directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format (console, json, sarif)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Drop findings below this severity (info, low, medium, high, critical)
        #[arg(long)]
        min_severity: Option<String>,

        /// Comma-separated languages to scan (javascript, typescript, python, go)
        #[arg(long, value_delimiter = ',')]
        languages: Option<Vec<String>>,

        /// Worker threads (0 = one per CPU)
        #[arg(long, env = "SECURESCAN_CONCURRENCY")]
        concurrency: Option<usize>,

        /// Minimum severity to fail (info, low, medium, high, critical)
        #[arg(long)]
        fail_on: Option<String>,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List all available detection rules
    ListRules {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter .securescan.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Scan {
            path,
            config,
            format,
            min_severity,
            languages,
            concurrency,
            fail_on,
            output,
        } => cmd_scan(ScanArgs {
            path,
            config,
            format,
            min_severity,
            languages,
            concurrency,
            fail_on,
            output,
        }),
        Commands::ListRules { format } => cmd_list_rules(format),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string())))
        .init();
}

struct ScanArgs {
    path: PathBuf,
    config: Option<PathBuf>,
    format: String,
    min_severity: Option<String>,
    languages: Option<Vec<String>>,
    concurrency: Option<usize>,
    fail_on: Option<String>,
    output: Option<PathBuf>,
}

fn cmd_scan(args: ScanArgs) -> Result<i32, ScanError> {
    let format = OutputFormat::from_str_lenient(&args.format).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", args.format);
        OutputFormat::Console
    });

    let fail_on = args.fail_on.and_then(|s| {
        let sev = Severity::from_str_lenient(&s);
        if sev.is_none() {
            eprintln!("Warning: unknown severity '{}', using config default", s);
        }
        sev
    });

    let min_severity = args.min_severity.and_then(|s| {
        let sev = Severity::from_str_lenient(&s);
        if sev.is_none() {
            eprintln!("Warning: unknown severity '{}', using config default", s);
        }
        sev
    });

    let languages = match args.languages {
        Some(names) => Some(parse_languages(&names)?),
        None => None,
    };

    let options = ScanOptions {
        config_path: args.config,
        languages,
        exclude_dirs: None,
        concurrency: args.concurrency,
        min_severity,
        fail_on_override: fail_on,
        cancel: None,
    };

    let report = securescan::scan(&args.path, &options)?;
    let rendered = securescan::render_report(&report, format)?;

    match args.output {
        Some(out) => securescan::output::write_to(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = pass, 2 = findings at or above threshold
    Ok(if report.verdict.pass {
        0
    } else {
        EXIT_POLICY_FAILED
    })
}

fn parse_languages(names: &[String]) -> Result<Vec<Language>, ScanError> {
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(|n| {
            Language::from_str_lenient(n)
                .ok_or_else(|| ScanError::Config(format!("unknown language '{n}'")))
        })
        .collect()
}

fn cmd_list_rules(format_str: String) -> Result<i32, ScanError> {
    let engine = RuleEngine::new();
    let rules = engine.list_rules();

    match format_str.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&rules)?;
            println!("{}", json);
        }
        _ => {
            println!(
                "{:<26} {:<26} {:<10} {:<10} ENGINE",
                "TYPE", "NAME", "SEVERITY", "CWE"
            );
            println!("{}", "-".repeat(84));
            for rule in &rules {
                println!(
                    "{:<26} {:<26} {:<10} {:<10} {}",
                    rule.kind,
                    rule.name,
                    rule.severity.to_string(),
                    rule.cwe,
                    rule.engine,
                );
            }
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, ScanError> {
    let path = PathBuf::from(CONFIG_FILE_NAME);

    if path.exists() && !force {
        eprintln!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created {CONFIG_FILE_NAME}");

    Ok(0)
}
