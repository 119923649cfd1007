//! CAN log to CSV command-line tool
//!
//! Converts a textual CAN bus log (BusMaster, PCAN-View or CL2000 export)
//! into a wide delimited signal table using the can-log-converter library.
//! Run settings come from command-line flags or from a TOML conversion
//! profile. Binary trace formats must be exported to text first.

use anyhow::{bail, Result};
use can_log_converter::{ConvertConfig, Converter, NameMode};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

mod config;

/// canlog2csv - Convert CAN bus text logs to signal tables
#[derive(Parser, Debug)]
#[command(name = "canlog2csv")]
#[command(about = "Convert CAN bus text logs to delimited signal tables", long_about = None)]
#[command(version)]
struct Args {
    /// Log file to convert (BusMaster, PCAN-View or CL2000; format is auto-detected)
    #[arg(value_name = "LOG", required_unless_present = "config")]
    log_file: Option<PathBuf>,

    /// DBC file(s) with signal definitions (later files win on ID clashes)
    #[arg(value_name = "DBC", required_unless_present = "config")]
    dbc_files: Vec<PathBuf>,

    /// Output file for the signal table
    #[arg(short, long, value_name = "FILE", default_value = "output.csv")]
    output: PathBuf,

    /// Cell delimiter for the output table
    #[arg(short, long, default_value = ";")]
    delimiter: char,

    /// Column naming scheme for decoded signals
    #[arg(short = 'n', long, value_enum, default_value_t = NameModeArg::Signal)]
    name_mode: NameModeArg,

    /// Add a reception counter column per catalog message
    #[arg(long)]
    message_counter: bool,

    /// Add a reception pulse column per catalog message
    #[arg(long)]
    message_pulser: bool,

    /// Conversion profile (TOML) carrying all of the above
    #[arg(
        short,
        long,
        value_name = "FILE",
        conflicts_with_all = [
            "log_file",
            "dbc_files",
            "output",
            "delimiter",
            "name_mode",
            "message_counter",
            "message_pulser",
        ]
    )]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

/// Column naming scheme, as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum NameModeArg {
    /// Bare signal name
    Signal,
    /// Message name, dot, signal name
    #[value(name = "message.signal")]
    MessageSignal,
}

impl From<NameModeArg> for NameMode {
    fn from(arg: NameModeArg) -> Self {
        match arg {
            NameModeArg::Signal => NameMode::Signal,
            NameModeArg::MessageSignal => NameMode::MessageSignal,
        }
    }
}

/// Everything one conversion run needs, resolved from flags or a profile
struct RunPlan {
    log_file: PathBuf,
    dbc_files: Vec<PathBuf>,
    output: PathBuf,
    table: ConvertConfig,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("canlog2csv v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using converter library v{}", can_log_converter::VERSION);

    let plan = resolve_run(&args)?;

    if !plan.log_file.exists() {
        bail!("Input file not found: {:?}", plan.log_file);
    }
    for dbc_path in &plan.dbc_files {
        if !dbc_path.exists() {
            bail!("DBC file not found: {:?}", dbc_path);
        }
    }

    run_conversion(&plan, args.quiet)
}

/// Resolve command-line flags or a TOML profile into one run plan
fn resolve_run(args: &Args) -> Result<RunPlan> {
    if let Some(config_path) = &args.config {
        log::info!("Loading conversion profile: {:?}", config_path);
        let profile = config::load_profile(config_path)?;
        if profile.input.dbc_files.is_empty() {
            bail!("Profile lists no DBC files: {:?}", config_path);
        }
        return Ok(RunPlan {
            log_file: profile.input.log_file,
            dbc_files: profile.input.dbc_files,
            output: profile.output.path,
            table: profile.output.table,
        });
    }

    let Some(log_file) = args.log_file.clone() else {
        bail!("No log file specified");
    };
    if args.dbc_files.is_empty() {
        bail!("No DBC files specified");
    }

    // The row terminator follows the chosen delimiter (trailing delimiter
    // plus CRLF), so `-d ,` changes both.
    let table = ConvertConfig::new()
        .with_delimiter(args.delimiter)
        .with_terminator(format!("{}\r\n", args.delimiter))
        .with_name_mode(args.name_mode.into())
        .with_message_counter(args.message_counter)
        .with_message_pulser(args.message_pulser);

    Ok(RunPlan {
        log_file,
        dbc_files: args.dbc_files.clone(),
        output: args.output.clone(),
        table,
    })
}

/// Load the DBC catalog, convert the log file and print a summary
fn run_conversion(plan: &RunPlan, quiet: bool) -> Result<()> {
    use std::io::{self, Write};

    if !quiet {
        println!("═══════════════════════════════════════════════");
        println!("  CAN Log Converter");
        println!("═══════════════════════════════════════════════\n");
    }

    let mut converter = Converter::new();

    for dbc_path in &plan.dbc_files {
        if !quiet {
            print!("Loading DBC: {:?} ... ", dbc_path);
            io::stdout().flush()?;
        }
        match converter.add_dbc(dbc_path) {
            Ok(_) => {
                if !quiet {
                    println!("✓");
                }
            }
            Err(e) => {
                if !quiet {
                    println!("✗");
                }
                eprintln!("Error loading DBC: {}", e);
                return Err(e.into());
            }
        }
    }

    let catalog = converter.catalog_stats();
    if !quiet {
        println!("\n📊 Signal catalog:");
        println!("  Messages: {}", catalog.messages);
        println!("  Signals:  {}", catalog.signals);

        println!("\n📄 Converting log file: {:?}", plan.log_file);
        println!("───────────────────────────────────────────────\n");
    }

    let stats = converter.convert_to_file(&plan.log_file, &plan.output, &plan.table)?;

    if !quiet {
        if let Some(format) = stats.format {
            println!("Detected format: {}", format);
        }
        println!("Rows written:    {}", stats.rows);
        println!("Matched rows:    {}", stats.matched_rows);
        println!("Signal columns:  {}", stats.columns);
        if stats.skipped_lines > 0 {
            println!("Skipped lines:   {}", stats.skipped_lines);
        }
        if stats.dlc_mismatches > 0 {
            println!("DLC mismatches:  {}", stats.dlc_mismatches);
        }
        println!("\n✓ CSV file created: {:?}", plan.output);
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
