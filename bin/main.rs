use std::fs::File;
use std::io::BufReader;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dnrs::bdd::NodeStore;
use dnrs::network::parser::read_network;
use dnrs::optimize::{OptimizeOptions, Optimizer, ReportStyle};

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    None,
}

impl LogLevel {
    fn to_trace(&self) -> Option<tracing::Level> {
        Some(match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::None => return None,
        })
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the textual network description
    #[arg(short, long, value_name = "network.dnet")]
    network_path: String,

    /// Path to the diagram of feasible configurations; read from stdin
    /// when omitted
    #[arg(short, long, value_name = "diagram.bdd")]
    bdd_path: Option<String>,

    /// How to render the result.
    #[arg(short, long, value_enum, default_value_t = ReportStyle::Summary)]
    report: ReportStyle,

    /// Leave the analytic lower bound out of the report.
    #[arg(long)]
    no_lower_bound: bool,

    /// Verbosity level. See `tracing::Level` for more information.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    verbosity: LogLevel,

    /// Print timing statistics.
    #[arg(short, long)]
    print_statistics: bool,
}

#[derive(Debug, Clone, Default)]
struct Statistics {
    parsing: Option<Duration>,
    optimization: Option<Duration>,
}

impl Statistics {
    fn print(&self) {
        println!("parsing time     : {:.2?}", self.parsing.unwrap());
        println!("optimization time: {:.2?}", self.optimization.unwrap());
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    if let Some(level) = args.verbosity.to_trace() {
        tracing_subscriber::fmt().with_max_level(level).init();
    }

    let mut statistics = Statistics::default();

    let parsing_start = Instant::now();
    let network_file = File::open(&args.network_path)
        .with_context(|| format!("could not open network file '{}'", args.network_path))?;
    let network = read_network(&mut BufReader::new(network_file))
        .with_context(|| format!("could not parse network file '{}'", args.network_path))?;

    let store = match &args.bdd_path {
        Some(path) => {
            let bdd_file =
                File::open(path).with_context(|| format!("could not open BDD file '{path}'"))?;
            NodeStore::from_reader(&mut BufReader::new(bdd_file))
                .with_context(|| format!("could not parse BDD file '{path}'"))?
        }
        None => NodeStore::from_reader(&mut std::io::stdin().lock())
            .context("could not parse BDD from stdin")?,
    };
    statistics.parsing = Some(parsing_start.elapsed());

    let optimization_start = Instant::now();
    let solution = Optimizer::new(&network, &store)
        .run()
        .context("optimization failed")?;
    statistics.optimization = Some(optimization_start.elapsed());

    let options = OptimizeOptions::builder()
        .report_style(args.report)
        .lower_bound(!args.no_lower_bound)
        .build();
    print!("{}", solution.render(&network, &options));

    if args.print_statistics {
        statistics.print();
    }

    Ok(())
}
