use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
};

use omalg::{
    io::{read_automaton, read_omega_semigroup, write_automaton, write_omega_semigroup, ParseError},
    prelude::*,
};

use thiserror::Error;
use tracing::{debug, info, trace, warn};
use tracing_subscriber::{filter, prelude::*};

use clap::{Arg, ArgAction, ArgMatches, Command};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Semantic(#[from] OmalgError),
    #[error("could not open {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
    #[error("could not write output: {0}")]
    Io(#[from] std::io::Error),
}

fn cli() -> clap::Command {
    Command::new("omalg")
        .about("Translations between omega-automata and omega-semigroups")
        .subcommand_required(true)
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_missing_value("info")
                .global(true),
        )
        .arg(
            Arg::new("input-file")
                .short('i')
                .long("input-file")
                .help("read from this file instead of stdin")
                .global(true),
        )
        .arg(
            Arg::new("output-file")
                .short('o')
                .long("output-file")
                .help("write to this file instead of stdout")
                .global(true),
        )
        .arg(
            Arg::new("suppress-warnings")
                .short('s')
                .long("suppress-warnings")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("a2os")
                .about("reads an automaton and computes an omega-semigroup recognizing its language")
                .arg(
                    Arg::new("syntactic")
                        .long("syntactic")
                        .help("reduce the result to the syntactic omega-semigroup")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("os2p")
                .about("reads an omega-semigroup and builds a deterministic parity automaton"),
        )
        .subcommand(
            Command::new("os2d")
                .about("reads an omega-semigroup and builds a deterministic Büchi automaton"),
        )
        .subcommand(
            Command::new("os2c")
                .about("reads an omega-semigroup and builds a deterministic co-Büchi automaton"),
        )
        .subcommand(
            Command::new("os2w")
                .about("reads an omega-semigroup and builds a deterministic weak Büchi automaton"),
        )
        .subcommand(
            Command::new("classify")
                .about("reports the classes of the Landweber hierarchy the language belongs to")
                .arg(automaton_flag()),
        )
        .subcommand(
            Command::new("show")
                .about("prints the tables of an omega-semigroup")
                .arg(automaton_flag()),
        )
}

fn automaton_flag() -> Arg {
    Arg::new("automaton")
        .short('a')
        .long("automaton")
        .help("the input is an automaton, which is converted into an omega-semigroup first")
        .action(ArgAction::SetTrue)
}

fn setup_logging(matches: &ArgMatches) {
    let level = match matches
        .try_get_one::<String>("verbosity")
        .ok()
        .flatten()
        .map(|m| m.as_str())
    {
        Some("trace") => filter::LevelFilter::TRACE,
        Some("debug") => filter::LevelFilter::DEBUG,
        Some("info") => filter::LevelFilter::INFO,
        _ if matches.get_flag("suppress-warnings") => filter::LevelFilter::ERROR,
        _ => filter::LevelFilter::WARN,
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .without_time()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn input(matches: &ArgMatches) -> Result<Box<dyn Read>, CliError> {
    match matches.get_one::<String>("input-file") {
        Some(path) => {
            debug!("reading from {path}");
            let file = File::open(path).map_err(|source| CliError::File {
                path: path.clone(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => {
            warn!("no input file given, reading from stdin");
            Ok(Box::new(std::io::stdin().lock()))
        }
    }
}

fn output(matches: &ArgMatches) -> Result<Box<dyn Write>, CliError> {
    match matches.get_one::<String>("output-file") {
        Some(path) => {
            debug!("writing to {path}");
            let file = File::create(path).map_err(|source| CliError::File {
                path: path.clone(),
                source,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => {
            warn!("no output file given, writing to stdout");
            Ok(Box::new(std::io::stdout().lock()))
        }
    }
}

fn read_semigroup(matches: &ArgMatches, from_automaton: bool) -> Result<OmegaSemigroup, CliError> {
    if from_automaton {
        let aut = read_automaton(input(matches)?)?;
        info!("read {} with {} states", aut.class(), aut.size());
        Ok(aut.to_omega_semigroup())
    } else {
        Ok(read_omega_semigroup(input(matches)?)?)
    }
}

fn run(matches: &ArgMatches) -> Result<(), CliError> {
    let start = std::time::Instant::now();
    match matches.subcommand() {
        Some(("a2os", sub_matches)) => {
            let aut = read_automaton(input(matches)?)?;
            info!("read {} with {} states", aut.class(), aut.size());
            let mut os = aut.to_omega_semigroup();
            if sub_matches.get_flag("syntactic") {
                os.reduce_to_syntactic();
            }
            info!(
                "computed omega-semigroup with {} finite and {} infinite elements in {}µs",
                os.s_plus().size(),
                os.omega_size(),
                start.elapsed().as_micros()
            );
            write_omega_semigroup(output(matches)?, &os)?;
        }
        Some((conversion @ ("os2p" | "os2d" | "os2c" | "os2w"), _)) => {
            let os = read_omega_semigroup(input(matches)?)?;
            let aut = match conversion {
                "os2p" => os.to_parity(),
                "os2d" => os.to_det_buechi()?,
                "os2c" => os.to_co_buechi()?,
                _ => os.to_weak_buechi()?,
            };
            info!(
                "built {} with {} states in {}µs",
                aut.class(),
                aut.size(),
                start.elapsed().as_micros()
            );
            write_automaton(output(matches)?, &aut)?;
        }
        Some(("classify", sub_matches)) => {
            let os = read_semigroup(matches, sub_matches.get_flag("automaton"))?;
            let mut out = output(matches)?;
            for (class, holds) in os.classify() {
                let answer = if holds { "yes" } else { "no" };
                writeln!(out, "{class}: {answer}")?;
            }
        }
        Some(("show", sub_matches)) => {
            let os = read_semigroup(matches, sub_matches.get_flag("automaton"))?;
            writeln!(output(matches)?, "{}", os.show())?;
        }
        _ => unreachable!(),
    }
    Ok(())
}

pub fn main() {
    let matches = cli().get_matches();

    setup_logging(&matches);

    if let Err(e) = run(&matches) {
        eprintln!("omalg: {e}");
        std::process::exit(1);
    }
}
