use std::path::Path;
use std::process;

use clap::ArgEnum;
use env_logger;
use log;

use tape_sort::config::{Config, DEFAULT_CONFIG_PATH};
use tape_sort::gen::generate_tape;
use tape_sort::{Emulation, ExternalSorterBuilder};

fn main() {
    let arg_parser = build_arg_parser();

    let log_level: LogLevel = arg_parser.value_of_t_or_exit("log_level");
    init_logger(log_level);

    let config_path = arg_parser.value_of("config").expect("value is required");
    let config = Config::load(Path::new(config_path));

    if let Some(mut generate) = arg_parser.values_of("generate") {
        let count = generate.next().expect("two values are required");
        let path = generate.next().expect("two values are required");

        let count: usize = match count.parse() {
            Ok(count) if count > 0 => count,
            _ => {
                log::error!("wrong generation size: {}", count);
                process::exit(1);
            }
        };

        let seed: Option<u64> = arg_parser
            .is_present("seed")
            .then(|| arg_parser.value_of_t_or_exit("seed"));

        match generate_tape(Path::new(path), count, seed) {
            Ok(values) => {
                println!("file generated: {}", path);
                println!("tape size: {}", values.len());
            }
            Err(err) => {
                log::error!("tape generation error: {}", err);
                process::exit(1);
            }
        }

        return;
    }

    let input = arg_parser.value_of("input").expect("value is required");
    let output = arg_parser.value_of("output").expect("value is required");

    let mut sorter_builder = ExternalSorterBuilder::new()
        .with_timing(config.timing)
        .with_mode(config.mode);

    if let Some(tmp_dir) = arg_parser.value_of("tmp_dir") {
        sorter_builder = sorter_builder.with_tmp_dir(Path::new(tmp_dir));
    }

    if arg_parser.is_present("memory_budget") {
        sorter_builder = sorter_builder.with_memory_budget(arg_parser.value_of_t_or_exit("memory_budget"));
    }

    let sorter = match sorter_builder.build() {
        Ok(sorter) => sorter,
        Err(err) => {
            log::error!("sorter initialization error: {}", err);
            process::exit(1);
        }
    };

    match sorter.sort(Path::new(input), Path::new(output)) {
        Ok(stats) => {
            log::info!("tape sorted: {} -> {} ({} runs)", input, output, stats.runs);
            if config.mode != Emulation::Disabled {
                println!("execution time: {} ms", stats.retired_cost.as_millis());
            }
        }
        Err(err) => {
            log::error!("tape sorting error: {}", err);
            process::exit(1);
        }
    }
}

#[derive(Copy, Clone, clap::ArgEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn possible_values() -> impl Iterator<Item = clap::PossibleValue<'static>> {
        Self::value_variants().iter().filter_map(|v| v.to_possible_value())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <LogLevel as clap::ArgEnum>::from_str(s, false)
    }
}

fn build_arg_parser() -> clap::ArgMatches {
    clap::App::new("tape-sort")
        .about("external merge sort over an emulated tape device")
        .arg(
            clap::Arg::new("input")
                .short('i')
                .long("input")
                .help("tape file to be sorted")
                .required_unless_present("generate")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("result tape file (created or truncated)")
                .required_unless_present("generate")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("generate")
                .short('g')
                .long("generate")
                .help("generate a tape of COUNT random values at PATH instead of sorting")
                .number_of_values(2)
                .value_names(&["COUNT", "PATH"])
                .conflicts_with_all(&["input", "output"]),
        )
        .arg(
            clap::Arg::new("seed")
                .long("seed")
                .help("seed for tape generation, random when omitted")
                .takes_value(true)
                .requires("generate"),
        )
        .arg(
            clap::Arg::new("config")
                .short('c')
                .long("config")
                .help("emulation config file: read, write and shift latencies in ms plus mode (0/1/2)")
                .takes_value(true)
                .default_value(DEFAULT_CONFIG_PATH),
        )
        .arg(
            clap::Arg::new("memory_budget")
                .short('m')
                .long("memory-budget")
                .help("number of tape cells a single run may hold in memory")
                .takes_value(true)
                .validator(|v| match v.parse::<usize>() {
                    Ok(budget) if budget > 0 => Ok(()),
                    _ => Err(format!("memory budget must be a positive integer: {}", v)),
                }),
        )
        .arg(
            clap::Arg::new("tmp_dir")
                .short('d')
                .long("tmp-dir")
                .help("directory to be used to store scratch runs")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("log_level")
                .short('l')
                .long("loglevel")
                .help("logging level")
                .takes_value(true)
                .default_value("info")
                .possible_values(LogLevel::possible_values()),
        )
        .get_matches()
}

fn init_logger(log_level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(match log_level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        })
        .format_timestamp_millis()
        .init();
}
