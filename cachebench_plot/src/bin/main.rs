use cachebench::Dataset;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use color_eyre::eyre::{self, WrapErr};
use color_eyre::Report;
use std::path::Path;

// folder where all plots will be stored, unless `--output-dir` is given
const DEFAULT_OUTPUT_DIR: &str = ".";

// default inputs, relative to the working directory
const BENCHMARK_CSV: &str =
    "data/combined_benchmark_results_with_perf_20251002_072156.csv";
const HIT_RATE_CSV: &str =
    "data/combined_benchmark_results_with_perf_20251003_110829.csv";
const YCSB_WORKLOADS_CSV: &str =
    "data/combined_ycsb_benchmark_results_with_perf_20251004_051834.csv";
const YCSB_THREADS_CSV: &str =
    "data/combined_ycsb_benchmark_results_with_perf_20251015_043151.csv";
const YCSB_MEDIANS_CSV: &str =
    "data/combined_ycsb_benchmark_results_with_perf_20251008_152420.csv";
const YCSB_ORIGINAL_CSV: &str =
    "data/combined_ycsb_benchmark_results_with_perf_20251009_185641.csv";
const YCSB_DEVICE_AWARE_CSV: &str =
    "data/combined_device_aware_ycsb_results_with_perf_20251010_030225.csv";

const V1_HELP: &str = "csv file with the results of version 1";
const V2_HELP: &str = "csv file with the results of version 2";

// figures drawn from a single csv file: name, default input and description
const SINGLE_INPUT_FIGURES: [(&str, &str, &str); 8] = [
    (
        "figure5",
        BENCHMARK_CSV,
        "throughput of each policy variant per thread count",
    ),
    (
        "figure6",
        HIT_RATE_CSV,
        "hit rate and throughput of each policy variant per operation",
    ),
    (
        "figure7",
        BENCHMARK_CSV,
        "throughput per storage type on 1, 4 and 8 threads",
    ),
    (
        "figure8",
        BENCHMARK_CSV,
        "ranking of the policy variants per operation and storage type",
    ),
    (
        "figure9",
        BENCHMARK_CSV,
        "ranking of the policy variants per cache size",
    ),
    (
        "figure10",
        YCSB_WORKLOADS_CSV,
        "throughput per storage type on each YCSB workload",
    ),
    (
        "figure11",
        YCSB_THREADS_CSV,
        "YCSB throughput as the number of threads grows",
    ),
    (
        "figure12",
        YCSB_MEDIANS_CSV,
        "median YCSB throughput of each policy variant",
    ),
];

fn main() -> Result<(), Report> {
    color_eyre::install()?;
    cachebench::util::init_tracing();

    let matches = app().get_matches();
    let (figure, args) = match matches.subcommand() {
        (figure, Some(args)) => (figure, args),
        _ => eyre::bail!("no figure selected"),
    };
    let output_dir =
        Path::new(args.value_of("output_dir").unwrap_or(DEFAULT_OUTPUT_DIR));

    // load every input before touching the plotting backend
    let inputs = Inputs::load(figure, args)?;

    // set global style
    cachebench_plot::set_global_style()?;

    let result = match (figure, &inputs) {
        ("figure3", Inputs::Versions(v1, v2)) => {
            cachebench_plot::figure3(v1, v2, output_dir)
        }
        ("figure4", Inputs::Versions(v1, v2)) => {
            cachebench_plot::figure4(v1, v2, output_dir)
        }
        ("figure13", Inputs::DeviceAware(original, device_aware)) => {
            cachebench_plot::figure13(original, device_aware, output_dir)
        }
        (figure, Inputs::Single(dataset)) => match figure {
            "figure5" => cachebench_plot::figure5(dataset, output_dir),
            "figure6" => cachebench_plot::figure6(dataset, output_dir),
            "figure7" => cachebench_plot::figure7(dataset, output_dir),
            "figure8" => cachebench_plot::figure8(dataset, output_dir),
            "figure9" => cachebench_plot::figure9(dataset, output_dir),
            "figure10" => cachebench_plot::figure10(dataset, output_dir),
            "figure11" => cachebench_plot::figure11(dataset, output_dir),
            "figure12" => cachebench_plot::figure12(dataset, output_dir),
            figure => eyre::bail!("unknown figure {}", figure),
        },
        (figure, _) => eyre::bail!("unknown figure {}", figure),
    };
    result.wrap_err_with(|| format!("plot {}", figure))
}

// the datasets each figure is drawn from
enum Inputs {
    Versions(Dataset, Dataset),
    DeviceAware(Dataset, Dataset),
    Single(Dataset),
}

impl Inputs {
    fn load(figure: &str, args: &ArgMatches<'_>) -> Result<Self, Report> {
        let inputs = match figure {
            "figure3" | "figure4" => Self::Versions(
                load(args, "v1", None)?,
                load(args, "v2", None)?,
            ),
            "figure13" => Self::DeviceAware(
                load(args, "csv_original", Some(YCSB_ORIGINAL_CSV))?,
                load(args, "csv_device_aware", Some(YCSB_DEVICE_AWARE_CSV))?,
            ),
            figure => {
                let default = SINGLE_INPUT_FIGURES
                    .iter()
                    .find(|(name, _, _)| *name == figure)
                    .map(|(_, default, _)| *default);
                Self::Single(load(args, "csv", default)?)
            }
        };
        Ok(inputs)
    }
}

fn app() -> App<'static, 'static> {
    let mut app = App::new("main")
        .version("0.1")
        .about("Plots the results of the cache policy benchmarks.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("figure3")
                .about("per-run throughput of two tree versions")
                .arg(version_arg("v1", V1_HELP))
                .arg(version_arg("v2", V2_HELP))
                .arg(output_dir_arg()),
        )
        .subcommand(
            SubCommand::with_name("figure4")
                .about("cycles per instruction of two tree versions")
                .arg(version_arg("v1", V1_HELP))
                .arg(version_arg("v2", V2_HELP))
                .arg(output_dir_arg()),
        );

    for (name, _, about) in SINGLE_INPUT_FIGURES {
        app = app.subcommand(
            SubCommand::with_name(name)
                .about(about)
                .arg(
                    Arg::with_name("csv")
                        .long("csv")
                        .value_name("CSV")
                        .help(
                            "csv file with benchmark results; \
                             defaults to a file in data/",
                        )
                        .takes_value(true),
                )
                .arg(output_dir_arg()),
        );
    }

    app.subcommand(
        SubCommand::with_name("figure13")
            .about(
                "median YCSB throughput per storage type, \
                 device-aware policy included",
            )
            .arg(
                Arg::with_name("csv_original")
                    .long("csv-original")
                    .value_name("CSV")
                    .help(
                        "csv file with the YCSB results \
                         of the original policies",
                    )
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("csv_device_aware")
                    .long("csv-device-aware")
                    .value_name("CSV")
                    .help(
                        "csv file with the YCSB results \
                         of the device-aware policy",
                    )
                    .takes_value(true),
            )
            .arg(output_dir_arg()),
    )
}

fn version_arg(
    name: &'static str,
    help: &'static str,
) -> Arg<'static, 'static> {
    Arg::with_name(name)
        .long(name)
        .value_name("CSV")
        .help(help)
        .required(true)
        .takes_value(true)
}

fn output_dir_arg() -> Arg<'static, 'static> {
    Arg::with_name("output_dir")
        .long("output-dir")
        .value_name("OUTPUT_DIR")
        .help("directory where plots are stored; default: current directory")
        .takes_value(true)
}

// loads the csv file given as `arg`, or `default` if not given
fn load(
    args: &ArgMatches<'_>,
    arg: &str,
    default: Option<&str>,
) -> Result<Dataset, Report> {
    let path = match args.value_of(arg).or(default) {
        Some(path) => path,
        None => eyre::bail!("missing argument --{}", arg),
    };
    tracing::info!("loading data from {}", path);
    Dataset::load(path)
}
