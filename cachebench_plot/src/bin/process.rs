use cachebench_plot::db::{self, ProfilingDB, ANALYSIS_DIR};
use clap::{App, Arg};
use color_eyre::eyre::{self, WrapErr};
use color_eyre::Report;

const DEFAULT_RESULTS_DIR: &str = "results";

fn main() -> Result<(), Report> {
    color_eyre::install()?;
    cachebench::util::init_tracing();

    let matches = App::new("process")
        .version("0.1")
        .about(
            "Collects the csv files of every benchmark folder \
             into one raw and one aggregated table.",
        )
        .arg(
            Arg::with_name("results_dir")
                .long("results-dir")
                .value_name("RESULTS_DIR")
                .help(
                    "directory with one folder per benchmark run; \
                     default: results",
                )
                .takes_value(true),
        )
        .get_matches();
    let results_dir =
        matches.value_of("results_dir").unwrap_or(DEFAULT_RESULTS_DIR);

    let db = ProfilingDB::load(results_dir).wrap_err_with(|| {
        format!("load benchmark folders in {}", results_dir)
    })?;
    if db.is_empty() {
        eyre::bail!("no data was collected in {}", results_dir);
    }

    let processed = db.write(results_dir)?;
    println!(
        "Analysis complete! Results saved to {}/{}",
        results_dir, ANALYSIS_DIR
    );
    db::print_summary(&processed);
    Ok(())
}
