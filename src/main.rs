mod args;
mod vgeo;

use clap::Parser;
use log::{info, warn};
use snafu::ErrorCompat;

use crate::args::Args;
use crate::vgeo::SourceOutcome;

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    info!("args: {:?}", args);

    let res = match &args.config {
        Some(config_path) => vgeo::run_config(config_path, args.out.clone()).map(|report| {
            for (source, outcome) in report.outcomes.iter() {
                match outcome {
                    SourceOutcome::Completed {
                        candidates,
                        warnings,
                    } => info!(
                        "{}: {} candidates classified, {} warnings",
                        source, candidates, warnings
                    ),
                    SourceOutcome::Aborted { reason } => warn!("{}: aborted: {}", source, reason),
                }
            }
            for e in report.errors.iter() {
                warn!("{}", e);
            }
            if let Some(summary) = &report.comparison {
                info!(
                    "comparison: same voting type: {}, different: {}",
                    summary.same, summary.different
                );
            }
            report.all_completed()
        }),
        None => vgeo::run_single(&args).map(|_| true),
    };

    match res {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("An error occured: {}", e);
            if let Some(bt) = ErrorCompat::backtrace(&e) {
                eprintln!("trace: {}", bt);
            }
            std::process::exit(1);
        }
    }
}
