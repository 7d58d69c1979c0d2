use clap::Parser;
use log::{info, LevelFilter};
use snafu::ErrorCompat;

mod args;
mod survey;

fn main() {
    let args = args::Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }
    info!("args: {:?}", args);

    let res = if args.list_competencies {
        survey::list_competencies(&args)
    } else {
        survey::run(&args)
    };

    if let Err(e) = res {
        eprintln!("Error processing file: {}", survey::error_message(&e));
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
