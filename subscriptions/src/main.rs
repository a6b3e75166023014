#![warn(clippy::all, rust_2018_idioms)]

use std::{io, process::ExitCode};

use clap::Parser;
use subscriptions::{output::Reporter, Args, Config, Error};
use subscriptions_backend::CloudPubsub;

fn main() -> ExitCode {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    match try_main(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(args: Args) -> Result<(), Error> {
    let config = Config::from_args(args)?;

    let service = CloudPubsub::connect(&config.project_id).map_err(Error::Connect)?;

    let mut reporter = Reporter::new(config.output, io::stdout().lock());
    subscriptions::run(&service, &config.run, &mut reporter)
}
