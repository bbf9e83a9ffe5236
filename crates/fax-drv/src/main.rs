use clap::Parser;

use fax_drv::cli::Cli;
use fax_drv::error::DriverError;

fn main() {
    let cli = Cli::parse();
    let outcome = fax_drv::run(&cli);
    std::process::exit(match outcome {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            match err {
                DriverError::CcFailed(code) => code,
                _ => 1,
            }
        }
    });
}
