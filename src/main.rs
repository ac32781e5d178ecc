//! # riksprot
//!
//! Extraction of speeches from tagged parliamentary protocols.
//!
//! ## Getting started
//!
//! ```sh
//! riksprot 0.1.0
//! parliamentary protocol speech extraction.
//!
//! USAGE:
//!     riksprot <SUBCOMMAND>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!
//! SUBCOMMANDS:
//!     extract    Extract speeches from tagged protocols
//!     help       Prints this message or the help of the given subcommand(s)
//!     list       List the protocols of a source folder
//! ```
//!
use std::io::Write;

use riksprot::corpus::Catalog;
use riksprot::error::Error;
use riksprot::pipelines::{Extract, Pipeline};
use structopt::StructOpt;

#[macro_use]
extern crate log;

mod cli;

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::Riksprot::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::Riksprot::Extract(e) => {
            let p = Extract::new(e.into());
            let stats = p.run()?;
            info!("done: {:?}", stats.target);
        }
        cli::Riksprot::List(l) => {
            let catalog = Catalog::load(&l.source_folder, &l.pattern, l.year_filter.as_ref())?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for item in &catalog {
                writeln!(out, "{}\t{}\t{}", item.name(), item.year(), item.path().display())?;
            }
        }
    };
    Ok(())
}
