#[macro_use]
extern crate log;

use chrono::Local;
use env_logger::Builder;
use failure::{format_err, Error, ResultExt};
use githuber::{CloneFailure, Config, Driver};
use log::LevelFilter;
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;

fn main() {
    let args = Args::from_args();

    if args.example_config {
        generate_example();
        return;
    }

    if let Err(e) = run(&args) {
        if let Some(clone_failure) = e.downcast_ref::<CloneFailure>() {
            let mut stderr = io::stderr();
            clone_failure.display(&mut stderr).ok();
        } else {
            eprintln!("Error: {}", e);

            for cause in e.iter_causes() {
                eprintln!("\tCaused By: {}", cause);
            }

            eprintln!("{}", e.backtrace());
        }

        process::exit(1);
    }
}

fn generate_example() {
    let example = Config::example();

    println!("{}", example.as_toml());
}

fn run(args: &Args) -> Result<(), Error> {
    initialize_logging(args)?;
    let cfg = args.config()?;

    if log_enabled!(log::Level::Debug) {
        for line in format!("{:#?}", cfg).lines() {
            debug!("{}", line);
        }
    }

    let (token, username, destination) = args.positional()?;
    let driver = Driver::new(cfg, token, username, destination);

    driver.run()?;

    Ok(())
}

#[derive(Debug, Clone, PartialEq, StructOpt)]
#[structopt(about = "Clone a GitHub user's public repositories, grouped by language.")]
struct Args {
    #[structopt(help = "A GitHub OAuth token")]
    token: Option<String>,
    #[structopt(help = "The user whose repositories will be cloned")]
    username: Option<String>,
    #[structopt(parse(from_os_str), help = "Where to put the clones")]
    destination: Option<PathBuf>,
    #[structopt(short = "c", long = "config", help = "An optional configuration file to use.")]
    config_file: Option<String>,
    #[structopt(
        short = "v",
        long = "verbose",
        parse(from_occurrences),
        help = "Verbose output (repeat for more verbosity)"
    )]
    verbosity: u64,
    #[structopt(long = "example-config", help = "Generate an example config and immediately exit.")]
    example_config: bool,
}

impl Args {
    pub fn config(&self) -> Result<Config, Error> {
        let config_file = match self.config_file {
            Some(ref path) => path,
            None => return Ok(Config::default()),
        };

        let config_file =
            shellexpand::full(config_file).context("Unable to expand wildcards")?;

        Config::from_file(&*config_file)
            .context("Couldn't load the config")
            .map_err(Into::into)
    }

    fn positional(&self) -> Result<(&str, &str, PathBuf), Error> {
        match (&self.token, &self.username, &self.destination) {
            (Some(token), Some(username), Some(dest)) => {
                Ok((token.as_str(), username.as_str(), dest.clone()))
            }
            _ => Err(format_err!(
                "Usage: githuber <oauth-token> <username> <destination-path>"
            )),
        }
    }
}

fn initialize_logging(args: &Args) -> Result<(), Error> {
    let mut builder = Builder::new();

    let level = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    builder.filter(Some("githuber"), level);

    if let Ok(filter) = env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    }

    builder.format(|out, record| {
        writeln!(
            out,
            "{} [{:5}] ({}): {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            location(record),
            record.args()
        )
    });

    builder.try_init()?;

    Ok(())
}

/// Where a log message came from, `target#line` when the line is known.
fn location(record: &log::Record) -> String {
    match record.line() {
        Some(line) => format!("{}#{}", record.target(), line),
        None => record.target().to_string(),
    }
}
