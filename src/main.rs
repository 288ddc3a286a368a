//! webstacks' main application entry point.
//! Parses command-line arguments, assembles the requested template, and
//! prints the serialized JSON document to standard output.

use webstacks::{
    cli::{get_args, Args},
    config::StackConfig,
    defaults::Defaults,
    error::{default_error_handler, Result},
    stack::build_template,
};

fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Off
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn run(args: Args) -> Result<()> {
    let defaults = match &args.defaults_file {
        Some(path) => Defaults::load(path)?,
        None => Defaults::default(),
    };

    let config = StackConfig { infra: args.infra, gov_cloud: args.gov_cloud, defaults };
    let template = build_template(&config);
    println!("{}", template.to_json()?);
    Ok(())
}
