use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use webstacks::cli::Args;
use webstacks::config::Infra;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("webstacks")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_default_args() {
    let parsed = Args::try_parse_from(make_args(&[])).unwrap();

    assert_eq!(parsed.infra, Infra::Ecs);
    assert!(!parsed.gov_cloud);
    assert!(parsed.defaults_file.is_none());
    assert!(!parsed.verbose);
}

#[test]
fn test_infra_variants() {
    let parsed = Args::try_parse_from(make_args(&["--infra", "eb"])).unwrap();
    assert_eq!(parsed.infra, Infra::Eb);

    let parsed = Args::try_parse_from(make_args(&["-i", "ec2"])).unwrap();
    assert_eq!(parsed.infra, Infra::Ec2);
}

#[test]
fn test_invalid_infra_rejected() {
    assert!(Args::try_parse_from(make_args(&["--infra", "lambda"])).is_err());
}

#[test]
fn test_gov_cloud_flag() {
    let parsed = Args::try_parse_from(make_args(&["--gov-cloud"])).unwrap();
    assert!(parsed.gov_cloud);
}

#[test]
fn test_defaults_file() {
    let parsed =
        Args::try_parse_from(make_args(&["--defaults-file", "overrides.yml"])).unwrap();
    assert_eq!(parsed.defaults_file, Some(PathBuf::from("overrides.yml")));
}

#[test]
fn test_verbose_flag() {
    let parsed = Args::try_parse_from(make_args(&["-v"])).unwrap();
    assert!(parsed.verbose);
}
