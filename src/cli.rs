use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::import::Importer;
use crate::source::SourceCatalog;

#[derive(Debug, Parser)]
#[command(
    name = "callbook",
    version,
    about = "Merge amateur-radio license and activity data into per-callsign JSON records"
)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run one source against its input file.
    Import {
        /// Source name, e.g. en, am, lotw, lotw-file.
        source: String,
        /// Input file, defaults to the source's own.
        #[arg(long, value_name = "PATH")]
        input: Option<PathBuf>,
        /// Where list-missing sources write callsigns without a record.
        #[arg(long, value_name = "PATH")]
        missing_list: Option<PathBuf>,
        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the available sources.
    Sources,
    /// Look for corrupt, misplaced and half-written records.
    Check {
        /// Print the check report as JSON.
        #[arg(long)]
        json: bool,
    },
}

pub fn parse_command(args: &[String]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(args)
}

pub fn run_with_args(args: &[String]) -> i32 {
    let cli = match parse_command(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() { 2 } else { 0 };
        }
    };

    match &cli.command {
        Command::Import {
            source,
            input,
            missing_list,
            json,
        } => handle_import(&cli.config, source, input.as_ref(), missing_list.as_ref(), *json),
        Command::Sources => handle_sources(&cli.config),
        Command::Check { json } => handle_check(&cli.config, *json),
    }
}

fn load_catalog(config: &Config) -> Option<SourceCatalog> {
    match config.catalog() {
        Ok(catalog) => Some(catalog),
        Err(err) => {
            eprintln!("failed to load sources: {err}");
            None
        }
    }
}

fn handle_import(
    config: &Config,
    source: &str,
    input: Option<&PathBuf>,
    missing_list: Option<&PathBuf>,
    as_json: bool,
) -> i32 {
    let Some(catalog) = load_catalog(config) else {
        return 1;
    };
    let spec = match catalog.get(source) {
        Ok(spec) => spec,
        Err(err) => {
            let names: Vec<&str> = catalog.iter().map(|s| s.name.as_str()).collect();
            eprintln!("{err} (available: {})", names.join(", "));
            return 2;
        }
    };

    let store = config.store();
    let input = input.cloned().unwrap_or_else(|| spec.input.clone());
    let mut importer = Importer::new(&store, spec);
    if let Some(path) = missing_list {
        importer = importer.with_missing_list(path);
    }

    let report = match importer.run_path(&input) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("import failed: {err}");
            return 1;
        }
    };

    if as_json {
        match serde_json::to_string_pretty(&report) {
            Ok(payload) => println!("{payload}"),
            Err(err) => {
                eprintln!("failed to serialize import report: {err}");
                return 1;
            }
        }
    } else {
        println!("import complete: {report}");
    }

    if report.has_critical_failures() {
        eprintln!(
            "import finished with {} critical failure(s)",
            report.corrupt_records + report.io_failures
        );
        for failure in report.failures.iter().filter(|f| f.kind.is_critical()) {
            eprintln!(
                "- line {} ({}): {}",
                failure.line,
                failure.callsign.as_deref().unwrap_or("?"),
                failure.message
            );
        }
        return 1;
    }
    0
}

fn handle_sources(config: &Config) -> i32 {
    let Some(catalog) = load_catalog(config) else {
        return 1;
    };
    println!("name\taction\tinput\tdescription");
    for spec in catalog.iter() {
        println!(
            "{}\t{}\t{}\t{}",
            spec.name,
            spec.action,
            spec.input.display(),
            spec.description.as_deref().unwrap_or("")
        );
    }
    0
}

fn handle_check(config: &Config, as_json: bool) -> i32 {
    let store = config.store();
    let report = match store.check() {
        Ok(report) => report,
        Err(err) => {
            eprintln!("check failed: {err}");
            return 1;
        }
    };

    if as_json {
        match serde_json::to_string_pretty(&report) {
            Ok(payload) => println!("{payload}"),
            Err(err) => {
                eprintln!("failed to serialize check report: {err}");
                return 1;
            }
        }
    } else {
        println!(
            "checked {} record(s) in {} prefix(es) under {}",
            report.records_checked,
            report.prefixes_checked,
            store.root().display()
        );
    }

    if report.is_clean() {
        return 0;
    }
    eprintln!("check failed: {} issue(s)", report.issues.len());
    for issue in &report.issues {
        eprintln!("- {} [{:?}]: {}", issue.path.display(), issue.kind, issue.detail);
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_import_with_options() {
        let cli = parse_command(&args(&[
            "callbook",
            "import",
            "am",
            "--input",
            "data/AM.dat",
            "--out",
            "../static/out",
        ]))
        .unwrap();

        assert_eq!(cli.config.out_dir, PathBuf::from("../static/out"));
        assert_eq!(
            cli.command,
            Command::Import {
                source: "am".to_string(),
                input: Some(PathBuf::from("data/AM.dat")),
                missing_list: None,
                json: false,
            }
        );
    }

    #[test]
    fn import_requires_a_source() {
        assert!(parse_command(&args(&["callbook", "import"])).is_err());
    }

    #[test]
    fn unknown_command_is_a_usage_error() {
        assert_eq!(run_with_args(&args(&["callbook", "serve"])), 2);
    }
}
