//! Command-line entry point for the family tree core.
//!
//! # Responsibility
//! - Keep a smoke probe that verifies `familytree_core` linkage.
//! - Drive GEDCOM inspect/import/export against files and databases.
//!
//! Usage:
//! - `familytree` / `familytree ping` / `familytree version`
//! - `familytree inspect <file.ged>`
//! - `familytree import <db> <file.ged>`
//! - `familytree export <db> [out.ged]`

use familytree_core::db::open_db;
use familytree_core::{
    core_version, parse_gedcom_bytes, ping, GedcomService, LoggingConfig, SqlitePersonRepository,
};
use log::info;
use std::error::Error;
use std::fs;
use std::io::{self, BufReader, Write};
use std::process::ExitCode;

type CliResult = Result<(), Box<dyn Error>>;

const USAGE: &str = "usage: familytree [ping|version|inspect <file>|import <db> <file>|export <db> [out]]";

fn main() -> ExitCode {
    if let Some(config) = LoggingConfig::from_env() {
        if let Err(err) = config.init() {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[&str]) -> CliResult {
    match args {
        [] => {
            // Probe output stays stable for quick local sanity checks.
            println!("familytree_core ping={}", ping());
            println!("familytree_core version={}", core_version());
            Ok(())
        }
        ["ping"] => {
            println!("{}", ping());
            Ok(())
        }
        ["version"] => {
            println!("{}", core_version());
            Ok(())
        }
        ["inspect", file] => inspect(file),
        ["import", db, file] => import(db, file),
        ["export", db] => export(db, None),
        ["export", db, out] => export(db, Some(*out)),
        _ => Err(USAGE.into()),
    }
}

fn inspect(file: &str) -> CliResult {
    let bytes = fs::read(file).map_err(|err| format!("cannot read `{file}`: {err}"))?;
    let result = parse_gedcom_bytes(&bytes);

    for diagnostic in &result.errors {
        eprintln!("warning: {diagnostic}");
    }
    println!("{}", serde_json::to_string_pretty(&result.members)?);
    Ok(())
}

fn import(db: &str, file: &str) -> CliResult {
    let conn = open_db(db)?;
    let service = GedcomService::new(SqlitePersonRepository::new(&conn));
    let reader = fs::File::open(file).map_err(|err| format!("cannot open `{file}`: {err}"))?;

    let result = service.import_reader(BufReader::new(reader))?;
    for diagnostic in &result.errors {
        eprintln!("warning: {diagnostic}");
    }
    println!(
        "imported {} members, {} parse warnings",
        result.members.len(),
        result.errors.len()
    );
    info!(
        "event=cli_import module=cli status=ok members={} warnings={}",
        result.members.len(),
        result.errors.len()
    );
    Ok(())
}

fn export(db: &str, out: Option<&str>) -> CliResult {
    let conn = open_db(db)?;
    let service = GedcomService::new(SqlitePersonRepository::new(&conn));
    let text = service.export_all()?;

    match out {
        Some(path) => fs::write(path, text).map_err(|err| format!("cannot write `{path}`: {err}"))?,
        None => io::stdout().lock().write_all(text.as_bytes())?,
    }
    info!("event=cli_export module=cli status=ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn unknown_command_reports_usage() {
        let err = run(&["frobnicate"]).unwrap_err();
        assert!(err.to_string().starts_with("usage:"));
    }

    #[test]
    fn import_then_export_round_trips_through_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("family.sqlite3");
        let source = dir.path().join("in.ged");
        let target = dir.path().join("out.ged");
        std::fs::write(
            &source,
            "0 HEAD\n0 @I1@ INDI\n1 NAME 三 /张/\n1 SEX M\n0 TRLR\n",
        )
        .unwrap();

        let db = db.to_str().unwrap();
        run(&["import", db, source.to_str().unwrap()]).unwrap();
        run(&["export", db, target.to_str().unwrap()]).unwrap();

        let exported = std::fs::read_to_string(&target).unwrap();
        assert!(exported.contains("1 NAME 三 /张/"));
        assert!(exported.trim_end().ends_with("0 TRLR"));
    }
}
