use std::io::{self, Write};
use std::ops::RangeInclusive;
use std::path::Path;
use std::{env, process};

/// Shared `main` for the four tools.
///
/// `arity` counts positional arguments after the program name. A wrong count
/// prints the usage line; any error from `body` is printed to stderr on one
/// line, independent of the log level. Both exit with status 1.
pub fn main_with<F>(usage: &str, arity: RangeInclusive<usize>, body: F) -> !
where
    F: FnOnce(&[String]) -> anyhow::Result<()>,
{
    if let Err(e) = crate::logger::init() {
        eprintln!("logger: {e}");
    }

    let mut args = env::args();
    let program = args.next().unwrap_or_default();
    let args: Vec<String> = args.collect();

    if !arity.contains(&args.len()) {
        eprintln!("Usage: {} {usage}", program_name(&program));
        process::exit(1);
    }

    match body(&args) {
        Ok(()) => {
            let _ = io::stdout().flush();
            process::exit(0)
        }
        Err(e) => {
            log::debug!("{e:?}");
            eprintln!("{e:#}");
            process::exit(1);
        }
    }
}

fn program_name(argv0: &str) -> &str {
    Path::new(argv0).file_name().and_then(|n| n.to_str()).unwrap_or(argv0)
}

/// Last path component, as used in user-facing messages about host files.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
