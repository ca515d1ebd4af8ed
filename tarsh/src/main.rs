use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::debug;
use tarsh::{Config, Interpreter, ListingMode, Outcome};

#[derive(Debug, Parser)]
#[command(name = "tarsh", about = "Browse a tar archive with a small shell")]
struct Args {
    /// JSON config with host_identity, archive_location and log_destination
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Archive to browse (overrides the config)
    #[arg(long, value_name = "TAR")]
    archive: Option<PathBuf>,
    /// Action log to append to (overrides the config)
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,
    /// Host identity reported by `uname` (overrides the config)
    #[arg(long)]
    host: Option<String>,
    /// List immediate children instead of every name sharing the prefix
    #[arg(long)]
    children: bool,
    /// Run `;`-separated commands and exit instead of reading stdin
    #[arg(short = 'c', value_name = "SCRIPT")]
    script: Option<String>,
}

fn build_config(args: &Args) -> Result<Config> {
    let mut cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => {
            let (Some(archive), Some(log)) = (&args.archive, &args.log) else {
                bail!("either --config or both --archive and --log are required");
            };
            Config { host_identity: None, ..Config::new("", archive, log) }
        }
    };
    if let Some(a) = &args.archive { cfg.archive_location = a.clone(); }
    if let Some(l) = &args.log { cfg.log_destination = l.clone(); }
    if let Some(h) = &args.host { cfg.host_identity = Some(h.clone()); }
    if args.children { cfg.listing = ListingMode::Children; }
    Ok(cfg)
}

fn print_outcome(out: &mut impl Write, outcome: &Outcome) -> Result<()> {
    if !outcome.text().is_empty() { writeln!(out, "{}", outcome.text())?; }
    out.flush()?;
    Ok(())
}

fn run_script(shell: &mut Interpreter, script: &str) -> Result<()> {
    let mut stdout = io::stdout();
    for line in script.split(';').filter(|s| !s.trim().is_empty()) {
        let outcome = shell.run_command(line)?;
        print_outcome(&mut stdout, &outcome)?;
        if outcome.is_exit() { break; }
    }
    Ok(())
}

fn run_repl(shell: &mut Interpreter) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();
    loop {
        write!(stdout, "{}:{}$ ", shell.host(), shell.session().current_dir())?;
        stdout.flush()?;
        let Some(line) = lines.next() else {
            debug!("stdin closed without exit");
            writeln!(stdout)?;
            break;
        };
        let outcome = shell.run_command(&line.context("reading command line")?)?;
        print_outcome(&mut stdout, &outcome)?;
        if outcome.is_exit() { break; }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("TARSH_LOG", "warn")).init();
    let args = Args::parse();
    let cfg = build_config(&args)?;
    let mut shell = Interpreter::new(&cfg)
        .with_context(|| format!("starting shell over {}", cfg.archive_location.display()))?;
    match &args.script {
        Some(script) => run_script(&mut shell, script),
        None => run_repl(&mut shell),
    }
}
