use std::sync::Arc;

use atty::Stream;
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use pyfind_core::{
    CommandContext, ExecutionOutcome, GlobalOptions, PythonCandidatesRequest, PythonFindRequest,
    PythonInfoRequest, SystemEffects,
};
use serde_json::Value;

mod cli;
mod style;

use cli::{CommandCli, PyfindCli};
use style::Style;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = PyfindCli::parse();
    init_tracing(cli.trace, cli.verbose);

    let global = GlobalOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
        json: cli.json,
    };

    let outcome = dispatch(&global, &cli.command).map_err(|err| eyre!("{err:?}"))?;
    let code = emit_output(&cli, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(trace: bool, verbose: u8) {
    let level = if trace {
        "trace"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("pyfind={level},pyfind_core={level},pyfind_cli={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn dispatch(global: &GlobalOptions, command: &CommandCli) -> anyhow::Result<ExecutionOutcome> {
    let ctx = CommandContext::new(global, Arc::new(SystemEffects::new()));
    match command {
        CommandCli::Find(args) => pyfind_core::python_find(
            &ctx,
            &PythonFindRequest {
                spec: args.spec.clone(),
            },
        ),
        CommandCli::Info(args) => pyfind_core::python_info(
            &ctx,
            &PythonInfoRequest {
                path: args.path.clone(),
            },
        ),
        CommandCli::Candidates(args) => pyfind_core::python_candidates(
            &ctx,
            &PythonCandidatesRequest {
                spec: args.spec.clone(),
            },
        ),
    }
}

fn emit_output(cli: &PyfindCli, outcome: &ExecutionOutcome) -> Result<i32> {
    let code = outcome.exit_code();
    let command = cli.command.name();
    let style = Style::new(cli.no_color, atty::is(Stream::Stdout));

    if cli.json {
        let payload = pyfind_core::to_json_response(command, outcome);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(code);
    }

    if cli.quiet {
        if code != 0 {
            eprintln!(
                "{}",
                pyfind_core::format_status_message(command, &outcome.message)
            );
        }
        return Ok(code);
    }

    let mut lines = outcome.message.lines();
    let headline = lines.next().unwrap_or_default();
    let message = pyfind_core::format_status_message(command, headline);
    println!("{}", style.status(&outcome.status, &message));
    for line in lines {
        println!("  {}", style.candidate(line));
    }
    if let Some(hint) = hint_from_details(&outcome.details) {
        println!("{}", style.hint(hint));
    }

    Ok(code)
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}
