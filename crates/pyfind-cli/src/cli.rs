use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

pub const PYFIND_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nCommands:\n{subcommands}\n\nGlobal options:\n{options}\n";

pub const PYFIND_BEFORE_HELP: &str = concat!(
    "pyfind ",
    env!("CARGO_PKG_VERSION"),
    " – locate a Python interpreter matching a spec\n\n",
    "  Specs look like `3`, `3.12`, `python3.11`, `pypy3-64` or an absolute path.\n",
    "  An empty spec accepts any interpreter.\n",
);

#[derive(Parser, Debug)]
#[command(
    name = "pyfind",
    author,
    version,
    propagate_version = false,
    disable_help_subcommand = true,
    before_help = PYFIND_BEFORE_HELP,
    help_template = PYFIND_HELP_TEMPLATE
)]
pub struct PyfindCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging (-vv reaches trace)", global = true)]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: CommandCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandCli {
    #[command(about = "Print the first interpreter that satisfies SPEC.")]
    Find(SpecArgs),
    #[command(about = "Inspect one interpreter executable.")]
    Info(InfoArgs),
    #[command(about = "List every proposed interpreter for SPEC in discovery order.")]
    Candidates(SpecArgs),
}

impl CommandCli {
    pub fn name(&self) -> &'static str {
        match self {
            CommandCli::Find(_) => "find",
            CommandCli::Info(_) => "info",
            CommandCli::Candidates(_) => "candidates",
        }
    }
}

#[derive(Args, Debug)]
pub struct SpecArgs {
    #[arg(
        value_name = "SPEC",
        default_value = "",
        help = "Interpreter spec (e.g. 3.12, pypy3, cpython3.11-64, /usr/bin/python3)"
    )]
    pub spec: String,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[arg(value_name = "PATH", help = "Interpreter executable to inspect")]
    pub path: PathBuf,
}
