use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod writers;

use crate::commands::build::command_build;

#[derive(Parser)]
#[command(version, about, arg_required_else_help(true))]
struct Cli {
    #[command(subcommand)]
    commands: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a dependency graph from one or more class artifact roots.
    Build {
        #[arg(required = true)]
        roots: Vec<PathBuf>,

        #[arg(long, value_enum, default_value_t = Mode::Package)]
        mode: Mode,

        #[arg(long, value_enum, default_value_t = Size::Total)]
        size: Size,

        #[arg(long, value_enum, default_value_t = Format::Dot)]
        format: Format,

        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum Mode {
    Package,
    Class,
}

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum Size {
    Total,
    Code,
}

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum Format {
    Dot,
    Gml,
    Graphml,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            use clap::error::ErrorKind;
            let display_only =
                matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion);
            if display_only {
                print!("{err}");
                return ExitCode::from(0);
            }
            eprint!("{err}");
            return ExitCode::from(1);
        }
    };

    let result = match &cli.commands {
        Some(Commands::Build {
            roots,
            mode,
            size,
            format,
            output,
        }) => command_build(roots, *mode, *size, *format, output.as_deref()),
        None => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(err) => {
            eprintln!("{:#}", err);
            let code = if err.downcast_ref::<commands::build::UsageError>().is_some() {
                1
            } else {
                2
            };
            ExitCode::from(code)
        }
    }
}
