use console::style;
use gitviz::cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    gitviz::logging::init(cli.verbose);

    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", style(format!("{err:#}")).for_stderr().red());
            ExitCode::FAILURE
        }
    }
}
