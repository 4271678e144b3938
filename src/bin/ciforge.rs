use ciforge::app::command_handlers;
use ciforge::app::command_support::logging_filter_for;
use ciforge::shared::logging::init_logging;

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    init_logging(&logging_filter_for(&args));
    let output = command_handlers::run_cli(args)?;
    println!("{output}");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
