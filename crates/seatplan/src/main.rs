#![forbid(unsafe_code)]

use clap::Parser;

fn main() {
    seatplan::util::init_logging();
    let cli = seatplan::Cli::parse();
    let json = cli.global.json;
    if let Err(error) = seatplan::run(cli) {
        if json {
            eprintln!(
                "{}",
                serde_json::json!({
                    "status": "error",
                    "error": error.to_string(),
                    "exit_code": error.exit_code(),
                })
            );
        } else {
            eprintln!("seatplan: {error}");
        }
        std::process::exit(error.exit_code());
    }
}
