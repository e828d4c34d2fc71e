use std::process;

use colored::Colorize;
use log::info;
use rsubresolve::input::Opts;
use rsubresolve::logger;
use rsubresolve::ResolveEngine;

#[tokio::main]
async fn main() {
    let opts = Opts::parse_compat(std::env::args_os());
    logger::init_logger(opts.verbose);

    let config = match opts.to_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n{} {}", "[!]".red(), e);
            process::exit(1);
        }
    };

    if !config.silent {
        print_banner();
    }

    let engine = ResolveEngine::new(config);
    match engine.run().await {
        Ok(report) => {
            info!(
                "done: {} confirmed, {} without records",
                report.stats.confirmed, report.stats.no_records
            );
            if !engine.config().silent {
                println!();
            }
        }
        Err(e) => {
            eprintln!("\nerror: {}", e);
            process::exit(1);
        }
    }
}

fn print_banner() {
    println!("{} rsubresolve : Subdomains Cleaning tool", "[#]".cyan());
    println!("{} Version : {}", "[#]".cyan(), env!("CARGO_PKG_VERSION"));
}
