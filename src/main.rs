use anyhow::Result;
use clap::Parser;

use plantid::cli::commands::{ask, chat, configure, detect, ping, servers};
use plantid::cli::{Args, Command};
use plantid::output::{self, OutputConfig};
use plantid::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    output::init(OutputConfig::from_flags(args.quiet, args.no_color));
    logging::init(args.verbose);

    let code = match args.command {
        Some(Command::Chat { image, server }) => {
            let options = chat::ChatOptions {
                image,
                server: server.into(),
            };
            chat::run_chat(options).await?;
            exitcode::OK
        }
        Some(Command::Ask {
            plant,
            message,
            server,
        }) => {
            let options = ask::AskOptions {
                plant,
                message,
                server: server.into(),
            };
            ask::run_ask(options).await?
        }
        Some(Command::Ping { server }) => ping::run_ping(&server.into()).await?,
        Some(Command::Servers { name }) => {
            servers::print_servers(name.as_deref())?;
            exitcode::OK
        }
        Some(Command::Configure) => {
            configure::run_configure()?;
            exitcode::OK
        }
        None => {
            let options = detect::DetectOptions {
                image: args.image,
                server: args.server.into(),
                save: args.save,
                json: args.json,
            };
            detect::run_detect(options).await?
        }
    };

    if code != exitcode::OK {
        std::process::exit(code);
    }

    Ok(())
}
