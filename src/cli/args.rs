use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ResolveOptions;

#[derive(Parser, Debug)]
#[command(name = "plantid")]
#[command(about = "Identify plants from photos and chat about them")]
#[command(version)]
pub struct Args {
    /// Image to identify (`-` reads from stdin)
    pub image: Option<PathBuf>,

    #[command(flatten)]
    pub server: ServerArgs,

    /// Save the annotated image to this path
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Print the detection as JSON
    #[arg(long)]
    pub json: bool,

    /// Suppress status messages and spinners
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Show debug logs on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Backend selection shared by every command that talks to the service.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServerArgs {
    /// Server name from config.toml
    #[arg(short = 's', long)]
    pub server: Option<String>,

    /// Backend URL (overrides the server's endpoint)
    #[arg(short = 'e', long)]
    pub endpoint: Option<String>,
}

impl From<ServerArgs> for ResolveOptions {
    fn from(args: ServerArgs) -> Self {
        Self {
            server: args.server,
            endpoint: args.endpoint,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive shell: pick a photo, identify it, ask questions
    Chat {
        /// Image to open and identify on start
        image: Option<PathBuf>,

        #[command(flatten)]
        server: ServerArgs,
    },
    /// Ask one question about a plant
    Ask {
        /// Plant name
        plant: String,

        /// The question
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        #[command(flatten)]
        server: ServerArgs,
    },
    /// Check that the backend is reachable
    Ping {
        #[command(flatten)]
        server: ServerArgs,
    },
    /// List configured servers
    Servers {
        /// Show details for one server
        name: Option<String>,
    },
    /// Choose the default server
    Configure,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_one_shot_detection() {
        let args = Args::try_parse_from([
            "plantid", "leaf.jpg", "-s", "lab", "--save", "out.jpg", "--json",
        ])
        .unwrap();

        assert_eq!(args.image, Some(PathBuf::from("leaf.jpg")));
        assert_eq!(args.server.server, Some("lab".to_string()));
        assert_eq!(args.save, Some(PathBuf::from("out.jpg")));
        assert!(args.json);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_parse_chat_with_endpoint() {
        let args =
            Args::try_parse_from(["plantid", "chat", "-e", "http://10.0.0.5:8000", "leaf.jpg"])
                .unwrap();

        match args.command {
            Some(Command::Chat { image, server }) => {
                assert_eq!(image, Some(PathBuf::from("leaf.jpg")));
                assert_eq!(server.endpoint, Some("http://10.0.0.5:8000".to_string()));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_ask_joins_words() {
        let args = Args::try_parse_from(["plantid", "ask", "Neem", "is", "it", "edible?"]).unwrap();

        match args.command {
            Some(Command::Ask { plant, message, .. }) => {
                assert_eq!(plant, "Neem");
                assert_eq!(message.join(" "), "is it edible?");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_ask_requires_message() {
        assert!(Args::try_parse_from(["plantid", "ask", "Neem"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["plantid", "ping", "-q", "--no-color", "-v"]).unwrap();

        assert!(args.quiet);
        assert!(args.no_color);
        assert!(args.verbose);
    }

    #[test]
    fn test_server_args_into_resolve_options() {
        let options = ResolveOptions::from(ServerArgs {
            server: Some("lab".to_string()),
            endpoint: None,
        });
        assert_eq!(options.server, Some("lab".to_string()));
        assert!(options.endpoint.is_none());
    }
}
