use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "glf",
    about = "GLF token registry: token metadata and image hosting",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// List stored tokens, newest first
    List(ListArgs),
    /// Show a single token
    Show(ShowArgs),
    /// Show the hashtag ranking
    Hashtags(HashtagsArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML config file; defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the configured bind address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct DataDirArg {
    /// Directory holding data.json
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub data: DataDirArg,
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args)]
pub struct ShowArgs {
    pub token_id: String,
    #[command(flatten)]
    pub data: DataDirArg,
}

#[derive(Args)]
pub struct HashtagsArgs {
    #[command(flatten)]
    pub data: DataDirArg,
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_serve() {
        let cli = Cli::parse_from(["glf", "serve", "--config", "glf.toml", "--bind", "0.0.0.0:9000"]);
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.config, Some(PathBuf::from("glf.toml")));
                assert_eq!(args.bind.unwrap().port(), 9000);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn parse_show_with_global_flags() {
        let cli = Cli::parse_from(["glf", "show", "12", "--data-dir", "/tmp/d", "--format", "json", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Command::Show(args) => {
                assert_eq!(args.token_id, "12");
                assert_eq!(args.data.data_dir, PathBuf::from("/tmp/d"));
            }
            _ => panic!("expected show"),
        }
    }
}
