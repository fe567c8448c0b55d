use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vsub",
    about = "Vsub - search, download and stream AnimeVietSub episodes",
    version,
    author
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Site origin, overrides the configured domain
    #[arg(long, global = true, env = "VSUB_DOMAIN")]
    pub domain: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search movies by title
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show movie details
    Details {
        /// Movie id
        id: u64,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the episodes of a movie
    Episodes {
        /// Movie id
        id: u64,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Download episodes as MPEG-TS files
    Download {
        /// Movie id
        id: u64,

        /// Episode number or range (e.g. 5, 2-11)
        #[arg(short, long)]
        episode: String,

        /// Existing output directory
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Save the decoded playlist of one episode
    Playlist {
        /// Movie id
        id: u64,

        /// Episode number
        #[arg(short, long)]
        episode: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Run the HLS proxy server
    Serve {
        /// Address to listen on, overrides the configured one
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Show configuration information
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_download() {
        let args = Args::parse_from([
            "vsub", "download", "42", "-e", "2-5", "-o", "/tmp/out", "--timeout", "5",
        ]);
        assert_eq!(args.timeout, Some(5));
        match args.command {
            Commands::Download {
                id,
                episode,
                output,
            } => {
                assert_eq!(id, 42);
                assert_eq!(episode, "2-5");
                assert_eq!(output, PathBuf::from("/tmp/out"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["vsub", "-q", "-v", "search", "x"]).is_err());
    }

    #[test]
    fn test_format_flag() {
        let args = Args::parse_from(["vsub", "details", "7", "--format", "json"]);
        assert!(matches!(
            args.command,
            Commands::Details {
                format: OutputFormat::Json,
                ..
            }
        ));
    }
}
