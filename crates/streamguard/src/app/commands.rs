use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

const LONG_ABOUT: &str = "\
Supervise a single long-running stream recorder process.\n\
\n\
`serve` (the default) reconciles leftovers from a previous run and exposes\n\
the HTTP control API. The other commands act once against the PID marker\n\
and the source list, then exit.";

const AFTER_LONG_HELP: &str = r#"EXAMPLES:
    # Run the control API on the default address
    streamguard serve

    # Bind somewhere else
    streamguard serve --listen 127.0.0.1:9000

    # Manage the recorder without the API
    streamguard start
    streamguard status --format json
    streamguard stop

    # Maintain the source list
    streamguard sources add "https://live.douyin.com/123" --name Alice
    streamguard sources list"#;

#[derive(Parser)]
#[command(name = "streamguard")]
#[command(author, version, propagate_version = true)]
#[command(about = "Supervisor and HTTP control plane for a stream recorder")]
#[command(long_about = LONG_ABOUT)]
#[command(after_long_help = AFTER_LONG_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json)
    #[arg(
        short,
        long,
        global = true,
        value_enum,
        value_name = "FORMAT",
        default_value_t = OutputFormat::Text,
        help_heading = "Output Options"
    )]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true, help_heading = "Debug Options")]
    pub verbose: bool,
}

impl Cli {
    pub fn effective_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve { listen: None })
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Reconcile leftovers, then serve the HTTP control API
    Serve {
        /// Listen address (overrides STREAMGUARD_LISTEN and PORT)
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,
    },

    /// Report whether the recorder is running
    Status,

    /// Start the recorder unless one is already running
    Start,

    /// Stop the recorder and any matching stragglers
    Stop,

    /// Inspect or extend the recorder's source list
    #[command(subcommand)]
    Sources(SourcesCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum SourcesCommand {
    /// List parsed source entries
    List,

    /// Append a source url unless it is already present
    Add {
        /// Stream url
        url: String,

        /// Display name written after the anchor tag
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
