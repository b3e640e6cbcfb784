use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP API daemon
    Daemon {},

    /// Print all influencer profiles
    List {},

    /// Semantic search over influencer profiles
    Search {
        /// Natural language query
        query: String,

        /// Maximum number of results
        #[clap(short, long)]
        limit: Option<usize>,

        /// Include similarity scores in the output
        #[clap(long, default_value = "false")]
        scores: bool,
    },

    /// Print the generated embedding description for every profile
    Describe {},
}
