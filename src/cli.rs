use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tubegram")]
#[command(author, version, about = "Interactive CLI for posting YouTube videos to a Telegram channel", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interactive download & upload pipeline (default)
    Run {
        /// Path to a Netscape-format cookies file (skips the prompt)
        #[arg(short, long)]
        cookies: Option<String>,

        /// Directory for temporary downloads (overrides DOWNLOAD_FOLDER)
        #[arg(short, long)]
        output_dir: Option<String>,
    },

    /// Print available formats for a URL and exit
    Info {
        /// YouTube video URL
        url: String,

        /// Path to a Netscape-format cookies file
        #[arg(short, long)]
        cookies: Option<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
