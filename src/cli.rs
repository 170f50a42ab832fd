use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "lmsquiz", version, about = "Take timed assessments from the learning portal")]
pub struct Cli {
    /// Config file [default: platform config dir/config.yaml]
    #[arg(long, value_name = "path", global = true)]
    pub config: Option<PathBuf>,

    /// Portal address, overrides config and LMSQUIZ_BASE_URL
    #[arg(long, value_name = "url", global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Browse assessments and take them (default)
    Tui {
        /// Open this assessment directly
        #[arg(long, value_name = "id")]
        assessment: Option<u64>,
    },

    /// Store an access token after checking it against the portal
    Login {
        #[arg(long)]
        token: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in learner
    Whoami,

    /// List submitted attempts and their scores
    Results,

    /// List the materials of a course
    Materials {
        #[arg(value_name = "course-id")]
        course: u64,
    },

    /// Download a material and open it in the configured viewer
    Open {
        #[arg(value_name = "material-id")]
        material: u64,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Tui { assessment: None })
    }
}

impl Command {
    /// Whether the command talks to the portal and so needs its address.
    pub fn needs_portal(&self) -> bool {
        !matches!(self, Command::Logout)
    }
}
