use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod config;
pub mod context;
pub mod init;
pub mod logging;
pub mod members;
pub mod query;
pub mod version;
pub mod vote;
pub mod workflow;

use accord::governance::VoteChoice;

#[derive(Parser)]
#[command(name = "accord")]
#[command(author = "Accord Project")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Operator CLI for the Accord bi-college price governance engine", long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.local/share/accord/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// College selector for `add-member`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollegeArg {
    Producer,
    Consumer,
}

/// Ballot choice for `vote`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChoiceArg {
    For,
    Against,
    Abstain,
}

impl From<ChoiceArg> for VoteChoice {
    fn from(choice: ChoiceArg) -> Self {
        match choice {
            ChoiceArg::For => VoteChoice::For,
            ChoiceArg::Against => VoteChoice::Against,
            ChoiceArg::Abstain => VoteChoice::Abstain,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a config file and create the initial state snapshot
    Init {
        /// Initial administrator (repeatable)
        #[arg(long = "admin", required = true)]
        admins: Vec<String>,

        /// Price committed before any proposal passes
        #[arg(long)]
        initial_price: u64,

        /// Path to the state snapshot (default: adjacent to the config file)
        #[arg(long)]
        state_path: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Register a producer or consumer
    AddMember {
        /// Acting administrator
        #[arg(long)]
        caller: String,

        /// Identity to register
        identity: String,

        /// College the member joins
        #[arg(long, value_enum)]
        college: CollegeArg,
    },

    /// Remove a member from its college
    RemoveMember {
        #[arg(long)]
        caller: String,
        identity: String,
    },

    /// Grant the administrator capability
    GrantAdmin {
        #[arg(long)]
        caller: String,
        identity: String,
    },

    /// Revoke the administrator capability
    RevokeAdmin {
        #[arg(long)]
        caller: String,
        identity: String,
    },

    /// Open proposal registration
    StartRegistration {
        #[arg(long)]
        caller: String,
    },

    /// Register a price proposal
    Propose {
        #[arg(long)]
        caller: String,

        /// Proposed price (nonzero)
        value: u64,
    },

    /// Close proposal registration
    EndRegistration {
        #[arg(long)]
        caller: String,
    },

    /// Open the voting session
    StartVoting {
        #[arg(long)]
        caller: String,
    },

    /// Cast a ballot on the active proposal
    Vote {
        /// Voting member
        #[arg(long)]
        caller: String,

        #[arg(value_enum)]
        choice: ChoiceArg,
    },

    /// Close the voting session
    EndVoting {
        #[arg(long)]
        caller: String,
    },

    /// Tally the active proposal and commit the price if it passes
    Execute {
        #[arg(long)]
        caller: String,
    },

    /// Return to voter registration after a tally
    Reset {
        #[arg(long)]
        caller: String,
    },

    /// Show phase, price, member counts and the open proposal
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one proposal with its weighted tally
    Proposal {
        /// Proposal id
        id: u64,
    },

    /// Show a recorded ballot
    Ballot {
        /// Proposal id
        proposal_id: u64,

        /// Voter identity
        voter: String,
    },

    /// Show the event log (most recent first)
    Events {
        /// Maximum number of entries
        #[arg(long, default_value_t = 50)]
        limit: usize,

        /// Only events for this proposal
        #[arg(long)]
        proposal: Option<u64>,
    },

    /// Display version information
    Version,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(config::default_config_path)
    }
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = cli.config_path();

    match cli.command {
        Commands::Init {
            admins,
            initial_price,
            state_path,
            force,
        } => init::execute(&config_path, admins, initial_price, state_path, force).await,
        Commands::AddMember {
            caller,
            identity,
            college,
        } => {
            members::add(
                &config_path,
                &caller,
                &identity,
                college == CollegeArg::Producer,
            )
            .await
        }
        Commands::RemoveMember { caller, identity } => {
            members::remove(&config_path, &caller, &identity).await
        }
        Commands::GrantAdmin { caller, identity } => {
            members::grant_admin(&config_path, &caller, &identity).await
        }
        Commands::RevokeAdmin { caller, identity } => {
            members::revoke_admin(&config_path, &caller, &identity).await
        }
        Commands::StartRegistration { caller } => {
            workflow::start_registration(&config_path, &caller).await
        }
        Commands::Propose { caller, value } => {
            workflow::propose(&config_path, &caller, value).await
        }
        Commands::EndRegistration { caller } => {
            workflow::end_registration(&config_path, &caller).await
        }
        Commands::StartVoting { caller } => workflow::start_voting(&config_path, &caller).await,
        Commands::Vote { caller, choice } => {
            vote::execute(&config_path, &caller, choice.into()).await
        }
        Commands::EndVoting { caller } => workflow::end_voting(&config_path, &caller).await,
        Commands::Execute { caller } => workflow::execute(&config_path, &caller).await,
        Commands::Reset { caller } => workflow::reset(&config_path, &caller).await,
        Commands::Status { json } => query::status(&config_path, json).await,
        Commands::Proposal { id } => query::proposal(&config_path, id).await,
        Commands::Ballot { proposal_id, voter } => {
            query::ballot(&config_path, proposal_id, &voter).await
        }
        Commands::Events { limit, proposal } => {
            query::events(&config_path, limit, proposal).await
        }
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}
