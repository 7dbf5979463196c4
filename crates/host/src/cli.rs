// crates/host/src/cli.rs

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "verlofrooster")]
#[command(version, about = "Verlofrooster - verlof en afwezigheid in SharePoint")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Tenant origin, e.g. https://organisatie.sharepoint.com
    #[arg(long, global = true, env = "VERLOF_SITE_ORIGIN")]
    pub origin: Option<String>,

    /// Site path below the origin
    #[arg(long, global = true, env = "VERLOF_SITE_PATH")]
    pub site_path: Option<String>,

    /// Raw Cookie header (FedAuth/rtFa)
    #[arg(long, global = true, env = "VERLOF_AUTH_COOKIE", hide_env_values = true)]
    pub cookie: Option<String>,

    /// OAuth bearer token; wins over --cookie
    #[arg(long, global = true, env = "VERLOF_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, global = true, env = "VERLOF_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Use canned data instead of SharePoint
    #[arg(long, global = true)]
    pub mock: bool,

    /// JSON file with extra or overriding list descriptors
    #[arg(long, global = true)]
    pub lists_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the signed-in user and their groups
    Whoami,

    /// Show the configured lists
    Lists,

    /// Read items from a list
    Items(ItemsArgs),

    /// Print the month roster
    Rooster {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },

    /// Submit a request (verlof, ziekte, compensatie, zittingsvrij)
    Aanvraag(AanvraagArgs),

    /// Approve a leave request
    Goedkeuren {
        id: u32,
        #[arg(long)]
        opmerking: Option<String>,
    },

    /// Reject a leave request
    Afwijzen {
        id: u32,
        #[arg(long)]
        opmerking: Option<String>,
    },

    /// Delete a roster item by type and id
    Verwijder {
        soort: String,
        id: u32,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Check access to a section; all sections when omitted
    Toegang { sectie: Option<String> },

    /// Post an item to the feedback forum
    Feedback {
        tekst: String,
        #[arg(long)]
        categorie: Option<String>,
    },
}

#[derive(Args)]
pub struct ItemsArgs {
    /// Logical list name, see `lists`
    pub key: String,

    #[arg(long)]
    pub select: Option<String>,

    #[arg(long)]
    pub filter: Option<String>,

    #[arg(long)]
    pub expand: Option<String>,

    #[arg(long)]
    pub orderby: Option<String>,

    #[arg(long)]
    pub top: Option<u32>,
}

#[derive(Args)]
pub struct AanvraagArgs {
    pub soort: String,

    /// Start, YYYY-MM-DD or YYYY-MM-DDTHH:MM
    #[arg(long)]
    pub start: String,

    /// End, same formats; a bare date means end of that day
    #[arg(long)]
    pub end: String,

    #[arg(long)]
    pub omschrijving: Option<String>,

    /// Compensation hours; derived from start/end when omitted
    #[arg(long)]
    pub uren: Option<f64>,
}
