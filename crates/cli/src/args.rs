use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "configurator", version, about = "Inspect product models and configurations")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List registered product models.
    Models,

    /// Show every step's options and whether they are currently selectable.
    Steps {
        /// Model id or slug.
        #[arg(long)]
        model: String,

        /// Selections as `step=option`.
        selections: Vec<String>,
    },

    /// Build the product code for a set of selections.
    Build {
        /// Model id or slug.
        #[arg(long)]
        model: String,

        /// Selections as `step=option`.
        selections: Vec<String>,
    },
}
