use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "picam-tui",
    version,
    about = "Terminal settings editor for the Raspberry Pi camera viewer"
)]
pub struct Cli {
    /// Settings file to edit instead of the one in the user data directory.
    #[arg(long, global = true)]
    pub settings_file: Option<PathBuf>,

    /// Log file to write instead of the one in the user data directory.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive settings editor.
    Settings,
    /// Print the current settings.
    Show(ShowArgs),
    /// Restore default settings and drop any suspended editing session.
    Reset,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Print machine-readable JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn no_subcommand_opens_the_editor() {
        let cli = Cli::try_parse_from(["picam-tui"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from([
            "picam-tui",
            "show",
            "--json",
            "--settings-file",
            "/tmp/s.json",
            "-vv",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 2);
        assert_eq!(
            cli.settings_file.as_deref(),
            Some(std::path::Path::new("/tmp/s.json"))
        );
        assert!(matches!(cli.command, Some(Command::Show(args)) if args.json));
    }
}
