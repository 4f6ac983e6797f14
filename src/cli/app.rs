use crate::cli::config::Config;
use crate::core::DiscoveryMode;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use std::io::Write;
use std::path::PathBuf;

/// Interactive console for population reports on the MySQL world database
#[derive(Parser, Debug)]
#[command(name = "world-reports", author, version, about, long_about = None)]
pub struct Cli {
    /// Run the database connectivity check and exit
    #[arg(short = 't', long = "test-db")]
    pub test_db: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file (defaults to config.toml in the data directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// How reports are registered at startup
    #[arg(long, value_enum, value_name = "MODE")]
    pub discovery: Option<DiscoveryMode>,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

/// What the process should do
#[derive(Debug)]
pub enum Mode {
    Completions(Shell),
    ConnectivityCheck,
    Interactive,
}

impl Mode {
    /// Whether this mode reads (and possibly creates) the config file
    pub fn needs_config(&self) -> bool {
        !matches!(self, Mode::Completions(_))
    }
}

/// Outcome of reading the command line
#[derive(Debug)]
pub enum Invocation {
    Run(Cli),
    /// An argument was not recognized; only the startup tips are shown
    Degraded { unknown: String },
}

impl Cli {
    /// Parse arguments, turning unrecognized ones into [`Invocation::Degraded`].
    ///
    /// `--help`, `--version` and malformed values of known flags come back
    /// as the clap error for the caller to print.
    pub fn parse_lenient<I, T>(args: I) -> Result<Invocation, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => Ok(Invocation::Run(cli)),
            Err(e) if e.kind() == ErrorKind::UnknownArgument => {
                let unknown = match e.get(ContextKind::InvalidArg) {
                    Some(ContextValue::String(arg)) => arg.clone(),
                    _ => "<unrecognized>".to_string(),
                };
                Ok(Invocation::Degraded { unknown })
            }
            Err(e) => Err(e),
        }
    }

    pub fn mode(&self) -> Mode {
        if let Some(shell) = self.completions {
            Mode::Completions(shell)
        } else if self.test_db {
            Mode::ConnectivityCheck
        } else {
            Mode::Interactive
        }
    }

    /// Configuration from file, environment and these flags, in that order.
    ///
    /// A file that cannot be read or parsed falls back to the defaults; the
    /// problem is returned alongside so the caller can report it.
    pub fn load_config(&self) -> (Config, Option<crate::core::WorldError>) {
        let loaded = match &self.config {
            Some(path) => Config::load_from_file(path),
            None => Config::load_default(),
        };
        let (config, mut problem) = match loaded {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        };

        let config = match config.clone().with_env_overrides() {
            Ok(config) => config,
            Err(e) => {
                if problem.is_none() {
                    problem = Some(e);
                }
                config
            }
        };

        (config.merge_with_cli_args(self), problem)
    }
}

/// Usage line followed by the startup tips
pub fn write_degraded<W: Write>(unknown: &str, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "WARNING: Unknown argument: {}", unknown)?;
    writeln!(out)?;
    writeln!(out, "{}", Cli::command().render_usage())?;
    writeln!(out)?;
    write_tips(out)
}

pub fn write_tips<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Application started without database access")?;
    writeln!(out, "TIP: Use --test-db or -t to run the database connectivity check")?;
    writeln!(out, "TIP: Use --help or -h for usage information")?;
    writeln!(out, "TIP: Run without options to start the interactive console")
}

/// Generate shell completion script
pub fn generate_completion<W: Write>(shell: Shell, out: &mut W) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_flags_is_interactive() {
        let cli = Cli::parse_from(["world-reports"]);
        assert!(matches!(cli.mode(), Mode::Interactive));
        assert!(!cli.verbose);
        assert!(cli.discovery.is_none());
    }

    #[test]
    fn test_short_and_long_test_db() {
        for flag in ["-t", "--test-db"] {
            let cli = Cli::parse_from(["world-reports", flag]);
            assert!(matches!(cli.mode(), Mode::ConnectivityCheck));
        }
    }

    #[test]
    fn test_completions_win_over_other_modes() {
        let cli = Cli::parse_from(["world-reports", "-t", "--completions", "bash"]);
        assert!(matches!(cli.mode(), Mode::Completions(Shell::Bash)));
    }

    #[test]
    fn test_only_completions_skip_config() {
        let completions = Cli::parse_from(["world-reports", "--completions", "zsh"]);
        assert!(!completions.mode().needs_config());

        for args in [vec!["world-reports"], vec!["world-reports", "-t"]] {
            assert!(Cli::parse_from(args).mode().needs_config());
        }
    }

    #[test]
    fn test_discovery_flag() {
        let cli = Cli::parse_from(["world-reports", "--discovery", "manifest", "-c", "/tmp/w.toml"]);
        assert_eq!(cli.discovery, Some(DiscoveryMode::Manifest));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/w.toml")));
    }

    #[test]
    fn test_unknown_flag_degrades() {
        match Cli::parse_lenient(["world-reports", "--frobnicate"]) {
            Ok(Invocation::Degraded { unknown }) => assert_eq!(unknown, "--frobnicate"),
            other => panic!("Expected degraded invocation, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_value_is_an_error() {
        let result = Cli::parse_lenient(["world-reports", "--discovery", "sideways"]);
        match result {
            Err(e) => assert_eq!(e.kind(), ErrorKind::InvalidValue),
            Ok(other) => panic!("Expected an error, got {:?}", other),
        }
    }

    #[test]
    fn test_help_is_passed_through() {
        let result = Cli::parse_lenient(["world-reports", "--help"]);
        assert!(matches!(result, Err(e) if e.kind() == ErrorKind::DisplayHelp));
    }

    #[test]
    fn test_degraded_output() {
        let mut out = Vec::new();
        write_degraded("--frobnicate", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("WARNING: Unknown argument: --frobnicate\n"));
        assert!(text.contains("world-reports"));
        assert!(text.contains("TIP: Use --test-db or -t"));
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[repl]\nprompt = \"world> \"\n").unwrap();

        let cli = Cli::parse_from([
            "world-reports".to_string(),
            "-c".to_string(),
            path.display().to_string(),
            "--discovery".to_string(),
            "scan".to_string(),
        ]);
        let (config, problem) = cli.load_config();

        assert!(problem.is_none());
        assert_eq!(config.repl.prompt, "world> ");
        assert_eq!(config.discovery.mode, DiscoveryMode::Scan);
    }

    #[test]
    fn test_broken_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not toml at all [").unwrap();

        let cli = Cli::parse_from(["world-reports".to_string(), "-c".to_string(), path.display().to_string()]);
        let (config, problem) = cli.load_config();

        assert!(matches!(problem, Some(crate::core::WorldError::Configuration(_))));
        assert_eq!(config.repl, Config::default().repl);
    }

    #[test]
    fn test_completion_script_mentions_binary() {
        let mut out = Vec::new();
        generate_completion(Shell::Bash, &mut out);
        assert!(String::from_utf8(out).unwrap().contains("world-reports"));
    }
}
