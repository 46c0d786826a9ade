//! argsmith - Declarative command-line argument parsing.

use anyhow::{Context, Result};
use argsmith::{generate_output, Config};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// Parse command-line arguments against a JSON argument declaration.
#[derive(Parser, Debug)]
#[command(name = "argsmith", version, about, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse arguments and print the path of a sourceable shell file
    Parse {
        /// JSON declaration of the target program's arguments
        #[arg(long)]
        config: String,

        /// Program name shown in help (overrides config)
        #[arg(long)]
        name: Option<String>,

        /// Variable prefix (overrides config)
        #[arg(long)]
        prefix: Option<String>,

        /// Arguments to parse for the target program
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print help text for the target program
    Help {
        /// JSON declaration of the target program's arguments
        #[arg(long)]
        config: String,

        /// Program name shown in help (overrides config)
        #[arg(long)]
        name: Option<String>,
    },

    /// Check the argument declaration for mistakes
    Check {
        /// JSON declaration of the target program's arguments
        #[arg(long)]
        config: String,
    },
}

/// Program name: CLI flag first, then config, then a fixed fallback.
fn effective_name<'a>(cli_name: Option<&'a str>, cfg: &'a Config) -> &'a str {
    cli_name.or(cfg.name.as_deref()).unwrap_or("program")
}

/// Variable prefix: CLI flag first, then config, then the default.
fn resolve_prefix<'a>(cli_prefix: Option<&'a str>, cfg: &'a Config) -> &'a str {
    cli_prefix.unwrap_or_else(|| cfg.effective_prefix())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            config,
            name,
            prefix,
            args,
        } => {
            tracing::debug!("executing parse command");
            let cfg = Config::from_json(&config).context("failed to parse config JSON")?;
            let mut parser = cfg
                .build_parser(effective_name(name.as_deref(), &cfg))
                .context("invalid argument declaration")?;

            let result = parser
                .parse_args_no_executable(&args)
                .context("invalid argument declaration")?;
            let path = generate_output(&result, resolve_prefix(prefix.as_deref(), &cfg))
                .context("failed to generate output file")?;

            println!("{}", path.display());
        }
        Commands::Help { config, name } => {
            tracing::debug!("executing help command");
            let cfg = Config::from_json(&config).context("failed to parse config JSON")?;
            let mut parser = cfg
                .build_parser(effective_name(name.as_deref(), &cfg))
                .context("invalid argument declaration")?;
            parser.validate().context("invalid argument declaration")?;
            print!("{}", parser.help_text());
        }
        Commands::Check { config } => {
            tracing::debug!("executing check command");
            let cfg = Config::from_json(&config).context("failed to parse config JSON")?;
            let mut parser = cfg
                .build_parser(effective_name(None, &cfg))
                .context("invalid argument declaration")?;
            parser.validate().context("invalid argument declaration")?;
            println!("ok");
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_parse_subcommand_parses_config() {
        let cli = Cli::try_parse_from(["argsmith", "parse", "--config", r#"{"name":"test"}"#, "--"])
            .unwrap();

        match cli.command {
            Commands::Parse {
                config,
                name,
                prefix,
                args,
            } => {
                assert_eq!(config, r#"{"name":"test"}"#);
                assert!(name.is_none());
                assert!(prefix.is_none());
                assert!(args.is_empty());
            }
            _ => panic!("Expected Parse command"),
        }
    }

    #[test]
    fn test_parse_subcommand_parses_args() {
        let cli = Cli::try_parse_from([
            "argsmith",
            "parse",
            "--config",
            r#"{"name":"test"}"#,
            "--",
            "-v",
            "--output",
            "file.txt",
            "input.txt",
        ])
        .unwrap();

        match cli.command {
            Commands::Parse { args, .. } => {
                assert_eq!(args, vec!["-v", "--output", "file.txt", "input.txt"]);
            }
            _ => panic!("Expected Parse command"),
        }
    }

    #[test]
    fn test_parse_subcommand_requires_config() {
        let result = Cli::try_parse_from(["argsmith", "parse", "--"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_subcommand() {
        let cli = Cli::try_parse_from(["argsmith", "check", "--config", "{}"]).unwrap();
        assert!(matches!(cli.command, Commands::Check { config } if config == "{}"));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        let result = Cli::try_parse_from(["argsmith"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_help() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_name_priority() {
        let cfg = Config::from_json(r#"{"name":"from-config"}"#).unwrap();
        assert_eq!(effective_name(Some("from-cli"), &cfg), "from-cli");
        assert_eq!(effective_name(None, &cfg), "from-config");

        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(effective_name(None, &cfg), "program");
    }

    #[test]
    fn test_prefix_priority() {
        let cfg = Config::from_json(r#"{"prefix":"CONFIG_"}"#).unwrap();
        assert_eq!(resolve_prefix(Some("CLI_"), &cfg), "CLI_");
        assert_eq!(resolve_prefix(None, &cfg), "CONFIG_");

        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(resolve_prefix(None, &cfg), "ARGSMITH_");
    }
}
