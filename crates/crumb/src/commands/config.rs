//! Config command - configuration management.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use crumb_config::CrumbConfig;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration
    Show,

    /// Show which config files are loaded and their precedence
    Which,

    /// Initialize a config file with defaults
    Init {
        /// Create project-local config (./crumb.toml) instead of user config
        #[arg(long)]
        local: bool,
    },

    /// Show configuration file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
        ConfigCommand::Init { local } => cmd_init(ctx, local),
        ConfigCommand::Path => cmd_path(ctx),
    }
}

/// The resolved config with every section filled in.
fn resolved(config: &CrumbConfig) -> CrumbConfig {
    CrumbConfig {
        server: Some(config.server()),
        session: Some(config.session()),
        logging: Some(config.logging()),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let config = resolved(&ctx.loaded.config);

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("# Crumb Configuration\n");

    let sources = ctx.loaded.loaded_from();
    if sources.is_empty() {
        println!("# No config files loaded (using defaults)\n");
    } else {
        for source in &sources {
            println!("# from {}", source.display());
        }
        println!();
    }

    print!("{}", config.to_toml()?);
    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    let loaded = &ctx.loaded;

    if ctx.json_output {
        let sources: Vec<_> = loaded
            .sources
            .iter()
            .map(|s| {
                serde_json::json!({
                    "path": s.path.display().to_string(),
                    "loaded": s.loaded,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "sources": sources,
                "warnings": loaded.warnings,
            }))?
        );
        return Ok(());
    }

    println!("Config file search order (later overrides earlier):\n");

    for source in &loaded.sources {
        let status = if source.loaded {
            "✓ loaded"
        } else {
            "· not found"
        };
        println!("  {} {}", status, source.path.display());
    }

    for warning in &loaded.warnings {
        println!("  ! {}", warning);
    }

    println!();
    let loaded_count = loaded.loaded_from().len();
    if loaded_count == 0 {
        println!("No config files found. Run 'crumb config init' to create one.");
    } else {
        println!("{} config file(s) loaded.", loaded_count);
    }

    Ok(())
}

fn cmd_init(ctx: &Context, local: bool) -> Result<()> {
    let path = if local {
        PathBuf::from("crumb.toml")
    } else {
        user_config_path(ctx)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
    };

    if path.exists() {
        println!("Config file already exists: {}", path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, TEMPLATE)?;

    println!("Created config file: {}", path.display());
    Ok(())
}

fn cmd_path(ctx: &Context) -> Result<()> {
    if let Some(path) = user_config_path(ctx) {
        println!("{}", path.display());
    } else {
        eprintln!("Could not determine config directory");
    }
    Ok(())
}

/// User config file, honoring `--config-dir` before the environment and platform default.
fn user_config_path(ctx: &Context) -> Option<PathBuf> {
    match ctx.config_dir {
        Some(ref dir) => Some(dir.join("config.toml")),
        None => crumb_config::xdg_config_path(),
    }
}

const TEMPLATE: &str = r#"# Crumb Configuration

[server]
port = 8080
bind = "127.0.0.1"
request_logging = true
# max_body_size = 65536

[session]
cookie_name = "sid"
# Random bytes per identifier (hex encoded in the cookie)
key_size = 32
# Idle lifetime: 28 days
max_age_secs = 2419200
# Sweep period, defaults to a quarter of max_age_secs
# sweep_interval_secs = 604800
# "reject" or "adopt"
unknown_session = "reject"
secure = false
# path = "/"

[logging]
file = true
# dir = "/var/log/crumb"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_and_validates() {
        let config = CrumbConfig::from_toml(TEMPLATE).unwrap();
        let session = config.session();
        assert_eq!(session.cookie_name, "sid");
        assert_eq!(session.max_age_secs, 2_419_200);
        session.validate().unwrap();
        assert_eq!(config.server().port, 8080);
    }

    #[test]
    fn test_resolved_fills_sections() {
        let config = resolved(&CrumbConfig::default());
        assert!(config.server.is_some());
        assert!(config.session.is_some());
        assert!(config.logging.is_some());
    }

    #[test]
    fn test_user_config_path_prefers_explicit_dir() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = crumb_config::load_config_with_options(
            Some(dir.path()),
            Some(dir.path()),
        )
        .unwrap();
        let ctx = Context {
            json_output: false,
            verbose: false,
            config_dir: Some(dir.path().to_path_buf()),
            loaded,
        };

        assert_eq!(
            user_config_path(&ctx),
            Some(dir.path().join("config.toml"))
        );
    }

    #[test]
    fn test_init_writes_template_once() {
        let dir = tempfile::tempdir().unwrap();
        let loaded =
            crumb_config::load_config_with_options(Some(dir.path()), Some(dir.path())).unwrap();
        let ctx = Context {
            json_output: false,
            verbose: false,
            config_dir: Some(dir.path().join("user")),
            loaded,
        };

        cmd_init(&ctx, false).unwrap();
        let path = dir.path().join("user").join("config.toml");
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, TEMPLATE);

        std::fs::write(&path, "# edited\n").unwrap();
        cmd_init(&ctx, false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# edited\n");
    }
}
