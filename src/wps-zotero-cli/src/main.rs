use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use wps_zotero_addin::{image_for, ResolvedEnvironment};
use wps_zotero_core::{init_logging, AppDirs, Config, SystemEnvironment, VERSION};
use wps_zotero_supervisor::{
    request_stop, CommandSpawner, HelperProbe, ProcessSupervisor, StartOutcome, StopEndpoint,
};

#[derive(Debug, Parser)]
#[command(name = "wps-zotero", version, about = "Manage the WPS-Zotero proxy helper")]
struct Cli {
    /// Directory holding the versioned add-in folder (takes precedence over config)
    #[arg(long, global = true)]
    install_root: Option<String>,
    /// Python interpreter for the helper (takes precedence over config)
    #[arg(long, global = true)]
    interpreter: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the resolved install directory and helper script
    Paths {
        /// Emit a JSON object instead of text
        #[arg(long)]
        json: bool,
    },
    /// Start the proxy helper in the background
    Start,
    /// Ask a running proxy helper to exit
    Stop,
    /// Check that the proxy helper and Zotero answer
    Ping,
    /// Print the icon used for a ribbon control
    Image {
        /// Ribbon control id, e.g. btnAddEditCitation
        control_id: String,
    },
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(root) = &self.install_root {
            config.addin.install_root = Some(root.clone());
        }
        if let Some(interpreter) = &self.interpreter {
            config.addin.interpreter = Some(interpreter.clone());
        }
    }
}

/// Send the stop request and wait for it; fails when no helper is listening.
fn stop_helper(endpoint: StopEndpoint) -> Result<String> {
    let url = endpoint.url();
    let outcome = request_stop(endpoint)
        .context("failed to start the stop request thread")?
        .join()
        .map_err(|_| anyhow!("stop request thread panicked"))?;
    match outcome {
        Ok(Some(status)) => Ok(format!("Stop request sent to {url} ({status})")),
        Ok(None) => Ok(format!("Stop request sent to {url}")),
        Err(err) if err.is_connect() => {
            Err(anyhow!("no proxy helper is listening at {url}: {err}"))
        }
        Err(err) => Err(anyhow!("stop request to {url} failed: {err}")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let dirs = AppDirs::discover()?;
    let mut config = Config::load_or_default(&dirs)?;
    cli.apply_overrides(&mut config);
    let logging = init_logging(&config.logging, &dirs)?;
    tracing::debug!(version = VERSION, command = ?cli.command, "wps-zotero CLI");

    match cli.command {
        Command::Paths { json } => {
            let resolved = ResolvedEnvironment::detect(&SystemEnvironment, &config)?;
            let install = &resolved.install_path;
            if json {
                let value = serde_json::json!({
                    "version": VERSION,
                    "platform": resolved.platform.platform.to_string(),
                    "install_path": install.as_str(),
                    "proxy_script": install.proxy_script(),
                    "interpreter": resolved.interpreter,
                    "config_file": Config::config_path(&dirs),
                    "log_dir": logging.log_dir(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("platform:     {}", resolved.platform.platform);
                println!("install path: {install}");
                println!("proxy script: {}", install.proxy_script());
                println!("config file:  {}", Config::config_path(&dirs).display());
                println!("log dir:      {}", logging.log_dir().display());
            }
        }
        Command::Start => {
            let resolved = ResolvedEnvironment::detect(&SystemEnvironment, &config)?;
            let mut supervisor = ProcessSupervisor::new(Box::new(CommandSpawner));
            let outcome = supervisor.start_once(
                &resolved.strategy,
                &resolved.install_path,
                resolved.interpreter.as_deref(),
            )?;
            if outcome == StartOutcome::Started {
                println!(
                    "Started proxy helper from {}",
                    resolved.install_path.proxy_script()
                );
            }
        }
        Command::Stop => {
            println!("{}", stop_helper(StopEndpoint::from_config(&config.proxy))?);
        }
        Command::Ping => {
            let probe = HelperProbe::new(&config.proxy)?;
            probe
                .ping()
                .with_context(|| format!("no answer from {}", probe.url()))?;
            println!("Proxy helper and Zotero are up ({})", probe.url());
        }
        Command::Image { control_id } => {
            println!("{}", image_for(&control_id));
        }
    }

    Ok(())
}
