use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use ttd_admin::config::AdminConfig;
use ttd_admin::utils::logging::init_logging;
use ttd_admin::AdminClient;

/// Issue RCON commands to an OpenTTD server on in-game date changes.
#[derive(Debug, Parser)]
#[command(name = "openttd-multitool", version, about)]
struct Cli {
    /// TOML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// The hostname (or IP address) of the OpenTTD server to connect to
    #[arg(long)]
    hostname: Option<String>,

    /// The port number of the admin interface (default is 3977)
    #[arg(long)]
    port: Option<u16>,

    /// The password for the admin interface ('admin_password' in openttd.cfg)
    #[arg(long, env = "TTD_ADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// An RCON command to run daily - may be repeated
    #[arg(long)]
    daily: Vec<String>,

    /// An RCON command to run monthly - may be repeated
    #[arg(long)]
    monthly: Vec<String>,

    /// An RCON command to run yearly - may be repeated
    #[arg(long)]
    yearly: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<tracing::Level>,
}

impl Cli {
    fn into_config(self) -> ttd_admin::Result<AdminConfig> {
        // file < environment < flags
        let mut config = match &self.config {
            Some(path) => AdminConfig::from_file(path)?,
            None => AdminConfig::default(),
        };
        config.apply_env();

        if let Some(host) = self.hostname {
            config.client.host = host;
        }
        if let Some(port) = self.port {
            config.client.port = port;
        }
        if let Some(password) = self.password {
            config.client.password = password;
        }
        if let Some(level) = self.log_level {
            config.logging.log_level = level;
        }

        let trimmed = |values: Vec<String>| values.into_iter().map(|v| v.trim().to_string());
        config.schedule.daily.extend(trimmed(self.daily));
        config.schedule.monthly.extend(trimmed(self.monthly));
        config.schedule.yearly.extend(trimmed(self.yearly));

        Ok(config)
    }
}

fn main() -> ExitCode {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("ERROR: {e}");
        return ExitCode::FAILURE;
    }

    let client = match AdminClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        address = %config.client.address(),
        daily = config.schedule.daily.len(),
        monthly = config.schedule.monthly.len(),
        yearly = config.schedule.yearly.len(),
        "starting admin client"
    );

    // blocks forever
    match client.run_blocking() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "admin client stopped");
            ExitCode::FAILURE
        }
    }
}
