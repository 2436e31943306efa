use {
    clap::Parser,
    limitwatch_config::{DEFAULT_LIMITS_CONFIG_FILENAME, DEFAULT_PROFILE},
    std::{env, path::PathBuf},
};

/// Report service limits and usage for a tenancy, flagging limits with nothing left.
#[derive(Clone, Debug, Parser)]
#[command(name = "limitwatch", version, about)]
pub struct Cli {
    /// Print the list of services and exit
    #[arg(short = 's', long = "services")]
    pub services_only: bool,

    /// Authenticate as the compute instance this runs on
    #[arg(short = 'i', long)]
    pub instance_principal: bool,

    /// Write the report to this file instead of standard output
    #[arg(short = 'o', long = "ofile", value_name = "FILE")]
    pub ofile: Option<PathBuf>,

    /// Limits configuration file [default: limits.conf next to the executable, else in the working directory]
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Provider config file used for API key authentication [default: ~/.oci/config]
    #[arg(long = "oci-config", env = "OCI_CONFIG_FILE", value_name = "FILE")]
    pub oci_config: Option<PathBuf>,

    /// Profile of the provider config file
    #[arg(long, env = "OCI_CLI_PROFILE", default_value = DEFAULT_PROFILE)]
    pub profile: String,
}

impl Cli {
    /// The limits configuration file to read: `--config` if given, else `limits.conf` beside the executable if that
    /// exists, else `limits.conf` in the working directory.
    pub fn limits_config_path(&self) -> PathBuf {
        if let Some(path) = &self.config {
            return path.clone();
        }

        let beside_executable =
            env::current_exe().ok().and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_LIMITS_CONFIG_FILENAME)));

        match beside_executable {
            Some(path) if path.is_file() => path,
            _ => PathBuf::from(DEFAULT_LIMITS_CONFIG_FILENAME),
        }
    }
}
