//! sintautils CLI
//!
//! Local entry point for dumping author data from the SINTA portal.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sintautils::{
    error::{AppError, Result},
    models::{ColumnSelection, Config, Credential, FieldSelection, RawAuthorId, SourceField},
    pipeline::{self, DumpRequest},
    storage::{ExportOptions, LocalExporter},
};

/// sintautils - SINTA author data retrieval
#[derive(Parser, Debug)]
#[command(
    name = "sintautils",
    version,
    about = "Fetch and export author profiles from the SINTA portal"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "sintautils.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the selected fields for one or more authors and export them
    Dump {
        /// SINTA author IDs
        #[arg(required = true)]
        ids: Vec<String>,

        /// Fields to fetch: "*" or names such as "book garuda"
        #[arg(short, long, default_value = "*")]
        fields: String,

        /// Keep only these entry columns (comma separated)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Output format: csv, json, json-pretty or xlsx
        #[arg(long)]
        format: Option<String>,

        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Prefix for every output file name
        #[arg(long)]
        prefix: Option<String>,

        /// Name files after the author's full name
        #[arg(long)]
        fullname: bool,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Check that the portal accepts the credentials
    Login {
        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Validate the configuration file
    Validate,

    /// List the recognized field names
    Fields,
}

#[derive(Args, Debug)]
struct AuthArgs {
    /// Portal username
    #[arg(short, long, env = "SINTAUTILS_USERNAME")]
    username: Option<String>,

    /// Portal password
    #[arg(short, long, env = "SINTAUTILS_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl AuthArgs {
    /// Credential from the flags, or `None` when neither part was given.
    fn credential(self) -> Result<Option<Credential>> {
        match (self.username, self.password) {
            (None, None) => Ok(None),
            (Some(username), Some(password)) => Credential::new(username, password).map(Some),
            _ => Err(AppError::invalid_input(
                "both --username and --password are needed",
            )),
        }
    }
}

/// Initialize logging; `RUST_LOG` overrides the given level.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = match (&loaded, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.logging.level.clone(),
        (Err(_), false) => "info".to_string(),
    };
    init_logging(&level);

    if let Command::Validate = cli.command {
        log::info!("Validating {}...", cli.config.display());
        let config = loaded.inspect_err(|e| log::error!("Config load failed: {e}"))?;
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {e}");
            return Err(e);
        }
        log::info!("✓ Portal: {}", config.portal.base_url);
        log::info!("✓ Timeout: {}s", config.portal.timeout_secs);
        log::info!(
            "✓ Concurrency: {}, max pages: {}",
            config.fetch.max_concurrent,
            config.fetch.max_pages
        );
        log::info!("All validations passed!");
        return Ok(());
    }

    let config = loaded.unwrap_or_else(|e| {
        log::warn!(
            "Using default configuration ({}: {e})",
            cli.config.display()
        );
        Config::default()
    });
    config.validate()?;

    match cli.command {
        Command::Dump {
            ids,
            fields,
            columns,
            format,
            out,
            prefix,
            fullname,
            auth,
        } => {
            let mut export = ExportOptions::from_config(&config.output)?;
            if let Some(format) = format {
                export.format = format.parse()?;
            }
            if let Some(out) = out {
                export.folder = out;
            }
            if let Some(prefix) = prefix {
                export.prefix = prefix;
            }
            export.use_fullname_prefix |= fullname;

            let request = DumpRequest {
                ids: ids.into_iter().map(RawAuthorId::from).collect(),
                fields: FieldSelection::parse(&fields)?,
                columns: ColumnSelection::from_names(&columns),
                export,
            };

            let report =
                pipeline::run_dump(&config, &request, auth.credential()?, &LocalExporter::new())
                    .await?;

            for path in &report.export.files {
                log::debug!("Wrote {}", path.display());
            }
            log::info!(
                "Dump complete: {} file(s) in {}",
                report.export.files.len(),
                request.export.folder.display()
            );
            if report.logins > 1 {
                log::info!("Session renewed {} time(s)", report.logins - 1);
            }
        }

        Command::Login { auth } => {
            let credential = auth
                .credential()?
                .ok_or_else(|| AppError::invalid_input("no credentials given"))?;
            pipeline::run_login(&config, credential).await?;
        }

        Command::Fields => {
            for field in SourceField::ALL {
                let access = if field.is_restricted() {
                    "login"
                } else {
                    "public"
                };
                println!("{:<10} {}", field, access);
            }
        }

        Command::Validate => {}
    }

    Ok(())
}
