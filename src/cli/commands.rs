use tracing_subscriber::EnvFilter;

use crate::catalog::CatalogClient;
use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::processors::{BatchDriver, LidarProcessor, MwrProcessor};
use crate::settings::Settings;
use crate::utils::paths::OutputLayout;
use crate::utils::progress::ProgressReporter;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())?;
    let layout = OutputLayout::new(&settings.data_root);

    match cli.command {
        Commands::Run => {
            let progress = ProgressReporter::new_spinner("Querying catalog...", false);
            let client = CatalogClient::connect(&settings.catalog_dsn).await?;
            let records = client.fetch_pending().await?;
            progress.finish_with_message(&format!("{} conversions pending", records.len()));

            let driver = BatchDriver::new(layout, settings.wind_policy);
            let converter = LidarProcessor::new();
            let report = driver.run(&records, &converter)?;
            println!("\n{}", report.summary());
        }

        Commands::Pending { json } => {
            // no spinner decoration when emitting machine-readable output
            let progress = ProgressReporter::new_spinner("Querying catalog...", json);
            let client = CatalogClient::connect(&settings.catalog_dsn).await?;
            let records = client.fetch_pending().await?;
            progress.finish_with_message(&format!("{} conversions pending", records.len()));

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for record in &records {
                    println!("{}, {}", record.site, record.date);
                }
            }
        }

        Commands::ConvertLidar {
            radial,
            scan,
            wind,
            site,
            date,
            output,
        } => {
            let output = match output {
                Some(path) => path,
                None => {
                    layout.ensure_lidar_dir(&site, date)?;
                    layout.lidar_file(&site, date)
                }
            };
            LidarProcessor::new().process(&radial, &scan, wind.as_deref(), &site, &output)?;
            println!("Wrote {}", output.display());
        }

        Commands::ConvertMwr { lv2, site, output } => {
            let output = output.unwrap_or_else(|| layout.mwr_file(&site));
            MwrProcessor::new(settings.resample_minutes).process(&lv2, &site, &output)?;
            println!("Wrote {}", output.display());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr so the batch driver's stdout contract stays clean.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
