//! Shrinkray CLI: synthesize the stack template, run the resize handler on a
//! message body, or halve a local image.
//!
//! `invoke` uses the same environment as the function (`PROCESSED_BUCKET_NAME`,
//! `STORAGE_BACKEND`, ...) unless `--local` points it at a directory.

use anyhow::Context;
use clap::{Parser, Subcommand};
use shrinkray_cli::{
    build_handler, init_tracing, inspect_file, invoke, local_config, notification_body,
    render_template, resize_file,
};
use shrinkray_core::Config;
use shrinkray_stack::StackProps;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shrinkray", about = "Shrinkray image pipeline CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the CloudFormation template of the pipeline
    Synth {
        /// Write the template to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// API stage name
        #[arg(long, default_value = "prod")]
        stage: String,
        /// Records per handler invocation
        #[arg(long, default_value = "1")]
        batch_size: u32,
        /// Queue visibility timeout in seconds
        #[arg(long, default_value = "300")]
        visibility_timeout: u32,
        /// Handler timeout in seconds
        #[arg(long, default_value = "60")]
        function_timeout: u32,
        /// Handler memory in MB
        #[arg(long, default_value = "512")]
        memory: u32,
    },
    /// Run the resize handler on one queue message
    Invoke {
        /// File holding the message body (storage notification JSON)
        #[arg(long, conflicts_with_all = ["bucket", "key"])]
        body_file: Option<PathBuf>,
        /// Source bucket, to synthesize the notification
        #[arg(long, requires = "key")]
        bucket: Option<String>,
        /// Source object key (decoded)
        #[arg(long, requires = "bucket")]
        key: Option<String>,
        /// Use filesystem storage rooted here and log notifications
        #[arg(long)]
        local: Option<PathBuf>,
        /// Raw bucket when running with --local
        #[arg(long, default_value = "raw-images")]
        raw_bucket: String,
        /// Processed bucket when running with --local
        #[arg(long, default_value = "processed-images")]
        processed_bucket: String,
    },
    /// Halve a local image and write it as JPEG
    Resize {
        input: PathBuf,
        output: PathBuf,
    },
    /// Show image metadata and the size the handler would produce
    Inspect { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Synth {
            output,
            stage,
            batch_size,
            visibility_timeout,
            function_timeout,
            memory,
        } => {
            let props = StackProps {
                stage_name: stage,
                batch_size,
                queue_visibility_timeout_secs: visibility_timeout,
                function_timeout_secs: function_timeout,
                function_memory_mb: memory,
                ..StackProps::default()
            };
            let template = render_template(props)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, template)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!(path = %path.display(), "Template written");
                }
                None => println!("{}", template),
            }
        }
        Commands::Invoke {
            body_file,
            bucket,
            key,
            local,
            raw_bucket,
            processed_bucket,
        } => {
            let body = match (body_file, bucket, key) {
                (Some(path), _, _) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, Some(bucket), Some(key)) => notification_body(&bucket, &key)?,
                _ => anyhow::bail!("Pass --body-file or --bucket and --key"),
            };

            let config = match local {
                Some(root) => local_config(&root, &raw_bucket, &processed_bucket),
                None => Config::from_env().context("Failed to load configuration")?,
            };

            let handler = build_handler(&config).await?;
            let report = invoke(&handler, &body).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Serialize report")?
            );
        }
        Commands::Resize { input, output } => {
            let halved = resize_file(&input, &output)?;
            println!(
                "{}",
                serde_json::json!({
                    "source": [halved.source_width, halved.source_height],
                    "output": [halved.width, halved.height],
                    "bytes": halved.data.len(),
                    "path": output.display().to_string(),
                })
            );
        }
        Commands::Inspect { file } => {
            let report = inspect_file(&file)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Serialize report")?
            );
        }
    }

    Ok(())
}
