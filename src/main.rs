#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::fs;
    use std::path::PathBuf;

    use anyhow::{bail, Context};
    use clap::{Parser, Subcommand};
    use scrollstage_engine::contact::handle_submission;
    use scrollstage_engine::content::{ContentItem, SiteContent};
    use scrollstage_engine::{Stage, StageConfig, StageKind};
    use tracing::info;
    use tracing_subscriber::EnvFilter;

    #[derive(Parser, Debug)]
    #[command(name = "scrollstage", about = "Preview scroll-driven stages without a browser")]
    struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand, Debug)]
    enum Command {
        /// Print one json frame per progress step
        Preview {
            #[arg(long, default_value = "hero")]
            stage: StageKind,
            /// Stage config json; its `kind` replaces --stage
            #[arg(long)]
            config: Option<PathBuf>,
            /// Site content json; placeholder items are used when omitted
            #[arg(long)]
            content: Option<PathBuf>,
            /// Number of placeholder scenes
            #[arg(long, default_value_t = 5)]
            scenes: usize,
            #[arg(long, default_value_t = 20)]
            steps: usize,
            #[arg(long)]
            pretty: bool,
        },
        /// Validate a contact form payload the way the site endpoint does
        Contact { payload: PathBuf },
    }

    pub fn run() -> anyhow::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();

        match Cli::parse().command {
            Command::Preview {
                stage,
                config,
                content,
                scenes,
                steps,
                pretty,
            } => preview(stage, config, content, scenes, steps, pretty),
            Command::Contact { payload } => {
                let json = fs::read_to_string(&payload)
                    .with_context(|| format!("reading {}", payload.display()))?;
                let response = handle_submission(&json);
                println!("{}", serde_json::to_string_pretty(&response)?);
                Ok(())
            }
        }
    }

    fn preview(
        kind: StageKind,
        config: Option<PathBuf>,
        content: Option<PathBuf>,
        scenes: usize,
        steps: usize,
        pretty: bool,
    ) -> anyhow::Result<()> {
        if steps == 0 {
            bail!("--steps must be at least 1");
        }

        let config = match config {
            Some(path) => {
                let json = fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                StageConfig::from_json(&json)?
            }
            None => StageConfig::preset(kind),
        };

        let items = match content {
            Some(path) => SiteContent::load(&path)?.items(config.kind).to_vec(),
            None => (0..scenes)
                .map(|i| ContentItem::new(format!("scene-{i}"), format!("Scene {}", i + 1)))
                .collect(),
        };

        let stage = Stage::new(items, config)?;
        info!(
            "previewing {} stage, {} scenes, {} steps",
            stage.kind(),
            stage.items().len(),
            steps
        );

        for step in 0..=steps {
            let frame = stage.frame(step as f32 / steps as f32);
            let line = if pretty {
                serde_json::to_string_pretty(&frame)?
            } else {
                serde_json::to_string(&frame)?
            };
            println!("{line}");
        }

        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
