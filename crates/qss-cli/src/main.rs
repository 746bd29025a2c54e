//! qss binary - render, inspect and live-reload QSS stylesheets with variables
//!
//! Copyright (c) 2025 Posit, PBC

use std::io::Stdout;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qss_variables::{
    DEFAULT_RELOAD_DEBOUNCE_MS, FileSink, FileWatcher, LoaderConfig, NullSink, StyleSink,
    StylesheetLoader, WriterSink, parse_available_themes, run_auto_reload,
};

#[derive(Parser, Debug)]
#[command(name = "qss")]
#[command(about = "Resolve @Variables blocks and themes in Qt stylesheets")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the stylesheet with all variables substituted
    Render {
        /// Stylesheet to load
        file: PathBuf,

        /// Theme to apply (defaults to the untagged @Variables block)
        #[arg(short, long, default_value = "")]
        theme: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the themes declared in a stylesheet
    Themes {
        /// Stylesheet to inspect
        file: PathBuf,
    },

    /// Print the resolved variables as `name: value` lines
    Vars {
        /// Stylesheet to load
        file: PathBuf,

        /// Theme to apply (defaults to the untagged @Variables block)
        #[arg(short, long, default_value = "")]
        theme: String,
    },

    /// Render, then re-render after every change to the file until Ctrl-C
    Watch {
        /// Stylesheet to load and watch
        file: PathBuf,

        /// Theme to apply (defaults to the untagged @Variables block)
        #[arg(short, long, default_value = "")]
        theme: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Quiet period after the last change before reloading
        #[arg(long, value_name = "MS", default_value_t = DEFAULT_RELOAD_DEBOUNCE_MS)]
        debounce_ms: u64,
    },
}

/// Where rendered stylesheets go.
enum Output {
    Stdout(WriterSink<Stdout>),
    File(FileSink),
}

impl Output {
    fn new(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Output::File(FileSink::new(path)),
            None => Output::Stdout(WriterSink::new(std::io::stdout())),
        }
    }
}

impl StyleSink for Output {
    fn apply(&mut self, stylesheet: &str) {
        match self {
            Output::Stdout(sink) => sink.apply(stylesheet),
            Output::File(sink) => sink.apply(stylesheet),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout only carries the stylesheet
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qss=info,qss_variables=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Render {
            file,
            theme,
            output,
        } => {
            let mut loader = StylesheetLoader::new(Output::new(output));
            loader
                .load_stylesheet(&file, &theme)
                .with_context(|| format!("Failed to render {}", file.display()))?;
        }
        Command::Themes { file } => {
            for theme in read_themes(&file)? {
                println!("{theme}");
            }
        }
        Command::Vars { file, theme } => {
            let mut loader = StylesheetLoader::new(NullSink);
            loader
                .load_stylesheet(&file, &theme)
                .with_context(|| format!("Failed to load {}", file.display()))?;
            for (name, value) in loader.variables() {
                println!("{name}: {value}");
            }
        }
        Command::Watch {
            file,
            theme,
            output,
            debounce_ms,
        } => watch(&file, &theme, output, debounce_ms).await?,
    }

    Ok(())
}

fn read_themes(file: &Path) -> anyhow::Result<Vec<String>> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    Ok(parse_available_themes(&text).into_iter().collect())
}

async fn watch(
    file: &Path,
    theme: &str,
    output: Option<PathBuf>,
    debounce_ms: u64,
) -> anyhow::Result<()> {
    let (watcher, mut events) = FileWatcher::new()?;
    let config = LoaderConfig::default()
        .with_debounce_ms(debounce_ms)
        .with_auto_reload(true);
    let mut loader = StylesheetLoader::with_config(Output::new(output), watcher, config);

    loader
        .load_stylesheet(file, theme)
        .with_context(|| format!("Failed to load {}", file.display()))?;

    let Some(watched) = loader.watched_path().map(Path::to_path_buf) else {
        anyhow::bail!("Could not watch {}", file.display());
    };
    info!(path = %watched.display(), debounce_ms, "Watching stylesheet, press Ctrl-C to stop");

    run_auto_reload(&mut loader, &mut events, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await;

    info!("Stopped watching");
    Ok(())
}
