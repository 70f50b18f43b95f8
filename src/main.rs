//! Fancy - host for the editor session and the site configuration.
//!
//! # Usage
//!
//! ```bash
//! fancy config show
//! fancy --root ./site config set --title "My Site"
//! fancy preview notes.md --format text
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use fancy_editor::config::{ActionResult, ensure_site_config, read_site_config, site_config_path};
use fancy_editor::document::ContentSnapshot;
use fancy_editor::form::{Field, SiteConfigForm, SubmitOutcome, ToastLevel};
use fancy_editor::session::{ContentSurface, SessionProvider};

/// Editor session and site configuration tools
#[derive(Parser, Debug)]
#[command(name = "fancy", version, about, long_about = None)]
struct Cli {
    /// Project root holding src/lib or lib
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect or change the site configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Load content into an editor session and print it
    Preview {
        /// Markup, Markdown (.md) or JSON tree (.json) file; stdin when omitted
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "html")]
        format: PreviewFormat,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the stored configuration
    Show,
    /// Create the starter configuration if none exists
    Init,
    /// Update fields and save through the config form
    Set {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        author_name: Option<String>,
        #[arg(long)]
        author_url: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum PreviewFormat {
    Html,
    Json,
    Text,
}

fn report(result: &ActionResult) -> Result<()> {
    if result.success {
        println!("{}", result.message);
        Ok(())
    } else {
        anyhow::bail!("{}", result.message)
    }
}

fn show_config(root: &Path) -> Result<()> {
    let Some(config) = read_site_config(root) else {
        anyhow::bail!(
            "No site config at {}",
            site_config_path(root).display()
        );
    };
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn set_config(root: &Path, updates: [(Field, Option<String>); 5]) -> Result<()> {
    let mut form = SiteConfigForm::load(root);
    for (field, value) in updates {
        if let Some(value) = value {
            form.set(field, value);
        }
    }
    match form.submit() {
        SubmitOutcome::Invalid(errors) => {
            for error in &errors {
                eprintln!("{}: {error}", error.field().label());
            }
            anyhow::bail!("Site config not saved")
        }
        outcome => match outcome.toast() {
            Some((ToastLevel::Error, message)) => anyhow::bail!("{message}"),
            Some((ToastLevel::Success, message)) => {
                println!("{message}");
                Ok(())
            }
            None => Ok(()),
        },
    }
}

fn load_content(file: Option<&Path>) -> Result<ContentSnapshot> {
    let Some(path) = file else {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read stdin")?;
        return Ok(ContentSnapshot::from(input));
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let content = match path.extension().and_then(|ext| ext.to_str()) {
        Some("md" | "markdown") => ContentSnapshot::from_markdown(&source),
        Some("json") => ContentSnapshot::from_json(&source)
            .with_context(|| format!("Invalid document tree in {}", path.display()))?,
        _ => ContentSnapshot::from(source),
    };
    Ok(content)
}

fn preview(file: Option<&Path>, format: PreviewFormat) -> Result<()> {
    let content = Rc::new(load_content(file)?);
    let mut provider = SessionProvider::new();
    let mut surface = ContentSurface::new().with_content(content);
    let rendered = provider.render(&mut [&mut surface]);
    let session = provider
        .session()
        .context("Editor failed to initiate")?;

    match format {
        PreviewFormat::Html => {
            let html = rendered
                .surfaces()
                .first()
                .map(|surface| surface.html.clone())
                .unwrap_or_default();
            println!("{html}");
        }
        PreviewFormat::Json => println!("{}", serde_json::to_string_pretty(&session.get_json())?),
        PreviewFormat::Text => println!("{}", session.get_text()),
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Show => show_config(&cli.root),
            ConfigAction::Init => report(&ensure_site_config(&cli.root)),
            ConfigAction::Set {
                title,
                description,
                url,
                author_name,
                author_url,
            } => set_config(
                &cli.root,
                [
                    (Field::Title, title),
                    (Field::Description, description),
                    (Field::Url, url),
                    (Field::AuthorName, author_name),
                    (Field::AuthorUrl, author_url),
                ],
            ),
        },
        Commands::Preview { file, format } => preview(file.as_deref(), format),
    }
}
