use anyhow::{Context, Result};
use sitekit::{
    Command, Config, DirSource, Document, HttpSource, PageLocation, TagFilter, build_site,
    markdown_to_html, render_page,
};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config);
    config.validate().context("Invalid configuration")?;

    match &config.command {
        Command::Build { site, output } => {
            let summary = build_site(site, output).context("Failed to build site")?;
            info!(
                "Built {} pages and {} writeups, copied {} files",
                summary.pages, summary.writeups, summary.copied
            );
            if summary.components_failed > 0 {
                warn!(
                    "{} of {} components failed to load",
                    summary.components_failed,
                    summary.components_failed + summary.components_loaded
                );
            }
            Ok(())
        }
        Command::Include { page, output, url } => include(page, output.as_deref(), url.as_deref()),
        Command::Filter { page, tags, output } => filter(page, tags, output.as_deref()),
        Command::Markdown { input, output } => {
            let markdown = fs::read_to_string(input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            emit(output.as_deref(), &markdown_to_html(&markdown))
        }
    }
}

/// Uses `RUST_LOG` when set, otherwise the level implied by the flags.
fn init_logging(config: &Config) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(config.log_level())
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn include(page: &Path, output: Option<&Path>, url: Option<&str>) -> Result<()> {
    let html = fs::read_to_string(page)
        .with_context(|| format!("Failed to read {}", page.display()))?;

    let (rendered, report) = match url {
        Some(url) => {
            let location = Url::parse(url).with_context(|| format!("Invalid page URL: {}", url))?;
            let source = HttpSource::new(url).context("Failed to create HTTP client")?;
            render_page(&html, source, &PageLocation::new(location.path()))
        }
        None => {
            let dir = page.parent().unwrap_or(Path::new("."));
            let name = page
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let location = PageLocation::new(format!("/{}", name));
            render_page(&html, DirSource::new(dir), &location)
        }
    };

    info!(
        "Loaded {} of {} components",
        report.loaded(),
        report.outcomes.len()
    );
    emit(output, &rendered)
}

fn filter(page: &Path, tags: &[String], output: Option<&Path>) -> Result<()> {
    let html = fs::read_to_string(page)
        .with_context(|| format!("Failed to read {}", page.display()))?;
    let mut doc = Document::parse(&html);

    let mut filter = TagFilter::bind(&doc);
    for tag in tags {
        filter.click_tag(&mut doc, tag)?;
    }

    match filter.state().selection() {
        Some(Some(tag)) => info!("Active tag: {}", tag),
        Some(None) => info!("Active tag: unlabelled button"),
        None => info!("No active tag"),
    }
    emit(output, &doc.to_html())
}

fn emit(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).context("Failed to create output directory")?;
            }
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Generated: {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .context("Failed to write output")?;
            stdout.flush().context("Failed to write output")?;
        }
    }
    Ok(())
}
