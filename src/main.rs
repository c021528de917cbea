//! Copied Notice Editor CLI
//!
//! Lists and edits `{{copied}}` attribution notices on pages of a local page
//! store.

use anyhow::{Result, anyhow};
use clap::Parser;
use copied_notice_editor::cli::edit::{AddArgs, MergeArgs, RemoveArgs, RowArgs, SaveArgs};
use copied_notice_editor::cli::view::{NoticeArgs, PageArgs};
use copied_notice_editor::cli::{Cli, Command};
use copied_notice_editor::config::{Config, ConfigLoader};
use copied_notice_editor::document::{Document, MergeOptions};
use copied_notice_editor::error::EditorError;
use copied_notice_editor::format::{self, OutputFormat};
use copied_notice_editor::logging::{self, LogTarget};
use copied_notice_editor::preview::PreviewPanel;
use copied_notice_editor::provider::{FsContentProvider, PlainRenderer};
use serde_json::{Value, json};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let target: LogTarget = cli.log.parse().map_err(|e: String| anyhow!(e))?;
    logging::init(&target, cli.verbose)?;

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_file(path)?,
        None => ConfigLoader::load()?.into_config(),
    };
    if let Some(pages_dir) = &cli.pages_dir {
        config.storage.pages_dir = pages_dir.clone();
    }
    let output: OutputFormat = cli.format.parse().map_err(|e: String| anyhow!(e))?;

    let provider = FsContentProvider::new(&config.storage.pages_dir);
    debug!(pages_dir = %config.storage.pages_dir.display(), "Using page store");

    match cli.command {
        Command::List(args) => run_list(&config, &provider, args, output).await,
        Command::Add(args) => run_add(&config, &provider, args).await,
        Command::Merge(args) => run_merge(&config, &provider, args).await,
        Command::Remove(args) => run_remove(&config, &provider, args).await,
        Command::ConvertDiff(args) => run_convert_diff(&config, &provider, args).await,
        Command::Text(args) => run_text(&config, &provider, args, output).await,
        Command::Attribution(args) => run_attribution(&config, &provider, args, output).await,
        Command::Wikitext(args) => run_wikitext(&config, &provider, args).await,
        Command::Preview(args) => run_preview(&config, &provider, args, output).await,
    }
}

async fn open(config: &Config, provider: &FsContentProvider, page: &PageArgs) -> Result<Document> {
    let mut doc = Document::new(config.notice.clone());
    doc.load(provider, &page.page).await?;
    Ok(doc)
}

/// Save the document, or print its markup for a dry run.
async fn finish(
    config: &Config,
    provider: &FsContentProvider,
    doc: &mut Document,
    save: &SaveArgs,
) -> Result<()> {
    if save.dry_run {
        print!("{}", doc.serialize(provider).await?);
        return Ok(());
    }
    let outcome = doc.save(provider, &config.edit.advert).await?;
    println!(
        "Saved {} (revision {}): {}",
        doc.page()?,
        outcome.version_token,
        doc.edit_summary(&config.edit.advert)
    );
    Ok(())
}

/// Identifiers of the requested notice, or of every notice.
fn selected_notices(doc: &Document, notice: Option<&str>) -> Result<Vec<String>> {
    match notice {
        Some(id) if doc.notice(id).is_some() => Ok(vec![id.to_string()]),
        Some(id) => Err(EditorError::notice_not_found(id).into()),
        None => Ok(doc.notices().iter().map(|n| n.id().to_string()).collect()),
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_list(
    config: &Config,
    provider: &FsContentProvider,
    args: PageArgs,
    output: OutputFormat,
) -> Result<()> {
    let doc = open(config, provider, &args).await?;
    println!("{}", format::format_document(&doc, output));
    Ok(())
}

async fn run_add(config: &Config, provider: &FsContentProvider, args: AddArgs) -> Result<()> {
    let mut doc = open(config, provider, &args.page).await?;

    let notice = match &args.notice {
        Some(id) => {
            doc.add_row(id, args.fields.to_fields())?;
            id.clone()
        }
        None => {
            let id = doc.add_notice()?;
            let row = doc
                .notice(&id)
                .and_then(|n| n.rows().first())
                .map(|row| row.id().clone())
                .ok_or_else(|| anyhow!("new notice {} has no rows", id))?;
            for (field, value) in args.fields.values() {
                doc.set_row_field(&row, field, Some(value))?;
            }
            id
        }
    };

    if args.collapse || args.small {
        let (collapsed, small) = doc
            .notice(&notice)
            .map(|n| (n.collapsed(), n.small()))
            .unwrap_or_default();
        doc.set_flags(&notice, collapsed || args.collapse, small || args.small)?;
    }

    info!(page = %args.page.page, notice = %notice, "Added to notice");
    finish(config, provider, &mut doc, &args.save).await
}

async fn run_merge(config: &Config, provider: &FsContentProvider, args: MergeArgs) -> Result<()> {
    let mut doc = open(config, provider, &args.page).await?;

    if args.all {
        doc.merge_all()?;
    } else {
        let into = args.into.as_deref().ok_or_else(|| anyhow!("--into is required"))?;
        let from = args.from.as_deref().ok_or_else(|| anyhow!("--from is required"))?;
        if doc.notice(from).is_none() {
            return Err(EditorError::notice_not_found(from).into());
        }
        doc.merge(
            into,
            from,
            MergeOptions {
                delete: !args.keep,
                clear: args.r#move,
            },
        )?;
    }

    finish(config, provider, &mut doc, &args.save).await
}

async fn run_remove(config: &Config, provider: &FsContentProvider, args: RemoveArgs) -> Result<()> {
    let mut doc = open(config, provider, &args.page).await?;

    if args.all {
        doc.destroy_all()?;
    } else {
        let notice = args
            .notice
            .as_deref()
            .ok_or_else(|| anyhow!("--notice is required"))?;
        match args.row {
            Some(position) => {
                let row = doc
                    .notice(notice)
                    .ok_or_else(|| EditorError::notice_not_found(notice))?
                    .rows()
                    .get(position.saturating_sub(1))
                    .map(|row| row.id().clone())
                    .ok_or_else(|| EditorError::row_not_found(&position.to_string()))?;
                doc.delete_row(notice, &row)?;
            }
            None => doc.destroy_notice(notice)?,
        }
    }

    finish(config, provider, &mut doc, &args.save).await
}

async fn run_convert_diff(
    config: &Config,
    provider: &FsContentProvider,
    args: RowArgs,
) -> Result<()> {
    let mut doc = open(config, provider, &args.page).await?;
    let row = doc
        .notice(&args.notice)
        .ok_or_else(|| EditorError::notice_not_found(&args.notice))?
        .rows()
        .get(args.row.saturating_sub(1))
        .map(|row| row.id().clone())
        .ok_or_else(|| EditorError::row_not_found(&args.row.to_string()))?;

    for (field, value) in doc.convert_diff(&row)? {
        eprintln!("{} = {}", field, value);
    }
    finish(config, provider, &mut doc, &args.save).await
}

async fn run_text(
    config: &Config,
    provider: &FsContentProvider,
    args: NoticeArgs,
    output: OutputFormat,
) -> Result<()> {
    let doc = open(config, provider, &args.page).await?;
    let mut texts = Vec::new();
    for id in selected_notices(&doc, args.notice.as_deref())? {
        texts.push((id.clone(), doc.to_text(&id)?));
    }

    match output {
        OutputFormat::Json => print_json(&json!(
            texts
                .iter()
                .map(|(id, text)| json!({"id": id, "text": text}))
                .collect::<Vec<_>>()
        )),
        OutputFormat::Markdown => {
            for (_, text) in texts {
                println!("{}", text);
            }
            Ok(())
        }
    }
}

async fn run_attribution(
    config: &Config,
    provider: &FsContentProvider,
    args: NoticeArgs,
    output: OutputFormat,
) -> Result<()> {
    let doc = open(config, provider, &args.page).await?;
    let mut entries = Vec::new();
    for id in selected_notices(&doc, args.notice.as_deref())? {
        let Some(notice) = doc.notice(&id) else {
            continue;
        };
        for row in notice.rows() {
            entries.push((id.clone(), row.label(), row.attribution_summary()));
        }
    }

    match output {
        OutputFormat::Json => print_json(&json!(
            entries
                .iter()
                .map(|(id, label, summary)| json!({
                    "notice": id,
                    "row": label,
                    "summary": summary.text,
                    "lacking": summary.lacking,
                }))
                .collect::<Vec<_>>()
        )),
        OutputFormat::Markdown => {
            for (id, label, summary) in entries {
                println!("- **{}** {}: {}", id, label, summary.text);
                if summary.lacking {
                    println!("  - *warning*: source page not given");
                }
            }
            Ok(())
        }
    }
}

async fn run_wikitext(config: &Config, provider: &FsContentProvider, args: PageArgs) -> Result<()> {
    let doc = open(config, provider, &args).await?;
    print!("{}", doc.serialize(provider).await?);
    Ok(())
}

async fn run_preview(
    config: &Config,
    provider: &FsContentProvider,
    args: NoticeArgs,
    output: OutputFormat,
) -> Result<()> {
    let doc = open(config, provider, &args.page).await?;
    let page = doc.page()?.to_string();
    let mut previews = Vec::new();
    for id in selected_notices(&doc, args.notice.as_deref())? {
        let text = doc.to_text(&id)?;
        let mut panel = PreviewPanel::with_interval(config.preview.refresh_interval_ms);
        panel.refresh(&PlainRenderer, &page, &text).await;
        previews.push((id, panel.html().unwrap_or_default().to_string()));
    }

    match output {
        OutputFormat::Json => print_json(&json!(
            previews
                .iter()
                .map(|(id, html)| json!({"id": id, "html": html}))
                .collect::<Vec<_>>()
        )),
        OutputFormat::Markdown => {
            for (_, html) in previews {
                println!("{}", html);
            }
            Ok(())
        }
    }
}
