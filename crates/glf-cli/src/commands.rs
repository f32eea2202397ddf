use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use glf_server::{GlfServer, ServerConfig};
use glf_store::{persist, Collection, DATA_FILE};
use glf_types::{timestamp::format_iso, TokenId, TokenRecord};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::List(args) => cmd_list(args, cli.format),
        Command::Show(args) => cmd_show(args, cli.format),
        Command::Hashtags(args) => cmd_hashtags(args, cli.format),
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    let server = GlfServer::open(config).context("opening token store")?;
    server.serve().await?;
    Ok(())
}

/// Read the collection without creating anything on disk.
fn load_collection(data_dir: &Path) -> anyhow::Result<Collection> {
    let path = data_dir.join(DATA_FILE);
    let records = persist::read_records(&path)
        .with_context(|| format!("reading {}", path.display()))?
        .unwrap_or_default();
    Ok(Collection::from_records(records)?)
}

fn cmd_list(args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let collection = load_collection(&args.data.data_dir)?;
    let records: Vec<&TokenRecord> = collection.records().take(args.limit).collect();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No tokens.");
        return Ok(());
    }
    for record in records {
        println!("{}", token_line(record));
    }
    if collection.len() > args.limit {
        println!("{}", format!("... {} more", collection.len() - args.limit).dimmed());
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let id: TokenId = args.token_id.parse()?;
    let collection = load_collection(&args.data.data_dir)?;
    let Some(record) = collection.get(id) else {
        bail!("token does not exist: {id}");
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }
    println!("{}", token_line(record));
    let field = |label: &str, value: &Option<String>| {
        if let Some(v) = value {
            println!("  {:<12} {}", label.dimmed(), v);
        }
    };
    field("artist", &record.artist);
    field("owner", &record.owner);
    field("description", &record.description);
    field("txHash", &record.tx_hash);
    field("image", &record.image);
    if !record.hashtags.is_empty() {
        println!("  {:<12} {}", "hashtags".dimmed(), record.hashtags.join(" ").cyan());
    }
    Ok(())
}

fn cmd_hashtags(args: HashtagsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let collection = load_collection(&args.data.data_dir)?;
    let tags: Vec<&String> = collection.hashtags().iter().take(args.limit).collect();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&tags)?);
        return Ok(());
    }
    if tags.is_empty() {
        println!("No hashtags.");
    }
    for (rank, tag) in tags.iter().enumerate() {
        println!("{:>3}. {}", rank + 1, format!("#{tag}").cyan());
    }
    Ok(())
}

fn token_line(record: &TokenRecord) -> String {
    format!(
        "{}  {}  {}",
        format!("#{}", record.token_id).yellow().bold(),
        format_iso(&record.date_created).dimmed(),
        record.name.as_deref().unwrap_or("(untitled)"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use glf_store::{FileTokenStore, TokenStore};
    use glf_types::NewToken;

    #[test]
    fn load_missing_collection_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let c = load_collection(dir.path()).unwrap();
        assert!(c.is_empty());
        assert!(!dir.path().join(DATA_FILE).exists());
    }

    #[test]
    fn load_reads_store_output() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::open(dir.path()).unwrap();
        let mut new = NewToken::new(TokenId::new(3));
        new.name = Some("Dusk".into());
        new.hashtags = vec!["sky".into()];
        store.append(new).unwrap();

        let c = load_collection(dir.path()).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c.hashtags(), ["sky"]);
        assert!(token_line(c.get(TokenId::new(3)).unwrap()).contains("Dusk"));
    }

    #[test]
    fn show_unknown_token_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = ShowArgs {
            token_id: "5".into(),
            data: DataDirArg { data_dir: dir.path().to_path_buf() },
        };
        assert!(cmd_show(args, OutputFormat::Text).is_err());
    }
}
