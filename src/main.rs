use anyhow::{Context, Result};
use clap::Parser;
use convo_store::cli::{Cli, Commands};
use convo_store::{utils, SaveOptions, SessionStore, Settings, StoredMessage};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::new().context("Failed to load configuration")?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let mut config = settings.store_config();
    if let Some(dir) = cli.session_dir {
        config.session_dir = dir;
    }
    if let Some(max) = cli.max_sessions {
        config = config.max_sessions(max);
    }
    let store = SessionStore::open(config).await?;

    match cli.command {
        Commands::List => handle_list(&store).await,
        Commands::Show { id } => handle_show(&store, &id).await,
        Commands::Save {
            file,
            id,
            name,
            description,
            provider,
            model,
        } => {
            let options = SaveOptions {
                session_id: id,
                name,
                description,
                provider,
                model,
            };
            handle_save(&store, file, options).await
        }
        Commands::Delete { id } => handle_delete(&store, &id).await,
        Commands::Purge { keep } => handle_purge(&store, keep).await,
        Commands::Last => handle_last(&store).await,
        Commands::Resume { id } => handle_resume(&store, id).await,
        Commands::Reindex => handle_reindex(&store).await,
    }
}

async fn handle_list(store: &SessionStore) -> Result<()> {
    let sessions = store.list_sessions().await;
    utils::print_header(&format!("Sessions in {}", store.session_dir().display()));
    utils::print_session_table(&sessions);
    Ok(())
}

async fn handle_show(store: &SessionStore, id: &str) -> Result<()> {
    match store.load_session(id).await? {
        Some(session) => utils::print_session(&session),
        None => utils::print_error(&format!("Session '{}' not found", id)),
    }
    Ok(())
}

async fn handle_save(store: &SessionStore, file: PathBuf, options: SaveOptions) -> Result<()> {
    let raw = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("Failed to read {:?}", file))?;
    let messages: Vec<StoredMessage> = serde_json::from_str(&raw)
        .with_context(|| format!("{:?} is not a JSON array of messages", file))?;

    let metadata = store.save_session(&messages, options).await?;
    utils::print_success(&format!(
        "Saved session '{}' ({} messages)",
        metadata.id, metadata.message_count
    ));
    Ok(())
}

async fn handle_delete(store: &SessionStore, id: &str) -> Result<()> {
    if store.delete_session(id).await? {
        utils::print_success(&format!("Deleted session '{}'", id));
    } else {
        utils::print_error(&format!("Session '{}' not found", id));
    }
    Ok(())
}

async fn handle_purge(store: &SessionStore, keep: Option<usize>) -> Result<()> {
    let keep = keep.unwrap_or_else(|| store.max_sessions());
    let removed = store.purge_sessions(keep).await?;
    utils::print_success(&format!("Removed {} sessions (keeping {})", removed, keep));
    Ok(())
}

async fn handle_last(store: &SessionStore) -> Result<()> {
    match store.get_last_session().await {
        Some(id) => println!("{}", id),
        None => utils::print_info("No last session"),
    }
    Ok(())
}

async fn handle_resume(store: &SessionStore, id: Option<String>) -> Result<()> {
    let id = match id {
        Some(id) => id,
        None => match store.get_last_session().await {
            Some(id) => id,
            None => {
                utils::print_info("No session to resume");
                return Ok(());
            }
        },
    };

    match store.restore_session(&id).await? {
        Some(restored) => {
            utils::print_header(&format!("Resuming {}", id));
            if let Some(summary) = restored.context_summary {
                println!("{}\n", summary);
            }
            utils::print_info(&format!("{} messages ready to replay", restored.messages.len()));
        }
        None => utils::print_error(&format!("Session '{}' not found", id)),
    }
    Ok(())
}

async fn handle_reindex(store: &SessionStore) -> Result<()> {
    let index = store.rebuild_index().await;
    utils::print_success(&format!("Indexed {} sessions", index.sessions.len()));
    Ok(())
}
