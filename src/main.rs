//! ZeroBot: local LLM chatbot over crawled web pages.
//!
//! Line-oriented REPL. `:crawl <url>` ingests a page, `:history` shows the
//! session's exchanges newest first, anything else is a question answered
//! from the indexed corpus.

use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

use zerobot::chat::{AnswerPipeline, ChatSession};
use zerobot::config::AppConfig;
use zerobot::ingestion::IngestionPipeline;
use zerobot::models::{OllamaEmbedder, OllamaGenerator};
use zerobot::stores::sqlite::SqliteDocumentStore;
use zerobot::stores::VectorStore;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            // Initialization failures are reported once; no panic, no retry
            // loop. The user fixes the environment and relaunches.
            error!("{message}");
            eprintln!("zerobot: {message}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = fmt().with_env_filter(filter).finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

async fn run() -> Result<(), String> {
    let config = AppConfig::from_env().map_err(|err| format!("configuration error: {err}"))?;

    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .map_err(|err| {
            format!(
                "cannot create data directory {}: {err}",
                config.data_dir.display()
            )
        })?;

    let embedder = OllamaEmbedder::new(
        config.ollama_host.clone(),
        config.model.clone(),
        config.embed_dim,
    );
    let generator = OllamaGenerator::new(config.ollama_host.clone(), config.model.clone());

    let store = SqliteDocumentStore::open(config.db_path(), &embedder)
        .await
        .map_err(|err| format!("cannot open vector store at {}: {err}", config.db_path().display()))?;
    let store: Arc<dyn VectorStore> = Arc::new(store);

    let ingestor = IngestionPipeline::new(embedder.clone(), Arc::clone(&store));
    let mut session = ChatSession::new(AnswerPipeline::new(
        embedder,
        Arc::clone(&store),
        Arc::new(generator),
    ));

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_banner(&config, &mut stdout).await;
    prompt(&mut stdout).await;

    while let Ok(Some(line)) = lines.next_line().await {
        let input = line.trim();
        if input.is_empty() {
            prompt(&mut stdout).await;
            continue;
        }

        match input.split_once(' ').map_or((input, ""), |(a, b)| (a, b)) {
            (":quit" | ":q", _) => break,
            (":help", _) => print_help(&mut stdout).await,
            (":history", _) => {
                if session.history_newest_first().next().is_none() {
                    say(&mut stdout, "no exchanges yet\n").await;
                }
                for entry in session.history_newest_first() {
                    say(
                        &mut stdout,
                        &format!("You: {}\nZeroBot: {}\n\n", entry.question, entry.answer),
                    )
                    .await;
                }
            }
            (":crawl", url) => match ingestor.ingest(url).await {
                Ok(report) => {
                    say(
                        &mut stdout,
                        &format!(
                            "ingested {} ({} bytes fetched, {} chars indexed)\n",
                            report.url, report.fetched_bytes, report.text_chars
                        ),
                    )
                    .await;
                }
                Err(err) => say(&mut stdout, &format!("ingestion failed: {err}\n")).await,
            },
            _ => {
                let answer = session.ask(input).await;
                say(&mut stdout, &format!("ZeroBot: {answer}\n")).await;
            }
        }
        prompt(&mut stdout).await;
    }

    Ok(())
}

async fn print_banner(config: &AppConfig, stdout: &mut tokio::io::Stdout) {
    say(
        stdout,
        &format!(
            "ZeroBot — local RAG chatbot (model {}, ollama {})\ntype :help for commands\n",
            config.model, config.ollama_host
        ),
    )
    .await;
}

async fn print_help(stdout: &mut tokio::io::Stdout) {
    say(
        stdout,
        ":crawl <url>  fetch a page and add it to the index\n\
         :history      show this session's exchanges, newest first\n\
         :quit         exit\n\
         anything else is asked as a question\n",
    )
    .await;
}

async fn prompt(stdout: &mut tokio::io::Stdout) {
    say(stdout, "> ").await;
}

async fn say(stdout: &mut tokio::io::Stdout, text: &str) {
    let _ = stdout.write_all(text.as_bytes()).await;
    let _ = stdout.flush().await;
}
