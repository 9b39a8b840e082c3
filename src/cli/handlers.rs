//! CLI command handlers

use std::io::BufRead;
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing::warn;

use crate::api;
use crate::config::AppConfig;
use crate::dialogue::DialogueEngine;
use crate::forms::FormParser;
use crate::forms::FormPipeline;
use crate::kb;
use crate::kb::KnowledgeIndex;
use crate::llm::AzureOpenAi;
use crate::llm::FieldExtractor;
use crate::ocr::DocumentIntelligence;
use crate::rag::RetrievalAugmentedAnswerer;
use crate::Result;

/// Start the API server, with CLI overrides taking precedence over config
pub async fn handle_serve(
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
    cors: bool,
) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let enable_cors = cors || config.server.enable_cors;

    api::serve_api(config, host, port, enable_cors).await
}

/// Interactive terminal chat: one intake dialogue session on stdin/stdout
pub async fn handle_chat(config: &AppConfig) -> Result<()> {
    let (engine, _) = build_engine(config).await?;

    let (mut session, greeting) = engine.start();
    for line in &greeting {
        println!("{line}");
    }

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        for reply in engine.submit(&mut session, input).await {
            println!("{reply}");
        }
    }

    info!("Chat session {} ended", session.id);
    Ok(())
}

/// OCR a document file and print or save the extracted fields
pub async fn handle_extract(
    config: &AppConfig,
    file: &Path,
    output: Option<&Path>,
    english: bool,
) -> Result<()> {
    let document = std::fs::read(file)?;
    info!("Read {} bytes from {}", document.len(), file.display());

    let azure = Arc::new(AzureOpenAi::from_config(&config.azure_openai)?);
    let ocr = Arc::new(DocumentIntelligence::from_config(
        &config.document_intelligence,
    )?);
    let pipeline = FormPipeline::new(ocr, FormParser::new(azure));

    let extraction = pipeline.extract(&document).await?;

    if !extraction.low_confidence_words.is_empty() {
        eprintln!("Low-confidence words (verify manually):");
        for word in &extraction.low_confidence_words {
            eprintln!("  {} ({:.2})", word.text, word.confidence);
        }
    }

    let fields = if english {
        &extraction.fields_en
    } else {
        &extraction.fields
    };
    let json = serde_json::to_string_pretty(fields)?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)?;
            println!("Extraction written to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Search the knowledge base and print the scored passages
pub async fn handle_search(config: &AppConfig, query: &str, limit: usize) -> Result<()> {
    let (_, index) = build_engine(config).await?;

    let results = index.search(query, limit).await;
    if results.is_empty() {
        println!("No matching passages found.");
        return Ok(());
    }

    for (rank, result) in results.iter().enumerate() {
        println!(
            "{}. [{:.4}] {} (paragraph {})",
            rank + 1,
            result.score,
            result.passage.source_file,
            result.passage.paragraph_index
        );
        println!("   {}", result.passage.text);
    }

    Ok(())
}

/// Print the active configuration with secrets redacted
pub fn handle_config(config: &AppConfig) -> Result<()> {
    println!("Azure OpenAI:");
    println!("  endpoint: {}", config.azure_openai.endpoint);
    println!("  api_key: {}", redact(&config.azure_openai.api_key));
    println!("  api_version: {}", config.azure_openai.api_version);
    println!("  chat_deployment: {}", config.azure_openai.chat_deployment);
    println!(
        "  embedding_deployment: {}",
        config.azure_openai.embedding_deployment
    );
    println!("Document Intelligence:");
    println!("  endpoint: {}", config.document_intelligence.endpoint);
    println!(
        "  api_key: {}",
        redact(&config.document_intelligence.api_key)
    );
    println!(
        "  api_version: {}",
        config.document_intelligence.api_version
    );
    println!("Knowledge base:");
    println!("  dir: {}", config.knowledge_base.dir);
    println!("  top_k: {}", config.knowledge_base.top_k);
    println!("  max_embed_chars: {}", config.knowledge_base.max_embed_chars);
    println!("Server:");
    println!("  host: {}", config.server.host);
    println!("  port: {}", config.server.port);
    println!("  enable_cors: {}", config.server.enable_cors);
    println!(
        "  session_timeout_secs: {}",
        config.server.session_timeout_secs
    );

    Ok(())
}

/// Build the dialogue engine and knowledge index for terminal commands
async fn build_engine(config: &AppConfig) -> Result<(DialogueEngine, Arc<KnowledgeIndex>)> {
    let azure = Arc::new(AzureOpenAi::from_config(&config.azure_openai)?);

    let loaded = kb::load_dir(config.knowledge_base_dir())?;
    if !loaded.failed_files.is_empty() {
        warn!(
            "{} knowledge base file(s) could not be read",
            loaded.failed_files.len()
        );
    }

    let index = Arc::new(
        KnowledgeIndex::build(loaded.passages, azure.clone(), config.max_embed_chars()).await,
    );
    info!("Knowledge index ready ({} entries)", index.len());

    let engine = DialogueEngine::new(
        FieldExtractor::new(azure.clone()),
        RetrievalAugmentedAnswerer::new(index.clone(), azure, config.top_k()),
    );

    Ok((engine, index))
}

fn redact(secret: &str) -> &str {
    if secret.is_empty() {
        "(not set)"
    } else {
        "********"
    }
}
