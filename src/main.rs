use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use textgraph::web::ShellServer;
use textgraph::{generate, Config, GeminiExtractor, Renderer};

#[derive(Parser, Debug)]
#[command(name = "textgraph")]
#[command(about = "Build interactive knowledge graphs from text or triples", version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the interactive web shell (default)
    Serve {
        /// Port to listen on (overrides http_server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Extract a graph from a UTF-8 text file and render it
    Text {
        file: PathBuf,
    },
    /// Render a JSON file of {subject, relation, object} triples
    Triples {
        file: PathBuf,
    },
}

/// Build the Gemini extractor from configuration.
fn build_extractor(config: &Config) -> Result<GeminiExtractor> {
    let api_key = config.api_key()?;
    Ok(GeminiExtractor::new(api_key, &config.extraction)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger from environment variable or default to info level
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let args = Args::parse();

    // Fails fast when the extraction credential is missing
    let config = Config::load()?;
    log::info!("Configuration loaded successfully");

    match args.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => run_server(config, port).await?,
        Command::Text { file } => run_text(config, &file).await?,
        Command::Triples { file } => {
            let path = run_triples(config, &file).await?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

/// Run the web shell
async fn run_server(config: Config, port: Option<u16>) -> Result<()> {
    log::info!("Starting textgraph v{}", env!("CARGO_PKG_VERSION"));

    let extractor = build_extractor(&config)?;
    log::info!("Extraction model: {}", extractor.model());
    let renderer = Renderer::new(config.render.clone());
    let port = port.unwrap_or(config.http_server.port);

    let server = ShellServer::new(Arc::new(extractor), renderer, &config);
    server.run(port).await?;

    Ok(())
}

/// One-shot extraction from a text file
async fn run_text(config: Config, file: &Path) -> Result<()> {
    let bytes = std::fs::read(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let text = generate::decode_text(&bytes)?;

    let extractor = build_extractor(&config)?;
    let renderer = Renderer::new(config.render.clone());

    let artifact = generate::from_text(&extractor, &renderer, text).await?;
    println!("{}", artifact.path.display());

    Ok(())
}

/// One-shot rendering of a triple file, returning the artifact path
async fn run_triples(config: Config, file: &Path) -> Result<PathBuf> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let renderer = Renderer::new(config.render);
    let artifact = generate::from_triples(&renderer, &content).await?;

    Ok(artifact.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use textgraph::config::RenderConfig;

    fn config_for(dir: &TempDir) -> Config {
        Config {
            render: RenderConfig {
                output_dir: dir.path().join("graphs"),
                ..RenderConfig::default()
            },
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_run_triples_writes_artifact() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("triples.json");
        std::fs::write(
            &input,
            r#"[{"subject":"Ada Lovelace","relation":"worked with","object":"Charles Babbage"}]"#,
        )
        .unwrap();

        let path = run_triples(config_for(&dir), &input).await.unwrap();
        assert!(path.starts_with(dir.path().join("graphs")));

        let written: Vec<_> = std::fs::read_dir(dir.path().join("graphs"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(written.len(), 1);
        assert!(written[0].starts_with("knowledge_graph-"));
        assert!(written[0].ends_with(".html"));

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("\"worked with\""));
    }

    #[tokio::test]
    async fn test_run_triples_rejects_malformed_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("triples.json");
        std::fs::write(&input, r#"[{"subject":"A","object":"B"}]"#).unwrap();

        assert!(run_triples(config_for(&dir), &input).await.is_err());
        assert!(!dir.path().join("graphs").exists());
    }

    #[tokio::test]
    async fn test_run_triples_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = run_triples(config_for(&dir), &dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
