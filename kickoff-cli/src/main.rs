//! Kickoff CLI - interpret scheduling constraints from the command line
//!
//! # Commands
//!
//! ```bash
//! # Show what the extractors pull out of a query
//! kickoff extract "at least 2 rivalry games on ESPN"
//!
//! # Interpret with the detectors alone, or fused with corpus similarity
//! kickoff interpret "no back-to-back road games"
//! kickoff interpret --fuse --embedder jina "each team gets a bye"
//!
//! # Nearest canonical phrasings after re-ranking
//! kickoff search "every team plays 3 away games in 4 weeks"
//!
//! # HTTP endpoint
//! kickoff serve --addr 0.0.0.0:3000
//! ```

mod server;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use kickoff_lib::{
    classify::{Classifier, FamilyScore, Thresholds},
    embed::{BgeEmbedder, Embedder, JinaConfig, JinaEmbedder},
    extract::Extraction,
    render::{render_outcome, Outcome},
    rerank::LexicalReranker,
    search::SearchEngine,
    store::{canonical_corpus, load_corpus, CorpusExample, MemoryStore},
    template::TemplateFamily,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kickoff")]
#[command(about = "Interpret natural-language sports-scheduling constraints")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the entity extractors and print what they found
    Extract {
        /// Constraint text
        query: String,
    },

    /// Interpret a constraint into a template
    Interpret {
        /// Constraint text
        query: String,

        /// Fuse detector scores with corpus similarity (needs an embedder)
        #[arg(long)]
        fuse: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,

        /// Include every family's score in the outcome
        #[arg(long)]
        debug: bool,

        #[command(flatten)]
        thresholds: ThresholdArgs,

        #[command(flatten)]
        embedder: EmbedderArgs,
    },

    /// Show the nearest canonical phrasings for a query
    Search {
        /// Query text
        query: String,

        /// Number of results to return
        #[arg(short, long, default_value = "5")]
        k: usize,

        /// Number of candidates retrieved before re-ranking
        #[arg(short, long, default_value = "10")]
        n: usize,

        /// JSON corpus file to index instead of the built-in phrasings
        #[arg(long)]
        corpus: Option<PathBuf>,

        #[command(flatten)]
        embedder: EmbedderArgs,
    },

    /// List the built-in canonical phrasings
    Corpus {
        /// Only show one family (id or display name)
        #[arg(short, long)]
        family: Option<TemplateFamily>,

        /// Print as JSON (loadable with `search --corpus`)
        #[arg(long)]
        json: bool,
    },

    /// Serve the interpretation endpoint over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, env = "KICKOFF_ADDR", default_value = "127.0.0.1:3000")]
        addr: String,

        /// JSON corpus file to index instead of the built-in phrasings
        #[arg(long)]
        corpus: Option<PathBuf>,

        #[command(flatten)]
        thresholds: ThresholdArgs,

        #[command(flatten)]
        embedder: EmbedderArgs,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EmbedderKind {
    /// Local BAAI/bge-large-en-v1.5
    Bge,
    /// Local BAAI/bge-small-en-v1.5
    BgeSmall,
    /// Jina AI embeddings API
    Jina,
}

#[derive(Args)]
struct EmbedderArgs {
    /// Embedding provider
    #[arg(long, value_enum, env = "KICKOFF_EMBEDDER", default_value = "bge-small")]
    embedder: EmbedderKind,

    /// Jina API key
    #[arg(long, env = "JINA_API_KEY", hide_env_values = true)]
    jina_api_key: Option<String>,
}

impl EmbedderArgs {
    fn build(&self) -> Result<Box<dyn Embedder>> {
        let embedder: Box<dyn Embedder> = match self.embedder {
            EmbedderKind::Bge => {
                println!("Loading BGE model (first run downloads ~1.2GB)...");
                Box::new(BgeEmbedder::new()?)
            }
            EmbedderKind::BgeSmall => {
                println!("Loading BGE small model (first run downloads ~130MB)...");
                Box::new(BgeEmbedder::small()?)
            }
            EmbedderKind::Jina => Box::new(JinaEmbedder::from_config(&JinaConfig {
                api_key: self.jina_api_key.clone(),
                ..JinaConfig::default()
            })?),
        };
        info!(model = embedder.model_name(), "embedder ready");
        Ok(embedder)
    }
}

/// Overrides for the confidence policy; unset flags keep the defaults.
#[derive(Args)]
struct ThresholdArgs {
    /// Below this confidence no constraint is produced
    #[arg(long)]
    low_confidence: Option<f32>,

    /// Alternatives are shown only below this confidence
    #[arg(long)]
    show_alternatives_below: Option<f32>,

    /// Minimum runner-up score for an alternative
    #[arg(long)]
    alternative_min_score: Option<f32>,
}

impl ThresholdArgs {
    fn thresholds(&self) -> Thresholds {
        let defaults = Thresholds::default();
        Thresholds {
            low_confidence: self.low_confidence.unwrap_or(defaults.low_confidence),
            show_alternatives_below: self
                .show_alternatives_below
                .unwrap_or(defaults.show_alternatives_below),
            alternative_min_score: self
                .alternative_min_score
                .unwrap_or(defaults.alternative_min_score),
        }
    }
}

fn corpus_examples(path: Option<&PathBuf>) -> Result<Vec<CorpusExample>> {
    Ok(match path {
        Some(path) => load_corpus(path)?,
        None => canonical_corpus(),
    })
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Interpreted {
            template,
            confidence,
            parsed_constraint,
            alternatives,
            debug,
            ..
        } => {
            println!("{template} (confidence {confidence:.2})\n");
            println!("{parsed_constraint}");
            for alt in alternatives {
                println!("\nAlternative ({:.2}): {}", alt.confidence, alt.reason);
                println!("  {}", alt.parsed_constraint);
            }
            print_scores(debug.as_deref());
        }
        Outcome::Unclear {
            message,
            suggestion,
            best_guess,
            confidence,
            debug,
        } => {
            println!("{message}");
            println!("Best guess: {best_guess} (confidence {confidence:.2})\n");
            println!("Try: {suggestion}");
            print_scores(debug.as_deref());
        }
    }
}

fn print_scores(scores: Option<&[FamilyScore]>) {
    let Some(scores) = scores else {
        return;
    };
    println!("\n=== Scores ===");
    for s in scores {
        println!("  {:<40} {:.2}", s.family.display_name(), s.score);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { query } => {
            let extraction = Extraction::from_text(&query);
            println!("{}", serde_json::to_string_pretty(&extraction)?);
        }

        Commands::Interpret {
            query,
            fuse,
            json,
            debug,
            thresholds,
            embedder,
        } => {
            let classifier = Classifier::with_thresholds(thresholds.thresholds());

            let result = if fuse {
                let mut engine = SearchEngine::with_rerank(
                    embedder.build()?,
                    MemoryStore::new(),
                    LexicalReranker,
                )
                .with_classifier(classifier.clone());
                engine.seed()?;
                engine.interpret(&query)?
            } else {
                classifier.classify(&query)?
            };

            let outcome = render_outcome(&result, classifier.thresholds(), debug);
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome);
            }
        }

        Commands::Search {
            query,
            k,
            n,
            corpus,
            embedder,
        } => {
            let examples = corpus_examples(corpus.as_ref())?;
            let mut engine =
                SearchEngine::with_rerank(embedder.build()?, MemoryStore::new(), LexicalReranker);

            println!("Indexing {} phrasings...", examples.len());
            engine.index(&examples)?;

            println!("\nSearching: '{query}' (k={k}, n={n})");
            let results = engine.search_reranked(&query, k, n)?;

            println!("\n=== Results ===\n");
            for (i, result) in results.iter().enumerate() {
                println!(
                    "#{} {} (distance: {:.4})",
                    i + 1,
                    result.example.family.display_name(),
                    result.distance
                );
                println!("  {}\n", result.example.text);
            }
        }

        Commands::Corpus { family, json } => {
            let examples: Vec<CorpusExample> = canonical_corpus()
                .into_iter()
                .filter(|e| family.map_or(true, |f| e.family == f))
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&examples)?);
            } else {
                for family in TemplateFamily::ALL {
                    let texts: Vec<&str> = examples
                        .iter()
                        .filter(|e| e.family == family)
                        .map(|e| e.text.as_str())
                        .collect();
                    if texts.is_empty() {
                        continue;
                    }
                    println!("=== {} ===", family.display_name());
                    for text in texts {
                        println!("- {text}");
                    }
                    println!();
                }
            }
        }

        Commands::Serve {
            addr,
            corpus,
            thresholds,
            embedder,
        } => {
            let examples = corpus_examples(corpus.as_ref())?;
            let mut engine =
                SearchEngine::with_rerank(embedder.build()?, MemoryStore::new(), LexicalReranker)
                    .with_classifier(Classifier::with_thresholds(thresholds.thresholds()));
            engine.index(&examples)?;
            info!(examples = engine.len(), "corpus indexed");

            server::serve(&addr, server::AppState::new(engine)).await?;
        }
    }

    Ok(())
}
