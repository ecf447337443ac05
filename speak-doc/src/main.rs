//! speak-doc - Read PDF and text documents aloud with language-matched TTS backends

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use speak_doc::output::{self, Manifest, OutputDir};
use speak_doc::text::{self, TextChunk};
use speak_doc::{Document, Narration, SpeakDocConfig, document};
use std::path::{Path, PathBuf};
use tts_client::{Language, SpeechGenerator, select_backend};

#[derive(Parser, Debug)]
#[command(name = "speak-doc")]
#[command(about = "Read PDF and text documents aloud with language-matched TTS backends", long_about = None)]
#[command(version)]
struct Args {
    /// Path to a PDF or text file ("-" for stdin)
    input: Option<PathBuf>,

    /// Read this text instead of a file
    #[arg(long, conflicts_with = "input")]
    text: Option<String>,

    /// Output directory (default: <input-name>_audio)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force the language instead of detecting it (en, pl)
    #[arg(short, long)]
    language: Option<Language>,

    /// Maximum characters per segment
    #[arg(long)]
    max_length: Option<usize>,

    /// Voice id for the selected backend
    #[arg(long)]
    voice: Option<String>,

    /// Speaking rate multiplier (0.25-4.0)
    #[arg(long)]
    rate: Option<f32>,

    /// Only synthesize the first N segments
    #[arg(long)]
    limit: Option<usize>,

    /// Show the segment plan without synthesizing
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show detected language, duration estimate and segments for a document
    Inspect {
        /// Path to a PDF or text file ("-" for stdin)
        input: Option<PathBuf>,

        /// Inspect this text instead of a file
        #[arg(long, conflicts_with = "input")]
        text: Option<String>,

        /// Maximum characters per segment
        #[arg(long)]
        max_length: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the Piper server URL (empty string runs the local piper executable)
    SetPiperUrl { url: String },
    /// Set the Piper voice id
    SetPiperVoice { voice: String },
    /// Set the path to the local piper executable
    SetPiperBinary { path: PathBuf },
    /// Set the directory holding Piper .onnx voice models
    SetVoicesDir { path: PathBuf },
    /// Set the Kokoro speech endpoint
    SetKokoroUrl { url: String },
    /// Set the Kokoro voice id
    SetKokoroVoice { voice: String },
    /// Set the Kokoro API key (empty string clears it)
    SetKokoroKey { key: String },
    /// Set default speaking rate
    SetRate {
        /// Value (0.25-4.0)
        value: f32,
    },
    /// Set maximum characters per segment
    SetMaxLength { value: usize },
    /// Set retry count for transient backend failures
    SetRetries { value: u32 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    // Handle subcommands
    match &args.command {
        Some(Commands::Config { action }) => {
            return handle_config_command(action);
        }
        Some(Commands::Inspect {
            input,
            text,
            max_length,
        }) => {
            return handle_inspect(input.as_deref(), text.as_deref(), *max_length);
        }
        None => {}
    }

    let mut config = SpeakDocConfig::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, &args);

    let document = load_input(args.input.as_deref(), args.text.as_deref())?;
    let language = args
        .language
        .unwrap_or_else(|| text::classify_with_threshold(&document.text, config.pl_threshold));
    let chunks = text::process_text(&document.text, config.max_chunk_length);
    let estimate = text::format_duration(text::estimate_seconds(document.char_count()));

    eprintln!(
        "Document: {} ({} chars, ~{} words)",
        document.name,
        document.char_count(),
        document.word_count()
    );
    eprintln!(
        "Language: {}{}",
        language,
        if args.language.is_some() { " (forced)" } else { "" }
    );
    eprintln!("Estimated duration: ~{}", estimate);
    eprintln!("Segments: {}", chunks.len());

    if chunks.is_empty() {
        anyhow::bail!("Nothing to read: the document produced no segments");
    }

    if args.dry_run {
        print_segments(&chunks);
        return Ok(());
    }

    let selected = match args.limit {
        Some(n) => &chunks[..n.min(chunks.len())],
        None => &chunks[..],
    };

    let backend = select_backend(language);
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| output::default_output_dir(args.input.as_deref()));
    let out = OutputDir::create(&output_dir, backend.audio_format())?;

    if args.debug {
        eprintln!("Backend: {}", backend.name());
        eprintln!("Output: {}", out.path().display());
        eprintln!("Max segment length: {}", config.max_chunk_length);
    }

    eprintln!("Synthesizing {} segment(s) with {}...", selected.len(), backend.name());

    let pb = ProgressBar::new(selected.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let narration = Narration {
        generator: &backend,
        language,
        config: &config.tts,
        max_retries: config.max_retries,
    };

    let result = narration
        .run(selected, |chunk, audio| {
            let record = out.write_segment(chunk, &audio)?;
            pb.set_message(record.file.clone());
            pb.inc(1);
            Ok(record)
        })
        .await;

    let records = match result {
        Ok(records) => {
            pb.finish_with_message("done");
            records
        }
        Err(e) => {
            pb.abandon();
            return Err(e);
        }
    };

    let manifest = Manifest {
        source: document.name.clone(),
        kind: document.kind,
        language,
        backend: backend.name().to_string(),
        format: backend.audio_format(),
        max_chunk_length: config.max_chunk_length,
        char_count: document.char_count(),
        estimated_duration: estimate,
        total_segments: chunks.len(),
        generated_at: Utc::now(),
        segments: records,
    };
    let manifest_path = out.write_manifest(&manifest)?;

    let total_bytes: usize = manifest.segments.iter().map(|s| s.bytes).sum();
    eprintln!(
        "\nWrote {} segment(s), {:.1} MB, to {}",
        manifest.segments.len(),
        total_bytes as f64 / (1024.0 * 1024.0),
        out.path().display()
    );
    log::info!("Manifest: {}", manifest_path.display());

    Ok(())
}

/// Route `log` output to stderr; `RUST_LOG` overrides the default level.
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Apply one-off command line settings on top of the config file.
fn apply_overrides(config: &mut SpeakDocConfig, args: &Args) {
    if let Some(max_length) = args.max_length {
        config.max_chunk_length = max_length;
    }
    if let Some(rate) = args.rate {
        config.tts = config.tts.clone().with_rate(rate);
    }
    if let Some(voice) = &args.voice {
        // Language isn't known yet, so both backends get the voice
        config.tts.piper_voice = voice.clone();
        config.tts.kokoro_voice = voice.clone();
    }
}

/// Load the document from `--text`, a path, or fail with usage help.
fn load_input(input: Option<&Path>, text: Option<&str>) -> Result<Document> {
    match (input, text) {
        (_, Some(text)) => Document::inline(text),
        (Some(path), None) => {
            eprintln!("Reading: {}", path.display());
            document::read_document(path)
        }
        (None, None) => Err(anyhow::anyhow!(
            "An input file or --text is required. Run 'speak-doc --help' for usage."
        )),
    }
}

fn print_segments(chunks: &[TextChunk]) {
    for chunk in chunks {
        println!("[{:>3}] ({:>3}) {}", chunk.index, chunk.char_len(), chunk.text);
    }
}

fn handle_inspect(input: Option<&Path>, text: Option<&str>, max_length: Option<usize>) -> Result<()> {
    let config = SpeakDocConfig::load().context("Failed to load configuration")?;
    let max_length = max_length.unwrap_or(config.max_chunk_length);

    let document = load_input(input, text)?;
    let density = text::diacritic_density(&document.text);
    let language = text::classify_with_threshold(&document.text, config.pl_threshold);
    let chunks = text::process_text(&document.text, max_length);

    println!("Source: {} ({:?})", document.name, document.kind);
    println!("Characters: {}", document.char_count());
    println!("Words: ~{}", document.word_count());
    println!(
        "Language: {} (diacritic density {:.4}, threshold {})",
        language, density, config.pl_threshold
    );
    println!("Backend: {}", select_backend(language).name());
    println!(
        "Estimated duration: ~{}",
        text::format_duration(text::estimate_seconds(document.char_count()))
    );
    println!("Segments: {} (max {} chars)", chunks.len(), max_length);
    println!();
    print_segments(&chunks);

    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = SpeakDocConfig::load()?;
            let tts = &config.tts;
            println!("Configuration file: {:?}", SpeakDocConfig::config_path()?);
            println!();
            println!("max_chunk_length = {}", config.max_chunk_length);
            println!("pl_threshold = {}", config.pl_threshold);
            println!("max_retries = {}", config.max_retries);
            println!();
            println!("[tts]");
            if tts.piper_url.trim().is_empty() {
                println!("piper_url = (local piper executable)");
            } else {
                println!("piper_url = \"{}\"", tts.piper_url);
            }
            println!("piper_voice = \"{}\"", tts.piper_voice);
            match &tts.piper_binary {
                Some(path) => println!("piper_binary = \"{}\"", path.display()),
                None => println!("piper_binary = (search PATH)"),
            }
            match tts.voices_dir() {
                Ok(dir) => println!("voices_dir = \"{}\"", dir.display()),
                Err(e) => println!("voices_dir = (unavailable: {})", e),
            }
            println!("kokoro_url = \"{}\"", tts.kokoro_url);
            match &tts.kokoro_api_key {
                Some(_) => println!("kokoro_api_key = (set)"),
                None => println!("kokoro_api_key = (none)"),
            }
            println!("kokoro_voice = \"{}\"", tts.kokoro_voice);
            println!("rate = {}", tts.rate);
        }
        ConfigAction::SetPiperUrl { url } => {
            let mut config = SpeakDocConfig::load()?;
            config.tts.piper_url = url.trim().to_string();
            config.save()?;
            if config.tts.piper_url.is_empty() {
                println!("Piper will run locally");
            } else {
                println!("Piper server URL set to: {}", config.tts.piper_url);
            }
        }
        ConfigAction::SetPiperVoice { voice } => {
            let mut config = SpeakDocConfig::load()?;
            config.tts.piper_voice = voice.clone();
            config.save()?;
            println!("Piper voice set to: {}", voice);
        }
        ConfigAction::SetPiperBinary { path } => {
            let mut config = SpeakDocConfig::load()?;
            config.tts.piper_binary = Some(path.clone());
            config.save()?;
            println!("Piper executable set to: {}", path.display());
        }
        ConfigAction::SetVoicesDir { path } => {
            let mut config = SpeakDocConfig::load()?;
            config.tts.voices_dir = Some(path.clone());
            config.save()?;
            println!("Voices directory set to: {}", path.display());
        }
        ConfigAction::SetKokoroUrl { url } => {
            let mut config = SpeakDocConfig::load()?;
            config.tts.kokoro_url = url.trim().to_string();
            config.save()?;
            println!("Kokoro URL set to: {}", config.tts.kokoro_url);
        }
        ConfigAction::SetKokoroVoice { voice } => {
            let mut config = SpeakDocConfig::load()?;
            config.tts.kokoro_voice = voice.clone();
            config.save()?;
            println!("Kokoro voice set to: {}", voice);
        }
        ConfigAction::SetKokoroKey { key } => {
            let mut config = SpeakDocConfig::load()?;
            let key = key.trim();
            config.tts.kokoro_api_key = if key.is_empty() {
                None
            } else {
                Some(key.to_string())
            };
            config.save()?;
            println!(
                "Kokoro API key {}",
                if key.is_empty() { "cleared" } else { "saved" }
            );
        }
        ConfigAction::SetRate { value } => {
            let mut config = SpeakDocConfig::load()?;
            config.tts = config.tts.clone().with_rate(*value);
            config.save()?;
            println!("Default rate set to: {}", config.tts.rate);
        }
        ConfigAction::SetMaxLength { value } => {
            let mut config = SpeakDocConfig::load()?;
            config.max_chunk_length = (*value).max(1);
            config.save()?;
            println!("Maximum segment length set to: {}", config.max_chunk_length);
        }
        ConfigAction::SetRetries { value } => {
            let mut config = SpeakDocConfig::load()?;
            config.max_retries = *value;
            config.save()?;
            println!("Retries set to: {}", config.max_retries);
        }
    }
    Ok(())
}
