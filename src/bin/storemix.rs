use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf, process};
use storemix_core::{
    load_playlist, write_artifact, AudioDecoder, DecodeEnv, MediaRef, MixConfig, MixSession,
    ProcessingPhase, ProcessingState, SymphoniaDecoder, Track, WavHeader,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "storemix")]
#[command(about = "Merge store music and voice intros into one WAV file", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge tracks, in the order given, into a single WAV file
    Merge {
        #[arg(short, long)]
        input: Vec<PathBuf>,

        #[arg(long)]
        playlist: Option<PathBuf>,

        /// File holding a base64 speech payload; placed before all music
        #[arg(long)]
        intro_payload: Vec<PathBuf>,

        #[arg(short, long, default_value = "mix.wav")]
        output: PathBuf,

        #[arg(long, env = "STOREMIX_SAMPLE_RATE")]
        sample_rate: Option<u32>,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Print every processing state as a JSON line on stdout
        #[arg(long)]
        json: bool,

        #[arg(short, long)]
        quiet: bool,
    },

    /// Decode one file and print what the decoder sees
    Probe {
        file: PathBuf,

        #[arg(long, default_value_t = 44_100)]
        sample_rate: u32,
    },

    /// Print the header of a WAV file
    Inspect { file: PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("storemix_core=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Merge {
            input,
            playlist,
            intro_payload,
            output,
            sample_rate,
            config,
            json,
            quiet,
        } => handle_merge(MergeArgs {
            input,
            playlist,
            intro_payload,
            output,
            sample_rate,
            config,
            json,
            quiet,
        }),
        Commands::Probe { file, sample_rate } => handle_probe(file, sample_rate),
        Commands::Inspect { file } => handle_inspect(file),
    };

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

struct MergeArgs {
    input: Vec<PathBuf>,
    playlist: Option<PathBuf>,
    intro_payload: Vec<PathBuf>,
    output: PathBuf,
    sample_rate: Option<u32>,
    config: Option<PathBuf>,
    json: bool,
    quiet: bool,
}

fn handle_merge(args: MergeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = match &args.config {
        Some(path) => MixConfig::load(path)?,
        None => MixConfig::default(),
    }
    .with_env()?;
    if let Some(rate) = args.sample_rate {
        cfg.sample_rate = rate;
    }

    let mut session = MixSession::new(cfg)?;

    for path in &args.intro_payload {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read intro payload {}: {}", path.display(), e))?;
        let audio = session.decoder().decode_payload(session.env(), &text)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("intro")
            .to_string();
        session.queue_mut().push(Track::voiceover(name, audio));
    }

    if let Some(playlist) = &args.playlist {
        let tracks = load_playlist(playlist, session.decoder(), session.env())?;
        session.queue_mut().extend(tracks);
    }

    for path in &args.input {
        if !path.exists() {
            return Err(format!("Input file not found: {}", path.display()).into());
        }
        session.queue_mut().push(Track::from_path(path));
    }

    if session.queue().is_empty() {
        return Err("Nothing to merge: pass --input, --playlist or --intro-payload".into());
    }

    if args.json {
        session.subscribe(|state| {
            if let Ok(line) = serde_json::to_string(state) {
                println!("{}", line);
            }
        });
    } else if !args.quiet {
        session.subscribe(print_progress);

        eprintln!("🎵 Store Mix");
        eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        for (i, track) in session.queue().iter().enumerate() {
            eprintln!("  {:>2}. {}", i + 1, track.name);
        }
        eprintln!("Output: {}", args.output.display());
        eprintln!("Rate:   {} Hz", session.env().sample_rate);
        eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        eprintln!();
    }

    let artifact = session.merge()?;
    write_artifact(&args.output, artifact)?;

    if args.json {
        // state stream already went to stdout
    } else if !args.quiet {
        let secs = artifact.duration_secs();
        eprintln!();
        eprintln!("✅ Mix written: {}", args.output.display());
        eprintln!(
            "   {} tracks, {}:{:02}, {:.2} MB",
            artifact.segments.len(),
            (secs / 60.0) as u64,
            (secs % 60.0) as u64,
            artifact.len() as f64 / 1_000_000.0
        );
    } else {
        println!("{}", args.output.display());
    }

    Ok(())
}

fn handle_probe(file: PathBuf, sample_rate: u32) -> Result<(), Box<dyn std::error::Error>> {
    let mut env = DecodeEnv::new(sample_rate);
    env.conform = false;

    let audio = SymphoniaDecoder::new().decode(&env, &MediaRef::Path(file.clone()))?;

    eprintln!("🔍 {}", file.display());
    eprintln!("  Channels:    {}", audio.channels());
    eprintln!("  Sample rate: {} Hz", audio.sample_rate);
    eprintln!("  Frames:      {}", audio.frames());
    eprintln!("  Duration:    {:.2} s", audio.duration_secs());
    if audio.sample_rate != sample_rate {
        eprintln!(
            "  Note: will be resampled to {} Hz when merged",
            sample_rate
        );
    }

    Ok(())
}

fn handle_inspect(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(&file)?;
    let header = WavHeader::parse(&bytes)
        .ok_or_else(|| format!("{} does not start with a canonical PCM WAV header", file.display()))?;

    let frames = header.data_len as u64 / header.block_align().max(1) as u64;
    eprintln!("📋 {}", file.display());
    eprintln!("  Channels:    {}", header.channels);
    eprintln!("  Sample rate: {} Hz", header.sample_rate);
    eprintln!("  Byte rate:   {}", header.byte_rate());
    eprintln!("  Data bytes:  {}", header.data_len);
    eprintln!(
        "  Duration:    {:.2} s",
        frames as f64 / header.sample_rate.max(1) as f64
    );
    if bytes.len() as u64 != 44 + header.data_len as u64 {
        eprintln!(
            "  ⚠️  File is {} bytes, header describes {}",
            bytes.len(),
            44 + header.data_len as u64
        );
    }

    Ok(())
}

fn print_progress(state: &ProcessingState) {
    match state.phase {
        ProcessingPhase::Decoding => {
            eprint!("\r🔄 {:>3}% {:<60}", state.progress, state.message);
        }
        ProcessingPhase::Merging => {
            eprintln!();
            eprintln!("⏳ {}", state.message);
        }
        ProcessingPhase::Completed => {
            eprintln!("✨ {}", state.message);
        }
        ProcessingPhase::Error => {
            eprintln!();
            eprintln!("❌ {}", state.message);
        }
        _ => {}
    }
}
