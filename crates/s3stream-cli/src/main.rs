//! s3stream CLI: pump a file through a flow-controlled stream.
//!
//! A producer thread reads the input file and writes it into the stream while
//! the main thread drains it into the output file, the same shape as a
//! transfer engine on one side and application code on the other.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use s3stream_buffer::{
    ByteStream, Error as StreamError, PollingStream, StreamStats, StreamingDownload,
    StreamingUpload,
};
use s3stream_core::prelude::{StreamConfig, Variant};

#[derive(Parser)]
#[command(name = "s3stream")]
#[command(about = "Pump bytes through a bounded, flow-controlled in-memory stream", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy a file through a stream with a producer and a consumer thread
    Pipe {
        /// File to read from
        #[arg(short, long)]
        input: PathBuf,

        /// File to write to
        #[arg(short, long)]
        output: PathBuf,

        /// Flow-control policy: download, upload, or polling
        #[arg(long, default_value = "download")]
        variant: Variant,

        /// Size of each producer write and consumer read
        #[arg(long, default_value = "65536")]
        chunk_size: usize,

        #[command(flatten)]
        overrides: ConfigOverrides,
    },

    /// Print the effective stream configuration as JSON
    Config {
        #[command(flatten)]
        overrides: ConfigOverrides,
    },
}

#[derive(Args, Default)]
struct ConfigOverrides {
    /// Buffer ceiling in bytes (overrides S3STREAM_BUFFER_SIZE)
    #[arg(long)]
    buffer_size: Option<usize>,

    /// First polling sleep in milliseconds
    #[arg(long)]
    poll_initial_ms: Option<u64>,

    /// Polling delay increment in milliseconds
    #[arg(long)]
    poll_step_ms: Option<u64>,

    /// Polling delay cap in milliseconds
    #[arg(long)]
    poll_max_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
struct PipeSummary {
    variant: Variant,
    bytes_in: u64,
    bytes_out: u64,
    blake3: String,
    elapsed_ms: u128,
    stats: StreamStats,
}

fn main() {
    let cli = Cli::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Pipe {
            input,
            output,
            variant,
            chunk_size,
            overrides,
        } => run_pipe(&input, &output, variant, chunk_size, &overrides).and_then(|summary| {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }),
        Commands::Config { overrides } => effective_config(&overrides).and_then(|cfg| {
            println!("{}", serde_json::to_string_pretty(&cfg)?);
            Ok(())
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Environment first, then command-line flags on top.
fn effective_config(overrides: &ConfigOverrides) -> Result<StreamConfig> {
    let mut cfg = StreamConfig::from_env();
    apply_overrides(&mut cfg, overrides);
    cfg.validate().context("invalid stream configuration")?;
    Ok(cfg)
}

fn apply_overrides(cfg: &mut StreamConfig, overrides: &ConfigOverrides) {
    if let Some(size) = overrides.buffer_size {
        cfg.buffer_size = size;
    }
    if let Some(initial) = overrides.poll_initial_ms {
        cfg.poll_initial_delay_ms = initial;
    }
    if let Some(step) = overrides.poll_step_ms {
        cfg.poll_step_ms = step;
    }
    if let Some(max) = overrides.poll_max_ms {
        cfg.poll_max_delay_ms = max;
    }
}

fn run_pipe(
    input: &Path,
    output: &Path,
    variant: Variant,
    chunk_size: usize,
    overrides: &ConfigOverrides,
) -> Result<PipeSummary> {
    if chunk_size == 0 {
        return Err(anyhow!("--chunk-size must be greater than zero"));
    }
    let cfg = effective_config(overrides)?;
    let total = fs::metadata(input)
        .with_context(|| format!("failed to stat {}", input.display()))?
        .len();
    info!(%variant, total, buffer_size = cfg.buffer_size, "starting pipe");

    match variant {
        Variant::Download => {
            let stream = Arc::new(StreamingDownload::with_config(total, &cfg)?);
            pump(stream, input, output, variant, chunk_size, false)
        }
        Variant::Upload => {
            let stream = Arc::new(StreamingUpload::with_config(total, &cfg)?);
            pump(stream, input, output, variant, chunk_size, true)
        }
        Variant::Polling => {
            let stream = Arc::new(PollingStream::with_config(total, &cfg)?);
            pump(stream, input, output, variant, chunk_size, false)
        }
    }
}

/// Producer thread fills the stream from `input`; this thread drains it into
/// `output`. With `report_progress` the consumer prunes what it read, the way
/// an upload engine's progress callback would.
fn pump<S: ByteStream + 'static>(
    stream: Arc<S>,
    input: &Path,
    output: &Path,
    variant: Variant,
    chunk_size: usize,
    report_progress: bool,
) -> Result<PipeSummary> {
    let started = Instant::now();

    let producer = {
        let stream = Arc::clone(&stream);
        let input = input.to_path_buf();
        thread::spawn(move || -> io::Result<u64> {
            let result = produce(stream.as_ref(), &input, chunk_size);
            // Finished or failed, the consumer must not wait for more.
            stream.close();
            result
        })
    };

    let consumed = consume(stream.as_ref(), output, chunk_size, report_progress);
    if consumed.is_err() {
        // Unblock a producer parked on the room gate.
        stream.close();
    }

    let bytes_in = match producer.join() {
        Ok(Ok(sent)) => sent,
        Ok(Err(err)) => {
            stream.set_error(StreamError::Io(err));
            return Err(producer_failure(stream.as_ref()));
        }
        Err(payload) => {
            if !stream.record_error(payload) {
                debug!("producer panicked with a non-error payload");
                stream.set_error(StreamError::Transfer("producer thread panicked".into()));
            }
            return Err(producer_failure(stream.as_ref()));
        }
    };
    let (bytes_out, digest) = consumed?;

    let summary = PipeSummary {
        variant,
        bytes_in,
        bytes_out,
        blake3: digest,
        elapsed_ms: started.elapsed().as_millis(),
        stats: stream.stats(),
    };
    info!(bytes_out, elapsed_ms = summary.elapsed_ms as u64, "pipe finished");
    Ok(summary)
}

/// Surface the error the producer left on the stream.
fn producer_failure<S: ByteStream + ?Sized>(stream: &S) -> anyhow::Error {
    match stream.error() {
        Some(err) => anyhow!("producer failed: {err}"),
        None => anyhow!("producer failed"),
    }
}

fn produce<S: ByteStream + ?Sized>(stream: &S, input: &Path, chunk_size: usize) -> io::Result<u64> {
    let mut file = File::open(input)?;
    let mut buf = vec![0u8; chunk_size];
    let mut sent = 0u64;
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        sent += stream.write(&buf[..n]) as u64;
    }
    Ok(sent)
}

fn consume<S: ByteStream + ?Sized>(
    stream: &S,
    output: &Path,
    chunk_size: usize,
    report_progress: bool,
) -> Result<(u64, String)> {
    let file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut out = BufWriter::new(file);
    let mut hasher = blake3::Hasher::new();
    let mut received = 0u64;

    loop {
        let chunk = stream.read(chunk_size);
        if chunk.is_empty() {
            break;
        }
        out.write_all(&chunk)
            .with_context(|| format!("failed to write {}", output.display()))?;
        hasher.update(&chunk);
        received += chunk.len() as u64;
        if report_progress {
            stream.prune(chunk.len());
        }
    }
    out.flush()?;

    Ok((received, hasher.finalize().to_hex().to_string()))
}
