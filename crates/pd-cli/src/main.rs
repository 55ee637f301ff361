//! PacDecode CLI
//!
//! CLI tool for decoding extracted PAC payloads and inspecting their parts.

use std::fs;
use std::path::Path;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::filter::LevelFilter;

use pd_core::{decode_mask, decode_payload, expand_domain_tokens, BucketOutcome, DecodeOptions, EntryLayout};

mod job;

use job::read_job;

#[derive(Parser)]
#[command(name = "pd-cli")]
#[command(about = "PacDecode payload decoder and tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Delimited,
    Fixed,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a payload job into a zone/length report
    Decode {
        /// Job file (JSON: mask, data, zones, optional options)
        #[arg(short, long)]
        input: String,

        /// Report file; printed to stdout when omitted
        #[arg(short, long)]
        output: Option<String>,

        /// Entry layout inside the decoded stream
        #[arg(long, value_enum)]
        layout: Option<LayoutArg>,

        /// Entry separator for the delimited layout
        #[arg(long)]
        separator: Option<char>,

        /// Raw bytes requested per missing entry
        #[arg(long)]
        bytes_per_entry: Option<usize>,

        /// Lower bound for a single read from the stream
        #[arg(long)]
        min_chunk: Option<usize>,

        /// Upper bound for a single read from the stream
        #[arg(long)]
        max_chunk: Option<usize>,

        /// Verbose output and debug logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decode only the control mask and print its statistics
    Mask {
        /// Job file to read the mask from
        #[arg(short, long)]
        input: String,
    },

    /// Expand dictionary tokens in raw entries
    Expand {
        /// Raw token text, one entry per argument
        #[arg(required = true)]
        entries: Vec<String>,
    },
}

struct DecodeArgs {
    input: String,
    output: Option<String>,
    layout: Option<LayoutArg>,
    separator: Option<char>,
    bytes_per_entry: Option<usize>,
    min_chunk: Option<usize>,
    max_chunk: Option<usize>,
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Library progress goes through `log`; the subscriber bridges it to stderr
    tracing_subscriber::fmt()
        .with_max_level(log_level(&cli.command))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Decode {
            input,
            output,
            layout,
            separator,
            bytes_per_entry,
            min_chunk,
            max_chunk,
            verbose,
        } => cmd_decode(DecodeArgs {
            input,
            output,
            layout,
            separator,
            bytes_per_entry,
            min_chunk,
            max_chunk,
            verbose,
        }),
        Commands::Mask { input } => cmd_mask(&input),
        Commands::Expand { entries } => cmd_expand(&entries),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn log_level(command: &Commands) -> LevelFilter {
    match command {
        Commands::Decode { verbose: true, .. } => LevelFilter::DEBUG,
        _ => LevelFilter::WARN,
    }
}

fn cmd_decode(args: DecodeArgs) -> Result<(), String> {
    let start = Instant::now();
    let job = read_job(Path::new(&args.input))?;
    let options = apply_overrides(job.options.unwrap_or_default(), &args)?;

    let report = decode_payload(&job.input, &options).map_err(|e| format!("Decode failed: {}", e))?;
    let elapsed = start.elapsed();

    if args.verbose {
        for (zone, buckets) in &report.zones {
            for (length, outcome) in buckets {
                match outcome {
                    BucketOutcome::Decoded { domains, span } => println!(
                        "  [{}] length {:>3}: {} domains ({} bytes)",
                        zone,
                        length,
                        domains.len(),
                        span.len()
                    ),
                    BucketOutcome::Partial { error, .. } => println!("  [{}] length {:>3}: {}", zone, length, error),
                }
            }
        }
    }

    let json = serde_json::to_string_pretty(&report).map_err(|e| format!("Failed to serialize report: {}", e))?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).map_err(|e| format!("Failed to write '{}': {}", path, e))?;
            println!("Decoded '{}' to '{}'", args.input, path);
        }
        None => println!("{json}"),
    }

    if args.verbose || args.output.is_some() {
        let stats = report.stats;
        let acc = report.accounting;
        println!("  Zones:     {} ({} with decoded buckets)", stats.zones, stats.successful_zones);
        println!(
            "  Buckets:   {} ({} decoded, {} partial)",
            stats.buckets, stats.decoded_buckets, stats.partial_buckets
        );
        println!(
            "  Domains:   {}/{} ({:.1}%)",
            stats.domains_recovered,
            stats.domains_expected,
            stats.efficiency()
        );
        println!(
            "  Stream:    {} bytes emitted, {} data bytes of {}, {} mask bits of {}",
            acc.bytes_emitted, acc.data_consumed, acc.data_total, acc.mask_bits_consumed, acc.mask_bits_total
        );
        println!("  Time:      {:.1}ms", elapsed.as_secs_f64() * 1000.0);
    }

    Ok(())
}

fn apply_overrides(mut options: DecodeOptions, args: &DecodeArgs) -> Result<DecodeOptions, String> {
    let separator = match args.separator {
        Some(ch) if ch.is_ascii() => Some(ch as u8),
        Some(ch) => return Err(format!("Separator {:?} is not ASCII", ch)),
        None => None,
    };

    match (args.layout, separator) {
        (Some(LayoutArg::Fixed), _) => options.layout = EntryLayout::FixedWidth,
        (Some(LayoutArg::Delimited), sep) => {
            let default = match options.layout {
                EntryLayout::Delimited { separator } => separator,
                EntryLayout::FixedWidth => b' ',
            };
            options.layout = EntryLayout::Delimited {
                separator: sep.unwrap_or(default),
            };
        }
        (None, Some(sep)) => options.layout = EntryLayout::Delimited { separator: sep },
        (None, None) => {}
    }

    if let Some(n) = args.bytes_per_entry {
        options.budget.bytes_per_entry = n;
    }
    if let Some(n) = args.min_chunk {
        options.budget.min_chunk = n;
    }
    if let Some(n) = args.max_chunk {
        options.budget.max_chunk = n;
        // A lone --max-chunk below the current floor lowers the floor with it
        if args.min_chunk.is_none() {
            options.budget.min_chunk = options.budget.min_chunk.min(n);
        }
    }
    Ok(options)
}

fn cmd_mask(input: &str) -> Result<(), String> {
    let job = read_job(Path::new(input))?;
    let mask = decode_mask(&job.input.mask).map_err(|e| format!("Invalid mask: {}", e))?;

    let bits = mask.bit_len();
    let predicted = mask.predicted_bits();
    println!("Mask: {}", input);
    println!("  Encoded:     {} chars", job.input.mask.len());
    println!("  Raw:         {} bytes ({} control bits)", mask.as_bytes().len(), bits);
    println!(
        "  Predicted:   {} bits ({:.1}%)",
        predicted,
        if bits == 0 { 0.0 } else { predicted as f64 / bits as f64 * 100.0 }
    );
    println!("  Literal:     {} bits (data has {} bytes)", bits - predicted, job.input.data.chars().count());

    Ok(())
}

fn cmd_expand(entries: &[String]) -> Result<(), String> {
    for entry in entries {
        println!("{}", expand_domain_tokens(entry.as_bytes()));
    }
    Ok(())
}
