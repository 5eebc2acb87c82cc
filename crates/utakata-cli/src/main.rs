//! utakata command-line interface.
//!
//! Loads a UST score and a voicebank, runs the auto-fit and render parameter
//! pipeline, and prints the per-note resampler/wavtool plan — as colored text
//! for eyeballing or as JSON for tooling. No external tool is spawned; this
//! is the planning half of a render.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::info;

use utakata_render::pipeline::{dedup_jobs, render_sequence, resampler_args, wavtool_args};
use utakata_render::{PitchMode, RenderConfig};
use utakata_score::tone::{self, AccidentalStyle};
use utakata_score::Ust;
use utakata_voicebank::Voicebank;

#[derive(Parser)]
#[command(name = "utakata", version, about = "UTAU score render planner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the full render plan for a score.
    Plan {
        /// UST score file (UTF-8).
        ust: PathBuf,
        /// Voicebank root directory.
        #[arg(long)]
        voicebank: PathBuf,
        /// Cache directory for resampler intermediates.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,
        /// Output wav path.
        #[arg(long, default_value = "output.wav")]
        output: PathBuf,
        /// Interpret pitch data as mode-1 raw points.
        #[arg(long)]
        mode1: bool,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Parse a score and dump its notes.
    Inspect {
        /// UST score file (UTF-8).
        ust: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match Cli::parse().command {
        Command::Plan {
            ust,
            voicebank,
            cache_dir,
            output,
            mode1,
            format,
        } => plan(ust, voicebank, cache_dir, output, mode1, format),
        Command::Inspect { ust } => inspect(ust),
    }
}

fn plan(
    ust_path: PathBuf,
    voicebank: PathBuf,
    cache_dir: PathBuf,
    output: PathBuf,
    mode1: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut ust =
        Ust::load(&ust_path).with_context(|| format!("loading {}", ust_path.display()))?;
    let vb = Voicebank::open(&voicebank)
        .with_context(|| format!("opening voicebank {}", voicebank.display()))?;
    let config = RenderConfig {
        cache_dir,
        output_path: output,
        pitch_mode: if mode1 { PitchMode::Mode1 } else { PitchMode::Mode2 },
        ..RenderConfig::default()
    };
    let rendered = render_sequence(&mut ust, &vb, &config)?;
    info!("planned {} notes", rendered.len());

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rendered)?),
        OutputFormat::Text => {
            let jobs = dedup_jobs(&rendered);
            println!(
                "{} {} notes, {} resampler runs",
                "plan:".bold(),
                rendered.len(),
                jobs.len()
            );
            for job in jobs {
                println!("{} {}", "resamp".cyan(), resampler_args(job).join(" "));
            }
            for note in &rendered {
                println!("{} {}", "wavtool".green(), wavtool_args(note).join(" "));
            }
        }
    }
    Ok(())
}

fn inspect(ust_path: PathBuf) -> Result<()> {
    let ust = Ust::load(&ust_path).with_context(|| format!("loading {}", ust_path.display()))?;
    println!(
        "{} tempo={} mode2={} notes={}",
        "score:".bold(),
        ust.tempo,
        ust.mode2,
        ust.notes.len()
    );
    for note in &ust.notes {
        let tone = tone::to_tone_name(note.notenum.get(), AccidentalStyle::SharpAscii);
        let lyric = if note.is_rest() {
            "(rest)".dimmed().to_string()
        } else {
            note.lyric.value().clone()
        };
        println!(
            "{:>6}  {:<8} {:<4} len={:<5} tempo={:.2}",
            note.num.value(),
            lyric,
            tone,
            note.length.get(),
            note.tempo.get(),
        );
    }
    Ok(())
}
