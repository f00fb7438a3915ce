use std::{fs, path::PathBuf, process};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use touchmap::{DebounceConfig, DebounceStateMachine, TouchEventKind};

#[derive(Debug, Parser)]
#[command(name = "touch_replay")]
#[command(about = "Replay a recorded pressure trace through the touch debouncer")]
struct Cli {
    /// CSV trace with `trace,<ms>,<pressure>` lines.
    trace: PathBuf,
    /// File listing the expected edge kinds, one `touch`/`release` per line.
    #[arg(long)]
    expect: Option<PathBuf>,
    #[arg(long = "debounce-ms", default_value_t = touchmap::touch::config::DEFAULT_DEBOUNCE_MS)]
    debounce_ms: u32,
    #[arg(long = "min-touch", default_value_t = touchmap::touch::config::DEFAULT_MIN_TOUCH_PRESSURE)]
    min_touch: i16,
    #[arg(long = "max-release", default_value_t = touchmap::touch::config::DEFAULT_MAX_RELEASE_PRESSURE)]
    max_release: i16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ReplaySample {
    ms: u32,
    pressure: i16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ReplayEvent {
    ms: u32,
    kind: TouchEventKind,
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = DebounceConfig::new(cli.debounce_ms, cli.min_touch, cli.max_release)
        .map_err(|err| anyhow!("invalid debounce parameters: {err}"))?;

    let trace = fs::read_to_string(&cli.trace)
        .with_context(|| format!("failed to read {}", cli.trace.display()))?;
    let samples =
        parse_trace(&trace).with_context(|| format!("in {}", cli.trace.display()))?;

    let events = replay(config, &samples)?;

    println!("event,ms,kind");
    for event in &events {
        println!("event,{},{}", event.ms, event.kind.label());
    }

    if let Some(expect_path) = cli.expect {
        let text = fs::read_to_string(&expect_path)
            .with_context(|| format!("failed to read {}", expect_path.display()))?;
        let expected = parse_expected_kinds(&text)
            .with_context(|| format!("in {}", expect_path.display()))?;
        let actual: Vec<&'static str> = events
            .iter()
            .filter(|e| e.kind.is_edge())
            .map(|e| e.kind.label())
            .collect();
        if actual != expected {
            eprintln!("expected edges: {}", expected.join(","));
            eprintln!("actual edges:   {}", actual.join(","));
            bail!("edge sequence mismatch");
        }
    }

    Ok(())
}

fn replay(config: DebounceConfig, samples: &[ReplaySample]) -> Result<Vec<ReplayEvent>> {
    let start_ms = samples.first().map_or(0, |s| s.ms);
    let mut machine = DebounceStateMachine::new(config, start_ms)
        .map_err(|err| anyhow!("invalid debounce parameters: {err}"))?;

    Ok(samples
        .iter()
        .map(|s| ReplayEvent {
            ms: s.ms,
            kind: machine.poll(s.ms, s.pressure),
        })
        .collect())
}

fn parse_trace(text: &str) -> Result<Vec<ReplaySample>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "trace,ms,pressure" {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts[0] != "trace" {
            continue;
        }
        if parts.len() < 3 {
            bail!("line {line_no}: expected `trace,<ms>,<pressure>`");
        }

        let ms = parts[1]
            .parse::<u32>()
            .with_context(|| format!("line {line_no}: invalid ms '{}'", parts[1]))?;
        let pressure = parts[2]
            .parse::<i16>()
            .with_context(|| format!("line {line_no}: invalid pressure '{}'", parts[2]))?;
        out.push(ReplaySample { ms, pressure });
    }
    Ok(out)
}

fn parse_expected_kinds(text: &str) -> Result<Vec<&'static str>> {
    let mut kinds = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        let kind = match token.to_ascii_lowercase().as_str() {
            "touch" => TouchEventKind::Touch,
            "release" => TouchEventKind::Release,
            _ => bail!("line {}: invalid expected edge kind: {token}", idx + 1),
        };
        kinds.push(kind.label());
    }
    Ok(kinds)
}
