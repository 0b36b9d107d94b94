use std::error::Error;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use bus::{Bus, CoreEvent};
use clap::Parser;
use net::NetConfig;
use runtime_net::start_net_runtime;
use suggest::{InputId, Key, MachineState, OptionsOverride, OverlayView, Span, SuggestEngine};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Type a query into a headless suggestion field and print what it shows.
#[derive(Parser)]
#[command(name = "typeahead")]
struct Cli {
    /// Text to type, one key at a time
    query: String,

    /// JSON file with option overrides (camelCase keys)
    #[arg(long)]
    options: Option<PathBuf>,

    /// Don't highlight the first row
    #[arg(long)]
    soft: bool,

    /// Enumerate `--options`' type instead of searching
    #[arg(long)]
    select: bool,

    /// Press Down this many times, then Enter
    #[arg(long)]
    pick: Option<usize>,

    /// Pause between keystrokes
    #[arg(long, default_value_t = 80)]
    keystroke_ms: u64,

    /// Give up waiting for results after this long
    #[arg(long, default_value_t = 15)]
    wait_secs: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut overrides = match &cli.options {
        Some(path) => OptionsOverride::from_json(&std::fs::read_to_string(path)?)?,
        None => OptionsOverride::default(),
    };
    if cli.soft {
        overrides.soft_select = Some(true);
    }

    let Bus {
        cmd_tx,
        cmd_rx,
        evt_tx,
        evt_rx,
    } = Bus::new();
    let _net = start_net_runtime(cmd_rx, evt_tx, NetConfig::default());
    let mut engine = SuggestEngine::new(cmd_tx);

    let input = InputId::from_raw(1);
    let _binding = if cli.select {
        engine.bind_select(input, overrides)
    } else {
        engine.bind_suggest(input, overrides)
    };
    let manage_delay = engine.options(input)?.timings.manage_delay;

    engine.focus(input, Instant::now());
    pump(&mut engine, &evt_rx, manage_delay + Duration::from_millis(10));

    for c in cli.query.chars() {
        engine.key(input, Key::Char(c), Instant::now())?;
        pump(&mut engine, &evt_rx, Duration::from_millis(cli.keystroke_ms));
    }

    let deadline = Instant::now() + Duration::from_secs(cli.wait_secs);
    while engine.state(input)? != MachineState::Showing && Instant::now() < deadline {
        pump(&mut engine, &evt_rx, Duration::from_millis(50));
    }
    if engine.state(input)? != MachineState::Showing {
        let view = engine.overlay(input)?;
        eprintln!(
            "no suggestions for {:?}{}",
            cli.query,
            view.error
                .as_deref()
                .map(|e| format!(" ({e})"))
                .unwrap_or_default()
        );
        return Ok(());
    }
    print_overlay(engine.overlay(input)?);

    if let Some(downs) = cli.pick {
        for _ in 0..downs {
            engine.key(input, Key::ArrowDown, Instant::now())?;
        }
        // give the flyout a moment
        pump(&mut engine, &evt_rx, Duration::from_millis(1500));
        let view = engine.overlay(input)?;
        if let Some(flyout) = &view.flyout {
            println!("--- {} <{}>", flyout.name, flyout.view_url);
            println!("    {} | {}", flyout.types, flyout.domains);
            println!("    {}", flyout.blurb);
        }
        engine.key(input, Key::Enter, Instant::now())?;
    }

    for event in engine.take_events() {
        println!("{}", serde_json::to_string(&event)?);
    }
    println!("field text: {:?}", engine.value(input)?);
    Ok(())
}

/// Run the engine for `span`: deliver network events and fire due timers.
fn pump(engine: &mut SuggestEngine, evt_rx: &Receiver<CoreEvent>, span: Duration) {
    let until = Instant::now() + span;
    loop {
        let now = Instant::now();
        engine.tick(now);
        if now >= until {
            return;
        }
        let wake = engine.next_deadline().map_or(until, |d| d.min(until));
        match evt_rx.recv_timeout(wake.saturating_duration_since(now)) {
            Ok(evt) => engine.on_core_event(evt, Instant::now()),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                log::error!("network runtime stopped");
                return;
            }
        }
    }
}

fn print_overlay(view: &OverlayView) {
    for (i, row) in view.rows.iter().enumerate() {
        let marker = if view.selected == Some(i) { '>' } else { ' ' };
        let lines: Vec<String> = row
            .fragment
            .lines
            .iter()
            .map(|line| line.spans.iter().map(render_span).collect())
            .collect();
        println!("{marker} {}", lines.join(" / "));
    }
    if let Some(label) = &view.suggest_new {
        println!("+ {label}");
    }
}

fn render_span(span: &Span) -> String {
    if span.emphasized {
        format!("[{}]", span.text)
    } else {
        span.text.clone()
    }
}
