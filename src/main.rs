// Copyright (c) 2026 rezky_nightky

mod cell;
mod config;
mod entities;
mod frame;
mod geometry;
mod scene;
mod terminal;

use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::Args;
use crate::entities::{gust, seed_line};
use crate::frame::Frame;
use crate::scene::Scene;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const MIN_WIDTH: u16 = 12;
const MIN_HEIGHT: u16 = 10;

/// What the input thread may ask of the simulation thread.
enum Pulse {
    Gust,
    Quit,
    Resync,
}

fn require_u64_range(name: &str, v: u64, min: u64, max: u64) -> u64 {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_f32_range(name: &str, v: f32, min: f32, max: f32) -> f32 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn read_lines() -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in io::stdin().lock().lines() {
        lines.push(line?);
    }
    Ok(lines)
}

/// Blocking event reader on its own thread. Only translates terminal
/// events into pulses; it never touches the scene.
fn input_loop(tx: mpsc::Sender<Pulse>) {
    loop {
        let Ok(ev) = event::read() else {
            return;
        };
        let pulse = match ev {
            Event::Resize(_, _) => Some(Pulse::Resync),
            Event::Key(k) if k.kind == KeyEventKind::Press => match (k.code, k.modifiers) {
                (KeyCode::Enter, _) => Some(Pulse::Gust),
                (KeyCode::Esc, _) => Some(Pulse::Quit),
                (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => Some(Pulse::Quit),
                _ => None,
            },
            _ => None,
        };
        if let Some(pulse) = pulse {
            if tx.send(pulse).is_err() {
                return;
            }
        }
    }
}

fn run(args: &Args, lines: &[String]) -> io::Result<()> {
    let interval =
        Duration::from_millis(require_u64_range("--interval", args.interval, 16, 5000));
    let snow_chance = require_f32_range("--snow-pct", args.snow_pct, 0.0, 100.0) / 100.0;
    let gust_chance = require_f32_range("--gust-pct", args.gust_pct, 0.0, 100.0) / 100.0;

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    if w < MIN_WIDTH || h < MIN_HEIGHT {
        drop(term);
        return Err(io::Error::other(format!(
            "terminal is too small: need at least {}x{}, have {}x{}",
            MIN_WIDTH, MIN_HEIGHT, w, h
        )));
    }

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || input_loop(tx));

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut scene = Scene::new(w as i32, h as i32);
    let mut frame = Frame::new(w, h, scene.default_bg);

    let mut line_ix = 0usize;
    let mut starting = true;

    loop {
        match rx.recv_timeout(interval) {
            Ok(Pulse::Quit) => break,
            Ok(Pulse::Gust) => gust(&mut scene, &mut rng),
            Ok(Pulse::Resync) => term.request_full_redraw(),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        if starting || rng.random::<f32>() < snow_chance {
            seed_line(&mut scene, &mut rng, &lines[line_ix]);
            line_ix = (line_ix + 1) % lines.len();
        }
        starting = false;

        if rng.random::<f32>() < gust_chance {
            gust(&mut scene, &mut rng);
        }

        frame.clear();
        scene.update_all(&mut rng);
        scene.draw_all(&mut frame);
        term.draw(&frame)?;
    }

    Ok(())
}

fn main() {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let args = Args::parse();

    let mut lines = match read_lines() {
        Ok(lines) => lines,
        Err(e) => {
            eprintln!("failed to read stdin: {}", e);
            std::process::exit(2);
        }
    };
    if lines.iter().all(|l| l.is_empty()) {
        lines = vec!["*".to_string()];
    }

    if let Err(e) = run(&args, &lines) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
