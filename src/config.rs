// Copyright (c) 2026 rezky_nightky

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "snowdrift",
    version,
    about = "Gentle snowfall for your terminal, seeded from lines on stdin"
)]
pub struct Args {
    #[arg(
        short = 'i',
        long = "interval",
        default_value_t = 300,
        help_heading = "PERFORMANCE",
        help = "Frame interval in milliseconds (min 16 max 5000)"
    )]
    pub interval: u64,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Random seed for a reproducible run (default: OS entropy)"
    )]
    pub seed: Option<u64>,

    #[arg(
        short = 's',
        long = "snow-pct",
        default_value_t = 10.0,
        help_heading = "BEHAVIOR",
        help = "Per-frame chance to seed the next input line (min 0 max 100)"
    )]
    pub snow_pct: f32,

    #[arg(
        short = 'g',
        long = "gust-pct",
        default_value_t = 5.0,
        help_heading = "BEHAVIOR",
        help = "Per-frame chance of a spontaneous wind gust (min 0 max 100)"
    )]
    pub gust_pct: f32,
}
