/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use frame_reorder::{
    pipeline, DecodedFrame, DrainController, FrameDecoder, OrderingMode, PixelFormat,
    ReorderConfig, ReorderStats, Y4mConfig, Y4mWriter,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

// This binary does the following:
// 1. Lays out a synthetic IBBP stream in display order.
// 2. Rearranges it into the coded order a B-frame decoder would produce.
// 3. Optionally shuffles arrival inside a small window, like a threaded
//    decoder finishing frames out of turn.
// 4. Feeds the result through the reorder pipeline into a Y4M writer.

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Coded,
    Display,
}

impl From<Mode> for OrderingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Coded => OrderingMode::Coded,
            Mode::Display => OrderingMode::Display,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(about = "Frame reorder buffer simulation", version)]
struct Args {
    #[clap(long, default_value_t = 120, help = "Number of frames to generate")]
    frames: u64,

    #[clap(long, default_value_t = 2, help = "B-frames between anchor frames")]
    gop: u64,

    #[clap(long, value_enum, default_value_t = Mode::Display, help = "Output order")]
    mode: Mode,

    #[clap(
        long,
        default_value_t = 0,
        help = "Shuffle decoder output inside windows of this many frames (0 = off)"
    )]
    jitter: usize,

    #[clap(long, help = "Write the reordered stream to this Y4M file")]
    output: Option<PathBuf>,

    #[clap(long, default_value_t = 64)]
    width: u32,

    #[clap(long, default_value_t = 48)]
    height: u32,

    #[clap(long, help = "Seed for the arrival shuffle")]
    seed: Option<u64>,
}

/// Display positions of an IBBP stream, listed in coded order.
fn ibbp_coded_order(frames: u64, b_frames: u64) -> Vec<u64> {
    let mut order = Vec::new();
    if frames == 0 {
        return order;
    }
    order.push(0);
    let mut prev = 0;
    while prev + 1 < frames {
        let anchor = (prev + b_frames + 1).min(frames - 1);
        order.push(anchor);
        order.extend(prev + 1..anchor);
        prev = anchor;
    }
    order
}

/// Paints each picture with a luma level derived from its display index, so
/// the output visibly steps when it is in order.
struct SyntheticDecoder {
    width: u32,
    height: u32,
}

impl FrameDecoder for SyntheticDecoder {
    /// (coded index, display index)
    type Unit = (u64, u64);

    fn decode(&mut self, (coded, display): (u64, u64)) -> anyhow::Result<Option<DecodedFrame>> {
        let format = PixelFormat::Yuv420p;
        let luma_size = (self.width * self.height) as usize;
        let mut data = vec![128u8; format.frame_size(self.width, self.height)];
        data[..luma_size].fill((16 + display * 8 % 220) as u8);
        Ok(Some(
            DecodedFrame::new(coded, self.width, self.height, format, data)
                .with_display_index(display),
        ))
    }
}

fn simulate<W: Write>(args: &Args, sink: W) -> anyhow::Result<ReorderStats> {
    let mut units: Vec<(u64, u64)> = ibbp_coded_order(args.frames, args.gop)
        .into_iter()
        .enumerate()
        .map(|(coded, display)| (coded as u64, display))
        .collect();

    if args.jitter > 1 {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        for window in units.chunks_mut(args.jitter) {
            window.shuffle(&mut rng);
        }
    }

    let decoder = SyntheticDecoder {
        width: args.width,
        height: args.height,
    };
    let config = ReorderConfig::with_mode(args.mode.into());
    let controller = DrainController::new(config, Y4mWriter::new(sink, Y4mConfig::default()));

    let (writer, stats) = pipeline::run(decoder, units, controller)?;
    writer.into_inner().context("flushing Y4M output")?;
    Ok(stats)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    log::info!(
        "Simulating {} frames, {} B-frames per anchor, {:?} order, jitter window {}",
        args.frames,
        args.gop,
        args.mode,
        args.jitter
    );

    let stats = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            simulate(&args, BufWriter::new(file))?
        }
        None => simulate(&args, io::sink())?,
    };

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ibbp_layout() {
        assert_eq!(ibbp_coded_order(7, 2), vec![0, 3, 1, 2, 6, 4, 5]);
        assert_eq!(ibbp_coded_order(5, 2), vec![0, 3, 1, 2, 4]);
        assert_eq!(ibbp_coded_order(3, 0), vec![0, 1, 2]);
        assert!(ibbp_coded_order(0, 2).is_empty());
    }
}
