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

//! The pull loop that connects a decoder to a [`DrainController`].

use crate::controller::DrainController;
use crate::decoder::FrameDecoder;
use crate::error::{ReorderError, Result};
use crate::stats::ReorderStats;
use crate::writer::FrameWriter;

/// Decodes `units` one at a time, reordering whatever comes out.
///
/// Each unit is fully drained before the next one is read. When `units` runs
/// out the controller is finished, so frames stuck behind a missing index
/// surface as [`ReorderError::Stranded`].
pub fn run<D, I, W>(
    mut decoder: D,
    units: I,
    mut controller: DrainController<W>,
) -> Result<(W, ReorderStats)>
where
    D: FrameDecoder,
    I: IntoIterator<Item = D::Unit>,
    W: FrameWriter,
{
    for (unit, input) in (0u64..).zip(units) {
        let decoded = decoder
            .decode(input)
            .map_err(|e| ReorderError::DecodeFailed {
                unit,
                reason: format!("{e:#}"),
            })?;

        match decoded {
            Some(frame) => {
                controller.ingest(frame)?;
            }
            None => log::debug!("Input unit {unit} produced no frame"),
        }
    }

    let (writer, stats) = controller.finish()?;
    log::info!(
        "Reordered {} frames, peak buffer {} frames, max reorder distance {}",
        stats.frames_emitted,
        stats.peak_buffered,
        stats.max_reorder_distance
    );
    Ok((writer, stats))
}
