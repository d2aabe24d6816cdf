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

//! Writes reordered frames as a YUV4MPEG2 stream.

use crate::frame::{DecodedFrame, PixelFormat};
use crate::writer::FrameWriter;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

const STREAM_MAGIC: &str = "YUV4MPEG2";
const FRAME_MAGIC: &[u8] = b"FRAME\n";

/// Stream-level parameters that the frames themselves do not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Y4mConfig {
    /// Frame rate as numerator/denominator
    pub frame_rate: (u32, u32),
    /// Sample aspect ratio; `(0, 0)` means unknown
    pub sample_aspect: (u32, u32),
}

impl Default for Y4mConfig {
    fn default() -> Self {
        Self {
            frame_rate: (30000, 1001),
            sample_aspect: (0, 0),
        }
    }
}

fn chroma_tag(format: PixelFormat) -> &'static str {
    match format {
        PixelFormat::Yuv420p => "420jpeg",
        PixelFormat::Yuv422p => "422",
        PixelFormat::Yuv444p => "444",
        PixelFormat::Gray8 => "mono",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StreamGeometry {
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
}

impl StreamGeometry {
    fn of(frame: &DecodedFrame) -> Self {
        Self {
            width: frame.width,
            height: frame.height,
            pixel_format: frame.pixel_format,
        }
    }
}

/// A [`FrameWriter`] producing a Y4M file.
///
/// The stream header is taken from the first frame, so every later frame
/// must match its dimensions and pixel format.
pub struct Y4mWriter<W: Write> {
    inner: W,
    config: Y4mConfig,
    geometry: Option<StreamGeometry>,
    frames_written: u64,
}

impl<W: Write> Y4mWriter<W> {
    pub fn new(inner: W, config: Y4mConfig) -> Self {
        Self {
            inner,
            config,
            geometry: None,
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn header_line(&self, geometry: StreamGeometry) -> String {
        let (fps_num, fps_den) = self.config.frame_rate;
        let (sar_num, sar_den) = self.config.sample_aspect;
        format!(
            "{STREAM_MAGIC} W{} H{} F{fps_num}:{fps_den} Ip A{sar_num}:{sar_den} C{}\n",
            geometry.width,
            geometry.height,
            chroma_tag(geometry.pixel_format)
        )
    }
}

impl<W: Write> FrameWriter for Y4mWriter<W> {
    fn write_frame(&mut self, frame: DecodedFrame) -> anyhow::Result<()> {
        let geometry = StreamGeometry::of(&frame);
        if geometry.width == 0 || geometry.height == 0 {
            anyhow::bail!("frame {} has no picture area", frame.coded_index);
        }
        if let Some(stream) = self.geometry {
            if stream != geometry {
                log::warn!(
                    "Rejecting frame {}: {}x{} {:?} does not match stream {}x{} {:?}",
                    frame.coded_index,
                    geometry.width,
                    geometry.height,
                    geometry.pixel_format,
                    stream.width,
                    stream.height,
                    stream.pixel_format
                );
                anyhow::bail!("frame {} changes stream geometry", frame.coded_index);
            }
        }
        if !frame.is_well_formed() {
            anyhow::bail!(
                "frame {} carries {} bytes, expected {}",
                frame.coded_index,
                frame.data.len(),
                frame.pixel_format.frame_size(frame.width, frame.height)
            );
        }

        if self.geometry.is_none() {
            let header = self.header_line(geometry);
            self.inner
                .write_all(header.as_bytes())
                .context("writing Y4M stream header")?;
            self.geometry = Some(geometry);
        }

        self.inner
            .write_all(FRAME_MAGIC)
            .and_then(|_| self.inner.write_all(&frame.data))
            .with_context(|| format!("writing Y4M frame {}", frame.coded_index))?;
        self.frames_written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picture(idx: u64, width: u32, height: u32, format: PixelFormat, fill: u8) -> DecodedFrame {
        let size = format.frame_size(width, height);
        DecodedFrame::new(idx, width, height, format, vec![fill; size])
    }

    #[test]
    fn writes_header_then_frames() {
        let mut writer = Y4mWriter::new(Vec::new(), Y4mConfig::default());
        writer
            .write_frame(picture(0, 2, 2, PixelFormat::Yuv420p, 1))
            .unwrap();
        writer
            .write_frame(picture(1, 2, 2, PixelFormat::Yuv420p, 2))
            .unwrap();
        assert_eq!(writer.frames_written(), 2);

        let bytes = writer.into_inner().unwrap();
        let mut expected = b"YUV4MPEG2 W2 H2 F30000:1001 Ip A0:0 C420jpeg\n".to_vec();
        expected.extend_from_slice(b"FRAME\n");
        expected.extend_from_slice(&[1; 6]);
        expected.extend_from_slice(b"FRAME\n");
        expected.extend_from_slice(&[2; 6]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn header_uses_configured_rate_and_aspect() {
        let config = Y4mConfig {
            frame_rate: (25, 1),
            sample_aspect: (1, 1),
        };
        let mut writer = Y4mWriter::new(Vec::new(), config);
        writer
            .write_frame(picture(0, 4, 2, PixelFormat::Gray8, 0))
            .unwrap();
        let bytes = writer.into_inner().unwrap();
        assert!(bytes.starts_with(b"YUV4MPEG2 W4 H2 F25:1 Ip A1:1 Cmono\n"));
    }

    #[test]
    fn geometry_change_is_rejected() {
        let mut writer = Y4mWriter::new(Vec::new(), Y4mConfig::default());
        writer
            .write_frame(picture(0, 2, 2, PixelFormat::Yuv444p, 0))
            .unwrap();
        let err = writer
            .write_frame(picture(1, 4, 2, PixelFormat::Yuv444p, 0))
            .unwrap_err();
        assert!(err.to_string().contains("frame 1"));
        assert_eq!(writer.frames_written(), 1);
    }

    #[test]
    fn short_payload_writes_nothing() {
        let mut writer = Y4mWriter::new(Vec::new(), Y4mConfig::default());
        let frame = DecodedFrame::new(0, 2, 2, PixelFormat::Yuv422p, vec![0; 3]);
        assert!(writer.write_frame(frame).is_err());
        assert!(writer.into_inner().unwrap().is_empty());
    }

    #[test]
    fn empty_picture_is_rejected() {
        let mut writer = Y4mWriter::new(Vec::new(), Y4mConfig::default());
        assert!(writer.write_frame(DecodedFrame::empty(0)).is_err());
    }
}
