//! Background decoding of the distortion source image.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::{ensure, Context, Result};
use image::imageops::{self, FilterType};

/// Tightly packed RGBA8 pixels, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        ensure!(width > 0 && height > 0, "image has no pixels ({width}x{height})");
        ensure!(
            rgba.len() == width as usize * height as usize * 4,
            "pixel buffer is {} bytes, expected {}",
            rgba.len(),
            width as usize * height as usize * 4
        );
        Ok(Self { width, height, rgba })
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn fits_within(&self, max_dimension: u32) -> bool {
        self.width <= max_dimension && self.height <= max_dimension
    }

    /// Scales the image down so neither side exceeds `max_dimension`,
    /// keeping its aspect ratio. Images that already fit are returned as is.
    pub fn fit_within(self, max_dimension: u32) -> Result<Self> {
        ensure!(max_dimension > 0, "no texture size is available");
        if self.fits_within(max_dimension) {
            return Ok(self);
        }

        let scale = max_dimension as f64 / self.width.max(self.height) as f64;
        let width = ((self.width as f64 * scale).round() as u32).clamp(1, max_dimension);
        let height = ((self.height as f64 * scale).round() as u32).clamp(1, max_dimension);

        let (w, h) = self.size();
        let src = image::RgbaImage::from_raw(w, h, self.rgba)
            .with_context(|| format!("pixel buffer does not match {w}x{h}"))?;
        let scaled = imageops::resize(&src, width, height, FilterType::Triangle);
        Self::from_rgba(width, height, scaled.into_raw())
    }
}

pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage> {
    let img = image::load_from_memory(bytes)
        .context("decoding image bytes")?
        .to_rgba8();
    let (width, height) = img.dimensions();
    DecodedImage::from_rgba(width, height, img.into_raw())
}

pub fn decode_file(path: &Path) -> Result<DecodedImage> {
    let img = image::open(path)
        .with_context(|| format!("loading image {}", path.display()))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    DecodedImage::from_rgba(width, height, img.into_raw())
}

/// A decode running on its own thread.
///
/// The result is handed back over a channel and picked up by [`poll`],
/// which never blocks. Dropping the loader abandons the result.
///
/// [`poll`]: ImageLoader::poll
#[derive(Debug)]
pub struct ImageLoader {
    path: PathBuf,
    rx: Option<Receiver<Result<DecodedImage>>>,
}

impl ImageLoader {
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (tx, rx) = mpsc::channel();

        let job_path = path.clone();
        let spawned = thread::Builder::new()
            .name("backdrop-image-decode".into())
            .spawn(move || {
                // The receiver may be gone if the effect was torn down meanwhile.
                let _ = tx.send(decode_file(&job_path));
            });

        let rx = match spawned {
            Ok(_) => Some(rx),
            Err(err) => {
                log::warn!("could not start image decoder for {}: {err}", path.display());
                None
            }
        };
        Self { path, rx }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.rx.is_some()
    }

    /// Returns the decode result once, when it is ready.
    pub fn poll(&mut self) -> Option<Result<DecodedImage>> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(result) => {
                self.rx = None;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.rx = None;
                Some(Err(anyhow::anyhow!(
                    "image decoder for {} exited without a result",
                    self.path.display()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    use super::*;

    fn png_2x1() -> Vec<u8> {
        let img = image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn wait_for(loader: &mut ImageLoader) -> Result<DecodedImage> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = loader.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "decoder never finished");
            thread::sleep(Duration::from_millis(5));
        }
    }

    // ── decode ────────────────────────────────────────────────────────────

    #[test]
    fn decodes_png_to_rgba() {
        let img = decode_bytes(&png_2x1()).unwrap();
        assert_eq!(img.size(), (2, 1));
        assert_eq!(&img.rgba[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn garbage_bytes_fail() {
        assert!(decode_bytes(b"definitely not an image").is_err());
    }

    #[test]
    fn buffer_size_is_checked() {
        assert!(DecodedImage::from_rgba(2, 2, vec![0; 3]).is_err());
        assert!(DecodedImage::from_rgba(0, 2, vec![]).is_err());
    }

    // ── texture limits ────────────────────────────────────────────────────

    #[test]
    fn oversized_image_is_scaled_to_the_limit() {
        let wide = DecodedImage::from_rgba(9000, 3, vec![128; 9000 * 3 * 4]).unwrap();
        assert!(!wide.fits_within(8192));

        let fitted = wide.fit_within(8192).unwrap();
        assert_eq!(fitted.width, 8192);
        assert!(fitted.height >= 1 && fitted.height <= 3);
        assert!(fitted.fits_within(8192));
        assert_eq!(fitted.rgba.len(), fitted.width as usize * fitted.height as usize * 4);
    }

    #[test]
    fn image_within_limit_is_untouched() {
        let img = DecodedImage::from_rgba(2, 1, vec![7; 8]).unwrap();
        assert_eq!(img.clone().fit_within(2).unwrap(), img);
    }

    #[test]
    fn zero_limit_is_an_error() {
        let img = DecodedImage::from_rgba(2, 1, vec![7; 8]).unwrap();
        assert!(img.fit_within(0).is_err());
    }

    // ── loader ────────────────────────────────────────────────────────────

    #[test]
    fn missing_file_reports_error() {
        let mut loader = ImageLoader::spawn("/nonexistent/backdrop/image.png");
        let err = wait_for(&mut loader).unwrap_err();
        assert!(format!("{err:#}").contains("image.png"));
        assert!(!loader.is_pending());
        assert!(loader.poll().is_none());
    }

    #[test]
    fn loads_file_in_background() {
        let path = std::env::temp_dir().join(format!("backdrop-loader-{}.png", std::process::id()));
        std::fs::write(&path, png_2x1()).unwrap();

        let mut loader = ImageLoader::spawn(&path);
        let img = wait_for(&mut loader).unwrap();
        assert_eq!(img.size(), (2, 1));

        let _ = std::fs::remove_file(&path);
    }
}
