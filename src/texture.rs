// texture.rs — 地球贴图的加载与预处理

use anyhow::Context;
use image::io::Reader as ImageReader;
use image::{GenericImageView, Rgba, RgbaImage};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

fn decode(path: &Path) -> anyhow::Result<RgbaImage> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let img = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)
        .and_then(|mut r| {
            r.no_limits();
            r.decode()
        })
        .with_context(|| format!("decode {}", path.display()))?;

    let (w, h) = img.dimensions();
    log::info!(
        "{}",
        crate::i18n::tr_with("log.texture_loaded", &[("w", w.to_string()), ("h", h.to_string())])
    );
    Ok(img.to_rgba8())
}

/// Outcome of one background load, tagged with the request it answers.
#[derive(Debug)]
pub struct LoadResult {
    pub seq: u64,
    pub image: anyhow::Result<RgbaImage>,
}

/// Decodes `path` on a worker thread and sends the outcome back,
/// success or failure.
pub fn spawn_load(seq: u64, path: PathBuf, tx: Sender<LoadResult>) {
    thread::spawn(move || {
        log::info!(
            "{}",
            crate::i18n::tr_with("log.loading_texture", &[("path", path.display().to_string())])
        );

        let image = decode(&path);
        if tx.send(LoadResult { seq, image }).is_err() {
            log::warn!("{}", crate::i18n::tr("error.send_to_main_failed"));
        }
    });
}

/// Background texture loads where only the most recent request counts.
/// Results of earlier requests that finish late are dropped.
pub struct TextureLoader {
    tx: Sender<LoadResult>,
    rx: Receiver<LoadResult>,
    latest: u64,
    finished: u64,
}

impl TextureLoader {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx, latest: 0, finished: 0 }
    }

    fn begin(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn load(&mut self, path: PathBuf) {
        let seq = self.begin();
        spawn_load(seq, path, self.tx.clone());
    }

    /// True until the latest request has finished, either way.
    pub fn is_loading(&self) -> bool {
        self.finished < self.latest
    }

    /// Drains finished loads. Returns the image for the latest request
    /// once it is ready; failures are logged and keep the current texture.
    pub fn poll(&mut self) -> Option<RgbaImage> {
        let mut ready = None;
        while let Ok(LoadResult { seq, image }) = self.rx.try_recv() {
            if seq != self.latest {
                log::debug!("dropping texture load #{} (latest is #{})", seq, self.latest);
                continue;
            }
            self.finished = seq;
            match image {
                Ok(img) => ready = Some(img),
                Err(e) => log::error!(
                    "{}",
                    crate::i18n::tr_with("error.load_texture", &[("err", format!("{:#}", e))])
                ),
            }
        }
        ready
    }
}

impl Default for TextureLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Downscales so neither side exceeds `max_dim`.
pub fn fit_to_limit(img: RgbaImage, max_dim: u32) -> RgbaImage {
    let (src_w, src_h) = img.dimensions();
    if src_w <= max_dim && src_h <= max_dim {
        return img;
    }

    let scale = max_dim as f32 / src_w.max(src_h) as f32;
    let new_w = ((src_w as f32 * scale) as u32).clamp(1, max_dim);
    let new_h = ((src_h as f32 * scale) as u32).clamp(1, max_dim);
    log::warn!(
        "{}",
        crate::i18n::tr_with(
            "gpu.texture_too_large_scaled",
            &[
                ("src_w", src_w.to_string()),
                ("src_h", src_h.to_string()),
                ("max", max_dim.to_string()),
                ("new_w", new_w.to_string()),
                ("new_h", new_h.to_string()),
            ]
        )
    );
    image::DynamicImage::ImageRgba8(img)
        .resize_exact(new_w, new_h, image::imageops::FilterType::Lanczos3)
        .to_rgba8()
}

/// Equirectangular stand-in shown until a real texture is loaded:
/// ocean shading, polar ice and a 30° graticule.
pub fn placeholder_globe(width: u32, height: u32) -> RgbaImage {
    let width = width.max(2);
    let height = height.max(1);
    RgbaImage::from_fn(width, height, |x, y| {
        let lon = (x as f32 + 0.5) / width as f32 * 360.0 - 180.0;
        let lat = 90.0 - (y as f32 + 0.5) / height as f32 * 180.0;

        if lat.abs() > 75.0 {
            return Rgba([235, 240, 245, 255]);
        }

        let step = 30.0;
        let px_deg = 360.0 / width as f32;
        let on_line = |deg: f32| {
            let m = deg.rem_euclid(step);
            m < px_deg || step - m < px_deg
        };
        if on_line(lon) || on_line(lat) {
            return Rgba([120, 170, 210, 255]);
        }

        let depth = 1.0 - lat.abs() / 90.0;
        Rgba([
            (20.0 + 20.0 * depth) as u8,
            (60.0 + 50.0 * depth) as u8,
            (120.0 + 60.0 * depth) as u8,
            255,
        ])
    })
}
