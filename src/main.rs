mod buffer;
mod capture;
mod config;
mod core;
mod domain;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;

use crate::capture::image::{is_accepted_mime, mime_for_path};
use crate::config::{AlertPolicy, CropScanConfig, OutputResolution};
use crate::core::app::{Analyzers, App, LogNotifier};
use crate::domain::{CropRegion, Dimensions};
use crate::session::messages::Msg;

/// `x,y,width,height`
#[derive(Clone, Copy, Debug, PartialEq)]
struct RegionArg([f32; 4]);

fn parse_region(s: &str) -> Result<RegionArg, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in region: {}", e))?;
    let parts: [f32; 4] = parts
        .try_into()
        .map_err(|_| "expected x,y,width,height".to_string())?;
    if !parts.iter().all(|p| p.is_finite()) {
        return Err("region values must be finite".to_string());
    }
    Ok(RegionArg(parts))
}

#[derive(Debug, Parser)]
#[command(name = "cropscan", version, about = "Crop an image and read its barcode and text")]
struct Cli {
    /// Image to analyze (png, jpg or jpeg)
    image: PathBuf,
    /// Crop region as x,y,width,height in displayed pixels (whole image if omitted)
    #[arg(long, value_parser = parse_region, allow_hyphen_values = true)]
    crop: Option<RegionArg>,
    /// Interpret the crop region in percent of the displayed size
    #[arg(long)]
    percent: bool,
    /// Width the image is displayed at
    #[arg(long)]
    display_width: Option<u32>,
    /// Height the image is displayed at
    #[arg(long)]
    display_height: Option<u32>,
    /// Size the cropped buffer in natural image pixels
    #[arg(long)]
    natural_resolution: bool,
    /// Alert when no barcode is found or the crop fails
    #[arg(long)]
    alert: bool,
    /// Barcode detection workers
    #[arg(long)]
    workers: Option<usize>,
    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the cropped JPEG here
    #[arg(long)]
    save_crop: Option<PathBuf>,
    /// Persist the effective settings to the config file
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn config(&self) -> CropScanConfig {
        let mut config = match &self.config {
            Some(path) => CropScanConfig::load_from(path),
            None => CropScanConfig::load(),
        };
        if self.natural_resolution {
            config.output_resolution = OutputResolution::Natural;
        }
        if self.alert {
            config.alert_policy = AlertPolicy::Alert;
        }
        if let Some(workers) = self.workers {
            config.barcode.workers = workers.max(1);
        }
        config
    }

    fn region(&self, displayed: Dimensions) -> CropRegion {
        match (self.crop, self.percent) {
            (Some(RegionArg([x, y, w, h])), false) => CropRegion::px(x, y, w, h),
            (Some(RegionArg([x, y, w, h])), true) => CropRegion::percent(x, y, w, h),
            (None, true) => CropRegion::default(),
            (None, false) => {
                CropRegion::px(0.0, 0.0, displayed.width as f32, displayed.height as f32)
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if !mime_for_path(&cli.image).is_some_and(is_accepted_mime) {
        bail!("{} is not a png or jpeg image", cli.image.display());
    }

    let config = cli.config();
    if cli.save_config {
        match &cli.config {
            Some(path) => config.save_to(path)?,
            None => config.save(),
        }
    }

    let mut app = App::new(config, Analyzers::default(), Arc::new(LogNotifier));
    app.update(Msg::FileSelected(cli.image.clone()));
    app.run_until_idle().await;

    let Some(natural) = app.state().source.as_ref().map(|s| s.natural()) else {
        let err = app.view().last_error.unwrap_or_default();
        bail!("could not load {}: {}", cli.image.display(), err);
    };
    if cli.display_width.is_some() || cli.display_height.is_some() {
        let bounds = Dimensions::new(
            cli.display_width.unwrap_or(u32::MAX),
            cli.display_height.unwrap_or(u32::MAX),
        );
        app.update(Msg::ImageDisplayed(natural.fit_within(bounds)));
    }
    let displayed = app
        .state()
        .source
        .as_ref()
        .map(|s| s.displayed())
        .unwrap_or(natural);

    let region = cli.region(displayed);
    app.update(Msg::CropChanged(region));
    app.update(Msg::CropComplete(region));
    app.run_until_idle().await;

    let view = app.view();
    let Some(url) = view.cropped_url.as_ref() else {
        match &view.last_error {
            Some(err) => bail!("crop failed: {}", err),
            None => bail!("crop region {:?} is empty", region),
        }
    };

    if let Some(path) = &cli.save_crop {
        let bytes = app
            .store()
            .fetch(url)
            .with_context(|| format!("{} was revoked", url))?;
        std::fs::write(path, &*bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!(
            "Saved {} crop to {}",
            app.store().mime(url).unwrap_or("image/jpeg"),
            path.display()
        );
    }

    println!("Detected Barcode: {}", view.barcode_text);
    println!("Detected Text: {}", view.recognized_text);
    if let Some(err) = &view.last_error {
        log::warn!("{}", err);
    }
    Ok(())
}
