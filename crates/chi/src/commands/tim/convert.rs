use chi_gs::Bpp;
use chi_tim::{png, EncodeOptions, TimFlavor};
use clap::{Args, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Tim3,
    Tim2,
}

impl From<Format> for TimFlavor {
    fn from(value: Format) -> Self {
        match value {
            Format::Tim3 => TimFlavor::Tim3,
            Format::Tim2 => TimFlavor::Tim2,
        }
    }
}

fn parse_bpp(value: &str) -> std::result::Result<Bpp, String> {
    let bits = value.parse::<u8>().map_err(|e| e.to_string())?;
    Bpp::try_from(bits).map_err(|bits| format!("{bits} bits per pixel is not supported, use 4 or 8"))
}

#[derive(Args)]
pub struct ConvertArgs {
    /// An indexed PNG file
    #[arg(short, long, value_name = "FILE")]
    png: PathBuf,

    /// Bits per pixel of the texture, 4 allows at most 16 colors
    #[arg(short, long, default_value = "8", value_parser = parse_bpp)]
    bpp: Bpp,

    /// Container to write
    #[arg(short, long, value_enum, default_value_t = Format::Tim3)]
    format: Format,

    /// The texture to write, TM3_<name>.tm3 or TM2_<name>.tm2 next to the PNG by default
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Declare a full 16 or 256 color palette in the header
    #[arg(long, default_value_t = false)]
    pad_clut: bool,
}

/// Default output path for a converted PNG
pub fn default_output(png: &Path, format: Format) -> PathBuf {
    let stem = png
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match format {
        Format::Tim3 => format!("TM3_{stem}.tm3"),
        Format::Tim2 => format!("TM2_{stem}.tm2"),
    };
    png.with_file_name(name)
}

impl ConvertArgs {
    pub fn handle(&self) -> Result<()> {
        let file = File::open(&self.png)
            .into_diagnostic()
            .context(format!("path: {}", self.png.display()))?;
        let image = png::read_indexed(BufReader::new(file))?;

        let options = EncodeOptions::builder()
            .flavor(self.format.into())
            .pad_clut_colors(self.pad_clut)
            .build();
        let bytes = chi_tim::encode(&image, self.bpp, &options)?;

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| default_output(&self.png, self.format));
        fs::write(&output, &bytes)
            .into_diagnostic()
            .context(format!("creating {}", output.display()))?;

        info!(
            "wrote {}x{} texture with {} colors to {}",
            image.width,
            image.height,
            image.palette.len(),
            output.display()
        );
        Ok(())
    }
}
