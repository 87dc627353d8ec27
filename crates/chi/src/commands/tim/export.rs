use chi_tim::{png, t32, Picture, TimImage};
use clap::{Args, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TextureKind {
    /// TIM2 or TIM3
    Tim,
    T32,
}

#[derive(Args)]
pub struct ExportArgs {
    /// An input texture
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Format of the input
    #[arg(short, long, value_enum, default_value_t = TextureKind::Tim)]
    kind: TextureKind,

    /// Byte offset of the texture inside the file
    #[arg(long, default_value_t = 0)]
    offset: u64,

    /// The PNG to write, the input with .png appended by default
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

/// Output path of picture `index` out of `count`
pub fn picture_output(base: &Path, index: usize, count: usize) -> PathBuf {
    if count == 1 {
        return base.to_path_buf();
    }
    let mut name = base.file_stem().unwrap_or_default().to_os_string();
    name.push(format!(".{index}.png"));
    base.with_file_name(name)
}

impl ExportArgs {
    pub fn handle(&self) -> Result<()> {
        let file = File::open(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", self.file.display()))?;
        let mut reader = BufReader::new(file);

        let pictures: Vec<Picture> = match self.kind {
            TextureKind::Tim => TimImage::decode(&mut reader, self.offset)?.pictures,
            TextureKind::T32 => vec![t32::decode(&mut reader, self.offset)?],
        };

        let base = self.output.clone().unwrap_or_else(|| {
            let mut name = self.file.as_os_str().to_os_string();
            name.push(".png");
            PathBuf::from(name)
        });

        for (index, picture) in pictures.iter().enumerate() {
            let path = picture_output(&base, index, pictures.len());
            let mut out = BufWriter::new(
                File::create(&path)
                    .into_diagnostic()
                    .context(format!("creating {}", path.display()))?,
            );
            png::write_picture(picture, &mut out)?;
            out.flush().into_diagnostic()?;

            info!(
                "wrote {}x{} {:?} picture to {}",
                picture.width,
                picture.height,
                picture.image_type,
                path.display()
            );
        }
        Ok(())
    }
}
