pub mod convert;
pub mod export;

#[derive(clap::Subcommand)]
pub enum TimCommands {
    /// Convert an indexed PNG into a TIM3 or TIM2 texture
    Convert(convert::ConvertArgs),
    /// Export the pictures of a texture as PNG files
    Export(export::ExportArgs),
}

impl TimCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            TimCommands::Convert(convert) => convert.handle(),
            TimCommands::Export(export) => export.handle(),
        }
    }
}
