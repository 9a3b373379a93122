//! Release package builder for file-based delivery.
//!
//! A package is a staging directory holding everything one distributor
//! ingests for one release: the interchange document, a one-row
//! `metadata.csv`, and the renamed audio/cover assets.

use std::path::{Path, PathBuf};

use crate::error::{AdapterError, AdapterResult};
use crate::models::{AudioFormat, CatalogMetadata, ImageFormat, ReleaseAssets};

/// A staged package ready for transport.
#[derive(Debug, Clone)]
pub struct BuiltPackage {
    pub path: PathBuf,
    pub files: Vec<String>,
}

/// Stages release packages under a root directory.
pub struct PackageBuilder {
    staging_root: PathBuf,
}

impl PackageBuilder {
    pub fn new(staging_root: impl Into<PathBuf>) -> Self {
        Self {
            staging_root: staging_root.into(),
        }
    }

    /// Stage one package: interchange document, metadata CSV, assets.
    ///
    /// Rebuilding the same release overwrites the previous staging
    /// directory.
    pub fn build(
        &self,
        metadata: &CatalogMetadata,
        assets: &ReleaseAssets,
        message_document: &str,
    ) -> AdapterResult<BuiltPackage> {
        let safe_title = sanitize(&metadata.track_title);
        let package_path = self
            .staging_root
            .join(format!("{}_{}", sanitize(&metadata.release_id), safe_title));
        std::fs::create_dir_all(&package_path).map_err(package_error)?;

        let mut files = Vec::new();

        let document_name = "release-message.json";
        std::fs::write(package_path.join(document_name), message_document)
            .map_err(package_error)?;
        files.push(document_name.to_string());

        let csv_name = "metadata.csv";
        write_metadata_csv(&package_path.join(csv_name), metadata)?;
        files.push(csv_name.to_string());

        let audio_name = format!("01 - {}.{}", safe_title, audio_extension(assets.audio.format));
        copy_asset(&assets.audio.path, &package_path.join(&audio_name))?;
        files.push(audio_name);

        let cover_name = format!("cover.{}", image_extension(assets.cover_art.format));
        copy_asset(&assets.cover_art.path, &package_path.join(&cover_name))?;
        files.push(cover_name);

        Ok(BuiltPackage {
            path: package_path,
            files,
        })
    }
}

fn write_metadata_csv(path: &Path, metadata: &CatalogMetadata) -> AdapterResult<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| AdapterError::Package(e.to_string()))?;
    writer
        .write_record([
            "Artist Name",
            "Release Title",
            "Release Date",
            "Record Label",
            "UPC",
            "Primary Genre",
            "Secondary Genre",
            "Language",
            "Track Title",
            "ISRC",
            "Explicit",
        ])
        .map_err(|e| AdapterError::Package(e.to_string()))?;
    writer
        .write_record([
            metadata.artist_name.as_str(),
            metadata.display_title(),
            metadata.release_date.as_str(),
            metadata.label_name.as_deref().unwrap_or(""),
            metadata.upc.as_deref().unwrap_or(""),
            metadata.genre.as_str(),
            metadata.sub_genre.as_deref().unwrap_or(""),
            metadata.language.as_deref().unwrap_or("English"),
            metadata.track_title.as_str(),
            metadata.isrc.as_deref().unwrap_or(""),
            if metadata.explicit { "Yes" } else { "No" },
        ])
        .map_err(|e| AdapterError::Package(e.to_string()))?;
    writer
        .flush()
        .map_err(|e| AdapterError::Package(e.to_string()))?;
    Ok(())
}

fn copy_asset(source: &str, destination: &Path) -> AdapterResult<()> {
    let source_path = Path::new(source.trim_start_matches("file://"));
    if !source_path.exists() {
        return Err(AdapterError::Package(format!("Asset not found: {}", source)));
    }
    std::fs::copy(source_path, destination).map_err(package_error)?;
    Ok(())
}

fn package_error(error: std::io::Error) -> AdapterError {
    AdapterError::Package(error.to_string())
}

fn sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn audio_extension(format: AudioFormat) -> &'static str {
    match format {
        AudioFormat::Wav => "wav",
        AudioFormat::Flac => "flac",
        AudioFormat::Mp3 => "mp3",
        AudioFormat::Aac => "aac",
        AudioFormat::Aiff => "aiff",
    }
}

fn image_extension(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpg => "jpg",
        ImageFormat::Png => "png",
    }
}
