//! Preview classification by file extension.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "log", "json", "xml", "csv", "ini", "conf", "yaml", "yml", "py", "js", "ts",
    "java", "c", "cpp", "cs", "go", "rb", "php", "bat", "ps1", "html", "css", "sql", "sh",
];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "svg", "ico"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "aac", "flac"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogv", "mkv", "mov"];

/// How a file is previewed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Plain text or source code, loaded into the editor widget.
    Text,
    /// Raster or vector image, shown through a resource URL.
    Image,
    /// PDF document, shown through a resource URL.
    Pdf,
    /// Audio stream, shown through a resource URL.
    Audio,
    /// Video stream, shown through a resource URL.
    Video,
    /// Anything else. Previewed as text when the content happens to be readable.
    Unsupported,
}

impl FileType {
    /// Classify a file by the extension of its name.
    pub fn from_name(name: &str) -> Self {
        let ext = extension(name);
        let ext = ext.as_str();
        if TEXT_EXTENSIONS.contains(&ext) {
            Self::Text
        } else if IMAGE_EXTENSIONS.contains(&ext) {
            Self::Image
        } else if ext == "pdf" {
            Self::Pdf
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            Self::Audio
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Self::Video
        } else {
            Self::Unsupported
        }
    }

    /// Whether the preview is a direct resource URL rather than fetched content.
    pub fn is_media(self) -> bool {
        matches!(self, Self::Image | Self::Pdf | Self::Audio | Self::Video)
    }
}

/// Editor language id for syntax highlighting.
pub fn language_for(name: &str) -> &'static str {
    match extension(name).as_str() {
        "js" => "javascript",
        "ts" => "typescript",
        "py" => "python",
        "html" => "html",
        "css" => "css",
        "json" => "json",
        "md" => "markdown",
        "xml" => "xml",
        "sql" => "sql",
        "sh" => "shell",
        "bat" => "bat",
        "java" => "java",
        "c" => "c",
        "cpp" => "cpp",
        "go" => "go",
        "rs" => "rust",
        "php" => "php",
        "rb" => "ruby",
        "yml" | "yaml" => "yaml",
        "ini" => "ini",
        _ => "plaintext",
    }
}

fn extension(name: &str) -> String {
    name.rsplit('.').next().unwrap_or_default().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(FileType::from_name("README.MD"), FileType::Text);
        assert_eq!(FileType::from_name("photo.JPeg"), FileType::Image);
        assert_eq!(FileType::from_name("manual.pdf"), FileType::Pdf);
        assert_eq!(FileType::from_name("song.flac"), FileType::Audio);
        assert_eq!(FileType::from_name("clip.mov"), FileType::Video);
        assert_eq!(FileType::from_name("archive.7z"), FileType::Unsupported);
        assert_eq!(FileType::from_name("Makefile"), FileType::Unsupported);
    }

    #[test]
    fn test_language_for() {
        assert_eq!(language_for("main.rs"), "rust");
        assert_eq!(language_for("conf.YAML"), "yaml");
        assert_eq!(language_for("notes.txt"), "plaintext");
    }

    #[test]
    fn test_file_type_round_trips_through_strum() {
        assert_eq!(FileType::Unsupported.to_string(), "unsupported");
        assert_eq!("pdf".parse::<FileType>().unwrap(), FileType::Pdf);
    }
}
