//! File kind classification and filename handling.
//!
//! Uploads are accepted by filename extension only; anything outside the
//! fixed allow-set is rejected before bytes reach a storage backend.

use serde::{Deserialize, Serialize};

/// Extensions accepted for upload, lowercase.
pub const ALLOWED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "mp4", "mov", "webm"];

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];
const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "mov", "webm"];

/// Classification of uploaded content, derived from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Still image.
    Image,
    /// Video clip.
    Video,
}

impl FileKind {
    /// Convert to the string value stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// Parse from the stored string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracts the lowercased extension, if the filename has one.
#[must_use]
pub fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Returns true if the filename carries an allowed extension.
#[must_use]
pub fn is_allowed_file(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Maps a filename to its file kind.
///
/// `None` means the file is not acceptable; callers must treat it as a
/// rejection, not a default.
#[must_use]
pub fn classify(filename: &str) -> Option<FileKind> {
    let ext = extension(filename)?;
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(FileKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(FileKind::Video)
    } else {
        None
    }
}

/// Sanitize a filename for use in a storage key.
///
/// Only ASCII alphanumeric characters, dots, hyphens, and underscores
/// survive; everything else (including path separators) becomes `_`.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a.jpg", true)]
    #[case("a.JPG", true)]
    #[case("clip.WebM", true)]
    #[case("a.exe", false)]
    #[case("noextension", false)]
    #[case("archive.tar.gz", false)]
    fn test_is_allowed_file(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_allowed_file(name), expected);
    }

    #[rstest]
    #[case("photo.png", Some(FileKind::Image))]
    #[case("photo.GIF", Some(FileKind::Image))]
    #[case("a.mov", Some(FileKind::Video))]
    #[case("a.mp4", Some(FileKind::Video))]
    #[case("a.pdf", None)]
    #[case("README", None)]
    fn test_classify(#[case] name: &str, #[case] expected: Option<FileKind>) {
        assert_eq!(classify(name), expected);
    }

    #[test]
    fn test_file_kind_roundtrip() {
        for kind in [FileKind::Image, FileKind::Video] {
            assert_eq!(FileKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(FileKind::parse("audio"), None);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("cat.jpg"), "cat.jpg");
        assert_eq!(sanitize_filename("my file (1).png"), "my_file__1_.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("日本語.mp4"), "___.mp4");
    }
}
