//! Image inspection for literal Open Graph image URLs.
//!
//! The [`ImageProbe`] trait answers one question: what are the MIME type and
//! dimensions of the image behind a URL. [`FileProbe`] answers it for URLs
//! that point into the site's own public directory by reading the file header
//! with the `image` crate. Nothing is fetched over the network.

use image::ImageReader;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("URL does not map to a local file: {0}")]
    Unmapped(String),
    #[error("Failed to identify {path}: {message}")]
    Identify { path: PathBuf, message: String },
}

/// What a probe reports about an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbedImage {
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

/// Reads type and dimensions of the image behind a URL.
pub trait ImageProbe {
    fn probe(&self, url: &str) -> Result<ProbedImage, ProbeError>;
}

/// Probe that never finds anything. Literal images render without the
/// derived type and size tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl ImageProbe for NoProbe {
    fn probe(&self, url: &str) -> Result<ProbedImage, ProbeError> {
        Err(ProbeError::Unmapped(url.to_string()))
    }
}

/// Probe that maps site URLs onto files below a public directory.
///
/// A URL maps if it starts with one of the configured prefixes (typically the
/// base URL and the site's own host) or is a root-relative path.
#[derive(Debug, Clone)]
pub struct FileProbe {
    prefixes: Vec<String>,
    public_dir: PathBuf,
}

impl FileProbe {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            prefixes: Vec::new(),
            public_dir: public_dir.into(),
        }
    }

    /// Treat URLs starting with `prefix` as local. Empty prefixes are ignored.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        if !prefix.is_empty() {
            self.prefixes.push(prefix.to_string());
        }
        self
    }

    /// The file a URL maps to, if any. Paths escaping the public directory
    /// never map.
    pub fn path_for(&self, url: &str) -> Option<PathBuf> {
        let url = url.split(['?', '#']).next().unwrap_or(url);
        let relative = self
            .prefixes
            .iter()
            .find_map(|prefix| url.strip_prefix(prefix.as_str()))
            .filter(|rest| rest.starts_with('/'))
            .or_else(|| url.starts_with('/').then_some(url))?;

        let relative = relative.trim_start_matches('/');
        if relative.split('/').any(|segment| segment == "." || segment == "..") {
            return None;
        }
        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.public_dir.join(relative))
    }
}

impl ImageProbe for FileProbe {
    fn probe(&self, url: &str) -> Result<ProbedImage, ProbeError> {
        let path = self
            .path_for(url)
            .ok_or_else(|| ProbeError::Unmapped(url.to_string()))?;
        let identify_err = |message: String| ProbeError::Identify {
            path: path.clone(),
            message,
        };

        let reader = ImageReader::open(&path)?.with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| identify_err("unknown image format".to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| identify_err(e.to_string()))?;

        Ok(ProbedImage {
            mime_type: format.to_mime_type().to_string(),
            width,
            height,
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Mock probe with canned answers that records every URL it was asked about.
    #[derive(Default)]
    pub struct MockProbe {
        pub results: HashMap<String, ProbedImage>,
        pub probed: Mutex<Vec<String>>,
    }

    impl MockProbe {
        pub fn with(url: &str, mime_type: &str, width: u32, height: u32) -> Self {
            let mut results = HashMap::new();
            results.insert(
                url.to_string(),
                ProbedImage {
                    mime_type: mime_type.to_string(),
                    width,
                    height,
                },
            );
            Self {
                results,
                probed: Mutex::new(Vec::new()),
            }
        }

        pub fn get_probed(&self) -> Vec<String> {
            self.probed.lock().unwrap().clone()
        }
    }

    impl ImageProbe for MockProbe {
        fn probe(&self, url: &str) -> Result<ProbedImage, ProbeError> {
            self.probed.lock().unwrap().push(url.to_string());
            self.results
                .get(url)
                .cloned()
                .ok_or_else(|| ProbeError::Unmapped(url.to_string()))
        }
    }

    #[test]
    fn mock_records_probes() {
        let probe = MockProbe::with("https://cdn.test/a.png", "image/png", 10, 20);
        assert_eq!(probe.probe("https://cdn.test/a.png").unwrap().width, 10);
        assert!(probe.probe("https://cdn.test/b.png").is_err());
        assert_eq!(
            probe.get_probed(),
            ["https://cdn.test/a.png", "https://cdn.test/b.png"]
        );
    }

    #[test]
    fn path_for_maps_prefixed_and_relative_urls() {
        let probe = FileProbe::new("/srv/public").with_prefix("https://acme.com/");
        assert_eq!(
            probe.path_for("https://acme.com/site/a.jpg"),
            Some(PathBuf::from("/srv/public/site/a.jpg"))
        );
        assert_eq!(
            probe.path_for("/site/a.jpg?v=2"),
            Some(PathBuf::from("/srv/public/site/a.jpg"))
        );
        assert_eq!(probe.path_for("https://other.com/site/a.jpg"), None);
        assert_eq!(probe.path_for("https://acme.com.evil/a.jpg"), None);
    }

    #[test]
    fn path_for_rejects_traversal() {
        let probe = FileProbe::new("/srv/public");
        assert_eq!(probe.path_for("/../etc/passwd"), None);
        assert_eq!(probe.path_for("/site/./a.jpg"), None);
    }

    #[test]
    fn file_probe_reads_png_header() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("img")).unwrap();
        image::RgbImage::new(64, 48)
            .save(tmp.path().join("img/share.png"))
            .unwrap();

        let probe = FileProbe::new(tmp.path()).with_prefix("https://acme.com");
        let probed = probe.probe("https://acme.com/img/share.png").unwrap();
        assert_eq!(
            probed,
            ProbedImage {
                mime_type: "image/png".into(),
                width: 64,
                height: 48,
            }
        );
    }

    #[test]
    fn file_probe_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let probe = FileProbe::new(tmp.path());
        assert!(matches!(
            probe.probe("/missing.jpg"),
            Err(ProbeError::Io(_))
        ));
    }

    #[test]
    fn file_probe_rejects_non_images() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "not an image").unwrap();
        let probe = FileProbe::new(tmp.path());
        assert!(matches!(
            probe.probe("/notes.txt"),
            Err(ProbeError::Identify { .. })
        ));
    }

    #[test]
    fn no_probe_never_finds_anything() {
        assert!(matches!(
            NoProbe.probe("/a.jpg"),
            Err(ProbeError::Unmapped(_))
        ));
    }
}
