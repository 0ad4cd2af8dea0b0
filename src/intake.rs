use crate::error::PipelineError;
use crate::models::UploadCandidate;
use crate::settings::{PipelineSettings, DEFAULT_EXTENSIONS, DEFAULT_MAX_UPLOAD_BYTES};

/// Decides which uploads are hyperspectral artifacts worth analysing.
#[derive(Debug, Clone)]
pub struct FileFilter {
    /// Stored as ".ext", lower-case.
    suffixes: Vec<String>,
    max_upload_bytes: u64,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS, DEFAULT_MAX_UPLOAD_BYTES)
    }
}

impl FileFilter {
    pub fn new<I, S>(allowed_extensions: I, max_upload_bytes: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = allowed_extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref().trim_start_matches('.').to_ascii_lowercase();
                format!(".{ext}")
            })
            .collect();

        Self {
            suffixes,
            max_upload_bytes,
        }
    }

    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self::new(&settings.allowed_extensions, settings.max_upload_bytes)
    }

    /// Extension check only; size is not considered.
    pub fn accepts(&self, candidate: &UploadCandidate) -> bool {
        self.accepts_name(&candidate.file_name)
    }

    pub fn accepts_name(&self, file_name: &str) -> bool {
        let lowered = file_name.to_lowercase();
        self.suffixes.iter().any(|suffix| lowered.ends_with(suffix.as_str()))
    }

    pub fn validate(&self, candidate: &UploadCandidate) -> Result<(), PipelineError> {
        if !self.accepts(candidate) {
            return Err(PipelineError::InvalidFileType {
                file_name: candidate.file_name.clone(),
            });
        }

        if candidate.byte_len > self.max_upload_bytes {
            return Err(PipelineError::FileTooLarge {
                file_name: candidate.file_name.clone(),
                byte_len: candidate.byte_len,
                limit: self.max_upload_bytes,
            });
        }

        Ok(())
    }
}

/// Checks a file name against the default allow-list.
pub fn accepts(file_name: &str) -> bool {
    FileFilter::default().accepts_name(file_name)
}
