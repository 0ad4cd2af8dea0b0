use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

use crate::models::{DEFAULT_ACTIVITY_CAPACITY, DEFAULT_STATUS_CAPACITY};

pub const DEFAULT_EXTENSIONS: [&str; 4] = ["tiff", "tif", "hdr", "raw"];
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineSettings {
    /// Simulated processing delay is drawn from `[delay_min_ms, delay_max_ms)`.
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub activity_log_capacity: usize,
    /// Finished status records kept for `analysis_status` lookups.
    pub status_history_capacity: usize,
    pub pest_probability: f64,
    pub notification_ttl_ms: u64,
    pub analysis_timeout_ms: u64,
    pub max_upload_bytes: u64,
    /// Lower-case, without the leading dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            delay_min_ms: 3000,
            delay_max_ms: 5000,
            activity_log_capacity: DEFAULT_ACTIVITY_CAPACITY,
            status_history_capacity: DEFAULT_STATUS_CAPACITY,
            pest_probability: 0.3,
            notification_ttl_ms: 3000,
            analysis_timeout_ms: 30_000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

impl PipelineSettings {
    pub fn validate(&self) -> Result<()> {
        if self.delay_min_ms >= self.delay_max_ms {
            bail!(
                "delay_min_ms ({}) must be below delay_max_ms ({})",
                self.delay_min_ms,
                self.delay_max_ms
            );
        }
        if self.activity_log_capacity == 0 {
            bail!("activity_log_capacity must be greater than zero");
        }
        if self.status_history_capacity == 0 {
            bail!("status_history_capacity must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.pest_probability) {
            bail!("pest_probability {} is outside [0, 1]", self.pest_probability);
        }
        if self.analysis_timeout_ms == 0 {
            bail!("analysis_timeout_ms must be greater than zero");
        }
        if self.allowed_extensions.is_empty() {
            bail!("allowed_extensions must not be empty");
        }
        Ok(())
    }

    /// Scales both delay bounds down, keeping the range non-empty.
    pub fn accelerated(mut self, factor: u64) -> Self {
        let factor = factor.max(1);
        self.delay_min_ms /= factor;
        self.delay_max_ms = (self.delay_max_ms / factor).max(self.delay_min_ms + 1);
        self
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_millis(self.analysis_timeout_ms)
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<PipelineSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            let parsed: PipelineSettings = serde_json::from_str(&contents)
                .with_context(|| format!("Invalid settings in {}", path.display()))?;
            parsed.validate()?;
            parsed
        } else {
            PipelineSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn pipeline(&self) -> PipelineSettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update_pipeline(&self, settings: PipelineSettings) -> Result<()> {
        settings.validate()?;
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: PipelineSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid settings in {}", self.path.display()))?;
        data.validate()?;
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = data;
        Ok(())
    }

    fn persist(&self, data: &PipelineSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
