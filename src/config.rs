// src/config.rs
use anyhow::{anyhow, Result};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

/// Column cap for the fixed-width diagnostic table.
pub const DEFAULT_MAX_COLUMN_WIDTH: usize = 40;

/// Owner used for rooftops the rooftop-information file has no mapping for.
pub const UNKNOWN_CSM: &str = "Unknown CSM";

/// Per-run settings. Nothing here is persisted between runs.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Tried in order; the first that decodes without error wins.
    pub encodings: Vec<&'static Encoding>,
    pub max_column_width: usize,
    pub unknown_csm: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // windows-1252 is also what the `latin1` and `iso-8859-1` labels resolve to
            encodings: vec![UTF_8, WINDOWS_1252],
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            unknown_csm: UNKNOWN_CSM.to_string(),
        }
    }
}

impl Settings {
    /// Replace the encoding list with the given WHATWG labels, keeping their order and
    /// dropping labels that resolve to an encoding already in the list.
    pub fn with_encoding_labels<S: AsRef<str>>(mut self, labels: &[S]) -> Result<Self> {
        if labels.is_empty() {
            return Ok(self);
        }
        let mut encodings: Vec<&'static Encoding> = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.as_ref();
            let enc = Encoding::for_label(label.trim().as_bytes())
                .ok_or_else(|| anyhow!("unknown text encoding label: {label:?}"))?;
            if !encodings.contains(&enc) {
                encodings.push(enc);
            }
        }
        self.encodings = encodings;
        Ok(self)
    }

    pub fn with_max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = width.max(1);
        self
    }

    pub fn encoding_names(&self) -> Vec<String> {
        self.encodings.iter().map(|e| e.name().to_string()).collect()
    }
}
