// src/session.rs

use parquet::file::properties::WriterProperties;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::ParquetCodec;
use crate::process::{parquet::writer_properties, LoadOptions};

/// Settings shared by every table converted within one session.
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    pub codec: ParquetCodec,
    pub load: LoadOptions,
}

/// Explicitly opened processing context for a conversion run.
///
/// Close it with [`ConversionSession::close`]; a session dropped without
/// closing (e.g. when a caller returns early with an error) is released by
/// `Drop`.
#[derive(Debug)]
pub struct ConversionSession {
    app_name: String,
    load: LoadOptions,
    props: WriterProperties,
    started: Instant,
    open: bool,
}

impl ConversionSession {
    pub fn open(app_name: impl Into<String>, settings: SessionSettings) -> Self {
        let app_name = app_name.into();
        info!(app = %app_name, codec = ?settings.codec, "session opened");
        Self {
            props: writer_properties(settings.codec.compression()),
            load: settings.load,
            app_name,
            started: Instant::now(),
            open: true,
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn load_options(&self) -> &LoadOptions {
        &self.load
    }

    pub fn writer_properties(&self) -> &WriterProperties {
        &self.props
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn release(&mut self) {
        if self.open {
            self.open = false;
            info!(app = %self.app_name, elapsed = ?self.started.elapsed(), "session closed");
        }
    }

    pub fn close(mut self) {
        self.release();
    }
}

impl Drop for ConversionSession {
    fn drop(&mut self) {
        if self.open {
            warn!(app = %self.app_name, "session dropped without close");
            self.release();
        }
    }
}
