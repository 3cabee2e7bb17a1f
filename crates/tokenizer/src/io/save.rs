//! Save functionality for trained models.

use super::format::{version_token, ModelFormat, SerializedModel, FORMAT_VERSION, MAGIC};
use sharif_bpe_core::{BpeError, Model, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Model saver - writes a model in one of the supported layouts.
pub struct ModelSaver<'a> {
    model: &'a Model,
    format: ModelFormat,
}

impl<'a> ModelSaver<'a> {
    /// Create a saver writing the text layout.
    pub fn new(model: &'a Model) -> Self {
        Self {
            model,
            format: ModelFormat::Text,
        }
    }

    /// Choose the output layout.
    pub fn format(mut self, format: ModelFormat) -> Self {
        self.format = format;
        self
    }

    /// Save the model to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| BpeError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
            .and_then(|()| writer.flush())
            .map_err(|e| BpeError::io(path, e))?;

        log::info!(
            "Saved model to {} ({} symbols, {} merges, {:?} layout)",
            path.display(),
            self.model.vocab_size(),
            self.model.merge_count(),
            self.format
        );
        Ok(())
    }

    /// Write the model to any writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        match self.format {
            ModelFormat::Text => self.write_text(writer),
            ModelFormat::Json => {
                serde_json::to_writer_pretty(&mut *writer, &SerializedModel::from(self.model))?;
                writeln!(writer)
            }
        }
    }

    fn write_text<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let model = self.model;
        writeln!(
            writer,
            "{MAGIC} {} base={} vocab={} merges={} split={}",
            version_token(FORMAT_VERSION),
            model.base_size(),
            model.vocab_size(),
            model.merge_count(),
            model.split_policy()
        )?;

        let base = model
            .symbols()
            .base_units()
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{base}")?;

        for rule in model.merges().iter() {
            writeln!(writer, "{} {}", rule.left, rule.right)?;
        }
        Ok(())
    }

    /// Render the model as a string.
    pub fn render(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)
            .map_err(|e| BpeError::io("<memory>", e))?;
        String::from_utf8(buf).map_err(|e| BpeError::InvalidConfig(e.to_string()))
    }
}
