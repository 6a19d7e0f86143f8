use crate::{
    assets::source::{SourceFile, load_sources},
    foundation::{
        config::EngineConfig,
        error::{StripError, StripResult},
    },
    session::record::ImageRecord,
};

/// Result of a successful batch load.
#[derive(Debug)]
pub struct BatchLoad {
    /// Number of records now held by the session.
    pub loaded: usize,
    /// Sources that failed to decode and were left out.
    pub skipped: Vec<StripError>,
}

/// In-memory photo list for one editing session.
///
/// Owns the ordered [`ImageRecord`]s; `position` of every record always equals its index.
#[derive(Debug, Default)]
pub struct Session {
    config: EngineConfig,
    records: Vec<ImageRecord>,
}

impl Session {
    /// Empty session using `config` for source limits.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
        }
    }

    /// Engine configuration used by this session.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Records in sequence order.
    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when no photos are loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow one record.
    pub fn get(&self, index: usize) -> StripResult<&ImageRecord> {
        self.records.get(index).ok_or_else(|| out_of_range(index, self.records.len()))
    }

    /// Replace all records with a freshly loaded batch.
    ///
    /// On any error the current records are left untouched.
    #[tracing::instrument(skip(self, files), fields(count = files.len()))]
    pub fn load_batch(&mut self, files: Vec<SourceFile>) -> StripResult<BatchLoad> {
        let report = load_sources(files, &self.config)?;
        self.records = report
            .decoded
            .into_iter()
            .enumerate()
            .map(|(i, src)| ImageRecord::from_decoded(src, i))
            .collect();
        tracing::debug!(
            loaded = self.records.len(),
            skipped = report.skipped.len(),
            "batch loaded"
        );
        Ok(BatchLoad {
            loaded: self.records.len(),
            skipped: report.skipped,
        })
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Rotate one record by a multiple of 90 degrees.
    pub fn rotate(&mut self, index: usize, degrees: i32) -> StripResult<()> {
        self.get_mut(index)?.rotate_by(degrees)
    }

    /// Toggle the horizontal mirror of one record.
    pub fn toggle_flip(&mut self, index: usize) -> StripResult<()> {
        self.get_mut(index)?.toggle_flip();
        Ok(())
    }

    /// Set the label of one record; empty restores the derived name.
    pub fn set_label(&mut self, index: usize, label: impl Into<String>) -> StripResult<()> {
        self.get_mut(index)?.set_label(label);
        Ok(())
    }

    /// Move the record at `from` so that it ends up at `to`, shifting the records in between.
    ///
    /// Only records in `min(from, to)..=max(from, to)` change position.
    pub fn move_record(&mut self, from: usize, to: usize) -> StripResult<()> {
        let len = self.records.len();
        if from >= len {
            return Err(out_of_range(from, len));
        }
        if to >= len {
            return Err(out_of_range(to, len));
        }
        if from == to {
            return Ok(());
        }

        let item = self.records.remove(from);
        self.records.insert(to, item);

        let (lo, hi) = if from < to { (from, to) } else { (to, from) };
        for (i, r) in self.records.iter_mut().enumerate().take(hi + 1).skip(lo) {
            r.set_position(i);
        }
        Ok(())
    }

    /// Owned copy of the record list for an export.
    ///
    /// Rasters are shared, so this is cheap; later edits do not affect the snapshot.
    pub fn snapshot(&self) -> Vec<ImageRecord> {
        self.records.clone()
    }

    fn get_mut(&mut self, index: usize) -> StripResult<&mut ImageRecord> {
        let len = self.records.len();
        self.records
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, len))
    }
}

fn out_of_range(index: usize, len: usize) -> StripError {
    StripError::invalid_input(format!(
        "record index {index} out of range for {len} records"
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/session/state.rs"]
mod tests;
