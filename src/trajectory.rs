use crate::error::{Error, Result};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// One recorded sample: where agent `id` stood at step `frame`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRow {
    pub frame: u64,
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

/// File-backed trajectory sink, one JSON row per line. The file is truncated
/// on creation; a run overwrites whatever the previous run left behind.
pub struct TrajectoryWriter {
    out: BufWriter<File>,
}

impl TrajectoryWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(TrajectoryWriter {
            out: BufWriter::new(file),
        })
    }

    pub fn write_row(&mut self, row: &TrajectoryRow) -> Result<()> {
        serde_json::to_writer(&mut self.out, row)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// A full run read back from disk, for post-hoc rendering and analysis.
#[derive(Debug, Clone)]
pub struct TrajectoryData {
    rows: Vec<TrajectoryRow>,
}

impl TrajectoryData {
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut rows = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let row = serde_json::from_str(&line)
                .map_err(|source| Error::MalformedTrajectory {
                    line: idx + 1,
                    source,
                })?;
            rows.push(row);
        }
        Ok(TrajectoryData { rows })
    }

    pub fn rows(&self) -> &[TrajectoryRow] {
        &self.rows
    }

    /// Distinct agent ids present in the record, ascending.
    pub fn agent_ids(&self) -> Vec<u64> {
        self.rows.iter().map(|r| r.id).sorted().dedup().collect()
    }

    /// Rows grouped per frame, ascending by frame number.
    pub fn by_frame(&self) -> BTreeMap<u64, Vec<&TrajectoryRow>> {
        let mut frames: BTreeMap<u64, Vec<&TrajectoryRow>> = BTreeMap::new();
        for row in &self.rows {
            frames.entry(row.frame).or_default().push(row);
        }
        frames
    }

    /// Rows grouped per agent, in file order (which is frame order for a
    /// writer fed once per step).
    pub fn by_agent(&self) -> BTreeMap<u64, Vec<&TrajectoryRow>> {
        let mut agents: BTreeMap<u64, Vec<&TrajectoryRow>> = BTreeMap::new();
        for row in &self.rows {
            agents.entry(row.id).or_default().push(row);
        }
        agents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(frame: u64, id: u64, x: f64) -> TrajectoryRow {
        TrajectoryRow { frame, id, x, y: 0.0 }
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");

        let mut writer = TrajectoryWriter::create(&path).unwrap();
        writer.write_row(&row(0, 1, 0.5)).unwrap();
        writer.write_row(&row(0, 2, 1.5)).unwrap();
        writer.write_row(&row(1, 1, 0.6)).unwrap();
        writer.finish().unwrap();

        let data = TrajectoryData::read_file(&path).unwrap();
        assert_eq!(data.rows().len(), 3);
        assert_eq!(data.agent_ids(), vec![1, 2]);
        assert_eq!(data.by_frame().len(), 2);
        assert_eq!(data.by_agent()[&1].len(), 2);
    }

    #[test]
    fn test_create_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");

        let mut writer = TrajectoryWriter::create(&path).unwrap();
        writer.write_row(&row(0, 1, 0.0)).unwrap();
        writer.finish().unwrap();

        let writer = TrajectoryWriter::create(&path).unwrap();
        writer.finish().unwrap();

        let data = TrajectoryData::read_file(&path).unwrap();
        assert!(data.rows().is_empty());
    }

    #[test]
    fn test_malformed_row_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        std::fs::write(&path, "{\"frame\":0,\"id\":1,\"x\":0.0,\"y\":0.0}\nnot json\n").unwrap();

        match TrajectoryData::read_file(&path) {
            Err(Error::MalformedTrajectory { line: 2, .. }) => {}
            other => panic!("expected malformed-row error, got {:?}", other.map(|d| d.rows().len())),
        }
    }
}
