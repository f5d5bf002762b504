use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use futures::StreamExt;
use jvmscan_core::ScanConfig;
use serde::{Serialize, Serializer, ser::SerializeMap};
use snafu::Snafu;
use tracing::{debug, info};

use crate::{
    candidate::{Candidate, CandidateSet},
    collector::Collector,
    keys::{PATH_KEY, PropertyKeys},
    probe::{Probe, ProbedProperties},
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ScanError {
    #[snafu(display("no usable Java runtime among {candidates} candidates"))]
    NothingFound { candidates: usize },
}

/// One runtime that reported at least one requested property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeRecord {
    path: PathBuf,
    properties: ProbedProperties,
}

impl RuntimeRecord {
    /// `None` when the probe found nothing; such runtimes are not reported.
    pub fn new(path: PathBuf, properties: ProbedProperties) -> Option<Self> {
        if properties.is_empty() {
            return None;
        }
        Some(Self { path, properties })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn properties(&self) -> &ProbedProperties {
        &self.properties
    }

    pub fn write_text(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{PATH_KEY}={}", self.path.display())?;
        for (key, value) in self.properties.iter() {
            writeln!(out, "{key}={value}")?;
        }
        Ok(())
    }
}

impl Serialize for RuntimeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len() + 1))?;
        map.serialize_entry(PATH_KEY, &self.path.to_string_lossy())?;
        for (key, value) in self.properties.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Records in candidate discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    records: Vec<RuntimeRecord>,
}

impl Report {
    pub fn records(&self) -> &[RuntimeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `key=value` blocks, each followed by a blank line.
    pub fn write_text(&self, out: &mut impl Write) -> io::Result<()> {
        for record in &self.records {
            record.write_text(out)?;
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Drives the probe over every collected candidate.
///
/// Up to `workers` probes run at once; results are still assembled in
/// collection order.
#[derive(Debug, Clone)]
pub struct Scanner {
    collector: Collector,
    probe: Probe,
    workers: usize,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        let probe = Probe::from_config(&config);
        let workers = config.workers.max(1);
        Self {
            collector: Collector::new(config),
            probe,
            workers,
        }
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    /// Collect, probe and assemble. Fails only when nothing usable was found.
    pub async fn scan(&self, keys: &PropertyKeys) -> Result<Report, ScanError> {
        let candidates = self.collector.collect();
        let total = candidates.len();
        let report = self.assemble(candidates, keys).await;

        info!(candidates = total, runtimes = report.len(), "scan finished");
        if report.is_empty() {
            return NothingFoundSnafu { candidates: total }.fail();
        }
        Ok(report)
    }

    pub async fn assemble(&self, candidates: CandidateSet, keys: &PropertyKeys) -> Report {
        let probe = &self.probe;
        let records = futures::stream::iter(candidates.into_iter().map(|candidate: Candidate| async move {
            let properties = probe.probe(candidate.path(), keys).await;
            if properties.is_empty() {
                debug!(path = %candidate.path().display(), "dropping runtime without properties");
            }
            RuntimeRecord::new(candidate.into_path(), properties)
        }))
        .buffered(self.workers)
        .filter_map(|record| async move { record })
        .collect::<Vec<_>>()
        .await;

        Report { records }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::parse_properties;

    fn record(path: &str, output: &str, keys: &PropertyKeys) -> Option<RuntimeRecord> {
        RuntimeRecord::new(PathBuf::from(path), parse_properties(output, keys))
    }

    #[test]
    fn empty_properties_produce_no_record() {
        let keys = PropertyKeys::new(["java.version"]);
        assert!(record("/opt/java/bin/java", "nothing here\n", &keys).is_none());
    }

    #[test]
    fn text_blocks_put_path_first() {
        let keys = PropertyKeys::new(["java.vendor", "java.version"]);
        let report = Report {
            records: vec![
                record("/a/bin/java", "java.version = 21\njava.vendor = Eclipse Adoptium\n", &keys)
                    .unwrap(),
                record("/b/bin/java", "java.version = 1.8.0_402\n", &keys).unwrap(),
            ],
        };

        let mut out = Vec::new();
        report.write_text(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "java.path=/a/bin/java\njava.vendor=Eclipse Adoptium\njava.version=21\n\n\
             java.path=/b/bin/java\njava.version=1.8.0_402\n\n"
        );
    }

    #[test]
    fn json_keeps_record_key_order() {
        let keys = PropertyKeys::new(["os.arch", "java.version"]);
        let report = Report {
            records: vec![record("/a/bin/java", "java.version = 17\nos.arch = aarch64\n", &keys).unwrap()],
        };

        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"[{"java.path":"/a/bin/java","os.arch":"aarch64","java.version":"17"}]"#
        );
    }

    #[tokio::test]
    async fn empty_candidate_set_assembles_empty_report() {
        let config = ScanConfig::new(jvmscan_core::Platform::Unix, jvmscan_core::EnvVars::default());
        let scanner = Scanner::new(config);
        let report = scanner.assemble(CandidateSet::new(), &PropertyKeys::default()).await;
        assert!(report.is_empty());
    }
}
