//! The fixed table of exported filebeat metrics.

use crate::stats::Stats;
use std::fmt;

/// Pure projection of one snapshot field. Safe to call at any frequency.
pub type StatExtractor = fn(&Stats) -> f64;

/// Values produced by background probes rather than by the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    HarvesterErrors,
}

#[derive(Clone, Copy)]
pub enum ValueSource {
    Stat(StatExtractor),
    Probe(Probe),
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Stat(_) => f.write_str("Stat"),
            ValueSource::Probe(p) => write!(f, "Probe({:?})", p),
        }
    }
}

/// One exported sample: family, help text, its constant label and where the
/// value comes from.
#[derive(Debug, Clone, Copy)]
pub struct MetricDeclaration {
    pub family: &'static str,
    pub help: &'static str,
    pub label: (&'static str, &'static str),
    pub source: ValueSource,
}

impl MetricDeclaration {
    const fn stat(
        family: &'static str,
        help: &'static str,
        label: (&'static str, &'static str),
        extract: StatExtractor,
    ) -> Self {
        Self {
            family,
            help,
            label,
            source: ValueSource::Stat(extract),
        }
    }

    const fn probe(
        family: &'static str,
        help: &'static str,
        label: (&'static str, &'static str),
        probe: Probe,
    ) -> Self {
        Self {
            family,
            help,
            label,
            source: ValueSource::Probe(probe),
        }
    }
}

pub const EVENTS: &str = "events";
pub const HARVESTER: &str = "harvester";
pub const INPUT_LOG: &str = "input_log";

/// Declarations in exposition order. Members of a family are contiguous.
pub fn filebeat_declarations() -> Vec<MetricDeclaration> {
    use MetricDeclaration as D;

    vec![
        D::stat(EVENTS, "filebeat.events", ("event", "active"), |s| s.filebeat.events.active),
        D::stat(EVENTS, "filebeat.events", ("event", "added"), |s| s.filebeat.events.added),
        D::stat(EVENTS, "filebeat.events", ("event", "done"), |s| s.filebeat.events.done),
        D::stat(HARVESTER, "filebeat.harvester", ("harvester", "closed"), |s| {
            s.filebeat.harvester.closed
        }),
        D::stat(HARVESTER, "filebeat.harvester", ("harvester", "open_files"), |s| {
            s.filebeat.harvester.open_files
        }),
        D::stat(HARVESTER, "filebeat.harvester", ("harvester", "running"), |s| {
            s.filebeat.harvester.running
        }),
        D::stat(HARVESTER, "filebeat.harvester", ("harvester", "skipped"), |s| {
            s.filebeat.harvester.skipped
        }),
        D::stat(HARVESTER, "filebeat.harvester", ("harvester", "started"), |s| {
            s.filebeat.harvester.started
        }),
        D::probe(
            HARVESTER,
            "filebeat.harvester",
            ("harvester", "errors"),
            Probe::HarvesterErrors,
        ),
        D::stat(INPUT_LOG, "filebeat.input_log", ("files", "renamed"), |s| {
            s.filebeat.input.log.files.renamed
        }),
        D::stat(INPUT_LOG, "filebeat.input_log", ("files", "truncated"), |s| {
            s.filebeat.input.log.files.truncated
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_shape() {
        let decls = filebeat_declarations();
        assert_eq!(decls.len(), 11);

        let identities: HashSet<_> = decls.iter().map(|d| (d.family, d.label)).collect();
        assert_eq!(identities.len(), decls.len());

        let probes: Vec<_> = decls
            .iter()
            .filter(|d| matches!(d.source, ValueSource::Probe(_)))
            .collect();
        assert_eq!(probes.len(), 1);
        assert_eq!(probes[0].label, ("harvester", "errors"));
    }

    #[test]
    fn test_families_are_contiguous_with_one_label_name() {
        let decls = filebeat_declarations();
        let mut seen: Vec<&str> = Vec::new();
        for d in &decls {
            if seen.last() != Some(&d.family) {
                assert!(!seen.contains(&d.family), "{} split", d.family);
                seen.push(d.family);
            }
            let first = decls.iter().find(|o| o.family == d.family).unwrap();
            assert_eq!(first.label.0, d.label.0);
            assert_eq!(first.help, d.help);
        }
        assert_eq!(seen, vec![EVENTS, HARVESTER, INPUT_LOG]);
    }

    #[test]
    fn test_extractors_read_their_field() {
        let mut stats = Stats::default();
        stats.filebeat.harvester.skipped = 9.0;
        stats.filebeat.input.log.files.renamed = 4.0;

        for d in filebeat_declarations() {
            if let ValueSource::Stat(extract) = d.source {
                let expected = match d.label.1 {
                    "skipped" => 9.0,
                    "renamed" => 4.0,
                    _ => 0.0,
                };
                assert_eq!(extract(&stats), expected, "{:?}", d.label);
            }
        }
    }
}
