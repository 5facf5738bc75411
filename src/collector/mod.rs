//! Pull-model collector for the filebeat families.
//!
//! Descriptors are built once from the declaration table. Each collect
//! evaluates every declaration against the latest snapshot (stat extractors)
//! or the last published probe value, and emits untyped samples.

pub mod declarations;

pub use declarations::{filebeat_declarations, MetricDeclaration, Probe, ValueSource};

use crate::constants::FILEBEAT_SUBSYSTEM;
use crate::error::Result;
use crate::harvester::ErrorCountHandle;
use crate::stats::{SnapshotSource, Stats};
use prometheus::core::{Collector, Desc, Describer};
use prometheus::proto::{Metric, MetricFamily, MetricType, Untyped};
use prometheus::Opts;
use std::sync::Arc;

/// Read side of background probes.
pub trait ProbeValues: Send + Sync {
    fn value(&self, probe: Probe) -> f64;
}

impl ProbeValues for ErrorCountHandle {
    fn value(&self, probe: Probe) -> f64 {
        match probe {
            Probe::HarvesterErrors => self.error_count() as f64,
        }
    }
}

/// One evaluated declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub fq_name: String,
    pub label: (String, String),
    pub value: f64,
}

pub struct FilebeatCollector {
    declarations: Vec<MetricDeclaration>,
    descs: Vec<Desc>,
    snapshot: Arc<dyn SnapshotSource>,
    probes: Arc<dyn ProbeValues>,
}

impl FilebeatCollector {
    pub fn new(
        namespace: &str,
        snapshot: Arc<dyn SnapshotSource>,
        probes: Arc<dyn ProbeValues>,
    ) -> Result<Self> {
        let declarations = filebeat_declarations();
        let namespace = sanitize_namespace(namespace);

        let descs = declarations
            .iter()
            .map(|d| {
                Opts::new(d.family, d.help)
                    .namespace(namespace.clone())
                    .subsystem(FILEBEAT_SUBSYSTEM)
                    .const_label(d.label.0, d.label.1)
                    .describe()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            declarations,
            descs,
            snapshot,
            probes,
        })
    }

    fn evaluate(&self, decl: &MetricDeclaration, stats: &Stats) -> f64 {
        match decl.source {
            ValueSource::Stat(extract) => extract(stats),
            ValueSource::Probe(probe) => self.probes.value(probe),
        }
    }

    /// One pass over the table against a single snapshot. Both the exported
    /// families and [`samples`](Self::samples) come from here.
    fn evaluated(&self) -> Vec<(&MetricDeclaration, &Desc, f64)> {
        let stats = self.snapshot.latest();
        self.declarations
            .iter()
            .zip(&self.descs)
            .map(|(decl, desc)| (decl, desc, self.evaluate(decl, &stats)))
            .collect()
    }

    /// Evaluate every declaration once against one snapshot.
    pub fn samples(&self) -> Vec<Sample> {
        self.evaluated()
            .into_iter()
            .map(|(decl, desc, value)| Sample {
                fq_name: desc.fq_name.clone(),
                label: (decl.label.0.to_string(), decl.label.1.to_string()),
                value,
            })
            .collect()
    }
}

impl Collector for FilebeatCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut families: Vec<MetricFamily> = Vec::new();

        for (_, desc, value) in self.evaluated() {
            let mut untyped = Untyped::default();
            untyped.set_value(value);

            let mut metric = Metric::default();
            metric.set_label(desc.const_label_pairs.clone().into());
            metric.set_untyped(untyped);

            match families.iter_mut().find(|f| f.get_name() == desc.fq_name) {
                Some(family) => family.mut_metric().push(metric),
                None => {
                    let mut family = MetricFamily::default();
                    family.set_name(desc.fq_name.clone());
                    family.set_help(desc.help.clone());
                    family.set_field_type(MetricType::UNTYPED);
                    family.set_metric(vec![metric].into());
                    families.push(family);
                }
            }
        }

        families
    }
}

/// Metric names only allow `[a-zA-Z0-9_]`; beat names may contain dashes.
pub fn sanitize_namespace(namespace: &str) -> String {
    namespace
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
