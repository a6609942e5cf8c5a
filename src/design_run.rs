use crate::error::DesignError;
use crate::oligo_library::{enumerate_window, OligoRecord};
use crate::primer_design::{
    forward_primer, homology_arm, reverse_primer, DesignConfig, ExtensionPhase, MutagenesisWindow,
    SequenceContext,
};
use crate::sampler::BernoulliSampler;
use bio::io::fasta;
use serde::Serialize;
use std::fs::File;

/// Per-window design summary; `error` is set when the window was aborted.
#[derive(Clone, Debug, Serialize)]
pub struct WindowReport {
    pub name: String,
    pub start_index: usize,
    pub window_end: usize,
    pub homology_arm: String,
    pub reverse_primer_name: String,
    pub reverse_primer: String,
    pub forward_primer: String,
    pub primer_start: usize,
    pub phase: Option<ExtensionPhase>,
    pub primer_end_past_window: bool,
    pub oligo_count: usize,
    pub error: Option<String>,
}

impl WindowReport {
    fn failed(window: &MutagenesisWindow, error: &DesignError) -> Self {
        Self {
            name: window.name.clone(),
            start_index: window.start_index,
            window_end: window.window_end,
            homology_arm: String::new(),
            reverse_primer_name: String::new(),
            reverse_primer: String::new(),
            forward_primer: String::new(),
            primer_start: 0,
            phase: None,
            primer_end_past_window: false,
            oligo_count: 0,
            error: Some(error.to_string()),
        }
    }
}

/// Append-only collector for oligo records and their FASTA counterparts,
/// in emission order.
#[derive(Clone, Debug, Default)]
pub struct RunAccumulator {
    records: Vec<OligoRecord>,
    fasta: Vec<(String, String)>,
}

impl RunAccumulator {
    fn push(&mut self, record: OligoRecord) {
        self.fasta
            .push((record.name.clone(), record.full_oligo.clone()));
        self.records.push(record);
    }

    pub fn records(&self) -> &[OligoRecord] {
        &self.records
    }

    pub fn fasta(&self) -> &[(String, String)] {
        &self.fasta
    }

    pub fn write_csv(&self, path: &str) -> Result<(), DesignError> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_fasta(&self, path: &str) -> Result<(), DesignError> {
        let mut writer = fasta::Writer::new(File::create(path)?);
        for (name, sequence) in &self.fasta {
            writer.write(name, None, sequence.as_bytes())?;
        }
        Ok(())
    }
}

/// One design run over a window set: frame pre-check, then strictly
/// sequential per-window processing against the shared Bernoulli stream.
pub struct DesignRun {
    context: SequenceContext,
    config: DesignConfig,
    sampler: BernoulliSampler,
    accumulator: RunAccumulator,
    reports: Vec<WindowReport>,
}

impl DesignRun {
    pub fn new(context: SequenceContext, config: DesignConfig) -> Result<Self, DesignError> {
        config.validate()?;
        let sampler = BernoulliSampler::from_seed(config.rng_seed);
        Ok(Self {
            context,
            config,
            sampler,
            accumulator: RunAccumulator::default(),
            reports: vec![],
        })
    }

    /// Process the windows in caller order. Configuration-level errors fail
    /// before any window runs; a window failure aborts only that window.
    pub fn process(&mut self, windows: &[MutagenesisWindow]) -> Result<(), DesignError> {
        for window in windows {
            self.check_window(window)?;
        }
        for window in windows {
            match self.process_window(window) {
                Ok(report) => self.reports.push(report),
                Err(error) => self.reports.push(WindowReport::failed(window, &error)),
            }
        }
        Ok(())
    }

    fn check_window(&self, window: &MutagenesisWindow) -> Result<(), DesignError> {
        if window.start_index >= window.window_end {
            return Err(DesignError::Config(format!(
                "window '{}' is empty: start {} is not before end {}",
                window.name, window.start_index, window.window_end
            )));
        }
        if window.window_end > self.context.vector.len() {
            return Err(DesignError::Config(format!(
                "window '{}' ends at {} but the vector has {} bases",
                window.name,
                window.window_end,
                self.context.vector.len()
            )));
        }
        let gene_start = self.context.gene_start;
        if window.start_index < gene_start || (window.start_index - gene_start) % 3 != 0 {
            return Err(DesignError::FrameMisalignment {
                window: window.name.clone(),
                start_index: window.start_index,
                gene_start,
            });
        }
        Ok(())
    }

    fn process_window(&mut self, window: &MutagenesisWindow) -> Result<WindowReport, DesignError> {
        let arm = homology_arm(&self.context, window, &self.config)?;
        let reverse = reverse_primer(&self.context, window, &self.config)?;
        let forward = forward_primer(&self.context, window, &self.config)?;
        let records = enumerate_window(
            &self.context,
            window,
            &arm,
            &forward,
            &self.config,
            &mut self.sampler,
        )?;
        let oligo_count = records.len();
        for record in records {
            self.accumulator.push(record);
        }
        Ok(WindowReport {
            name: window.name.clone(),
            start_index: window.start_index,
            window_end: window.window_end,
            homology_arm: arm,
            reverse_primer_name: format!("rev_{}", window.name),
            reverse_primer: reverse,
            forward_primer: forward.sequence,
            primer_start: forward.primer_start,
            phase: Some(forward.phase),
            primer_end_past_window: forward.primer_end_past_window,
            oligo_count,
            error: None,
        })
    }

    pub fn accumulator(&self) -> &RunAccumulator {
        &self.accumulator
    }

    pub fn reports(&self) -> &[WindowReport] {
        &self.reports
    }
}

/// Load a window set from a JSON array of `{start_index, window_end, name}`.
pub fn load_windows(path: &str) -> Result<Vec<MutagenesisWindow>, DesignError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
