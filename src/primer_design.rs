use crate::dna_sequence::{reverse_complement, DNAsequence};
use crate::error::DesignError;
use crate::melting_temperature::{gc_count, melting_temperature};
use crate::FACILITY;
use serde::{Deserialize, Serialize};

/// Seed length for every primer before threshold-driven extension.
pub const PRIMER_SEED_LEN: usize = 15;

/// G+C count a long primer must exceed in short-window-guard mode.
pub const LONG_PRIMER_MIN_GC: usize = 8;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    pub oligo_len: usize,
    pub homology_len: usize,
    pub melt_temp: f64,
    pub rev_melt_temp: f64,
    pub synonymous_rate: f64,
    pub remove_stop_rate: f64,
    pub codon_table: usize,
    pub rng_seed: u64,
    pub min_window_codons: usize,
    pub clamp_primer_end: bool,
    pub recode_organism: String,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            oligo_len: 60,
            homology_len: 20,
            melt_temp: 55.0,
            rev_melt_temp: 55.0,
            synonymous_rate: 0.5,
            remove_stop_rate: 0.5,
            codon_table: 1,
            rng_seed: 0,
            min_window_codons: 4,
            clamp_primer_end: false,
            recode_organism: "Saccharomyces cerevisiae".to_string(),
        }
    }
}

impl DesignConfig {
    /// Bases left for sub-window plus forward primer once the homology arm
    /// is paid for.
    #[inline(always)]
    pub fn primer_budget(&self) -> usize {
        self.oligo_len - self.homology_len
    }

    pub fn validate(&self) -> Result<(), DesignError> {
        if self.oligo_len <= self.homology_len {
            return Err(DesignError::Config(format!(
                "oligo_len ({}) must exceed homology_len ({})",
                self.oligo_len, self.homology_len
            )));
        }
        for (name, rate) in [
            ("synonymous_rate", self.synonymous_rate),
            ("remove_stop_rate", self.remove_stop_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(DesignError::Config(format!(
                    "{name} ({rate}) must be within [0, 1]"
                )));
            }
        }
        if self.min_window_codons == 0 {
            return Err(DesignError::Config(
                "min_window_codons must be at least 1".to_string(),
            ));
        }
        if 3 * self.min_window_codons > self.primer_budget() {
            return Err(DesignError::Config(format!(
                "min_window_codons ({}) does not fit the primer budget of {} bases",
                self.min_window_codons,
                self.primer_budget()
            )));
        }
        if FACILITY.genetic_code(self.codon_table).is_none() {
            return Err(DesignError::Config(format!(
                "unknown codon table {}, available: {:?}",
                self.codon_table,
                FACILITY.known_codon_tables()
            )));
        }
        if FACILITY.codon_usage(&self.recode_organism).is_none() {
            return Err(DesignError::Config(format!(
                "no codon usage data for '{}', available: {:?}",
                self.recode_organism,
                FACILITY.known_organisms()
            )));
        }
        Ok(())
    }
}

/// A caller-defined contiguous region to mutate. `start_index` must be
/// codon-frame aligned to the gene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MutagenesisWindow {
    pub start_index: usize,
    pub window_end: usize,
    pub name: String,
}

/// Run-scoped, read-only sequence data.
#[derive(Clone, Debug)]
pub struct SequenceContext {
    pub vector: DNAsequence,
    pub wild_type: DNAsequence,
    pub gene_start: usize,
}

impl SequenceContext {
    pub fn new(
        mut vector: DNAsequence,
        mut wild_type: DNAsequence,
        gene_start: usize,
    ) -> Result<Self, DesignError> {
        vector.normalize();
        wild_type.normalize();
        if vector.is_empty() {
            return Err(DesignError::Config("empty vector sequence".to_string()));
        }
        if vector.len() != wild_type.len() {
            return Err(DesignError::Config(format!(
                "vector ({} bp) and wild-type ({} bp) sequences are not index-compatible",
                vector.len(),
                wild_type.len()
            )));
        }
        if gene_start >= vector.len() {
            return Err(DesignError::Config(format!(
                "gene_start ({gene_start}) is past the end of the sequence"
            )));
        }
        Ok(Self {
            vector,
            wild_type,
            gene_start,
        })
    }
}

/// Which path of the forward-primer state machine produced the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtensionPhase {
    /// Leftward extension followed by frame correction; the sub-window
    /// boundary is codon-aligned.
    FrameAligned,
    /// The sub-window was pinned to `3 * min_window_codons` bases and the
    /// primer grown rightward under the temperature and G+C gates.
    ShortWindowGuard,
    /// The mutation region would overrun the window; the primer starts at
    /// `window_end` and may not be frame-aligned.
    TerminalFallback,
}

#[derive(Clone, Debug)]
pub struct ForwardPrimer {
    pub primer_start: usize,
    pub primer_end: usize,
    pub sequence: String,
    pub phase: ExtensionPhase,
    /// Base shift applied by frame correction: +1 shrank the sub-window,
    /// -1 grew it, 0 none.
    pub frame_shift: i8,
    /// True when the unclamped right edge exceeded `window_end`; with
    /// `clamp_primer_end` unset the edge is left as computed and this flag
    /// is a diagnostic only.
    pub primer_end_past_window: bool,
}

/// Fixed-length slice of the vector ending exactly at the window start.
pub fn homology_arm(
    ctx: &SequenceContext,
    window: &MutagenesisWindow,
    config: &DesignConfig,
) -> Result<String, DesignError> {
    if window.start_index < config.homology_len {
        return Err(DesignError::InsufficientSequence(format!(
            "homology arm of {} bases needs {} bases upstream of index {}",
            config.homology_len, config.homology_len, window.start_index
        )));
    }
    let arm = ctx
        .vector
        .get_range_safe(window.start_index - config.homology_len..window.start_index)
        .ok_or_else(|| {
            DesignError::InsufficientSequence(format!(
                "homology arm slice before index {} is out of range",
                window.start_index
            ))
        })?;
    Ok(String::from_utf8_lossy(&arm).into_owned())
}

/// Reverse-complement of the vector up to the window start, grown from a
/// 15-base prefix until the reverse melting-temperature gate is met.
pub fn reverse_primer(
    ctx: &SequenceContext,
    window: &MutagenesisWindow,
    config: &DesignConfig,
) -> Result<String, DesignError> {
    let upstream = reverse_complement(&ctx.vector.bytes()[..window.start_index]);
    if upstream.len() < PRIMER_SEED_LEN {
        return Err(DesignError::InsufficientSequence(format!(
            "reverse primer needs {} bases upstream of index {}",
            PRIMER_SEED_LEN, window.start_index
        )));
    }
    let mut taken = PRIMER_SEED_LEN;
    while melting_temperature(&upstream[..taken])? < config.rev_melt_temp {
        taken += 1;
        if taken > upstream.len() {
            return Err(DesignError::InsufficientSequence(format!(
                "reverse primer for '{}' exhausted {} upstream bases below {} degrees",
                window.name,
                upstream.len(),
                config.rev_melt_temp
            )));
        }
    }
    Ok(String::from_utf8_lossy(&upstream[..taken]).into_owned())
}

/// The forward-primer extension engine: anchor the right edge, extend
/// leftward to the melting-temperature gate, then apply the short-window
/// guard, frame correction or terminal fallback.
pub fn forward_primer(
    ctx: &SequenceContext,
    window: &MutagenesisWindow,
    config: &DesignConfig,
) -> Result<ForwardPrimer, DesignError> {
    let vector = ctx.vector.bytes();
    let start = window.start_index;

    let mut primer_end = start + config.primer_budget();
    let primer_end_past_window = primer_end > window.window_end;
    if primer_end_past_window && config.clamp_primer_end {
        primer_end = window.window_end;
    }
    if primer_end > vector.len() {
        return Err(DesignError::InsufficientSequence(format!(
            "forward primer right edge {} for '{}' is past the vector end ({})",
            primer_end,
            window.name,
            vector.len()
        )));
    }
    if primer_end < PRIMER_SEED_LEN {
        return Err(DesignError::InsufficientSequence(format!(
            "forward primer right edge {} for '{}' leaves no room for a {}-base seed",
            primer_end, window.name, PRIMER_SEED_LEN
        )));
    }

    let mut primer_start = primer_end - PRIMER_SEED_LEN;
    while melting_temperature(&vector[primer_start..primer_end])? < config.melt_temp {
        primer_start = primer_start.checked_sub(1).ok_or_else(|| {
            DesignError::InsufficientSequence(format!(
                "forward primer for '{}' reached the vector start below {} degrees",
                window.name, config.melt_temp
            ))
        })?;
    }

    let mut phase = ExtensionPhase::FrameAligned;
    let mut frame_shift = 0i8;

    if primer_end - primer_start > config.primer_budget() - 3 * config.min_window_codons {
        // The primer would eat the sub-window: pin the sub-window to the
        // minimum codon count and grow a long primer rightward instead.
        phase = ExtensionPhase::ShortWindowGuard;
        primer_start = start + 3 * config.min_window_codons;
        primer_end = primer_start + PRIMER_SEED_LEN;
        loop {
            if primer_end > vector.len() {
                return Err(DesignError::MeltingTempNeverReached(format!(
                    "long forward primer for '{}' ran off the vector before meeting {} degrees with more than {} G+C",
                    window.name, config.melt_temp, LONG_PRIMER_MIN_GC
                )));
            }
            let slice = &vector[primer_start..primer_end];
            if melting_temperature(slice)? >= config.melt_temp
                && gc_count(slice) > LONG_PRIMER_MIN_GC
            {
                break;
            }
            primer_end += 1;
        }
    } else {
        // Nudge the boundary so the sub-window stays codon-aligned.
        let remainder = (primer_start as isize - start as isize).rem_euclid(3);
        if remainder == 2 {
            primer_start += 1;
            frame_shift = 1;
        } else if remainder == 1 {
            primer_start = primer_start.checked_sub(1).ok_or_else(|| {
                DesignError::InsufficientSequence(format!(
                    "frame correction for '{}' would move the primer before the vector start",
                    window.name
                ))
            })?;
            frame_shift = -1;
        }
    }

    if primer_start > window.window_end {
        // Last primer of a tiling: mutate everything up to the window end
        // and grow the primer rightward only.
        phase = ExtensionPhase::TerminalFallback;
        frame_shift = 0;
        primer_start = window.window_end;
        primer_end = primer_start + PRIMER_SEED_LEN;
        loop {
            if primer_end > vector.len() {
                return Err(DesignError::MeltingTempNeverReached(format!(
                    "terminal forward primer for '{}' ran off the vector below {} degrees",
                    window.name, config.melt_temp
                )));
            }
            if melting_temperature(&vector[primer_start..primer_end])? >= config.melt_temp {
                break;
            }
            primer_end += 1;
        }
    }

    Ok(ForwardPrimer {
        primer_start,
        primer_end,
        sequence: String::from_utf8_lossy(&vector[primer_start..primer_end]).into_owned(),
        phase,
        frame_shift,
        primer_end_past_window,
    })
}
