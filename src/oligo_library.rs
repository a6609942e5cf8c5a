use crate::codon_table::{
    contains_stop_missense_variant, degenerate_codon_sets, iupac_to_amino_acids,
};
use crate::error::DesignError;
use crate::primer_design::{DesignConfig, ForwardPrimer, MutagenesisWindow, SequenceContext};
use crate::sampler::BernoulliSampler;
use crate::FACILITY;
use itertools::Itertools;
use serde::Serialize;

/// Per-codon inclusion decision inside one sub-window.
#[derive(Clone, Debug)]
pub struct CodonDecision {
    pub wt_codon: String,
    /// 1-based amino-acid position relative to the gene start.
    pub position: usize,
    pub include_synonymous: bool,
    pub has_stop_variant: bool,
    pub remove_stop_variant: bool,
    pub degenerate_codons: Vec<String>,
}

/// One emitted oligo; immutable once appended to the run accumulator.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OligoRecord {
    pub name: String,
    pub codon_sub: String,
    pub wt_codon: String,
    pub position: usize,
    pub iupac_codon: String,
    pub iupac_aa: String,
    pub sub_window: String,
    pub full_oligo: String,
    pub add_synonymous_codon: bool,
    pub contains_missense_stop: bool,
    pub remove_missense_stop_codon: bool,
}

/// Enumerate the mutagenic oligos for one window: one record per degenerate
/// codon of every wild-type codon in `[start_index, primer_start)`, in
/// ascending codon position and lexicographic order within a position.
pub fn enumerate_window(
    ctx: &SequenceContext,
    window: &MutagenesisWindow,
    homology_arm: &str,
    forward: &ForwardPrimer,
    config: &DesignConfig,
    sampler: &mut BernoulliSampler,
) -> Result<Vec<OligoRecord>, DesignError> {
    let code = FACILITY
        .genetic_code(config.codon_table)
        .ok_or_else(|| DesignError::Config(format!("unknown codon table {}", config.codon_table)))?;
    let usage = FACILITY.codon_usage(&config.recode_organism).ok_or_else(|| {
        DesignError::Config(format!(
            "no codon usage data for '{}'",
            config.recode_organism
        ))
    })?;

    let start = window.start_index;
    let sub_window_len = forward.primer_start.saturating_sub(start);
    let sub_window_end = start + sub_window_len;
    if sub_window_end > ctx.wild_type.len() {
        return Err(DesignError::InsufficientSequence(format!(
            "sub-window of '{}' ends at {} but the wild-type sequence has {} bases",
            window.name,
            sub_window_end,
            ctx.wild_type.len()
        )));
    }
    let wt_region = &ctx.wild_type.bytes()[start..sub_window_end];
    let vector_region = &ctx.vector.bytes()[start..sub_window_end];
    let codon_count = sub_window_len / 3;

    // Synonymously recoded background, lower-case; a terminal-fallback
    // window may leave a partial codon, which is carried unmodified.
    let recoded: Vec<String> = vector_region
        .chunks_exact(3)
        .map(|codon| usage.preferred_synonymous(codon, code).to_lowercase())
        .collect();
    let tail = String::from_utf8_lossy(&vector_region[codon_count * 3..]).to_lowercase();

    let mut decisions = Vec::with_capacity(codon_count);
    for (i, wt_codon) in wt_region.chunks_exact(3).enumerate() {
        let wt_string: String = wt_codon
            .iter()
            .map(|b| b.to_ascii_uppercase() as char)
            .collect();
        let include_synonymous = sampler.draw(config.synonymous_rate);
        let has_stop_variant = contains_stop_missense_variant(wt_codon, code);
        // The stream must stay untouched when a codon has no reachable stop
        // or the removal rate is zero.
        let remove_stop_variant = has_stop_variant
            && config.remove_stop_rate > 0.0
            && sampler.draw(config.remove_stop_rate);
        let sets = degenerate_codon_sets(wt_codon, code).ok_or(DesignError::UnknownCodon {
            codon: wt_string.clone(),
            position: start + 3 * i,
        })?;
        let degenerate_codons = match (include_synonymous, remove_stop_variant) {
            (true, true) => sets.with_synonymous_no_stop,
            (true, false) => sets.with_synonymous,
            (false, true) => sets.missense_no_stop,
            (false, false) => sets.missense,
        };
        decisions.push(CodonDecision {
            wt_codon: wt_string,
            position: (start - ctx.gene_start) / 3 + 1 + i,
            include_synonymous,
            has_stop_variant,
            remove_stop_variant,
            degenerate_codons,
        });
    }

    let mut records = vec![];
    for (i, decision) in decisions.iter().enumerate() {
        for iupac_codon in &decision.degenerate_codons {
            let mut sub_window: String = recoded
                .iter()
                .enumerate()
                .map(|(j, codon)| {
                    if i == j {
                        iupac_codon.as_str()
                    } else {
                        codon.as_str()
                    }
                })
                .join("");
            sub_window.push_str(&tail);

            let codon_sub = format!(
                "{}{}{}",
                decision.wt_codon, decision.position, iupac_codon
            );
            records.push(OligoRecord {
                name: format!("{}_{}", window.name, codon_sub),
                codon_sub,
                wt_codon: decision.wt_codon.clone(),
                position: decision.position,
                iupac_codon: iupac_codon.clone(),
                iupac_aa: iupac_to_amino_acids(iupac_codon.as_bytes(), code),
                full_oligo: format!("{homology_arm}{sub_window}{}", forward.sequence),
                sub_window,
                add_synonymous_codon: decision.include_synonymous,
                contains_missense_stop: decision.has_stop_variant,
                remove_missense_stop_codon: decision.remove_stop_variant,
            });
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dna_sequence::DNAsequence;
    use crate::primer_design::{forward_primer, homology_arm as build_arm};

    const EASY_TM: f64 = 10.0;

    fn config(synonymous_rate: f64, remove_stop_rate: f64) -> DesignConfig {
        DesignConfig {
            melt_temp: EASY_TM,
            rev_melt_temp: EASY_TM,
            synonymous_rate,
            remove_stop_rate,
            ..DesignConfig::default()
        }
    }

    fn context_from(vector: &str, wild_type: &str) -> SequenceContext {
        SequenceContext::new(
            DNAsequence::from_sequence(vector).unwrap(),
            DNAsequence::from_sequence(wild_type).unwrap(),
            20,
        )
        .unwrap()
    }

    /// 20 backbone bases, then "ATG GCT GAT" followed by filler codons.
    fn scenario_vector() -> String {
        let mut v = "AACCGGTTAACCGGTTAACC".to_string();
        v += "ATGGCTGAT";
        v += &"CCTGAAGGTTCTACTGCTGTT".repeat(3);
        v += "TAA";
        v
    }

    fn window() -> MutagenesisWindow {
        MutagenesisWindow {
            start_index: 23,
            window_end: 50,
            name: "w1".to_string(),
        }
    }

    fn run(
        ctx: &SequenceContext,
        window: &MutagenesisWindow,
        cfg: &DesignConfig,
    ) -> (Vec<OligoRecord>, String, ForwardPrimer) {
        let arm = build_arm(ctx, window, cfg).unwrap();
        let fwd = forward_primer(ctx, window, cfg).unwrap();
        let mut sampler = BernoulliSampler::from_seed(cfg.rng_seed);
        let records = enumerate_window(ctx, window, &arm, &fwd, cfg, &mut sampler).unwrap();
        (records, arm, fwd)
    }

    #[test]
    fn test_scenario_gct_at_position_two() {
        let vector = scenario_vector();
        let ctx = context_from(&vector, &vector);
        let cfg = config(0.0, 0.0);
        let (records, arm, fwd) = run(&ctx, &window(), &cfg);

        assert_eq!(arm.as_bytes(), &ctx.vector.bytes()[3..23]);

        // GCT is the first codon of the window, amino-acid position 2.
        let gct: Vec<&OligoRecord> = records.iter().filter(|r| r.position == 2).collect();
        assert_eq!(gct.len(), 2);
        assert!(gct.iter().all(|r| r.wt_codon == "GCT"));
        assert_eq!(gct[0].iupac_codon, "GDT");
        assert_eq!(gct[1].iupac_codon, "HCT");
        assert_eq!(gct[0].iupac_aa, "DGV");
        assert_eq!(gct[0].name, "w1_GCT2GDT");
        assert_eq!(gct[0].codon_sub, "GCT2GDT");
        assert!(gct
            .iter()
            .all(|r| !r.add_synonymous_codon && !r.contains_missense_stop));

        // Every record is arm ++ sub-window ++ forward primer.
        let sub_window_len = fwd.primer_start - 23;
        for record in &records {
            assert_eq!(record.sub_window.len(), sub_window_len);
            assert_eq!(
                record.full_oligo,
                format!("{arm}{}{}", record.sub_window, fwd.sequence)
            );
        }
    }

    #[test]
    fn test_output_ordering() {
        let vector = scenario_vector();
        let ctx = context_from(&vector, &vector);
        let cfg = config(0.5, 0.5);
        let (records, _, _) = run(&ctx, &window(), &cfg);
        for pair in records.windows(2) {
            assert!(pair[0].position <= pair[1].position);
            if pair[0].position == pair[1].position {
                assert!(pair[0].iupac_codon < pair[1].iupac_codon);
            }
        }
    }

    #[test]
    fn test_synonymous_background_recoding() {
        // All-TAT gene: background recodes to "tac", substituted codon
        // stays upper-case.
        let mut vector = "AACCGGTTAACCGGTTAACC".to_string();
        vector += &"TAT".repeat(40);
        let ctx = context_from(&vector, &vector);
        let cfg = config(0.0, 0.0);
        let win = MutagenesisWindow {
            start_index: 23,
            window_end: 110,
            name: "tat".to_string(),
        };
        let (records, _, fwd) = run(&ctx, &win, &cfg);
        let codon_count = (fwd.primer_start - 23) / 3;
        assert_eq!(codon_count, 8);
        let first = records
            .iter()
            .find(|r| r.position == 2 && r.iupac_codon == "TBT")
            .unwrap();
        assert_eq!(
            first.sub_window,
            format!("TBT{}", "tac".repeat(codon_count - 1))
        );
    }

    #[test]
    fn test_deterministic_across_runs() {
        let vector = scenario_vector();
        let ctx = context_from(&vector, &vector);
        let cfg = config(0.5, 0.5);
        let (first, _, _) = run(&ctx, &window(), &cfg);
        let (second, _, _) = run(&ctx, &window(), &cfg);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_zero_remove_stop_rate_consumes_no_draws() {
        // Every TAT codon has reachable stops, so a non-zero rate would
        // draw once per codon; a zero rate must leave the stream aligned
        // with synonymous-only consumption.
        let mut vector = "AACCGGTTAACCGGTTAACC".to_string();
        vector += &"TAT".repeat(40);
        let ctx = context_from(&vector, &vector);
        let cfg = config(0.5, 0.0);
        let win = MutagenesisWindow {
            start_index: 23,
            window_end: 110,
            name: "tat".to_string(),
        };
        let arm = build_arm(&ctx, &win, &cfg).unwrap();
        let fwd = forward_primer(&ctx, &win, &cfg).unwrap();
        let codon_count = (fwd.primer_start - 23) / 3;

        let mut sampler = BernoulliSampler::from_seed(99);
        let records = enumerate_window(&ctx, &win, &arm, &fwd, &cfg, &mut sampler).unwrap();
        assert!(records
            .iter()
            .all(|r| r.contains_missense_stop && !r.remove_missense_stop_codon));

        let mut mirror = BernoulliSampler::from_seed(99);
        for _ in 0..codon_count {
            mirror.draw(cfg.synonymous_rate);
        }
        let tail_a: Vec<bool> = (0..20).map(|_| sampler.draw(0.5)).collect();
        let tail_b: Vec<bool> = (0..20).map(|_| mirror.draw(0.5)).collect();
        assert_eq!(tail_a, tail_b);
    }

    #[test]
    fn test_remove_stop_rate_one() {
        let mut vector = "AACCGGTTAACCGGTTAACC".to_string();
        vector += &"TAT".repeat(40);
        let ctx = context_from(&vector, &vector);
        let cfg = config(0.0, 1.0);
        let win = MutagenesisWindow {
            start_index: 23,
            window_end: 110,
            name: "tat".to_string(),
        };
        let (records, _, _) = run(&ctx, &win, &cfg);
        assert!(records.iter().all(|r| r.remove_missense_stop_codon));
        // missense-no-stop set of TAT per codon
        let iupacs: Vec<&str> = records
            .iter()
            .filter(|r| r.position == 2)
            .map(|r| r.iupac_codon.as_str())
            .collect();
        assert_eq!(iupacs, vec!["TBT", "VAT"]);
    }

    #[test]
    fn test_unknown_codon_reports_position() {
        let vector = scenario_vector();
        let mut wild_type = vector.clone();
        // Second codon of the window gets an N in the wild type only.
        wild_type.replace_range(26..27, "N");
        let ctx = context_from(&vector, &wild_type);
        let cfg = config(0.0, 0.0);
        let arm = build_arm(&ctx, &window(), &cfg).unwrap();
        let fwd = forward_primer(&ctx, &window(), &cfg).unwrap();
        let mut sampler = BernoulliSampler::from_seed(0);
        let err = enumerate_window(&ctx, &window(), &arm, &fwd, &cfg, &mut sampler).unwrap_err();
        match err {
            DesignError::UnknownCodon { codon, position } => {
                assert_eq!(codon, "NAT");
                assert_eq!(position, 26);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
