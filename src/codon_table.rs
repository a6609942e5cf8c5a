use crate::iupac_code::IupacCode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// One NCBI translation table: 64 amino acids in TCAG codon order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GeneticCode {
    pub id: usize,
    pub sequence: String,
    pub organism: String,
}

impl GeneticCode {
    /// TCAG-order index of a plain codon, None for ambiguous or invalid bases.
    fn codon_index(codon: &[u8]) -> Option<usize> {
        if codon.len() != 3 {
            return None;
        }
        let mut index = 0;
        for base in codon {
            index = index * 4
                + match base.to_ascii_uppercase() {
                    b'T' | b'U' => 0,
                    b'C' => 1,
                    b'A' => 2,
                    b'G' => 3,
                    _ => return None,
                };
        }
        Some(index)
    }

    pub fn translate(&self, codon: &[u8]) -> Option<char> {
        let index = Self::codon_index(codon)?;
        self.sequence.as_bytes().get(index).map(|aa| *aa as char)
    }

    #[inline(always)]
    pub fn is_stop(&self, codon: &[u8]) -> bool {
        self.translate(codon) == Some('*')
    }
}

/// The four degenerate-codon sets for one wild-type codon, each
/// lexicographically sorted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DegenerateCodonSets {
    pub missense: Vec<String>,
    pub with_synonymous: Vec<String>,
    pub missense_no_stop: Vec<String>,
    pub with_synonymous_no_stop: Vec<String>,
}

/// Compute the degenerate codons covering the single-base substitutions of
/// `wt_codon`. Per codon position, the three non-wild-type bases are
/// filtered by the synonymous/stop predicates; a surviving set becomes one
/// IUPAC codon. Returns None when the wild-type codon is not plain A/C/G/T.
pub fn degenerate_codon_sets(wt_codon: &[u8], code: &GeneticCode) -> Option<DegenerateCodonSets> {
    let wt_aa = code.translate(wt_codon)?;
    let build = |include_synonymous: bool, remove_stop: bool| -> Vec<String> {
        let mut set = vec![];
        for pos in 0..3 {
            let mut surviving = vec![];
            for base in b"ACGT" {
                if *base == wt_codon[pos].to_ascii_uppercase() {
                    continue;
                }
                let mut candidate = [
                    wt_codon[0].to_ascii_uppercase(),
                    wt_codon[1].to_ascii_uppercase(),
                    wt_codon[2].to_ascii_uppercase(),
                ];
                candidate[pos] = *base;
                let Some(aa) = code.translate(&candidate) else {
                    continue;
                };
                if remove_stop && aa == '*' {
                    continue;
                }
                if !include_synonymous && aa == wt_aa {
                    continue;
                }
                surviving.push(*base);
            }
            if let Some(letter) = IupacCode::from_bases(&surviving).to_letter() {
                let mut codon = [
                    wt_codon[0].to_ascii_uppercase(),
                    wt_codon[1].to_ascii_uppercase(),
                    wt_codon[2].to_ascii_uppercase(),
                ];
                codon[pos] = letter;
                set.push(String::from_utf8_lossy(&codon).into_owned());
            }
        }
        set.sort();
        set
    };
    Some(DegenerateCodonSets {
        missense: build(false, false),
        with_synonymous: build(true, false),
        missense_no_stop: build(false, true),
        with_synonymous_no_stop: build(true, true),
    })
}

/// True if any single-base substitution of the wild-type codon is a stop
/// codon under `code`.
pub fn contains_stop_missense_variant(wt_codon: &[u8], code: &GeneticCode) -> bool {
    for pos in 0..3 {
        for base in b"ACGT" {
            if *base == wt_codon[pos].to_ascii_uppercase() {
                continue;
            }
            let mut candidate = [
                wt_codon[0].to_ascii_uppercase(),
                wt_codon[1].to_ascii_uppercase(),
                wt_codon[2].to_ascii_uppercase(),
            ];
            candidate[pos] = *base;
            if code.is_stop(&candidate) {
                return true;
            }
        }
    }
    false
}

/// All amino acids encodable by a degenerate codon, as a sorted,
/// deduplicated one-letter string ('*' for stop).
pub fn iupac_to_amino_acids(iupac_codon: &[u8], code: &GeneticCode) -> String {
    if iupac_codon.len() != 3 {
        return String::new();
    }
    let choices: Vec<Vec<u8>> = iupac_codon
        .iter()
        .map(|letter| IupacCode::from_letter(*letter).to_vec())
        .collect();
    let mut amino_acids = BTreeSet::new();
    for first in &choices[0] {
        for second in &choices[1] {
            for third in &choices[2] {
                if let Some(aa) = code.translate(&[*first, *second, *third]) {
                    amino_acids.insert(aa);
                }
            }
        }
    }
    amino_acids.into_iter().collect()
}

/// Usage-ranked codon lists per amino acid for one organism.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CodonUsage {
    pub organism: String,
    pub ranked_codons: HashMap<char, Vec<String>>,
}

impl CodonUsage {
    /// The highest-ranked synonymous codon different from the input; the
    /// input itself for single-codon amino acids, stops and unknown codons.
    pub fn preferred_synonymous(&self, codon: &[u8], code: &GeneticCode) -> String {
        let upper: String = codon
            .iter()
            .map(|b| b.to_ascii_uppercase() as char)
            .collect();
        let Some(aa) = code.translate(codon) else {
            return upper;
        };
        self.ranked_codons
            .get(&aa)
            .and_then(|ranked| ranked.iter().find(|c| **c != upper))
            .cloned()
            .unwrap_or(upper)
    }
}
