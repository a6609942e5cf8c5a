use crate::{iupac_code::IupacCode, FACILITY};
use anyhow::Result;
use bio::io::fasta;
use gb_io::seq::{Seq, Topology};
use serde::{Deserialize, Serialize};
use std::{fmt, fs::File, ops::Range};

type DNAstring = Vec<u8>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DNAsequence {
    seq: Seq,
}

impl DNAsequence {
    pub fn from_sequence(sequence: &str) -> Result<DNAsequence> {
        Ok(DNAsequence::from_u8(sequence.as_bytes()))
    }

    pub fn from_fasta_file(filename: &str) -> Result<Vec<DNAsequence>> {
        let file = File::open(filename)?;
        Ok(fasta::Reader::new(file)
            .records()
            .filter_map(|record| record.ok())
            .map(|record| DNAsequence::from_fasta_record(&record))
            .collect())
    }

    pub fn from_genbank_file(filename: &str) -> Result<Vec<DNAsequence>> {
        Ok(gb_io::reader::parse_file(filename)?
            .into_iter()
            .map(DNAsequence::from_genbank_seq)
            .collect())
    }

    pub fn from_genbank_seq(seq: Seq) -> Self {
        Self { seq }
    }

    pub fn from_fasta_record(record: &bio::io::fasta::Record) -> Self {
        let mut ret = Self::from_u8(record.seq());
        ret.seq.name = Some(record.id().to_string());
        if let Some(desc) = record.desc() {
            ret.seq.comments.push(desc.to_string())
        }
        ret
    }

    fn from_u8(s: &[u8]) -> Self {
        let seq = Seq {
            name: None,
            topology: Topology::Linear,
            date: None,
            len: Some(s.len()),
            molecule_type: None,
            division: String::new(),
            definition: None,
            accession: None,
            version: None,
            source: None,
            dblink: None,
            keywords: None,
            references: vec![],
            comments: vec![],
            seq: s.to_vec(),
            contig: None,
            features: vec![],
        };
        Self { seq }
    }

    #[inline(always)]
    fn forward(&self) -> &Vec<u8> {
        &self.seq.seq
    }

    #[inline(always)]
    pub fn bytes(&self) -> &[u8] {
        self.forward()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.forward().len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward().is_empty()
    }

    pub fn name(&self) -> &Option<String> {
        &self.seq.name
    }

    pub fn is_circular(&self) -> bool {
        self.seq.topology == Topology::Circular
    }

    pub fn set_circular(&mut self, is_circular: bool) {
        self.seq.topology = match is_circular {
            true => Topology::Circular,
            false => Topology::Linear,
        };
    }

    pub fn get_forward_string(&self) -> String {
        String::from_utf8_lossy(self.forward()).into_owned()
    }

    pub fn get_range_safe(&self, range: Range<usize>) -> Option<DNAstring> {
        let Range { start, end } = range;
        if start >= end {
            return None;
        }
        let start = if self.is_circular() {
            start % self.len()
        } else {
            start
        };
        let end = if self.is_circular() {
            (end - 1) % self.len()
        } else {
            end - 1
        };
        if start >= self.len() || end >= self.len() {
            return None;
        }
        if start > end {
            if self.is_circular() {
                Some(
                    self.forward()[start..]
                        .iter()
                        .chain(self.forward()[..=end].iter())
                        .copied()
                        .collect(),
                )
            } else {
                None
            }
        } else {
            Some(self.forward()[start..=end].to_vec())
        }
    }

    /// Uppercases IUPAC letters, strips whitespace, replaces anything else
    /// with N.
    pub fn validate_dna_sequence(v: &[u8]) -> Vec<u8> {
        v.iter()
            .filter(|c| !c.is_ascii_whitespace())
            .map(|c| {
                if IupacCode::is_valid_letter(*c) {
                    c.to_ascii_uppercase()
                } else {
                    b'N'
                }
            })
            .collect()
    }

    /// Rewrites the sequence through `validate_dna_sequence`.
    pub fn normalize(&mut self) {
        self.seq.seq = Self::validate_dna_sequence(&self.seq.seq);
        self.seq.len = Some(self.seq.seq.len());
    }
}

/// Reverse complement of a nucleotide slice.
pub fn reverse_complement(sequence: &[u8]) -> DNAstring {
    sequence
        .iter()
        .rev()
        .map(|base| FACILITY.complement(*base))
        .collect()
}

impl fmt::Display for DNAsequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.forward()))
    }
}

impl From<String> for DNAsequence {
    fn from(s: String) -> Self {
        DNAsequence::from_u8(s.as_bytes())
    }
}
