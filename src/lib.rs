//! Primer and oligo design for saturating mutagenesis libraries.
//!
//! Given a target gene embedded in a vector backbone and a set of
//! mutagenesis windows, this crate produces per window a homology arm, a
//! reverse primer, a melting-temperature- and frame-aware forward primer,
//! and the enumerated mutagenic oligos covering every codon of the window
//! with IUPAC-degenerate substitutions.

use facility::Facility;
use lazy_static::lazy_static;

pub mod codon_table;
pub mod design_run;
pub mod dna_sequence;
pub mod error;
pub mod facility;
pub mod iupac_code;
pub mod melting_temperature;
pub mod oligo_library;
pub mod primer_design;
pub mod sampler;

lazy_static! {
    // Complement table, genetic codes, codon usage
    pub static ref FACILITY: Facility = Facility::new();
}
