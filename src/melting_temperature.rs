//! Nearest-neighbor DNA melting temperature.
//!
//! Unified dinucleotide parameters from Allawi & SantaLucia (1997) with
//! terminal initiation terms, 50 mM monovalent salt and 25 nM + 25 nM
//! strand concentrations, matching the defaults of the usual
//! nearest-neighbor primer calculators.

use crate::error::DesignError;

const GAS_CONSTANT: f64 = 1.987; // cal/(K*mol)
const MONOVALENT_SALT_M: f64 = 0.05;
const DUPLEX_CONC_M: f64 = 12.5e-9; // dnac1 - dnac2/2, 25 nM each strand

/// Melting temperature in degrees Celsius. Pure function of the slice;
/// needs at least two plain A/C/G/T bases.
pub fn melting_temperature(sequence: &[u8]) -> Result<f64, DesignError> {
    if sequence.len() < 2 {
        return Err(DesignError::InsufficientSequence(
            "melting temperature needs at least two bases".to_string(),
        ));
    }

    let mut delta_h = 0.0;
    let mut delta_s = 0.0;

    for terminal in [sequence[0], sequence[sequence.len() - 1]] {
        let (h, s) = match terminal.to_ascii_uppercase() {
            b'A' | b'T' => (2.3, 4.1),
            b'C' | b'G' => (0.1, -2.8),
            other => return Err(DesignError::InvalidBase(other as char)),
        };
        delta_h += h;
        delta_s += s;
    }

    for pair in sequence.windows(2) {
        let (h, s) = nn_parameters(pair[0], pair[1])?;
        delta_h += h;
        delta_s += s;
    }

    delta_s += 0.368 * (sequence.len() - 1) as f64 * MONOVALENT_SALT_M.ln();
    let tm = 1000.0 * delta_h / (delta_s + GAS_CONSTANT * DUPLEX_CONC_M.ln()) - 273.15;
    Ok(tm)
}

/// (delta H [kcal/mol], delta S [cal/(K*mol)]) for one dinucleotide step.
fn nn_parameters(first: u8, second: u8) -> Result<(f64, f64), DesignError> {
    let step = (first.to_ascii_uppercase(), second.to_ascii_uppercase());
    let params = match step {
        (b'A', b'A') | (b'T', b'T') => (-7.9, -22.2),
        (b'A', b'T') => (-7.2, -20.4),
        (b'T', b'A') => (-7.2, -21.3),
        (b'C', b'A') | (b'T', b'G') => (-8.5, -22.7),
        (b'G', b'T') | (b'A', b'C') => (-8.4, -22.4),
        (b'C', b'T') | (b'A', b'G') => (-7.8, -21.0),
        (b'G', b'A') | (b'T', b'C') => (-8.2, -22.2),
        (b'C', b'G') => (-10.6, -27.2),
        (b'G', b'C') => (-9.8, -24.4),
        (b'G', b'G') | (b'C', b'C') => (-8.0, -19.9),
        _ => {
            let bad = if matches!(step.0, b'A' | b'C' | b'G' | b'T') {
                step.1
            } else {
                step.0
            };
            return Err(DesignError::InvalidBase(bad as char));
        }
    };
    Ok(params)
}

/// Number of G and C bases in a slice.
#[inline(always)]
pub fn gc_count(sequence: &[u8]) -> usize {
    sequence
        .iter()
        .map(|c| c.to_ascii_uppercase())
        .filter(|&c| c == b'G' || c == b'C')
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poly_a() {
        // 15-mer poly-A: dH = 14*-7.9 + 2*2.3, dS = 14*-22.2 + 2*4.1,
        // salt-corrected and solved for Tm by hand.
        let tm = melting_temperature(b"AAAAAAAAAAAAAAA").unwrap();
        assert!((tm - 26.1).abs() < 0.5, "tm was {tm}");
    }

    #[test]
    fn test_gc_raises_tm() {
        let at = melting_temperature(b"ATATATATATATATATATAT").unwrap();
        let mixed = melting_temperature(b"ATGCATGCATGCATGCATGC").unwrap();
        let gc = melting_temperature(b"GCGCGCGCGCGCGCGCGCGC").unwrap();
        assert!(at < mixed && mixed < gc);
    }

    #[test]
    fn test_extension_raises_tm() {
        let short = melting_temperature(b"ATGCATGCATGCATG").unwrap();
        let long = melting_temperature(b"ATGCATGCATGCATGC").unwrap();
        assert!(long > short);
    }

    #[test]
    fn test_case_insensitive() {
        let upper = melting_temperature(b"ATGCATGCATGCATGC").unwrap();
        let lower = melting_temperature(b"atgcatgcatgcatgc").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            melting_temperature(b"A"),
            Err(DesignError::InsufficientSequence(_))
        ));
        assert!(matches!(
            melting_temperature(b"ATGNCA"),
            Err(DesignError::InvalidBase('N'))
        ));
    }

    #[test]
    fn test_gc_count() {
        assert_eq!(gc_count(b"ATGCatgc"), 4);
        assert_eq!(gc_count(b"AATT"), 0);
        assert_eq!(gc_count(b""), 0);
    }
}
