use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum DesignError {
    /// A slice or extension would read past the start or end of the
    /// available sequence. Fatal for the affected window only.
    InsufficientSequence(String),
    /// `start_index - gene_start` is not a multiple of three; rejected
    /// before any window is processed.
    FrameMisalignment {
        window: String,
        start_index: usize,
        gene_start: usize,
    },
    /// A wild-type codon that cannot be looked up in the genetic code,
    /// reported with its nucleotide position.
    UnknownCodon { codon: String, position: usize },
    /// An extension loop exhausted the sequence without satisfying its
    /// melting-temperature (or G+C) gate.
    MeltingTempNeverReached(String),
    InvalidBase(char),
    Config(String),
    Io(std::io::Error),
    Serde(serde_json::Error),
    Csv(csv::Error),
}

impl Error for DesignError {}

impl fmt::Display for DesignError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DesignError::InsufficientSequence(msg) => {
                write!(f, "insufficient sequence: {msg}")
            }
            DesignError::FrameMisalignment {
                window,
                start_index,
                gene_start,
            } => write!(
                f,
                "window '{window}' is out of codon frame: start index {start_index} relative to gene start {gene_start}"
            ),
            DesignError::UnknownCodon { codon, position } => {
                write!(f, "unknown codon '{codon}' at position {position}")
            }
            DesignError::MeltingTempNeverReached(msg) => {
                write!(f, "melting temperature never reached: {msg}")
            }
            DesignError::InvalidBase(base) => write!(f, "invalid nucleotide '{base}'"),
            DesignError::Config(msg) => write!(f, "configuration error: {msg}"),
            DesignError::Io(e) => write!(f, "{e}"),
            DesignError::Serde(e) => write!(f, "{e}"),
            DesignError::Csv(e) => write!(f, "{e}"),
        }
    }
}

impl From<String> for DesignError {
    fn from(err: String) -> Self {
        DesignError::Config(err)
    }
}

impl From<std::io::Error> for DesignError {
    fn from(err: std::io::Error) -> Self {
        DesignError::Io(err)
    }
}

impl From<serde_json::Error> for DesignError {
    fn from(err: serde_json::Error) -> Self {
        DesignError::Serde(err)
    }
}

impl From<csv::Error> for DesignError {
    fn from(err: csv::Error) -> Self {
        DesignError::Csv(err)
    }
}
