use satmut::design_run::{load_windows, DesignRun};
use satmut::dna_sequence::DNAsequence;
use satmut::primer_design::{DesignConfig, SequenceContext};
use std::{env, fs};

const DEFAULT_TABLE_PATH: &str = "dms_oligos.csv";
const DEFAULT_FASTA_PATH: &str = "dms_oligos.fa";

fn usage() {
    eprintln!(
        "Usage:\n  \
  satmut --version\n  \
  satmut config-template\n  \
  satmut design --vector FILE --windows FILE [OPTIONS]\n\n\
Options for design:\n  \
  --vector FILE      vector/backbone sequence (FASTA, or GenBank by extension)\n  \
  --wt FILE          wild-type sequence, defaults to the vector sequence\n  \
  --gene-start N     0-based index of the first gene base (default 0)\n  \
  --windows FILE     JSON array of {{start_index, window_end, name}}\n  \
  --config JSON      design configuration, inline JSON or @file.json\n  \
  --out-table FILE   oligo table output (default {DEFAULT_TABLE_PATH})\n  \
  --out-fasta FILE   oligo FASTA output (default {DEFAULT_FASTA_PATH})\n\n  \
  Tip: 'satmut config-template' prints the default configuration"
    );
}

fn load_json_arg(value: &str) -> Result<String, String> {
    if let Some(path) = value.strip_prefix('@') {
        fs::read_to_string(path).map_err(|e| format!("Could not read JSON file '{path}': {e}"))
    } else {
        Ok(value.to_string())
    }
}

fn load_sequence(path: &str) -> Result<DNAsequence, String> {
    let lower = path.to_ascii_lowercase();
    let sequences = if lower.ends_with(".gb") || lower.ends_with(".gbk") || lower.ends_with(".genbank")
    {
        DNAsequence::from_genbank_file(path)
    } else {
        DNAsequence::from_fasta_file(path)
    }
    .map_err(|e| format!("Could not read sequence file '{path}': {e}"))?;
    sequences
        .into_iter()
        .next()
        .ok_or_else(|| format!("No sequence records in '{path}'"))
}

struct DesignArgs {
    vector: String,
    wild_type: Option<String>,
    gene_start: usize,
    windows: String,
    config: DesignConfig,
    out_table: String,
    out_fasta: String,
}

fn parse_design_args(args: &[String]) -> Result<DesignArgs, String> {
    let mut vector = None;
    let mut wild_type = None;
    let mut gene_start = 0usize;
    let mut windows = None;
    let mut config = DesignConfig::default();
    let mut out_table = DEFAULT_TABLE_PATH.to_string();
    let mut out_fasta = DEFAULT_FASTA_PATH.to_string();

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let mut value = || {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("Missing value for {flag}"))
        };
        match flag.as_str() {
            "--vector" => vector = Some(value()?),
            "--wt" => wild_type = Some(value()?),
            "--gene-start" => {
                let raw = value()?;
                gene_start = raw
                    .parse()
                    .map_err(|e| format!("Invalid --gene-start '{raw}': {e}"))?;
            }
            "--windows" => windows = Some(value()?),
            "--config" => {
                let json = load_json_arg(&value()?)?;
                config = serde_json::from_str(&json)
                    .map_err(|e| format!("Invalid configuration JSON: {e}"))?;
            }
            "--out-table" => out_table = value()?,
            "--out-fasta" => out_fasta = value()?,
            other => return Err(format!("Unknown option '{other}'")),
        }
    }

    Ok(DesignArgs {
        vector: vector.ok_or("design requires --vector")?,
        wild_type,
        gene_start,
        windows: windows.ok_or("design requires --windows")?,
        config,
        out_table,
        out_fasta,
    })
}

fn design(args: DesignArgs) -> Result<(), String> {
    let vector = load_sequence(&args.vector)?;
    let wild_type = match &args.wild_type {
        Some(path) => load_sequence(path)?,
        None => vector.clone(),
    };
    let context = SequenceContext::new(vector, wild_type, args.gene_start)
        .map_err(|e| e.to_string())?;
    let windows = load_windows(&args.windows).map_err(|e| e.to_string())?;

    let mut run = DesignRun::new(context, args.config).map_err(|e| e.to_string())?;
    run.process(&windows).map_err(|e| e.to_string())?;

    for report in run.reports() {
        match &report.error {
            Some(error) => eprintln!("Window '{}' failed: {error}", report.name),
            None => {
                println!(
                    "{}\t{} oligos\tsub-window {}..{}\tforward {}\treverse {}",
                    report.name,
                    report.oligo_count,
                    report.start_index,
                    report.primer_start,
                    report.forward_primer,
                    report.reverse_primer
                );
                if report.primer_end_past_window {
                    eprintln!(
                        "Warning: window '{}': oligo budget reaches past the window end; \
                         set clamp_primer_end to confine it",
                        report.name
                    );
                }
            }
        }
    }

    run.accumulator()
        .write_csv(&args.out_table)
        .map_err(|e| format!("Could not write '{}': {e}", args.out_table))?;
    run.accumulator()
        .write_fasta(&args.out_fasta)
        .map_err(|e| format!("Could not write '{}': {e}", args.out_fasta))?;
    println!(
        "Wrote {} oligos to '{}' and '{}'",
        run.accumulator().records().len(),
        args.out_table,
        args.out_fasta
    );
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("satmut {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }

    match args[1].as_str() {
        "config-template" => {
            let text = serde_json::to_string_pretty(&DesignConfig::default())
                .map_err(|e| format!("Could not serialize configuration: {e}"))?;
            println!("{text}");
            Ok(())
        }
        "design" => {
            let parsed = parse_design_args(&args[2..])?;
            design(parsed)
        }
        other => {
            usage();
            Err(format!("Unknown command '{other}'"))
        }
    }
}
