use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use dna_processing::align;
use dna_processing::index::{IndexMeta, KmerIndex};
use dna_processing::io::fasta::FastaReader;
use dna_processing::seq::{self, Alphabet, Sequence};
use dna_processing::store;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "dna-processing", author, version, about = "K-mer based DNA sequence processing toolkit", arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract selected chromosomes from a FASTA file into a packed store
    Encode {
        /// Input FASTA file
        fasta: String,
        /// Output directory for chromosomes.dat / chromosomes.idx
        #[arg(short, long, default_value = ".")]
        out_dir: String,
        /// Chromosome names to keep (repeatable)
        #[arg(short, long = "chrom", required = true)]
        chromosomes: Vec<String>,
    },
    /// Build a k-mer occurrence index from reference sequences (FASTA)
    Index {
        /// Reference FASTA file
        reference: String,
        /// K-mer width (1..=32)
        #[arg(short = 'k', long = "kmer", default_value_t = 21)]
        k: usize,
        /// Output prefix for the index file
        #[arg(short, long, default_value = "ref")]
        output: String,
    },
    /// Find approximate matches of query sequences against an index
    Match {
        /// Path to k-mer index (.kdx)
        #[arg(short = 'i', long = "index")]
        index: String,
        /// Query FASTA file
        queries: String,
        /// Maximum edit distance (must be < k)
        #[arg(short = 'e', long = "max-edits", default_value_t = 2)]
        max_edits: u32,
        /// Output TSV path (stdout if omitted)
        #[arg(short, long)]
        out: Option<String>,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
    },
    /// Apply point mutations to a stored chromosome and write the result
    Mutate {
        /// Store directory (from `encode`)
        #[arg(short, long)]
        store: String,
        /// Chromosome name
        chromosome: String,
        /// Mutations as POS:BASE (0-based, repeatable), e.g. 0:G 5:A
        #[arg(required = true)]
        mutations: Vec<String>,
        /// Output path (60-column wrapped sequence)
        #[arg(short, long)]
        out: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Encode {
            fasta,
            out_dir,
            chromosomes,
        } => run_encode(&fasta, &out_dir, &chromosomes),
        Commands::Index {
            reference,
            k,
            output,
        } => run_index(&reference, k, &output),
        Commands::Match {
            index,
            queries,
            max_edits,
            out,
            threads,
        } => run_match(&index, &queries, max_edits, out.as_deref(), threads),
        Commands::Mutate {
            store,
            chromosome,
            mutations,
            out,
        } => run_mutate(&store, &chromosome, &mutations, &out),
    }
}

fn run_encode(fasta: &str, out_dir: &str, chromosomes: &[String]) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create output directory '{}'", out_dir))?;
    let index = store::encode_store(Path::new(fasta), Path::new(out_dir), chromosomes)?;

    for name in chromosomes {
        match index.get(name) {
            Some((offset, len)) => println!("{}\toffset={}\tlen={}", name, offset, len),
            None => eprintln!("warning: chromosome '{}' not found in '{}'", name, fasta),
        }
    }
    println!("store written: {}/{{{},{}}}", out_dir, store::DATA_FILE, store::INDEX_FILE);
    Ok(())
}

fn read_sequences(path: &str) -> Result<Vec<Sequence>> {
    let fh = std::fs::File::open(path)
        .with_context(|| format!("cannot open FASTA file '{}'", path))?;
    let mut reader = FastaReader::new(std::io::BufReader::new(fh));

    let mut seqs = Vec::new();
    while let Some(rec) = reader.next_record()? {
        let s = seq::encode(&rec.id, &rec.seq, Alphabet::DnaN)
            .with_context(|| format!("record '{}' in '{}'", rec.id, path))?;
        seqs.push(s);
    }
    Ok(seqs)
}

fn run_index(reference: &str, k: usize, output: &str) -> Result<()> {
    let seqs = read_sequences(reference)?;
    if seqs.is_empty() {
        bail!("FASTA file '{}' contains no sequences", reference);
    }
    let total_len: usize = seqs.iter().map(Sequence::len).sum();
    if total_len == 0 {
        bail!("FASTA file '{}' contains only empty sequences", reference);
    }

    println!("reference: {}", reference);
    println!("sequences: {}", seqs.len());
    println!("total_len: {}", total_len);

    let mut index = KmerIndex::build(seqs, k)?;
    index.set_meta(IndexMeta {
        reference_file: Some(reference.to_string()),
        build_args: Some(std::env::args().collect::<Vec<_>>().join(" ")),
        build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
    });
    println!("k: {}", index.k);
    println!("distinct_kmers: {}", index.distinct_kmers());
    println!("total_hits: {}", index.total_hits());

    let out_path = format!("{}.kdx", output);
    index
        .save_to_file(&out_path)
        .with_context(|| format!("cannot write index to '{}'", out_path))?;
    println!("k-mer index saved: {}", out_path);
    Ok(())
}

fn run_match(
    index_path: &str,
    queries_path: &str,
    max_edits: u32,
    out_path: Option<&str>,
    threads: usize,
) -> Result<()> {
    let index = KmerIndex::load_from_file(index_path)?;
    let queries = read_sequences(queries_path)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("cannot build thread pool")?;
    let results = pool.install(|| align::find_matches_batch(&queries, &index, max_edits))?;

    let mut out: Box<dyn Write> = if let Some(p) = out_path {
        Box::new(std::io::BufWriter::new(std::fs::File::create(p)?))
    } else {
        Box::new(std::io::BufWriter::new(std::io::stdout()))
    };

    writeln!(out, "#query\tref\tstrand\tref_start\tlen\tedits\tcigar")?;
    for (query, matches) in queries.iter().zip(&results) {
        for m in matches {
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                query.id,
                index.seq_name(m.seq),
                if m.is_rev { '-' } else { '+' },
                m.ref_start,
                m.len,
                m.edits,
                m.cigar,
            )?;
        }
    }
    out.flush()?;
    Ok(())
}

/// 解析 `POS:BASE` 形式的突变描述。
fn parse_mutation(spec: &str) -> Result<(usize, u8)> {
    let (pos, base) = match spec.split_once(':') {
        Some(parts) => parts,
        None => bail!("invalid mutation '{}', expected POS:BASE", spec),
    };
    let pos: usize = pos
        .parse()
        .with_context(|| format!("invalid mutation position in '{}'", spec))?;
    if base.len() != 1 {
        bail!("invalid mutation base in '{}', expected a single symbol", spec);
    }
    Ok((pos, base.as_bytes()[0]))
}

fn run_mutate(store_dir: &str, chromosome: &str, mutations: &[String], out: &str) -> Result<()> {
    let parsed: Vec<(usize, u8)> = mutations
        .iter()
        .map(|s| parse_mutation(s))
        .collect::<Result<_>>()?;

    let applied = store::mutate(
        Path::new(store_dir),
        chromosome,
        &parsed,
        Path::new(out),
    )?;
    println!("{}: {} of {} mutations applied -> {}", chromosome, applied, parsed.len(), out);
    Ok(())
}
