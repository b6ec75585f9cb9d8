//! recfile - Fixed-Size Record File Tool
//!
//! Provisions record corpora and reads, verifies or conditions them through either
//! access strategy.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use log::info;
use recfile::corpus::{self, DEFAULT_CORPUS_SEED, DEFAULT_INDEX_SEED};
use recfile::{
    AccessStrategy, MappedWriter, PageResidency, RecordFileFactory, RecordGeometry, RecordReader,
};
use std::path::PathBuf;

fn cli() -> Command {
    let path_arg = Arg::new("path")
        .help("Path to the record file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .index(1);

    Command::new("recfile")
        .version(recfile::VERSION)
        .about("Fixed-size record access via positional I/O or memory mapping")
        .subcommand_required(true)
        .arg(
            Arg::new("record-size")
                .long("record-size")
                .global(true)
                .value_parser(value_parser!(usize))
                .help("Bytes per record (default 100)"),
        )
        .arg(
            Arg::new("record-count")
                .long("record-count")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Records per file (default 1000000)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file (requires the `config` feature)"),
        )
        .subcommand(
            Command::new("generate")
                .about("Write a deterministic pseudo-random corpus")
                .arg(path_arg.clone())
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Corpus seed (default 12345)"),
                ),
        )
        .subcommand(
            Command::new("read")
                .about("Print one record as hex")
                .arg(path_arg.clone())
                .arg(
                    Arg::new("index")
                        .required(true)
                        .value_parser(value_parser!(u64))
                        .index(2),
                )
                .arg(
                    Arg::new("strategy")
                        .long("strategy")
                        .help("positional or mmap"),
                ),
        )
        .subcommand(
            Command::new("verify")
                .about("Check that both strategies return identical records")
                .arg(path_arg.clone())
                .arg(
                    Arg::new("samples")
                        .long("samples")
                        .value_parser(value_parser!(usize))
                        .help("Number of random indices to compare (default 1000)"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Index sequence seed (default 42)"),
                ),
        )
        .subcommand(
            Command::new("warm")
                .about("Fault every page of a writable mapping into memory")
                .arg(path_arg),
        )
}

/// Geometry and default strategy from configuration, overridden by flags
fn settings(matches: &ArgMatches) -> Result<(RecordGeometry, AccessStrategy)> {
    #[cfg(feature = "config")]
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => recfile::config::RecfileConfig::load(path)?,
        None => recfile::config::RecfileConfig::load_default()?,
    };

    #[cfg(not(feature = "config"))]
    if matches.get_one::<PathBuf>("config").is_some() {
        anyhow::bail!("--config requires recfile to be built with the `config` feature");
    }

    #[cfg(feature = "config")]
    let (mut record_size, mut record_count, strategy) =
        (config.record_size, config.record_count, config.strategy()?);

    #[cfg(not(feature = "config"))]
    let (mut record_size, mut record_count, strategy) = (
        recfile::record_file::RECORD_SIZE,
        recfile::record_file::RECORD_COUNT,
        AccessStrategy::Positional,
    );

    if let Some(&size) = matches.get_one::<usize>("record-size") {
        record_size = size;
    }
    if let Some(&count) = matches.get_one::<u64>("record-count") {
        record_count = count;
    }

    let geometry = RecordGeometry::new(record_size, record_count)?;
    Ok((geometry, strategy))
}

fn path_of(matches: &ArgMatches) -> Result<&PathBuf> {
    matches
        .get_one::<PathBuf>("path")
        .context("path argument is required")
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn main() -> Result<()> {
    // Initialize logging, controlled by RUST_LOG
    env_logger::init();

    let matches = cli().get_matches();
    let (geometry, default_strategy) = settings(&matches)?;

    match matches.subcommand() {
        Some(("generate", sub)) => {
            let path = path_of(sub)?;
            let seed = sub.get_one::<u64>("seed").copied().unwrap_or(DEFAULT_CORPUS_SEED);

            corpus::generate_corpus(path, &geometry, seed)
                .with_context(|| format!("generating corpus at {}", path.display()))?;
            info!("wrote {} bytes to {}", geometry.file_size(), path.display());
        }
        Some(("read", sub)) => {
            let path = path_of(sub)?;
            let index = *sub.get_one::<u64>("index").context("index argument is required")?;
            let strategy = match sub.get_one::<String>("strategy") {
                Some(name) => name.parse()?,
                None => default_strategy,
            };

            let reader = RecordFileFactory::open_reader(path, strategy, geometry)?;
            let mut buf = vec![0u8; geometry.record_size()];
            let record = reader
                .read_record(index, &mut buf)
                .with_context(|| format!("reading record {} via {}", index, strategy))?;
            println!("{}", hex(record));
            reader.close()?;
        }
        Some(("verify", sub)) => {
            let path = path_of(sub)?;
            let samples = sub.get_one::<usize>("samples").copied().unwrap_or(1000);
            let seed = sub.get_one::<u64>("seed").copied().unwrap_or(DEFAULT_INDEX_SEED);

            let positional =
                RecordFileFactory::open_reader(path, AccessStrategy::Positional, geometry)?;
            let mapped =
                RecordFileFactory::open_reader(path, AccessStrategy::MemoryMapped, geometry)?;

            let mut indices = corpus::random_indices(seed, samples, &geometry);
            if geometry.record_count() > 0 {
                indices.extend([0, geometry.record_count() - 1]);
            }

            let mut buf = vec![0u8; geometry.record_size()];
            let mut mismatches = 0usize;
            for &index in &indices {
                let expected = positional.read_record(index, &mut buf)?;
                let actual = mapped.read_record(index, &mut [])?;
                if expected != actual {
                    mismatches += 1;
                    eprintln!("record {} differs between strategies", index);
                }
            }

            positional.close()?;
            mapped.close()?;

            if mismatches > 0 {
                anyhow::bail!("{} of {} records differ", mismatches, indices.len());
            }
            println!("{} records identical across strategies", indices.len());
        }
        Some(("warm", sub)) => {
            let path = path_of(sub)?;
            let writer = MappedWriter::open(path, geometry)?;
            writer.warm_pages();
            info!("warmed {} bytes of {}", writer.mapping_len(), path.display());
        }
        _ => anyhow::bail!("no command given, see --help"),
    }

    Ok(())
}
