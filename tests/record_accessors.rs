use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::TempDir;

use recfile::corpus::{self, DEFAULT_CORPUS_SEED};
use recfile::{
    MappedReader, MappedWriter, PageResidency, PositionalReader, PositionalWriter, RecfileError,
    RecordGeometry, RecordReader, RecordWriter,
};

const RECORD_SIZE: usize = 100;
const RECORD_COUNT: u64 = 10_000;

/// Indices spread across the file, including both ends
const SAMPLE_INDICES: [u64; 7] = [0, 1, 100, 1000, 5000, 9998, 9999];

fn geometry() -> RecordGeometry {
    RecordGeometry::new(RECORD_SIZE, RECORD_COUNT).expect("valid geometry")
}

/// A corpus in its own directory, plus helpers to clone it
struct Corpus {
    dir: TempDir,
    geometry: RecordGeometry,
}

impl Corpus {
    fn new(geometry: RecordGeometry) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        corpus::generate_corpus(&dir.path().join("data.bin"), &geometry, DEFAULT_CORPUS_SEED)
            .expect("generate corpus");
        Self { dir, geometry }
    }

    fn path(&self) -> std::path::PathBuf {
        self.dir.path().join("data.bin")
    }

    fn copy(&self, name: &str) -> std::path::PathBuf {
        let target = self.dir.path().join(name);
        std::fs::copy(self.path(), &target).expect("copy corpus");
        target
    }
}

fn expect_out_of_range<T: std::fmt::Debug>(result: recfile::Result<T>, index: u64) {
    match result {
        Err(RecfileError::IndexOutOfRange {
            index: reported,
            record_count,
        }) => {
            assert_eq!(reported, index);
            assert_eq!(record_count, RECORD_COUNT);
        }
        other => panic!("expected IndexOutOfRange for {}, got {:?}", index, other),
    }
}

#[test]
fn readers_return_identical_records() {
    let corpus = Corpus::new(geometry());
    let positional = PositionalReader::open(corpus.path(), corpus.geometry).unwrap();
    let mapped = MappedReader::open(corpus.path(), corpus.geometry).unwrap();
    let mut buf = vec![0u8; RECORD_SIZE];

    for index in 0..RECORD_COUNT {
        let via_syscall = positional.read_record(index, &mut buf).unwrap();
        let via_mapping = mapped.read_record(index, &mut []).unwrap();
        assert_eq!(via_syscall.len(), RECORD_SIZE);
        assert_eq!(via_syscall, via_mapping, "record {} differs", index);
    }

    positional.close().unwrap();
    mapped.close().unwrap();
}

#[test]
fn readers_match_raw_file_layout() {
    let corpus = Corpus::new(geometry());
    let raw = std::fs::read(corpus.path()).unwrap();
    let mapped = MappedReader::open(corpus.path(), corpus.geometry).unwrap();

    for index in SAMPLE_INDICES {
        let start = index as usize * RECORD_SIZE;
        assert_eq!(
            mapped.read_record(index, &mut []).unwrap(),
            &raw[start..start + RECORD_SIZE]
        );
    }
}

#[test]
fn writers_produce_identical_files() {
    let corpus = Corpus::new(geometry());
    let first = corpus.copy("positional.bin");
    let second = corpus.copy("mapped.bin");

    let mut positional = PositionalWriter::open(&first, corpus.geometry).unwrap();
    let mut mapped = MappedWriter::open(&second, corpus.geometry).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(98765);

    for index in SAMPLE_INDICES {
        let payload = corpus::random_payload(&mut rng, &corpus.geometry);
        positional.write_record(index, &payload).unwrap();
        mapped.write_record(index, &payload).unwrap();
    }

    RecordWriter::close(positional).unwrap();
    RecordWriter::close(mapped).unwrap();

    let first = PositionalReader::open(&first, corpus.geometry).unwrap();
    let second = PositionalReader::open(&second, corpus.geometry).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(98765);

    for index in SAMPLE_INDICES {
        let payload = corpus::random_payload(&mut rng, &corpus.geometry);
        assert_eq!(first.read_record_owned(index).unwrap(), payload);
        assert_eq!(second.read_record_owned(index).unwrap(), payload);
    }

    let untouched = 42;
    assert_eq!(
        first.read_record_owned(untouched).unwrap(),
        second.read_record_owned(untouched).unwrap()
    );
}

#[test]
fn boundary_indices_for_every_operation() {
    let corpus = Corpus::new(geometry());
    let writable = corpus.copy("writable.bin");
    let payload = vec![0x5Au8; RECORD_SIZE];
    let mut buf = vec![0u8; RECORD_SIZE];

    let positional_reader = PositionalReader::open(corpus.path(), corpus.geometry).unwrap();
    let mapped_reader = MappedReader::open(corpus.path(), corpus.geometry).unwrap();
    let mut positional_writer = PositionalWriter::open(&writable, corpus.geometry).unwrap();
    let mut mapped_writer = MappedWriter::open(&writable, corpus.geometry).unwrap();

    for index in [0, 1, RECORD_COUNT - 1] {
        assert!(positional_reader.read_record(index, &mut buf).is_ok());
        assert!(mapped_reader.read_record(index, &mut []).is_ok());
        assert!(positional_writer.write_record(index, &payload).is_ok());
        assert!(mapped_writer.write_record(index, &payload).is_ok());
    }

    for index in [RECORD_COUNT, u64::MAX] {
        expect_out_of_range(positional_reader.read_record(index, &mut buf), index);
        expect_out_of_range(mapped_reader.read_record(index, &mut []), index);
        expect_out_of_range(positional_writer.write_record(index, &payload), index);
        expect_out_of_range(mapped_writer.write_record(index, &payload), index);
    }
}

#[test]
fn fixed_size_enforcement() {
    let corpus = Corpus::new(geometry());
    let first = corpus.copy("positional.bin");
    let second = corpus.copy("mapped.bin");

    let mut positional = PositionalWriter::open(&first, corpus.geometry).unwrap();
    let mut mapped = MappedWriter::open(&second, corpus.geometry).unwrap();

    for len in [RECORD_SIZE - 1, RECORD_SIZE + 1] {
        let payload = vec![1u8; len];
        for result in [
            positional.write_record(7, &payload),
            mapped.write_record(7, &payload),
        ] {
            match result {
                Err(RecfileError::SizeMismatch { expected, actual }) => {
                    assert_eq!(expected, RECORD_SIZE);
                    assert_eq!(actual, len);
                }
                other => panic!("expected SizeMismatch, got {:?}", other),
            }
        }
    }

    // Only the positional reader needs caller storage
    let positional_reader = PositionalReader::open(corpus.path(), corpus.geometry).unwrap();
    let mapped_reader = MappedReader::open(corpus.path(), corpus.geometry).unwrap();
    let mut short = vec![0u8; RECORD_SIZE - 1];

    assert!(matches!(
        positional_reader.read_record(7, &mut short),
        Err(RecfileError::BufferTooSmall { .. })
    ));
    assert_eq!(
        mapped_reader.read_record(7, &mut short).unwrap().len(),
        RECORD_SIZE
    );

    // Rejected writes left the copies untouched
    RecordWriter::close(positional).unwrap();
    RecordWriter::close(mapped).unwrap();
    let original = std::fs::read(corpus.path()).unwrap();
    assert_eq!(std::fs::read(&first).unwrap(), original);
    assert_eq!(std::fs::read(&second).unwrap(), original);
}

#[test]
fn eviction_and_warming_keep_written_content() {
    let corpus = Corpus::new(geometry());
    let path = corpus.copy("residency.bin");
    let pattern: Vec<u8> = (0..RECORD_SIZE as u8).collect();
    let last = RECORD_COUNT - 1;

    let mut writer = MappedWriter::open(&path, corpus.geometry).unwrap();
    writer.write_record(last, &pattern).unwrap();
    writer.evict_pages().unwrap();
    writer.warm_pages();
    assert_eq!(writer.read_record(last, &mut []).unwrap(), &pattern[..]);
    RecordWriter::close(writer).unwrap();

    let reader = PositionalReader::open(&path, corpus.geometry).unwrap();
    assert_eq!(reader.read_record_owned(last).unwrap(), pattern);

    let original = PositionalReader::open(corpus.path(), corpus.geometry).unwrap();
    for index in [0, 1, 5000] {
        assert_eq!(
            reader.read_record_owned(index).unwrap(),
            original.read_record_owned(index).unwrap()
        );
    }
}

#[test]
fn short_file_reports_storage_errors() {
    let corpus = Corpus::new(geometry());
    let truncated = corpus.copy("truncated.bin");
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(&truncated)
        .unwrap();
    file.set_len(RECORD_SIZE as u64 * 10 + 40).unwrap();
    drop(file);

    let positional = PositionalReader::open(&truncated, corpus.geometry).unwrap();
    let mapped = MappedReader::open(&truncated, corpus.geometry).unwrap();
    let mut buf = vec![0u8; RECORD_SIZE];

    assert!(positional.read_record(9, &mut buf).is_ok());
    assert!(mapped.read_record(9, &mut []).is_ok());

    assert!(matches!(
        positional.read_record(10, &mut buf),
        Err(RecfileError::PartialTransfer { actual: 40, .. })
    ));
    assert!(matches!(
        mapped.read_record(10, &mut []),
        Err(RecfileError::BoundsExceeded {
            index: 10,
            mapping_len: 1040,
            ..
        })
    ));
}

/// Read the middle record through both readers, write the last record through
/// both writers, cycle residency on the mapped one, then read back positionally
fn run_scenario(geometry: RecordGeometry) {
    let corpus = Corpus::new(geometry);
    assert_eq!(
        std::fs::metadata(corpus.path()).unwrap().len(),
        geometry.file_size()
    );

    let middle = geometry.record_count() / 2;
    let last = geometry.record_count() - 1;

    let positional = PositionalReader::open(corpus.path(), geometry).unwrap();
    let mapped = MappedReader::open(corpus.path(), geometry).unwrap();
    let mut buf = vec![0u8; geometry.record_size()];
    assert_eq!(
        positional.read_record(middle, &mut buf).unwrap(),
        mapped.read_record(middle, &mut []).unwrap()
    );

    let pattern: Vec<u8> = (0..geometry.record_size())
        .map(|i| (geometry.record_size() - 1 - i) as u8)
        .collect();
    let first = corpus.copy("positional.bin");
    let second = corpus.copy("mapped.bin");

    let mut writer = PositionalWriter::open(&first, geometry).unwrap();
    writer.write_record(last, &pattern).unwrap();
    RecordWriter::close(writer).unwrap();

    let mut writer = MappedWriter::open(&second, geometry).unwrap();
    writer.write_record(last, &pattern).unwrap();
    writer.evict_pages().unwrap();
    writer.warm_pages();
    RecordWriter::close(writer).unwrap();

    let untouched = PositionalReader::open(corpus.path(), geometry).unwrap();
    for path in [&first, &second] {
        let reader = PositionalReader::open(path, geometry).unwrap();
        assert_eq!(reader.read_record_owned(last).unwrap(), pattern);
        assert_eq!(
            reader.read_record_owned(middle).unwrap(),
            untouched.read_record_owned(middle).unwrap()
        );
    }
}

#[test]
fn scaled_down_scenario() {
    // Index 5000 of 10,000 and the last record mirror 500,000 and 999,999
    run_scenario(geometry());
}

/// Full-size scenario: 1,000,000 records of 100 bytes
#[test]
#[ignore = "provisions three 100 MB files"]
fn default_geometry_scenario() {
    assert_eq!(RecordGeometry::DEFAULT.file_size(), 100_000_000);
    run_scenario(RecordGeometry::DEFAULT);
}
