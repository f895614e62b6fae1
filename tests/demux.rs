mod common;

use std::fs;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tempfile::tempdir;

use common::{chunk, fragment_reads, run_config, run_config_with, write_fastq, write_fastq_gz, CHUNK_CHARS};
use oligo_pipelines::codec::{Codec, CodonCodec};
use oligo_pipelines::config::defs::{PipelineError, UNIVERSAL_A};
use oligo_pipelines::pipelines::{chunk as chunk_job, demux};
use oligo_pipelines::utils::fastx::read_sequences;
use oligo_pipelines::utils::sequence::{mutate, oligo_tag, DNA};

fn hello_reads(copies: usize) -> Result<Vec<String>> {
    let message = CodonCodec::new().text_to_dna("hello")?;
    let read = format!("{}{}{}", UNIVERSAL_A, oligo_tag(1, 0)?, message);
    Ok(vec![read; copies])
}

fn padded(text: &str) -> String {
    format!("{:<width$}", text, width = CHUNK_CHARS)
}

#[tokio::test]
async fn test_hello_round_trip() -> Result<()> {
    let dir = tempdir()?;
    let mut rng = StdRng::seed_from_u64(1);
    write_fastq(&dir.path().join("hello.fastq"), &hello_reads(150)?, &mut rng)?;

    let out = dir.path().join("out");
    let stats = demux::run(run_config(dir.path(), "hello.fastq", &out)?).await?;

    assert_eq!(stats.reads_seen, 150);
    assert_eq!(stats.reads_accepted, 150);
    assert_eq!(stats.fragments_resolved, 1);
    assert_eq!(stats.fragments_discarded, 0);
    assert_eq!(stats.samples.len(), 1);

    let expected_dna = CodonCodec::new().text_to_dna("hello")?;
    assert_eq!(fs::read_to_string(out.join("01_condensed.txt"))?, format!("{}\n", expected_dna));
    assert_eq!(fs::read_to_string(out.join("01_translated.txt"))?, "hello\n");
    Ok(())
}

#[tokio::test]
async fn test_gap_truncates_payload() -> Result<()> {
    let dir = tempdir()?;
    let mut rng = StdRng::seed_from_u64(2);
    let mut reads = Vec::new();
    reads.extend(fragment_reads(2, 0, "it was the best of", 120)?);
    reads.extend(fragment_reads(2, 1, "times, it was the", 120)?);
    reads.extend(fragment_reads(2, 3, "worst of times", 120)?);
    write_fastq(&dir.path().join("gap.fastq"), &reads, &mut rng)?;

    let out = dir.path().join("out");
    let stats = demux::run(run_config(dir.path(), "gap.fastq", &out)?).await?;
    assert_eq!(stats.fragments_resolved, 3);

    let condensed = fs::read_to_string(out.join("02_condensed.txt"))?;
    assert_eq!(condensed, format!("{}{}\n", chunk("it was the best of")?, chunk("times, it was the")?));
    let translated = fs::read_to_string(out.join("02_translated.txt"))?;
    assert_eq!(translated, format!("{}{}\n", padded("it was the best of"), padded("times, it was the")));
    Ok(())
}

#[tokio::test]
async fn test_tag_only_read_does_not_fill_gap() -> Result<()> {
    let dir = tempdir()?;
    let mut rng = StdRng::seed_from_u64(12);
    let mut reads = Vec::new();
    reads.extend(fragment_reads(2, 0, "it was the best of", 120)?);
    reads.extend(fragment_reads(2, 1, "times, it was the", 120)?);
    reads.extend(fragment_reads(2, 3, "worst of times", 120)?);
    reads.push(oligo_tag(2, 2)?);
    write_fastq(&dir.path().join("tag_only.fastq"), &reads, &mut rng)?;

    let out = dir.path().join("out");
    let stats = demux::run(run_config(dir.path(), "tag_only.fastq", &out)?).await?;
    assert_eq!((stats.fragments_resolved, stats.fragments_discarded), (3, 1));

    let condensed = fs::read_to_string(out.join("02_condensed.txt"))?;
    assert_eq!(condensed, format!("{}{}\n", chunk("it was the best of")?, chunk("times, it was the")?));
    Ok(())
}

#[tokio::test]
async fn test_threshold_boundary() -> Result<()> {
    let dir = tempdir()?;
    let mut rng = StdRng::seed_from_u64(3);
    let mut reads = Vec::new();
    reads.extend(fragment_reads(3, 0, "exactly one hundred", 100)?);
    reads.extend(fragment_reads(3, 1, "one short", 99)?);
    write_fastq(&dir.path().join("boundary.fastq"), &reads, &mut rng)?;

    let out = dir.path().join("default");
    let stats = demux::run(run_config(dir.path(), "boundary.fastq", &out)?).await?;
    assert_eq!((stats.fragments_resolved, stats.fragments_discarded), (1, 1));
    assert_eq!(fs::read_to_string(out.join("03_translated.txt"))?, format!("{}\n", padded("exactly one hundred")));

    // Lowering the threshold lets the short fragment through
    let out = dir.path().join("lowered");
    let config = run_config_with(dir.path(), "boundary.fastq", &out, |args| args.count_threshold = 99)?;
    let stats = demux::run(config).await?;
    assert_eq!((stats.fragments_resolved, stats.fragments_discarded), (2, 0));
    assert_eq!(
        fs::read_to_string(out.join("03_translated.txt"))?,
        format!("{}{}\n", padded("exactly one hundred"), padded("one short"))
    );
    Ok(())
}

#[tokio::test]
async fn test_all_fragments_weak_writes_nothing() -> Result<()> {
    let dir = tempdir()?;
    let mut rng = StdRng::seed_from_u64(4);
    write_fastq(&dir.path().join("weak.fastq"), &fragment_reads(4, 0, "too few", 10)?, &mut rng)?;

    let out = dir.path().join("out");
    let stats = demux::run(run_config(dir.path(), "weak.fastq", &out)?).await?;
    assert_eq!(stats.fragments_discarded, 1);
    assert!(stats.samples.is_empty());
    assert_eq!(fs::read_dir(&out)?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_result_independent_of_read_order() -> Result<()> {
    let dir = tempdir()?;
    let mut rng = StdRng::seed_from_u64(5);
    let texts = ["we hold these truth", "s to be self-eviden", "t, that all men are"];

    let mut reads = Vec::new();
    for sample in [6, 7] {
        for (fragment, text) in texts.iter().enumerate() {
            for read in fragment_reads(sample, fragment as u32, text, 200)? {
                reads.push(mutate(&read, 0.01, &mut rng));
            }
        }
    }
    write_fastq(&dir.path().join("ordered.fastq"), &reads, &mut rng)?;
    reads.shuffle(&mut rng);
    write_fastq(&dir.path().join("shuffled.fastq"), &reads, &mut rng)?;

    let ordered_out = dir.path().join("ordered");
    let shuffled_out = dir.path().join("shuffled");
    let ordered = demux::run(run_config(dir.path(), "ordered.fastq", &ordered_out)?).await?;
    let shuffled = demux::run(run_config(dir.path(), "shuffled.fastq", &shuffled_out)?).await?;

    assert_eq!(ordered.reads_accepted, shuffled.reads_accepted);
    assert_eq!(ordered.fragments_resolved, shuffled.fragments_resolved);
    for sample in ["06", "07"] {
        for tag in ["condensed", "translated"] {
            let name = format!("{}_{}.txt", sample, tag);
            assert_eq!(fs::read_to_string(ordered_out.join(&name))?, fs::read_to_string(shuffled_out.join(&name))?);
        }
        assert_eq!(
            fs::read_to_string(ordered_out.join(format!("{}_translated.txt", sample)))?,
            format!("{}\n", texts.concat())
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_junk_reads_do_not_vote() -> Result<()> {
    let dir = tempdir()?;
    let mut rng = StdRng::seed_from_u64(6);

    let mut reads = hello_reads(120)?;
    for _ in 0..300 {
        reads.push(DNA::random_sequence(150, &mut rng));
    }
    reads.push("N".repeat(150));
    reads.push(hello_reads(1)?[0].replacen('C', "N", 1));
    reads.push(hello_reads(1)?[0].to_lowercase());
    // tag grammar with undecodable ID text
    reads.push(format!("TGTC{}TGAT{}", "AAAA".repeat(2), "AAAA".repeat(3)));
    // valid tag, unaligned frame
    reads.push(format!("{}ACG", hello_reads(1)?[0]));
    reads.shuffle(&mut rng);
    write_fastq(&dir.path().join("junk.fastq"), &reads, &mut rng)?;

    let out = dir.path().join("out");
    let stats = demux::run(run_config(dir.path(), "junk.fastq", &out)?).await?;
    assert_eq!(stats.reads_seen, reads.len() as u64);
    assert_eq!(stats.reads_accepted, 120);
    assert_eq!(stats.fragments_resolved, 1);
    assert_eq!(fs::read_to_string(out.join("01_translated.txt"))?, "hello\n");
    Ok(())
}

#[tokio::test]
async fn test_truncated_fastq_is_fatal() -> Result<()> {
    let dir = tempdir()?;
    let mut rng = StdRng::seed_from_u64(7);
    let path = dir.path().join("truncated.fastq");
    write_fastq(&path, &hello_reads(150)?, &mut rng)?;
    let mut content = fs::read_to_string(&path)?;
    content.push_str("@broken\nACGTACGT\n+\nIII\n");
    fs::write(&path, content)?;

    let out = dir.path().join("out");
    let result = demux::run(run_config(dir.path(), "truncated.fastq", &out)?).await;
    assert!(matches!(result, Err(PipelineError::InvalidFastqFormat(_))));
    assert_eq!(fs::read_dir(&out)?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_gzipped_input() -> Result<()> {
    let dir = tempdir()?;
    let mut rng = StdRng::seed_from_u64(8);
    write_fastq_gz(&dir.path().join("hello.fastq.gz"), &hello_reads(150)?, &mut rng)?;

    let out = dir.path().join("out");
    let stats = demux::run(run_config(dir.path(), "hello.fastq.gz", &out)?).await?;
    assert_eq!(stats.reads_accepted, 150);
    assert_eq!(fs::read_to_string(out.join("01_translated.txt"))?, "hello\n");
    Ok(())
}

#[tokio::test]
async fn test_max_reads_caps_input() -> Result<()> {
    let dir = tempdir()?;
    let mut rng = StdRng::seed_from_u64(9);
    write_fastq(&dir.path().join("hello.fastq"), &hello_reads(150)?, &mut rng)?;

    let out = dir.path().join("out");
    let config = run_config_with(dir.path(), "hello.fastq", &out, |args| args.max_reads = Some(99))?;
    let stats = demux::run(config).await?;
    assert_eq!(stats.reads_seen, 99);
    assert_eq!(stats.fragments_discarded, 1);
    assert!(stats.samples.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_invalid_parameters_rejected() -> Result<()> {
    let dir = tempdir()?;
    let mut rng = StdRng::seed_from_u64(10);
    write_fastq(&dir.path().join("hello.fastq"), &hello_reads(5)?, &mut rng)?;
    let out = dir.path().join("out");

    let config = run_config_with(dir.path(), "hello.fastq", &out, |args| args.count_threshold = 0)?;
    assert!(matches!(demux::run(config).await, Err(PipelineError::InvalidConfig(_))));

    let config = run_config_with(dir.path(), "hello.fastq", &out, |args| args.max_oligo_len = 30)?;
    assert!(matches!(demux::run(config).await, Err(PipelineError::InvalidConfig(_))));

    let config = run_config(dir.path(), "missing.fastq", &out)?;
    assert!(matches!(demux::run(config).await, Err(PipelineError::InvalidConfig(_))));
    Ok(())
}

#[tokio::test]
async fn test_cancelled_run_writes_nothing() -> Result<()> {
    let dir = tempdir()?;
    let mut rng = StdRng::seed_from_u64(11);
    write_fastq(&dir.path().join("hello.fastq"), &hello_reads(150)?, &mut rng)?;

    let out = dir.path().join("out");
    let config = run_config(dir.path(), "hello.fastq", &out)?;
    config.cancel.cancel();
    assert!(matches!(demux::run(config).await, Err(PipelineError::Cancelled(_))));
    assert_eq!(fs::read_dir(&out)?.count(), 0);
    Ok(())
}


#[tokio::test]
async fn test_chunked_payloads_demux_back() -> Result<()> {
    let dir = tempdir()?;
    let mut rng = StdRng::seed_from_u64(11);
    let texts = ["thirty characters of payload!!", "second payload"];
    let mut codec = CodonCodec::new();
    let mut fasta = String::new();
    for (i, text) in texts.iter().enumerate() {
        fasta.push_str(&format!(">doc{}\n{}\n", i, codec.text_to_dna(text)?));
    }
    fs::write(dir.path().join("payload.fa"), fasta)?;

    let chunked = chunk_job::run(run_config(dir.path(), "payload.fa", dir.path())?).await?;
    assert_eq!((chunked.records, chunked.oligos), (2, 3));

    let mut rx = read_sequences(chunked.output, None, 16)?;
    let mut reads = Vec::new();
    while let Some(record) = rx.recv().await {
        let oligo = String::from_utf8(record?.seq().to_vec())?;
        reads.extend(std::iter::repeat_n(oligo, 120));
    }
    reads.shuffle(&mut rng);
    write_fastq(&dir.path().join("pool.fq"), &reads, &mut rng)?;

    let out = dir.path().join("out");
    let stats = demux::run(run_config(dir.path(), "pool.fq", &out)?).await?;
    assert_eq!((stats.fragments_resolved, stats.fragments_discarded), (3, 0));
    assert_eq!(
        fs::read_to_string(out.join("00_translated.txt"))?,
        format!("{}{}\n", texts[0], "'".repeat(8))
    );
    assert_eq!(
        fs::read_to_string(out.join("01_translated.txt"))?,
        format!("{}{}\n", texts[1], "'".repeat(5))
    );
    Ok(())
}
