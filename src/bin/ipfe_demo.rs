//! Minimal CLI demo: runs Setup → Initialize → KeyGen → KeyDerive → Enc → Dec
//! end to end and prints the recovered inner product.
//!
//! This binary is a test harness, not part of the library's public surface
//! (no network, no config files). Flags mirror the reference tool's own
//! command-line parameters one for one.

#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;

use ipfe::{decrypt, encrypt, initialize, key_derive, key_gen, setup, PublicParams};

fn parse_flag(args: &[String], key: &str) -> Option<String> {
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == key {
            return it.next().cloned();
        }
    }
    None
}

fn parse_csv_u64(s: &str) -> Vec<u64> {
    s.split(',')
        .filter(|t| !t.is_empty())
        .map(|t| t.trim().parse().expect("vector components must be u64"))
        .collect()
}

fn scalars_from_u64s(vals: &[u64]) -> Vec<ipfe::Scalar> {
    vals.iter().map(|&v| ipfe::group::scalar_from_u64(v)).collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "ipfe_demo=info,ipfe=info".into()))
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();

    let msg_len: u32 = parse_flag(&args, "--msg-len").and_then(|s| s.parse().ok()).unwrap_or(4);
    let dimension_len: u32 = parse_flag(&args, "--dim-len").and_then(|s| s.parse().ok()).unwrap_or(1);
    let dlog_len: u32 = parse_flag(&args, "--dlog-len").and_then(|s| s.parse().ok()).unwrap_or(16);
    let tuning: u32 = parse_flag(&args, "--tuning").and_then(|s| s.parse().ok()).unwrap_or(0);
    let thread_count: usize = parse_flag(&args, "--threads").and_then(|s| s.parse().ok()).unwrap_or(4);
    let table_dir: PathBuf = parse_flag(&args, "--table-dir").map(PathBuf::from).unwrap_or_else(|| env::current_dir().unwrap());

    let pp: PublicParams = setup(msg_len, dimension_len, dlog_len, tuning, thread_count)?;
    tracing::info!(dimension = pp.dimension, dlog_len, tuning, "IPFE Setup: generated public parameters");

    let table = initialize(&pp, &table_dir)?;
    tracing::info!(entries = table.len(), "IPFE Initialize: DLOG table ready");

    let (mpk, msk) = key_gen(&pp);
    tracing::info!("IPFE KeyGen: generated (mpk, msk)");

    let x: Vec<u64> = parse_flag(&args, "--x")
        .map(|s| parse_csv_u64(&s))
        .unwrap_or_else(|| vec![3, 5]);
    let y: Vec<u64> = parse_flag(&args, "--y")
        .map(|s| parse_csv_u64(&s))
        .unwrap_or_else(|| vec![2, 7]);

    if x.len() != pp.dimension || y.len() != pp.dimension {
        eprintln!(
            "--x and --y must each supply exactly {} comma-separated values (got {} and {})",
            pp.dimension,
            x.len(),
            y.len()
        );
        std::process::exit(1);
    }

    let fsk = key_derive(&pp, &msk, &scalars_from_u64s(&y))?;
    tracing::info!("IPFE KeyDerive: derived fsk from msk");

    let ct = encrypt(&pp, &mpk, &scalars_from_u64s(&x))?;
    tracing::info!("IPFE Enc: encryption finished");

    let result = decrypt(&pp, &fsk, &ct, &table)?;
    tracing::info!(result, "IPFE Dec: decryption finished");

    println!("<x, y> = {result}");
    Ok(())
}
