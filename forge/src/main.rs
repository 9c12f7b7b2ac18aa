use std::process::ExitCode;

use rand::Rng;
use sha1ext::{extend, forge_with_oracle, padding, sign, verify, Sha1};
use tracing_subscriber::EnvFilter;

const SECRET_KEY: &[u8] = b"my secret key";
const MESSAGE: &[u8] = b"a=1&b=2";
const SUFFIX: &[u8] = b"&b=5";

/// Secret lengths tried when the key length is unknown.
const MAX_SECRET_LEN: usize = 64;

fn init_tracing() {
    // RUST_LOG first, then FORGE_LOG, then info
    let env_filter = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var("FORGE_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    let filter = EnvFilter::try_new(env_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .init();
}

/// Forges with the exact secret length, then replays the hash step by step.
fn known_length() -> bool {
    let digest = sign(SECRET_KEY, MESSAGE);
    let total = (SECRET_KEY.len() + MESSAGE.len()) as u64;

    let (forged, forged_digest) = match extend(MESSAGE, &digest.to_string(), total, SUFFIX) {
        Ok(pair) => pair,
        Err(err) => {
            tracing::error!(%err, "could not parse our own digest");
            return false;
        }
    };

    let mut replay = Sha1::new();
    replay.update(SECRET_KEY);
    tracing::debug!(processed = replay.processed(), pending = replay.pending(), "after key");
    replay.update(MESSAGE);
    tracing::debug!(processed = replay.processed(), pending = replay.pending(), "after message");
    replay.update(padding(total));
    tracing::debug!(processed = replay.processed(), pending = replay.pending(), "after glue padding");
    replay.update(SUFFIX);
    let replayed = replay.finalize();
    tracing::debug!(%replayed, "direct hash of secret || forged message");

    let valid = verify(SECRET_KEY, &forged, &forged_digest);
    tracing::info!(
        original = %digest,
        forged = %forged_digest,
        forged_message = %forged.escape_ascii(),
        valid,
        "length extension with known secret length"
    );
    valid && replayed == forged_digest
}

/// Forges against a random secret by asking a verifier for each length guess.
fn unknown_length() -> bool {
    let mut rng = rand::thread_rng();
    let secret_len = rng.gen_range(1..=MAX_SECRET_LEN);
    let secret: Vec<u8> = (0..secret_len).map(|_| rng.gen()).collect();

    let digest = sign(&secret, MESSAGE);
    let mut queries = 0usize;

    let forgery = forge_with_oracle(MESSAGE, &digest, SUFFIX, 0..=MAX_SECRET_LEN, |msg, tag| {
        queries += 1;
        verify(&secret, msg, tag)
    });

    match forgery {
        Some(forgery) => {
            tracing::info!(
                guessed = forgery.secret_len,
                actual = secret_len,
                queries,
                forged = %forgery.digest,
                "length extension with unknown secret length"
            );
            forgery.secret_len == secret_len
        }
        None => {
            tracing::error!(actual = secret_len, queries, "no secret length produced a valid forgery");
            false
        }
    }
}

fn main() -> ExitCode {
    init_tracing();

    if known_length() && unknown_length() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
