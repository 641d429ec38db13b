use materiality::{Session, SessionSettings};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Default seeded session with a fixed RNG seed
pub fn seeded_session(seed: u64) -> Session {
    init_logging();
    let mut rng = StdRng::seed_from_u64(seed);
    Session::seeded(&mut rng, SessionSettings::default())
}

/// CSV text without the byte-order mark
pub fn csv_text(bytes: &[u8]) -> String {
    let body = bytes
        .strip_prefix(materiality::export::UTF8_BOM)
        .expect("CSV should start with a BOM");
    String::from_utf8(body.to_vec()).expect("CSV should be UTF-8")
}
