use rand::rngs::StdRng;
use rand::Rng;
use trail_core::{Category, HistoryRecord};

/// How many trailing records a journey summary looks at.
const RECENT_WINDOW: usize = 5;

const CONNECTORS: [&str; 5] = [
    "explored",
    "discovered",
    "ventured into",
    "journeyed through",
    "navigated",
];

/// Narrate the most recent stretch of the journey. Returns `None` when
/// the window holds fewer than two distinct domains; a story needs a
/// departure and an arrival.
pub fn journey_summary(records: &[HistoryRecord], rng: &mut StdRng) -> Option<String> {
    let start = records.len().saturating_sub(RECENT_WINDOW);
    let mut domains: Vec<String> = Vec::new();
    for rec in &records[start..] {
        let key = rec.domain_key();
        if key.is_empty() || domains.contains(&key) {
            continue;
        }
        domains.push(key);
    }
    if domains.len() < 2 {
        return None;
    }
    let connector = CONNECTORS[rng.gen_range(0..CONNECTORS.len())];
    Some(format!(
        "You {connector} from {} to {}",
        domains[0],
        domains[domains.len() - 1]
    ))
}

/// One-line caption for a surprising category jump.
pub fn wormhole_text(from: Category, to: Category) -> String {
    format!(
        "Wormhole detected: a sudden jump from {} to {}",
        from.label(),
        to.label()
    )
}
