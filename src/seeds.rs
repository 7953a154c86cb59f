//! Seed usefulness statistics from a fuzzing session log.
//!
//! The fuzzer imports seed files into its workdir under fresh `seed_N`
//! names and prints, per import, whether the payload produced new coverage,
//! nothing new, or failed validation. The seed name appears on the line
//! preceding the verdict line, and the original payload name can be
//! recovered from the `copying <payload> -> <seed>` lines.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

static PAYLOAD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"payload_[0-9a-zA-Z_-]+").unwrap());
static SEED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"seed_[0-9]+").unwrap());
static COPY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^copying .* -> seed_[0-9]+").unwrap());
static USEFUL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Received new input .*:").unwrap());
static USELESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Worker-[0-9]+ Imported payload produced no new coverage, skipping\.\.").unwrap()
});
static INVALID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Worker-[0-9]+ (Input validation failed! Target funky\?\.\.|Guest ABORT:.+)")
        .unwrap()
});

/// What the fuzzer made of an imported seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SeedVerdict {
    /// New coverage was reached
    Useful,
    /// No new paths were discovered
    Useless,
    /// Validation failure or guest abort while loading the seed
    Invalid,
}

impl fmt::Display for SeedVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SeedVerdict::Useful => "useful",
            SeedVerdict::Useless => "useless",
            SeedVerdict::Invalid => "invalid",
        };
        write!(f, "{s}")
    }
}

impl SeedVerdict {
    pub const ALL: [SeedVerdict; 3] =
        [SeedVerdict::Useful, SeedVerdict::Useless, SeedVerdict::Invalid];

    fn pattern(self) -> &'static Regex {
        match self {
            SeedVerdict::Useful => &USEFUL_RE,
            SeedVerdict::Useless => &USELESS_RE,
            SeedVerdict::Invalid => &INVALID_RE,
        }
    }
}

/// Parsed per-session seed statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedStats {
    /// seed name -> original payload name
    pub payloads: BTreeMap<String, String>,
    /// verdict -> seed names, in log order
    pub verdicts: BTreeMap<SeedVerdict, Vec<String>>,
}

impl SeedStats {
    /// Seeds that got the given verdict, in log order.
    pub fn seeds(&self, verdict: SeedVerdict) -> &[String] {
        self.verdicts.get(&verdict).map_or(&[], Vec::as_slice)
    }
}

fn seed_from_line(line: &str) -> Option<String> {
    SEED_RE.find(line).map(|m| m.as_str().to_string())
}

/// Parse a fuzzer log into seed statistics.
pub fn parse_log(text: &str) -> SeedStats {
    let lines: Vec<&str> = text.lines().collect();
    let mut stats = SeedStats::default();

    for line in &lines {
        if COPY_RE.is_match(line) {
            if let (Some(seed), Some(payload)) = (
                seed_from_line(line),
                PAYLOAD_RE.find(line).map(|m| m.as_str().to_string()),
            ) {
                stats.payloads.insert(seed, payload);
            }
        }
    }

    for (i, line) in lines.iter().enumerate() {
        for verdict in SeedVerdict::ALL {
            if verdict.pattern().is_match(line) {
                // the verdict refers to the seed named on the previous line
                if let Some(seed) = i.checked_sub(1).and_then(|p| seed_from_line(lines[p])) {
                    stats.verdicts.entry(verdict).or_default().push(seed);
                }
            }
        }
    }
    stats
}

/// Render `seed verdict` lines, optionally with the payload name between.
pub fn render(stats: &SeedStats, with_payloads: bool) -> String {
    let mut out = String::new();
    for verdict in SeedVerdict::ALL {
        for seed in stats.seeds(verdict) {
            if with_payloads {
                let payload = stats.payloads.get(seed).map_or("-", String::as_str);
                out.push_str(&format!("{seed} {payload} {verdict}\n"));
            } else {
                out.push_str(&format!("{seed} {verdict}\n"));
            }
        }
    }
    out
}
