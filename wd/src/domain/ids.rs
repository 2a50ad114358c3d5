//! Identifier generation and resolution
//!
//! Request and schedule ids use the format `{PREFIX}{base36 stamp}`, for
//! example `REQLXK3T0QF`. The stamp starts from the current time in
//! milliseconds and only moves forward, skipping any value whose id is
//! already taken, so two ids from one generator never collide.
//!
//! Collector ids use `C` plus a three-digit sequence: `C001`, `C002`, ...

use tracing::debug;

/// Prefix for request ids
pub const REQUEST_PREFIX: &str = "REQ";

/// Prefix for schedule entry ids
pub const SCHEDULE_PREFIX: &str = "SCH";

/// Prefix for collector ids
pub const COLLECTOR_PREFIX: &str = "C";

const BASE36_DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Encode a number in upper-case base 36
pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Monotonic, collision-checked id source
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last_stamp: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next id for `prefix`
    ///
    /// `now_ms` seeds the stamp; `is_taken` reports ids already in use.
    pub fn next(&mut self, prefix: &str, now_ms: i64, is_taken: impl Fn(&str) -> bool) -> String {
        let mut stamp = (now_ms.max(0) as u64).max(self.last_stamp.saturating_add(1));
        let mut id = format!("{}{}", prefix, to_base36(stamp));
        while is_taken(&id) {
            debug!(%id, "IdGenerator::next: id taken, bumping stamp");
            stamp += 1;
            id = format!("{}{}", prefix, to_base36(stamp));
        }
        self.last_stamp = stamp;
        id
    }
}

/// Next collector id: highest numeric suffix + 1, zero-padded to three digits
///
/// Ids without a numeric suffix count as 0.
pub fn next_collector_id<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let max = existing
        .into_iter()
        .map(|id| {
            id.strip_prefix(COLLECTOR_PREFIX)
                .and_then(|n| n.parse::<u32>().ok())
                .unwrap_or(0)
        })
        .max()
        .unwrap_or(0);
    format!("{}{:03}", COLLECTOR_PREFIX, max + 1)
}

/// Resolves partial references typed by a user to full ids
pub struct IdResolver<'a> {
    ids: Vec<&'a str>,
}

impl<'a> IdResolver<'a> {
    pub fn new(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Resolve a reference to a full ID
    ///
    /// Returns:
    /// - Ok(Some(id)) on an exact match or a single partial match
    /// - Ok(None) if nothing matches
    /// - Err with candidates if ambiguous
    pub fn resolve(&self, reference: &str) -> Result<Option<String>, Vec<String>> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Ok(None);
        }

        if let Some(exact) = self.ids.iter().find(|id| id.eq_ignore_ascii_case(reference)) {
            return Ok(Some(exact.to_string()));
        }

        let matches: Vec<String> = self
            .ids
            .iter()
            .filter(|id| Self::matches(id, reference))
            .map(|id| id.to_string())
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.into_iter().next()),
            _ => Err(matches),
        }
    }

    /// Prefix or suffix match, ignoring case
    fn matches(id: &str, reference: &str) -> bool {
        let id = id.to_ascii_uppercase();
        let reference = reference.to_ascii_uppercase();
        id.starts_with(&reference) || id.ends_with(&reference)
    }
}
