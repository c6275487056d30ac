use anyhow::{Result, bail};

const DEFAULT_SEED: u64 = 1337;

/// Split a comma-separated CLI value into trimmed, non-empty tokens.
#[must_use]
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve CLI seed tokens into a deduplicated seed list.
///
/// Supports literal integers (negatives take their absolute value), inclusive
/// `start..end` ranges, and the keyword `default`.
///
/// # Errors
///
/// Returns an error for unrecognized tokens or inverted ranges.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut pending: Vec<u64> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("default") {
            pending.push(DEFAULT_SEED);
            continue;
        }

        if let Some((start, end)) = token.split_once("..") {
            let start: u64 = parse_seed(start.trim())?;
            let end: u64 = parse_seed(end.trim())?;
            if start > end {
                bail!("Inverted seed range: {token}");
            }
            pending.extend(start..=end);
            continue;
        }

        pending.push(parse_seed(token)?);
    }

    let mut deduped: Vec<u64> = Vec::new();
    for seed in pending {
        if !deduped.contains(&seed) {
            deduped.push(seed);
        }
    }

    if deduped.is_empty() {
        deduped.push(DEFAULT_SEED);
    }

    Ok(deduped)
}

fn parse_seed(token: &str) -> Result<u64> {
    if let Ok(value) = token.parse::<u64>() {
        return Ok(value);
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }
    bail!("Unrecognized seed token: {token}")
}
