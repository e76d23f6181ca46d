//! Runtime configuration shared by the binaries.
//!
//! Handles conversion from CLI-friendly strings (like "500ms", "30s") to the
//! types used by the coordinator, and the one-time choice of content backend.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_ADMIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-call RPC budgets. A call that exceeds its budget fails with a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpcTimeouts {
    /// Content reads and deletes.
    pub read: Duration,
    /// Content writes.
    pub write: Duration,
    /// Inventory, listing and every migration RPC.
    pub admin: Duration,
}

impl Default for RpcTimeouts {
    fn default() -> Self {
        Self {
            read: DEFAULT_READ_TIMEOUT,
            write: DEFAULT_WRITE_TIMEOUT,
            admin: DEFAULT_ADMIN_TIMEOUT,
        }
    }
}

/// Timeout flags, flattened into any command that talks to storage nodes.
#[derive(Debug, Clone, clap::Args)]
pub struct TimeoutArgs {
    /// Budget for content reads and deletes.
    #[arg(long, env = "SEGMENT_READ_TIMEOUT", default_value = "5s", value_parser = parse_duration)]
    pub read_timeout: Duration,

    /// Budget for content writes.
    #[arg(long, env = "SEGMENT_WRITE_TIMEOUT", default_value = "10s", value_parser = parse_duration)]
    pub write_timeout: Duration,

    /// Budget for inventory and migration calls.
    #[arg(long, env = "SEGMENT_ADMIN_TIMEOUT", default_value = "30s", value_parser = parse_duration)]
    pub admin_timeout: Duration,
}

impl From<TimeoutArgs> for RpcTimeouts {
    fn from(args: TimeoutArgs) -> Self {
        Self {
            read: args.read_timeout,
            write: args.write_timeout,
            admin: args.admin_timeout,
        }
    }
}

/// Which content service the process runs with. Chosen once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBackend {
    /// Files under one local directory.
    Local { base_dir: PathBuf },
    /// Files spread over storage nodes by the hash ring.
    Cluster { nodes: Vec<String> },
}

/// Parses a duration such as "250ms", "5s", "2m" or a plain number of seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty duration string".into());
    }

    let lower = input.to_ascii_lowercase();
    let (num_str, unit_ms) = if let Some(n) = lower.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = lower.strip_suffix('s') {
        (n, 1000)
    } else if let Some(n) = lower.strip_suffix('m') {
        (n, 60 * 1000)
    } else {
        (lower.as_str(), 1000)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid duration: '{input}'"))?;

    num.checked_mul(unit_ms)
        .map(Duration::from_millis)
        .ok_or_else(|| format!("duration overflow: '{input}'"))
}

/// Splits a comma-separated node list, trimming entries and dropping empty
/// ones and repeats (first occurrence wins).
pub fn parse_node_list(input: &str) -> Vec<String> {
    dedup_nodes(input.split(','))
}

pub fn dedup_nodes<I, S>(nodes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = Vec::new();
    for node in nodes {
        let node = node.as_ref().trim();
        if !node.is_empty() && !seen.iter().any(|known: &String| known == node) {
            seen.push(node.to_string());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration(" 10S ").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("99999999999999999999m").is_err());
    }

    #[test]
    fn test_parse_node_list() {
        assert_eq!(
            parse_node_list(" a:1, b:1 ,,a:1,c:1 "),
            vec!["a:1".to_string(), "b:1".to_string(), "c:1".to_string()]
        );
        assert!(parse_node_list("").is_empty());
    }

    #[test]
    fn test_default_timeouts() {
        let timeouts = RpcTimeouts::default();
        assert!(timeouts.read < timeouts.admin);
        assert!(timeouts.write < timeouts.admin);
    }
}
