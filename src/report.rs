//! The JSON document printed for a contract, and its optional split into
//! size-bounded batches.

use std::io::Write;

use base64::Engine as _;
use serde::Serialize;

use crate::error::ErrorKind;
use crate::rpc::query::StateEntry;
use crate::Result;

/// Keys of a contract's storage, in the order the RPC returned them, alongside
/// an owner label passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Storage keys, base64 encoded.
    pub keys: Vec<String>,
    pub owner_id: String,
}

impl Report {
    pub fn new(entries: &[StateEntry], owner_id: &str) -> Self {
        Self {
            keys: entries.iter().map(|entry| encode_key(&entry.key)).collect(),
            owner_id: owner_id.into(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| ErrorKind::DataConversion.custom(err))
    }
}

fn encode_key(key: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(key)
}

/// Split `entries` into consecutive reports whose entries add up to at most
/// `max_bytes` of storage each. An entry larger than `max_bytes` on its own is
/// given a report of its own. No entry is dropped or reordered, and an empty
/// state still yields a single, empty report.
pub fn batched(entries: &[StateEntry], owner_id: &str, max_bytes: u64) -> Vec<Report> {
    let mut reports = Vec::new();
    let mut start = 0;
    let mut used = 0u64;

    for (idx, entry) in entries.iter().enumerate() {
        let size = entry.size();
        if idx > start && used.saturating_add(size) > max_bytes {
            reports.push(Report::new(&entries[start..idx], owner_id));
            start = idx;
            used = 0;
        }
        used = used.saturating_add(size);
    }

    if start < entries.len() || reports.is_empty() {
        reports.push(Report::new(&entries[start..], owner_id));
    }
    reports
}

/// Write each report as one line of JSON. Everything is rendered before the first
/// byte is written, so a failure leaves `out` untouched.
pub fn write_reports<W: Write>(reports: &[Report], mut out: W) -> Result<()> {
    let mut buf = String::new();
    for report in reports {
        buf.push_str(&report.to_json()?);
        buf.push('\n');
    }

    out.write_all(buf.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|err| ErrorKind::Io.custom(err))
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(key: &str, value_len: usize) -> StateEntry {
        StateEntry {
            key: key.as_bytes().to_vec(),
            value: vec![0; value_len],
        }
    }

    fn all_keys(reports: &[Report]) -> Vec<String> {
        reports.iter().flat_map(|r| r.keys.clone()).collect()
    }

    #[test]
    fn test_report_projection() {
        let entries = vec![entry("STATE", 10), entry("a", 0), entry("STATE", 1)];
        let report = Report::new(&entries, "owner.testnet");
        assert_eq!(report.keys, vec!["U1RBVEU=", "YQ==", "U1RBVEU="]);
        assert_eq!(report.owner_id, "owner.testnet");
    }

    #[test]
    fn test_report_json() -> anyhow::Result<()> {
        let report = Report::new(&[entry("STATE", 3)], "owner.testnet");
        assert_eq!(
            report.to_json()?,
            r#"{"keys":["U1RBVEU="],"owner_id":"owner.testnet"}"#
        );

        let empty = Report::new(&[], "");
        assert_eq!(empty.to_json()?, r#"{"keys":[],"owner_id":""}"#);
        Ok(())
    }

    #[test]
    fn test_batched_respects_budget() {
        // sizes: 5, 5, 5, 12, 1
        let entries = vec![
            entry("a", 4),
            entry("b", 4),
            entry("c", 4),
            entry("d", 11),
            entry("e", 0),
        ];
        let reports = batched(&entries, "owner", 10);

        let sizes: Vec<usize> = reports.iter().map(|r| r.keys.len()).collect();
        assert_eq!(sizes, vec![2, 1, 1, 1]);
        assert_eq!(all_keys(&reports), Report::new(&entries, "owner").keys);
        assert!(reports.iter().all(|r| r.owner_id == "owner"));
    }

    #[test]
    fn test_batched_single_batch_when_budget_is_large() {
        let entries = vec![entry("a", 4), entry("b", 4)];
        let reports = batched(&entries, "owner", u64::MAX);
        assert_eq!(reports, vec![Report::new(&entries, "owner")]);
    }

    #[test]
    fn test_batched_empty_state() {
        let reports = batched(&[], "owner", 10);
        assert_eq!(reports, vec![Report::new(&[], "owner")]);
    }

    #[test]
    fn test_write_reports() -> anyhow::Result<()> {
        let reports = batched(&[entry("a", 4), entry("b", 4)], "owner", 5);
        let mut out = Vec::new();
        write_reports(&reports, &mut out)?;
        assert_eq!(
            String::from_utf8(out)?,
            "{\"keys\":[\"YQ==\"],\"owner_id\":\"owner\"}\n{\"keys\":[\"Yg==\"],\"owner_id\":\"owner\"}\n"
        );
        Ok(())
    }
}
