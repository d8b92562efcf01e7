/// Stream audit
///
/// Checks a captured action stream: every line well-formed, identifiers
/// exactly {0, .., K-1}, the sentinel present once and last.

use crate::decoder::{DecodeError, Decoder, Record};
use crate::gap_detector::GapDetector;
use std::collections::BTreeMap;
use std::io::BufRead;

#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    pub actions: u64,
    pub symbols: BTreeMap<String, u64>,
    pub quantities: BTreeMap<u32, u64>,
    pub sentinel_seen: bool,
    /// Lines of any kind after the first sentinel
    pub lines_after_sentinel: u64,
    pub gaps: Vec<(u64, u64)>,
    /// Identifiers inside `gaps`
    pub missing: u64,
    pub duplicates: Vec<u64>,
    pub sequential: bool,
    /// (1-based line number, error)
    pub malformed: Vec<(u64, DecodeError)>,
}

impl AuditReport {
    pub fn is_terminated(&self) -> bool {
        self.sentinel_seen && self.lines_after_sentinel == 0
    }

    /// Well-formed, gap-free, duplicate-free and properly terminated
    pub fn is_valid(&self) -> bool {
        self.is_terminated()
            && self.malformed.is_empty()
            && self.gaps.is_empty()
            && self.duplicates.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct StreamAudit {
    ids: GapDetector,
    report: AuditReport,
    line_no: u64,
}

impl StreamAudit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line
    pub fn process_line(&mut self, line: &str) {
        self.line_no += 1;

        if self.report.sentinel_seen {
            self.report.lines_after_sentinel += 1;
            return;
        }

        match Decoder::decode_line(line) {
            Ok(Record::Print) => self.report.sentinel_seen = true,
            Ok(Record::Order(order)) => {
                self.report.actions += 1;
                self.ids.process(order.id);
                *self.report.symbols.entry(order.symbol.to_string()).or_insert(0) += 1;
                *self.report.quantities.entry(order.quantity).or_insert(0) += 1;
            }
            Err(e) => self.report.malformed.push((self.line_no, e)),
        }
    }

    pub fn process_text(&mut self, text: &str) {
        for line in text.lines() {
            self.process_line(line);
        }
    }

    /// Drain a reader line by line
    pub fn process_reader<R: BufRead>(&mut self, reader: R) -> std::io::Result<()> {
        for line in reader.lines() {
            self.process_line(&line?);
        }
        Ok(())
    }

    pub fn finish(mut self) -> AuditReport {
        self.report.gaps = self.ids.gaps();
        self.report.missing = self.ids.total_gaps();
        self.report.duplicates = self.ids.duplicates().to_vec();
        self.report.sequential = self.ids.is_sequential();
        self.report
    }
}

/// Audit a complete in-memory stream
pub fn audit_text(text: &str) -> AuditReport {
    let mut audit = StreamAudit::new();
    audit.process_text(text);
    audit.finish()
}
