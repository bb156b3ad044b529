//! Forwarder: crash-safe delivery of logged readings to the collector.
//!
//! There is exactly one delivery routine, [`flush`]: walk the log from the
//! cursor to the end; per record, attempt delivery; on success advance the
//! cursor to that record's end offset; on the first failure stop. Both the
//! startup backlog replay and live delivery (after every append) are this
//! routine, so the cursor has a single writer, advances strictly per-record
//! in log order, and can never skip over an unsent record.
//!
//! No retry backoff: the next natural trigger (next reading, periodic tick,
//! next startup) simply flushes again.

use log::{debug, info};

use crate::app::ports::UplinkPort;
use crate::store::journal::Journal;

/// Result of one flush pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushOutcome {
    /// Records accepted by the collector during this pass.
    pub sent: usize,
    /// Whether delivery stopped before reaching the end of the log.
    pub stalled: bool,
}

/// Deliver the contiguous unsent suffix of the log, oldest first.
pub fn flush(journal: &mut Journal, uplink: &mut impl UplinkPort) -> FlushOutcome {
    let start = journal.cursor();
    let records: Vec<_> = match journal.read_from(start) {
        Ok(iter) => iter.collect(),
        Err(e) => {
            log::warn!("cannot read log for flush: {e}");
            return FlushOutcome {
                sent: 0,
                stalled: true,
            };
        }
    };

    let mut sent = 0;
    for (end_offset, reading) in records {
        if !uplink.send(&reading) {
            debug!("delivery stalled at offset {}", journal.cursor());
            return FlushOutcome { sent, stalled: true };
        }
        journal.advance_cursor(end_offset);
        sent += 1;
    }

    if sent > 0 {
        info!("forwarded {sent} record(s), cursor at {}", journal.cursor());
    }
    FlushOutcome {
        sent,
        stalled: false,
    }
}
