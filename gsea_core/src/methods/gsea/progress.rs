use std::io::Write;

/// How often (in permutations) the permutation drivers report progress.
pub const LOG_FREQ: usize = 5;

/// Collaborator the permutation drivers report progress through. The kernel
/// never prints directly; it calls `on_progress` and lets the sink decide
/// what, if anything, to do with it.
pub trait ProgressSink {
    fn on_progress(&mut self, iter: usize, total: usize, label: &str);
}

/// Silent sink, for non-interactive or test use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_progress(&mut self, _iter: usize, _total: usize, _label: &str) {}
}

/// Writes one line per reported iteration to any `io::Write` — a
/// framework-free alternative to `println!`-based CLI status lines, usable
/// by library consumers that don't want to link `owo-colors`.
pub struct StreamProgressSink<W: Write> {
    out: W,
}

impl<W: Write> StreamProgressSink<W> {
    pub fn new(out: W) -> Self {
        StreamProgressSink { out }
    }
}

impl<W: Write> ProgressSink for StreamProgressSink<W> {
    fn on_progress(&mut self, iter: usize, total: usize, label: &str) {
        let _ = writeln!(self.out, "[{}/{}] {}", iter, total, label);
    }
}

/// Emits a progress line only every [`LOG_FREQ`] iterations (and always on
/// the last one).
pub fn report_if_due(sink: &mut dyn ProgressSink, iter: usize, total: usize, label: &str) {
    if iter % LOG_FREQ == 0 || iter + 1 == total {
        sink.on_progress(iter, total, label);
    }
}
