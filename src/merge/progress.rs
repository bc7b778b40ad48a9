//! Progress reporting for long merges

/// Receives `(tables_done, tables_total)` as the merge advances
pub trait ProgressSink {
    fn report(&mut self, done: usize, total: usize);
}

impl<F> ProgressSink for F
where
    F: FnMut(usize, usize),
{
    fn report(&mut self, done: usize, total: usize) {
        self(done, total)
    }
}

/// Sink that discards every report
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _done: usize, _total: usize) {}
}

/// Step counter that reports to a sink; never reports past `total`
pub(crate) struct Progress<'a> {
    sink: &'a mut dyn ProgressSink,
    done: usize,
    total: usize,
}

impl<'a> Progress<'a> {
    pub(crate) fn new(sink: &'a mut dyn ProgressSink, total: usize) -> Self {
        sink.report(0, total);
        Self {
            sink,
            done: 0,
            total,
        }
    }

    /// One more input table has been folded in
    pub(crate) fn step(&mut self) {
        if self.done < self.total {
            self.done += 1;
            self.sink.report(self.done, self.total);
        }
    }

    /// Jump to 100%, e.g. when a fold stops early
    pub(crate) fn finish(&mut self) {
        if self.done < self.total {
            self.done = self.total;
            self.sink.report(self.done, self.total);
        }
    }
}
