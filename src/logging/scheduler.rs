// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use crossbeam_channel::after;
use crossbeam_channel::bounded;
use crossbeam_channel::select;

use crate::logging::sink::BufferedSink;

/// Drives periodic flushes of a [`BufferedSink`] from a background thread.
///
/// The worker waits on a control channel and a timer at the same time, so
/// stopping never has to sit out the remainder of a flush interval: dropping
/// the control sender wakes the worker immediately, and a nudge makes it
/// re-arm the timer from the sink's current interval. Flush errors on the
/// worker are reported to stderr rather than unwinding the thread.
pub(crate) struct FlushScheduler {
    control: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl FlushScheduler {
    pub(crate) fn spawn(sink: Arc<BufferedSink>) -> io::Result<FlushScheduler> {
        let (control_tx, control_rx) = bounded(1);
        let handle = std::thread::Builder::new()
            .name("cpubench-log-flusher".to_string())
            .spawn(move || run(&sink, &control_rx))?;
        Ok(FlushScheduler {
            control: Some(control_tx),
            handle: Some(handle),
        })
    }

    /// Wakes the worker so it re-arms its timer with the current interval.
    ///
    /// The channel holds one pending wake; nudging an already-nudged worker
    /// is a no-op.
    pub(crate) fn nudge(&self) {
        if let Some(control) = &self.control {
            let _ = control.try_send(());
        }
    }

    /// Stops the worker and waits for it to exit.
    ///
    /// No flush is performed here; the final flush is the owner's job once
    /// the worker is known to be gone.
    pub(crate) fn stop(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        drop(self.control.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                eprintln!("log flush scheduler thread panicked");
            }
        }
    }
}

impl Drop for FlushScheduler {
    fn drop(&mut self) {
        self.finish();
    }
}

fn run(sink: &BufferedSink, control: &Receiver<()>) {
    loop {
        // Re-read each lap; a nudge cuts the current wait short so a new
        // interval applies at once.
        let interval = sink.flush_interval();
        select! {
            recv(control) -> message => match message {
                Ok(()) => {}
                Err(_) => break,
            },
            recv(after(interval)) -> _ => {
                if let Err(err) = sink.flush_all() {
                    eprintln!("failed to flush log buffer: {err}");
                }
            }
        }
    }
}
