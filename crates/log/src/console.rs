use log::warn;
use std::cell::RefCell;
use std::io::{self, Write};

thread_local! {
    static CAPTURE: RefCell<Option<String>> = RefCell::new(None);
}

/// Writes one banner section to stdout, or to the capture buffer of the
/// current thread if [`capture`] is active.
pub(crate) fn emit(text: &str) {
    let captured = CAPTURE.with(|c| match c.borrow_mut().as_mut() {
        Some(buf) => {
            buf.push_str(text);
            true
        }
        None => false,
    });
    if captured {
        return;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        warn!("failed to write call log to stdout: {}", e);
    }
}

/// Runs `f` and returns its result together with everything the call
/// logger printed on this thread meanwhile, instead of printing it.
///
/// Captures nest: an inner `capture` takes the output of its own closure
/// and the outer one gets the rest.
pub fn capture<R>(f: impl FnOnce() -> R) -> (R, String) {
    struct Restore(Option<String>);

    impl Drop for Restore {
        fn drop(&mut self) {
            let outer = self.0.take();
            CAPTURE.with(|c| *c.borrow_mut() = outer);
        }
    }

    let outer = CAPTURE.with(|c| c.borrow_mut().replace(String::new()));
    let restore = Restore(outer);
    let res = f();
    let captured = CAPTURE.with(|c| c.borrow_mut().take()).unwrap_or_default();
    drop(restore);
    (res, captured)
}
