use crate::config::{global_config, LogConfig};
use crate::display::{write_joined, Loggable, Rendered};
use crate::signature::{ParameterKind, Signature};
use crate::text::{fill, format_seconds};
use crate::{console, CallLogResult, LogModel};
use log::debug;
use std::fmt;
use std::future::{poll_fn, Future};
use std::pin::pin;
use std::time::{Duration, Instant};

/// Key under which the name of the running logged function is kept in the MDC.
pub const FN_NAME_KEY: &str = "fn_name";

const ARGS_LABEL: &str = "    Args: ";
const DEFAULTS_LABEL: &str = "    Default Args: ";
const INPUT_LABEL: &str = "    Input: ";
const OUTPUT_LABEL: &str = "    Output: ";

/// Prints the banner block around every call of one wrapped callable.
#[derive(Debug, Clone)]
pub struct CallLogger {
    signature: Signature,
    config: Option<LogConfig>,
}

impl CallLogger {
    pub fn new(signature: Signature) -> CallLogResult<Self> {
        signature.validate()?;
        Ok(CallLogger::trusted(signature))
    }

    /// Skips validation, for signatures already checked at compile time.
    #[doc(hidden)]
    pub fn trusted(signature: Signature) -> Self {
        CallLogger {
            signature,
            config: None,
        }
    }

    /// Uses `config` instead of the global config.
    pub fn with_config(mut self, config: LogConfig) -> CallLogResult<Self> {
        config.validate()?;
        self.config = Some(config);
        Ok(self)
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn config(&self) -> LogConfig {
        self.config.unwrap_or_else(global_config)
    }

    /// Prints the start of the block for a call with `args`, one per
    /// parameter in declaration order.
    ///
    /// The arguments are rendered here, so they can be moved into the call
    /// afterwards.
    pub fn enter(&self, args: &[&dyn Loggable]) -> ActiveCall<'_> {
        let config = self.config();
        let args: Vec<Rendered> = args
            .iter()
            .map(|arg| arg.rendered(config.threshold))
            .collect();

        console::emit(&self.start_section(&args, config.width));

        ActiveCall {
            logger: self,
            config,
            args,
        }
    }

    fn start_section(&self, args: &[Rendered], width: usize) -> String {
        let name = self.signature.name();
        let param_names = format!("{:?}", self.signature.param_names());
        let defaults = self.signature.defaults();
        let defaults = if defaults.is_empty() {
            "None".to_string()
        } else {
            Tuple(&defaults).to_string()
        };

        let mut positional = vec![];
        let mut named = vec![];
        let mut params = self.signature.parameters().iter();
        for arg in args {
            match params.next() {
                Some(p) if p.kind == ParameterKind::Named => {
                    named.push(format!("{:?}: {}", p.name, arg))
                }
                _ => positional.push(arg),
            }
        }
        let input = format!("{} {{{}}}", Tuple(&positional), named.join(", "));

        format!(
            "\n##### @Log {} #####\n{}\n{}\n\n{}\n\n",
            name,
            fill(ARGS_LABEL, &param_names, width),
            fill(DEFAULTS_LABEL, &defaults, width),
            fill(INPUT_LABEL, &input, width),
        )
    }

    fn end_section(&self, output: &Rendered, elapsed: Duration, width: usize) -> String {
        format!(
            "{}\n##### Log {} END (Time: {} s) #####\n\n",
            fill(OUTPUT_LABEL, &output.to_string(), width),
            self.signature.name(),
            format_seconds(elapsed.as_secs_f64()),
        )
    }
}

/// One call between its start and end banners.
pub struct ActiveCall<'a> {
    logger: &'a CallLogger,
    config: LogConfig,
    args: Vec<Rendered>,
}

impl ActiveCall<'_> {
    /// Times `call`, prints its result and the end banner and hands the
    /// result back untouched. A panic in `call` unwinds straight through and
    /// nothing more is printed.
    pub fn finish<R: Loggable>(self, call: impl FnOnce() -> R) -> R {
        let _mdc = MdcGuard::enter(self.logger.signature.name());
        let start = Instant::now();
        let res = call();
        let elapsed = start.elapsed();
        self.report(&res, elapsed);
        res
    }

    /// [`ActiveCall::finish`] for a future; the time covers every poll.
    ///
    /// The MDC entry is set for the length of each poll only, so calls
    /// interleaved on one thread or moved between threads never see each
    /// other's function name.
    pub async fn finish_async<F>(self, fut: F) -> F::Output
    where
        F: Future,
        F::Output: Loggable,
    {
        let logger = self.logger;
        let fn_name = logger.signature.name();
        let start = Instant::now();
        let mut fut = pin!(fut);
        let res = poll_fn(|cx| {
            let _mdc = MdcGuard::enter(fn_name);
            fut.as_mut().poll(cx)
        })
        .await;
        let elapsed = start.elapsed();

        let _mdc = MdcGuard::enter(fn_name);
        self.report(&res, elapsed);
        res
    }

    fn report(self, res: &dyn Loggable, elapsed: Duration) {
        let output = res.rendered(self.config.threshold);
        console::emit(
            &self
                .logger
                .end_section(&output, elapsed, self.config.width),
        );

        let signature = &self.logger.signature;
        let fn_args: Vec<String> = signature
            .param_names()
            .iter()
            .zip(self.args.iter())
            .map(|(name, arg)| format!("{}: {}", name, arg))
            .collect();
        let fn_args: Vec<&str> = fn_args.iter().map(|arg| arg as &str).collect();
        let fn_return = output.to_string();
        let log = LogModel {
            fn_name: signature.name(),
            fn_args: &fn_args,
            fn_return: &fn_return,
        };
        debug!(target: signature.name(), "{:?}", log);
    }
}

struct Tuple<'a, T>(&'a [T]);

impl<T: fmt::Display> fmt::Display for Tuple<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, "(", self.0, ")")
    }
}

/// Holds the function name in the MDC until dropped, then puts back
/// whatever an enclosing logged call had there. Never held across an await.
struct MdcGuard {
    previous: Option<String>,
}

impl MdcGuard {
    fn enter(fn_name: &str) -> Self {
        MdcGuard {
            previous: log_mdc::insert(FN_NAME_KEY, fn_name),
        }
    }
}

impl Drop for MdcGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(previous) => {
                log_mdc::insert(FN_NAME_KEY, previous);
            }
            None => {
                log_mdc::remove(FN_NAME_KEY);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture;

    fn add_logger() -> CallLogger {
        CallLogger::new(Signature::new("add").params(["a", "b"])).unwrap()
    }

    #[test]
    fn test_block_layout() {
        let logger = add_logger();
        let (res, out) = capture(|| logger.enter(&[&3i32, &5i32]).finish(|| (8, 3, 5)));
        assert_eq!((8, 3, 5), res);

        let expected_start = "\n##### @Log add #####\n    Args: [\"a\", \"b\"]\n    Default Args: None\n\n    Input: (3, 5) {}\n\n    Output: (8, 3, 5)\n##### Log add END (Time: ";
        assert!(out.starts_with(expected_start), "{}", out);
        assert!(out.ends_with(" s) #####\n\n"), "{}", out);
    }

    #[test]
    fn test_defaults_and_named_arguments() {
        let logger = CallLogger::new(
            Signature::new("clamp")
                .param("x")
                .named("lo")
                .named("hi")
                .default_value("lo", 0)
                .default_value("hi", 100),
        )
        .unwrap();
        let (_, out) = capture(|| logger.enter(&[&250i32, &0i32, &100i32]).finish(|| 100i32));
        assert!(out.contains("    Default Args: (0, 100)\n"), "{}", out);
        assert!(out.contains("    Input: (250,) {\"lo\": 0, \"hi\": 100}\n"), "{}", out);
    }

    #[test]
    fn test_no_parameters() {
        let logger = CallLogger::new(Signature::new("now")).unwrap();
        let (_, out) = capture(|| logger.enter(&[]).finish(|| "noon"));
        assert!(out.contains("    Args: []\n"), "{}", out);
        assert!(out.contains("    Input: () {}\n"), "{}", out);
        assert!(out.contains("    Output: \"noon\"\n"), "{}", out);
    }

    #[test]
    fn test_large_values_are_abbreviated() {
        let logger = CallLogger::new(Signature::new("sum").param("xs")).unwrap();
        let xs: Vec<u64> = (1..=12).collect();
        let (total, out) = capture(|| {
            let call = logger.enter(&[&xs]);
            call.finish(|| xs.iter().sum::<u64>())
        });
        assert_eq!(78, total);
        assert!(
            out.contains("    Input: ([1, 2, 3, 4, 5, 6, 7, 8, 9, 10],) {}\n"),
            "{}",
            out
        );
    }

    #[test]
    fn test_own_config_overrides_global() {
        let logger = add_logger()
            .with_config(LogConfig::default().threshold(2))
            .unwrap();
        let (_, out) = capture(|| logger.enter(&[&vec![1i32, 2, 3], &0i32]).finish(|| ()));
        assert!(out.contains("    Input: ([1, 2], 0) {}\n"), "{}", out);
        assert!(add_logger().with_config(LogConfig::default().width(0)).is_err());
    }

    #[test]
    fn test_long_input_is_wrapped() {
        let logger = CallLogger::new(Signature::new("concat").params(["a", "b"]))
            .unwrap()
            .with_config(LogConfig::default().width(30))
            .unwrap();
        let (_, out) = capture(|| {
            logger
                .enter(&[&"a fairly long string", &"and another one"])
                .finish(|| ())
        });
        assert!(
            out.contains("    Input: (\"a fairly long\n           string\", \"and\n           another one\") {}\n"),
            "{}",
            out
        );
    }

    #[test]
    fn test_mdc_is_scoped_to_the_call() {
        let outer = CallLogger::new(Signature::new("outer")).unwrap();
        let inner = CallLogger::new(Signature::new("inner")).unwrap();
        let mut seen = vec![];
        capture(|| {
            outer.enter(&[]).finish(|| {
                log_mdc::get(FN_NAME_KEY, |v| seen.push(v.map(str::to_string)));
                inner.enter(&[]).finish(|| {
                    log_mdc::get(FN_NAME_KEY, |v| seen.push(v.map(str::to_string)));
                });
                log_mdc::get(FN_NAME_KEY, |v| seen.push(v.map(str::to_string)));
            })
        });
        log_mdc::get(FN_NAME_KEY, |v| seen.push(v.map(str::to_string)));
        assert_eq!(
            vec![
                Some("outer".to_string()),
                Some("inner".to_string()),
                Some("outer".to_string()),
                None
            ],
            seen
        );
    }
}
