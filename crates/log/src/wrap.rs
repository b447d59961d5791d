use crate::config::LogConfig;
use crate::display::Loggable;
use crate::logger::CallLogger;
use crate::signature::Signature;
use crate::{CallLogError, CallLogResult};
use std::marker::PhantomData;

/// The arguments of a wrapped callable, passed as one tuple.
pub trait Arguments {
    const ARITY: usize;

    fn loggables(&self) -> Vec<&dyn Loggable>;
}

impl Arguments for () {
    const ARITY: usize = 0;

    fn loggables(&self) -> Vec<&dyn Loggable> {
        vec![]
    }
}

macro_rules! arguments {
    ($arity:expr; $($name:ident),+) => {
        impl<$($name: Loggable),+> Arguments for ($($name,)+) {
            const ARITY: usize = $arity;

            #[allow(non_snake_case)]
            fn loggables(&self) -> Vec<&dyn Loggable> {
                let ($($name,)+) = self;
                vec![$($name as &dyn Loggable),+]
            }
        }
    };
}

arguments!(1; A);
arguments!(2; A, B);
arguments!(3; A, B, C);
arguments!(4; A, B, C, D);
arguments!(5; A, B, C, D, E);
arguments!(6; A, B, C, D, E, F);
arguments!(7; A, B, C, D, E, F, G);
arguments!(8; A, B, C, D, E, F, G, H);
arguments!(9; A, B, C, D, E, F, G, H, I);
arguments!(10; A, B, C, D, E, F, G, H, I, J);
arguments!(11; A, B, C, D, E, F, G, H, I, J, K);
arguments!(12; A, B, C, D, E, F, G, H, I, J, K, L);

/// Wraps `callable` so that every call prints the banner block described by
/// `signature`.
///
/// The signature is checked here, before anything is called: it has to be
/// valid and declare exactly as many parameters as the callable's argument
/// tuple has elements.
///
/// ```
/// use call_log::{log, Signature};
///
/// let add = log(Signature::new("add").params(["a", "b"]), |(a, b): (i32, i32)| {
///     (a + b, a, b)
/// })
/// .unwrap();
/// assert_eq!((8, 3, 5), add.call((3, 5)));
/// ```
pub fn log<A, R, F>(signature: Signature, callable: F) -> CallLogResult<Logged<A, F>>
where
    A: Arguments,
    R: Loggable,
    F: Fn(A) -> R,
{
    if signature.arity() != A::ARITY {
        return Err(CallLogError::ArityMismatch {
            name: signature.name().to_string(),
            expected: signature.arity(),
            actual: A::ARITY,
        });
    }
    Ok(Logged {
        logger: CallLogger::new(signature)?,
        callable,
        _args: PhantomData,
    })
}

/// A callable returned by [`log`].
pub struct Logged<A, F> {
    logger: CallLogger,
    callable: F,
    _args: PhantomData<fn(A)>,
}

impl<A, R, F> Logged<A, F>
where
    A: Arguments,
    R: Loggable,
    F: Fn(A) -> R,
{
    pub fn call(&self, args: A) -> R {
        let call = self.logger.enter(&args.loggables());
        call.finish(|| (self.callable)(args))
    }

    pub fn with_config(mut self, config: LogConfig) -> CallLogResult<Self> {
        self.logger = self.logger.with_config(config)?;
        Ok(self)
    }

    pub fn logger(&self) -> &CallLogger {
        &self.logger
    }

    /// The wrapped callable as a plain closure.
    pub fn into_fn(self) -> impl Fn(A) -> R {
        move |args| self.call(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture;
    use proptest::prelude::*;

    #[test]
    fn test_arity_mismatch() {
        let res = log(Signature::new("add").param("a"), |(a, b): (i32, i32)| a + b);
        assert!(matches!(
            res.err(),
            Some(CallLogError::ArityMismatch {
                expected: 1,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_signature_fails_before_any_call() {
        let res = log(Signature::new("").param("a"), |(a,): (i32,)| -> u8 {
            panic!("called with {}", a)
        });
        assert!(matches!(res.err(), Some(CallLogError::EmptyName)));
    }

    #[test]
    fn test_error_result_is_returned_unchanged() {
        let parse = log(Signature::new("parse").param("s"), |(s,): (&str,)| {
            s.parse::<u8>()
        })
        .unwrap();
        let (res, out) = capture(|| parse.call(("300",)));
        assert_eq!("300".parse::<u8>(), res);
        assert!(out.contains("    Output: Err(ParseIntError"), "{}", out);
    }

    #[test]
    fn test_panic_propagates_without_end_banner() {
        let explode = log(Signature::new("explode"), |()| -> u8 { panic!("boom") }).unwrap();
        let (res, out) = capture(|| {
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| explode.call(())))
        });
        let payload = res.unwrap_err();
        assert_eq!(Some(&"boom"), payload.downcast_ref::<&str>());
        assert!(out.contains("##### @Log explode #####"), "{}", out);
        assert!(!out.contains("END"), "{}", out);
    }

    #[test]
    fn test_into_fn() {
        let double = log(Signature::new("double").param("x"), |(x,): (u32,)| x * 2)
            .unwrap()
            .into_fn();
        let (res, out) = capture(|| double((21,)));
        assert_eq!(42, res);
        assert!(out.contains("    Input: (21,) {}\n"), "{}", out);
    }

    #[test]
    fn test_elapsed_covers_the_call() {
        let nap = log(Signature::new("nap").param("ms"), |(ms,): (u64,)| {
            std::thread::sleep(std::time::Duration::from_millis(ms))
        })
        .unwrap();
        let (_, out) = capture(|| nap.call((20,)));
        let time = out
            .split("(Time: ")
            .nth(1)
            .and_then(|rest| rest.split(" s)").next())
            .unwrap();
        let secs: f64 = time.parse().unwrap();
        assert!(secs >= 0.02, "{}", out);
    }

    proptest! {
        #[test]
        fn prop_logged_call_returns_the_same_value(a in any::<i64>(), b in any::<i64>(), xs in proptest::collection::vec(any::<u8>(), 0..40)) {
            let f = |(a, b, xs): (i64, i64, Vec<u8>)| (a.wrapping_mul(b), xs.len(), xs);
            let logged = log(Signature::new("f").params(["a", "b", "xs"]), f).unwrap();
            let (res, _) = capture(|| logged.call((a, b, xs.clone())));
            prop_assert_eq!(f((a, b, xs)), res);
        }
    }
}
