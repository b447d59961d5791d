//! The display transform: how an argument or a return value is printed.
//!
//! A value is printed in one of three ways, picked from what it can expose
//! through [`Loggable`] rather than from its concrete type:
//!
//! - it exposes a shape: an array-like buffer. With more elements than the
//!   threshold only the shape is printed.
//! - it exposes its items: an ordered sequence. With more items than the
//!   threshold only the first `threshold` of them are printed.
//! - anything else is printed verbatim with `Debug`.
//!
//! The transform only looks at the top-level value, nested collections are
//! printed as they are.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::{self, Debug};
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `[a, b]`
    Bracket,
    /// `(a, b)`, a single item keeps its trailing comma: `(a,)`
    Paren,
}

/// Borrowed items of a sequence, ready to be printed one by one.
pub struct Sequence<'a> {
    pub items: Vec<&'a dyn Debug>,
    pub delimiter: Delimiter,
}

impl<'a> Sequence<'a> {
    pub fn list(items: Vec<&'a dyn Debug>) -> Self {
        Sequence {
            items,
            delimiter: Delimiter::Bracket,
        }
    }

    pub fn tuple(items: Vec<&'a dyn Debug>) -> Self {
        Sequence {
            items,
            delimiter: Delimiter::Paren,
        }
    }
}

/// The printable form of a value after the display transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Scalar(String),
    Sequence {
        items: Vec<String>,
        delimiter: Delimiter,
    },
    Shape(Vec<usize>),
}

impl Rendered {
    pub fn scalar<T: Debug + ?Sized>(value: &T) -> Self {
        Rendered::Scalar(format!("{:?}", value))
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendered::Scalar(s) => f.write_str(s),
            Rendered::Sequence { items, delimiter } => {
                let (open, close) = match delimiter {
                    Delimiter::Bracket => ("[", "]"),
                    Delimiter::Paren => ("(", ")"),
                };
                write_joined(f, open, items, close)?;
                Ok(())
            }
            Rendered::Shape(dims) => {
                f.write_str("array(shape=")?;
                write_joined(f, "(", dims, ")")?;
                f.write_str(")")
            }
        }
    }
}

/// Writes `open a, b close`, with the trailing comma of one item tuples.
pub(crate) fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: &[T],
    close: &str,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    if items.len() == 1 && open == "(" {
        f.write_str(",")?;
    }
    f.write_str(close)
}

/// A value the call logger can print.
///
/// Implement it with an empty body for types printed verbatim, override
/// [`Loggable::sequence`] for ordered collections and [`Loggable::shape`] for
/// n-dimensional buffers:
///
/// ```
/// use call_log::{Loggable, Rendered};
///
/// #[derive(Debug)]
/// struct Image {
///     width: usize,
///     height: usize,
///     pixels: Vec<u8>,
/// }
///
/// impl Loggable for Image {
///     fn shape(&self) -> Option<Vec<usize>> {
///         Some(vec![self.height, self.width])
///     }
/// }
///
/// let image = Image { width: 4, height: 3, pixels: vec![0; 12] };
/// assert_eq!(Rendered::Shape(vec![3, 4]), image.rendered(10));
/// ```
pub trait Loggable: Debug {
    /// Dimensions of an array-like value.
    fn shape(&self) -> Option<Vec<usize>> {
        None
    }

    /// Items of an ordered sequence.
    fn sequence(&self) -> Option<Sequence<'_>> {
        None
    }

    fn rendered(&self, threshold: usize) -> Rendered {
        transform(self, threshold)
    }
}

/// Applies the display transform to `value`.
pub fn transform<T: Loggable + ?Sized>(value: &T, threshold: usize) -> Rendered {
    if let Some(shape) = value.shape() {
        // a product past usize::MAX is certainly over the threshold
        let exceeds = shape
            .iter()
            .try_fold(1usize, |count, &dim| count.checked_mul(dim))
            .map_or(true, |count| count > threshold);
        if exceeds {
            return Rendered::Shape(shape);
        }
        return Rendered::scalar(value);
    }

    if let Some(Sequence { items, delimiter }) = value.sequence() {
        return Rendered::Sequence {
            items: items
                .into_iter()
                .take(threshold)
                .map(|item| format!("{:?}", item))
                .collect(),
            delimiter,
        };
    }

    Rendered::scalar(value)
}

impl Loggable for Rendered {
    fn rendered(&self, threshold: usize) -> Rendered {
        match self {
            Rendered::Sequence { items, delimiter } if items.len() > threshold => {
                Rendered::Sequence {
                    items: items[..threshold].to_vec(),
                    delimiter: *delimiter,
                }
            }
            _ => self.clone(),
        }
    }
}

/// Stands in for an argument whose value must not be printed.
#[derive(Clone, Copy, Default)]
pub struct Ignored;

impl Debug for Ignored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ignored")
    }
}

impl Loggable for Ignored {}

macro_rules! verbatim {
    ($($t:ty),* $(,)?) => {
        $(impl Loggable for $t {})*
    };
}

verbatim!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    str,
    String,
    std::time::Duration,
    std::path::Path,
    std::path::PathBuf,
);

impl<T: Debug> Loggable for Option<T> {}

impl<T: Debug, E: Debug> Loggable for Result<T, E> {}

impl<K: Debug, V: Debug, S> Loggable for HashMap<K, V, S> {}

impl<K: Debug, V: Debug> Loggable for BTreeMap<K, V> {}

impl<T: Debug, S> Loggable for HashSet<T, S> {}

impl<T: Debug> Loggable for BTreeSet<T> {}

impl<T: Debug> Loggable for [T] {
    fn sequence(&self) -> Option<Sequence<'_>> {
        Some(Sequence::list(self.iter().map(|x| x as &dyn Debug).collect()))
    }
}

impl<T: Debug, const N: usize> Loggable for [T; N] {
    fn sequence(&self) -> Option<Sequence<'_>> {
        self.as_slice().sequence()
    }
}

impl<T: Debug> Loggable for Vec<T> {
    fn sequence(&self) -> Option<Sequence<'_>> {
        self.as_slice().sequence()
    }
}

impl<T: Debug> Loggable for VecDeque<T> {
    fn sequence(&self) -> Option<Sequence<'_>> {
        Some(Sequence::list(self.iter().map(|x| x as &dyn Debug).collect()))
    }
}

macro_rules! forward {
    ($($wrapper:ty),*) => {
        $(
            impl<T: Loggable + ?Sized> Loggable for $wrapper {
                fn shape(&self) -> Option<Vec<usize>> {
                    (**self).shape()
                }

                fn sequence(&self) -> Option<Sequence<'_>> {
                    (**self).sequence()
                }

                fn rendered(&self, threshold: usize) -> Rendered {
                    (**self).rendered(threshold)
                }
            }
        )*
    };
}

forward!(&T, &mut T, Box<T>, Rc<T>, Arc<T>);

macro_rules! tuple {
    ($($name:ident),+) => {
        impl<$($name: Debug),+> Loggable for ($($name,)+) {
            #[allow(non_snake_case)]
            fn sequence(&self) -> Option<Sequence<'_>> {
                let ($($name,)+) = self;
                Some(Sequence::tuple(vec![$($name as &dyn Debug),+]))
            }
        }
    };
}

tuple!(A);
tuple!(A, B);
tuple!(A, B, C);
tuple!(A, B, C, D);
tuple!(A, B, C, D, E);
tuple!(A, B, C, D, E, F);
tuple!(A, B, C, D, E, F, G);
tuple!(A, B, C, D, E, F, G, H);
tuple!(A, B, C, D, E, F, G, H, I);
tuple!(A, B, C, D, E, F, G, H, I, J);
tuple!(A, B, C, D, E, F, G, H, I, J, K);
tuple!(A, B, C, D, E, F, G, H, I, J, K, L);
