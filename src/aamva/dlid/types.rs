//! Typed data element values.
//!
//! Names follow the AAMVA notation: `F` fixed or `V` variable length, the
//! length, then the character class (`A` alpha, `N` numeric, `An`
//! alphanumeric, `Ans` alphanumeric and special).
use std::{fmt, marker::PhantomData, ops::Deref};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid field value: {0}")]
pub struct InvalidFieldValue(MaybeAscii);

#[derive(Clone, PartialEq, Eq)]
struct MaybeAscii(Vec<u8>);

impl fmt::Display for MaybeAscii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) if s.is_ascii() => write!(f, "{s:?}"),
            _ => write!(f, "{:?}", self.0),
        }
    }
}

impl fmt::Debug for MaybeAscii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// ASCII character class.
///
/// # Safety
///
/// The `contains` function must return `true` only for ASCII bytes.
pub unsafe trait CharClass {
    fn contains(c: u8) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Alpha;

unsafe impl CharClass for Alpha {
    fn contains(c: u8) -> bool {
        c.is_ascii_uppercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Numeric;

unsafe impl CharClass for Numeric {
    fn contains(c: u8) -> bool {
        c.is_ascii_digit()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlphaNumeric;

unsafe impl CharClass for AlphaNumeric {
    fn contains(c: u8) -> bool {
        c.is_ascii_uppercase() || c.is_ascii_digit()
    }
}

/// Printable ASCII, space included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlphaNumericSpecial;

unsafe impl CharClass for AlphaNumericSpecial {
    fn contains(c: u8) -> bool {
        (0x20..=0x7e).contains(&c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed<C: CharClass, const N: usize> {
    data: [u8; N],
    class: PhantomData<C>,
}

impl<C: CharClass, const N: usize> Fixed<C, N> {
    pub fn new(value: impl AsRef<[u8]>) -> Result<Self, InvalidFieldValue> {
        let bytes = value.as_ref();
        if bytes.len() != N || !bytes.iter().copied().all(C::contains) {
            return Err(InvalidFieldValue(MaybeAscii(bytes.to_owned())));
        }

        let mut data = [0u8; N];
        data.copy_from_slice(bytes);

        Ok(Self {
            data,
            class: PhantomData,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_str(&self) -> &str {
        unsafe {
            // SAFETY: the character class `C` ensures that all bytes are in the
            //         ASCII range.
            std::str::from_utf8_unchecked(self.as_bytes())
        }
    }
}

impl<C: CharClass, const N: usize> Deref for Fixed<C, N> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

/// Variable length value, between 1 and `N` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable<C: CharClass, const N: usize> {
    data: [u8; N],
    len: usize,
    class: PhantomData<C>,
}

impl<C: CharClass, const N: usize> Variable<C, N> {
    pub fn new(value: impl AsRef<[u8]>) -> Result<Self, InvalidFieldValue> {
        let bytes = value.as_ref();
        let len = bytes.len();
        if len == 0 || len > N || !bytes.iter().copied().all(C::contains) {
            return Err(InvalidFieldValue(MaybeAscii(bytes.to_owned())));
        }

        let mut data = [0u8; N];
        data[..len].copy_from_slice(bytes);

        Ok(Self {
            data,
            len,
            class: PhantomData,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn as_str(&self) -> &str {
        unsafe {
            // SAFETY: the character class `C` ensures that all bytes are in the
            //         ASCII range.
            std::str::from_utf8_unchecked(self.as_bytes())
        }
    }
}

impl<C: CharClass, const N: usize> Deref for Variable<C, N> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

pub type F1A = Fixed<Alpha, 1>;
pub type F2A = Fixed<Alpha, 2>;

pub type F1N = Fixed<Numeric, 1>;
pub type F3N = Fixed<Numeric, 3>;
pub type F8N = Fixed<Numeric, 8>;

pub type V3A = Variable<Alpha, 3>;

pub type V11An = Variable<AlphaNumeric, 11>;

pub type V5Ans = Variable<AlphaNumericSpecial, 5>;
pub type V6Ans = Variable<AlphaNumericSpecial, 6>;
pub type V12Ans = Variable<AlphaNumericSpecial, 12>;

/// Checks `value` against a variable-length printable field of `max` bytes.
///
/// Free-text elements have many distinct maximum lengths; this is the
/// runtime-sized counterpart of [`Variable`] for them.
pub fn is_variable_ans(value: &str, max: usize) -> bool {
    !value.is_empty()
        && value.len() <= max
        && value.bytes().all(AlphaNumericSpecial::contains)
}
