/// A record field that tracks whether the server sent it.
///
/// JSON distinguishes three cases that a bare `Option` folds into two:
///
/// - `Absent`: the key was not in the object,
/// - `Null`: the key was there with a `null` value,
/// - `Present`: the key carried a value, possibly a zero or an empty string.
///
/// Encoding omits `Absent` fields, writes `null` for `Null` ones and the value
/// for `Present` ones, so a decoded record re-encodes to the same members.
///
/// ```rust
/// use api_types::Field;
///
/// let amount = Field::Present(0_i64);
/// assert_eq!(amount.as_ref(), Some(&0));
/// assert!(Field::<i64>::Absent.as_ref().is_none());
/// assert!(Field::<i64>::Null.is_null());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field<T> {
    Absent,
    Null,
    Present(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Field<T> {
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Returns the value when present, `None` for both absent and null.
    #[must_use]
    pub const fn as_ref(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    pub fn as_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    /// Maps the present value, keeping `Absent` and `Null` as they are.
    pub fn map<U, F>(self, f: F) -> Field<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Absent => Field::Absent,
            Self::Null => Field::Null,
            Self::Present(value) => Field::Present(f(value)),
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    /// `None` becomes `Absent`: a value built in code was never sent as `null`.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Present(value),
            None => Self::Absent,
        }
    }
}
