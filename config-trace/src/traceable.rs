use std::fmt::{self, Debug, Display, Formatter};

use crate::source::Source;

/// Whether a value was read from the document or substituted as a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueOrigin {
    #[default]
    Explicit,
    Defaulted,
}

/// A value paired with the place it was read from.
#[derive(Clone, PartialEq)]
pub struct Traceable<T> {
    value: T,
    source: Source,
    origin: ValueOrigin,
    secret: bool,
}

impl<T> Traceable<T> {
    pub fn of(source: Source, value: T) -> Self {
        Self {
            value,
            source,
            origin: ValueOrigin::Explicit,
            secret: false,
        }
    }

    pub fn defaulted(source: Source, value: T) -> Self {
        Self {
            origin: ValueOrigin::Defaulted,
            ..Self::of(source, value)
        }
    }

    /// Mark the value as sensitive so diagnostics never print it.
    pub fn into_secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn origin(&self) -> ValueOrigin {
        self.origin
    }

    pub fn is_defaulted(&self) -> bool {
        self.origin == ValueOrigin::Defaulted
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// Derive a new value at the same source, keeping origin and secrecy.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Traceable<U> {
        Traceable {
            value: f(self.value),
            source: self.source,
            origin: self.origin,
            secret: self.secret,
        }
    }

    pub fn as_ref(&self) -> Traceable<&T> {
        Traceable {
            value: &self.value,
            source: self.source.clone(),
            origin: self.origin,
            secret: self.secret,
        }
    }
}

impl<T: Debug> Debug for Traceable<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.secret {
            write!(f, "*** @ {}", self.source)
        } else {
            write!(f, "{:?} @ {}", self.value, self.source)
        }
    }
}

impl<T: Display> Display for Traceable<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.secret {
            f.write_str("***")
        } else {
            self.value.fmt(f)
        }
    }
}

/// A possibly absent value. An absence still knows where it was looked for.
#[derive(Clone, PartialEq)]
pub struct OptTraceable<T> {
    value: Option<T>,
    source: Source,
    secret: bool,
}

impl<T> OptTraceable<T> {
    pub fn of_nullable(source: Source, value: Option<T>) -> Self {
        Self {
            value,
            source,
            secret: false,
        }
    }

    pub fn empty(source: Source) -> Self {
        Self::of_nullable(source, None)
    }

    pub fn into_secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// Present values become explicit traceables, absent ones are dropped.
    pub fn into_traceable(self) -> Option<Traceable<T>> {
        let OptTraceable {
            value,
            source,
            secret,
        } = self;
        value.map(|value| Traceable {
            value,
            source,
            origin: ValueOrigin::Explicit,
            secret,
        })
    }

    /// Substitute `default` when absent. `track` controls whether the result
    /// remembers that it was defaulted.
    pub fn or_default_value(self, default: T, track: bool) -> Traceable<T> {
        let secret = self.secret;
        let traced = match self.value {
            Some(value) => Traceable::of(self.source, value),
            None if track => Traceable::defaulted(self.source, default),
            None => Traceable::of(self.source, default),
        };
        Traceable { secret, ..traced }
    }

    pub fn into_option(self) -> Option<T> {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OptTraceable<U> {
        OptTraceable {
            value: self.value.map(f),
            source: self.source,
            secret: self.secret,
        }
    }
}

impl<T: Debug> Debug for OptTraceable<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (&self.value, self.secret) {
            (None, _) => write!(f, "<absent> @ {}", self.source),
            (Some(_), true) => write!(f, "*** @ {}", self.source),
            (Some(value), false) => write!(f, "{value:?} @ {}", self.source),
        }
    }
}

/// Anything that can be named as the subject of a diagnostic.
pub trait Traced {
    fn source(&self) -> &Source;

    /// Printable value, `None` for absences; secrets render as `***`.
    fn describe(&self) -> Option<String>;
}

impl<T: Debug> Traced for Traceable<T> {
    fn source(&self) -> &Source {
        &self.source
    }

    fn describe(&self) -> Option<String> {
        if self.secret {
            return Some("***".to_string());
        }
        Some(describe_value(&self.value))
    }
}

impl<T: Debug> Traced for OptTraceable<T> {
    fn source(&self) -> &Source {
        &self.source
    }

    fn describe(&self) -> Option<String> {
        match &self.value {
            None => None,
            Some(_) if self.secret => Some("***".to_string()),
            Some(value) => Some(describe_value(value)),
        }
    }
}

impl Traced for Source {
    fn source(&self) -> &Source {
        self
    }

    fn describe(&self) -> Option<String> {
        None
    }
}

// Strings print without Debug quotes; everything else uses Debug.
fn describe_value<T: Debug>(value: &T) -> String {
    let text = format!("{value:?}");
    match text.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(inner) if !inner.contains('"') => inner.to_string(),
        _ => text,
    }
}
