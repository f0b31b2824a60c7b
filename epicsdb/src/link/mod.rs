use std::fmt;

/// What a link points at. Only the resolved name is kept: links reference
/// records, they never own them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkTarget {
    /// A record built in this database
    Record(String),
    /// A record defined elsewhere, known only by name
    Import(String),
}

impl LinkTarget {
    pub fn name(&self) -> &str {
        match self {
            LinkTarget::Record(name) | LinkTarget::Import(name) => name,
        }
    }
}

/// A process variable link: a record, an optional field of that record,
/// and a list of specifiers such as `PP` or `MS`.
///
/// Links are immutable. [`Link::append`] returns a new link with the extra
/// specifiers added after the existing ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    target: LinkTarget,
    field: Option<String>,
    specifiers: Vec<String>,
}

impl Link {
    pub(crate) fn new(target: LinkTarget, field: Option<String>) -> Self {
        Link {
            target,
            field,
            specifiers: Vec::new(),
        }
    }

    pub fn target(&self) -> &LinkTarget {
        &self.target
    }

    pub fn target_name(&self) -> &str {
        self.target.name()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn specifiers(&self) -> &[String] {
        &self.specifiers
    }

    /// Returns a copy of this link with `specifiers` appended.
    pub fn append<I, S>(&self, specifiers: I) -> Link
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut link = self.clone();
        link.specifiers.extend(specifiers.into_iter().map(Into::into));
        link
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.target.name())?;
        if let Some(field) = &self.field {
            write!(f, ".{field}")?;
        }
        for specifier in &self.specifiers {
            write!(f, " {specifier}")?;
        }
        Ok(())
    }
}

impl From<&Link> for Link {
    fn from(link: &Link) -> Self {
        link.clone()
    }
}

/// "Process Passive": the linked record is processed if its SCAN is Passive.
pub fn pp(link: impl Into<Link>) -> Link {
    link.into().append(["PP"])
}

/// "Channel Access": force the link to be treated as a CA link.
pub fn ca(link: impl Into<Link>) -> Link {
    link.into().append(["CA"])
}

/// "Channel Process": the linking record processes whenever the linked
/// record is updated.
pub fn cp(link: impl Into<Link>) -> Link {
    link.into().append(["CP"])
}

/// "Channel Process if Passive": like CP, but only if the linking record is
/// Passive.
pub fn cpp(link: impl Into<Link>) -> Link {
    link.into().append(["CPP"])
}

/// "Maximise Severity": propagate alarm severity, status becomes LINK_ALARM.
pub fn ms(link: impl Into<Link>) -> Link {
    link.into().append(["MS"])
}

/// "Maximise Status and Severity".
pub fn mss(link: impl Into<Link>) -> Link {
    link.into().append(["MSS"])
}

/// "Maximise Severity if Invalid".
pub fn msi(link: impl Into<Link>) -> Link {
    link.into().append(["MSI"])
}

/// "Non-Maximise Severity": no alarm is propagated.
pub fn nms(link: impl Into<Link>) -> Link {
    link.into().append(["NMS"])
}

/// "No Process": the linked record is not processed.
pub fn np(link: impl Into<Link>) -> Link {
    link.into().append(["NPP"])
}
