//! Column roles and their resolution.
//!
//! A fit needs up to four columns: `x`, `xerr`, `y` and `yerr`. Callers may
//! name some of them explicitly (by header or by 1-based position) and let the
//! rest be derived. Derivation walks the roles in that fixed order and gives
//! each unset role the next column after the previously resolved one, skipping
//! columns already claimed by an earlier role.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One of the four fitting roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    X,
    Xerr,
    Y,
    Yerr,
}

impl Role {
    /// Resolution order.
    pub const ALL: [Role; 4] = [Role::X, Role::Xerr, Role::Y, Role::Yerr];

    pub fn name(self) -> &'static str {
        match self {
            Role::X => "x",
            Role::Xerr => "xerr",
            Role::Y => "y",
            Role::Yerr => "yerr",
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            Role::X => 0,
            Role::Xerr => 1,
            Role::Y => 2,
            Role::Yerr => 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference to a column by exact name or by 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Name(String),
    Index(usize),
}

impl From<&str> for ColumnRef {
    fn from(value: &str) -> Self {
        ColumnRef::Name(value.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(value: String) -> Self {
        ColumnRef::Name(value)
    }
}

impl From<usize> for ColumnRef {
    fn from(value: usize) -> Self {
        ColumnRef::Index(value)
    }
}

impl ColumnRef {
    /// Resolve to a 0-based column position among `names`.
    pub(crate) fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<usize> {
        match self {
            ColumnRef::Name(name) => names
                .iter()
                .position(|n| n.as_ref() == name)
                .ok_or_else(|| Error::ColumnExistence(name.clone())),
            ColumnRef::Index(index) => {
                if (1..=names.len()).contains(index) {
                    Ok(index - 1)
                } else {
                    Err(Error::ColumnIndex {
                        index: *index,
                        columns: names.len(),
                    })
                }
            }
        }
    }
}

/// Role hints given at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleHints {
    pub x: Option<ColumnRef>,
    pub xerr: Option<ColumnRef>,
    pub y: Option<ColumnRef>,
    pub yerr: Option<ColumnRef>,
    /// Derive unset roles from column order.
    pub search: bool,
}

impl Default for RoleHints {
    fn default() -> Self {
        Self {
            x: None,
            xerr: None,
            y: None,
            yerr: None,
            search: true,
        }
    }
}

impl RoleHints {
    /// No hints and no derivation: every role starts unbound.
    pub fn none() -> Self {
        Self {
            search: false,
            ..Self::default()
        }
    }

    pub fn get(&self, role: Role) -> Option<&ColumnRef> {
        match role {
            Role::X => self.x.as_ref(),
            Role::Xerr => self.xerr.as_ref(),
            Role::Y => self.y.as_ref(),
            Role::Yerr => self.yerr.as_ref(),
        }
    }

    pub fn with(mut self, role: Role, column: impl Into<ColumnRef>) -> Self {
        let column = Some(column.into());
        match role {
            Role::X => self.x = column,
            Role::Xerr => self.xerr = column,
            Role::Y => self.y = column,
            Role::Yerr => self.yerr = column,
        }
        self
    }

    pub fn search(mut self, search: bool) -> Self {
        self.search = search;
        self
    }
}

/// 0-based column positions bound to each role, indexed by [`Role::slot`].
pub(crate) type Bindings = [Option<usize>; 4];

/// Resolve all four roles in one ordered pass.
pub(crate) fn resolve_roles<S: AsRef<str>>(names: &[S], hints: &RoleHints) -> Result<Bindings> {
    let mut bindings: Bindings = [None; 4];
    let mut cursor = 0usize;

    for role in Role::ALL {
        let resolved = match hints.get(role) {
            Some(column) => Some(column.resolve(names)?),
            None if hints.search => {
                let claimed = &bindings[..role.slot()];
                (cursor..names.len()).find(|idx| !claimed.contains(&Some(*idx)))
            }
            None => None,
        };
        if let Some(idx) = resolved {
            cursor = idx + 1;
        }
        bindings[role.slot()] = resolved;
    }

    Ok(bindings)
}
