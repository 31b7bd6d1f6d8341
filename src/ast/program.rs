//! Program nodes of the rule language and their pretty-printed form.
//!
//! The printed form follows the rule language's surface syntax:
//!
//! ```text
//! edge (monitor (@org.weather.current(location=$context.location.home))) on temperature >= 30 => @com.twitter.post(status=summary);
//! now => (@com.bing.web_search(query="rust")), title =~ "crate" => notify;
//! ```
use super::{BooleanExpression, FunctionDef, Value};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Selector {
    Device { kind: String },
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Device { kind } => write!(f, "@{}", kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputParam {
    pub name: String,
    pub value: Value,
}

impl fmt::Display for InputParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// A call to one function of one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub selector: Selector,
    pub channel: String,
    pub in_params: Vec<InputParam>,
    pub schema: FunctionDef,
}

impl Invocation {
    pub fn new(kind: impl Into<String>, schema: FunctionDef) -> Self {
        Self {
            selector: Selector::Device { kind: kind.into() },
            channel: schema.name.clone(),
            in_params: Vec::new(),
            schema,
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({})",
            self.selector,
            self.channel,
            self.in_params.iter().join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Table {
    Invocation(Invocation),
    Filter {
        table: Box<Table>,
        filter: BooleanExpression,
    },
}

impl Table {
    /// The invocation at the root of this table, looking through filters.
    pub fn invocation(&self) -> &Invocation {
        match self {
            Table::Invocation(inv) => inv,
            Table::Filter { table, .. } => table.invocation(),
        }
    }

    pub fn invocation_mut(&mut self) -> &mut Invocation {
        match self {
            Table::Invocation(inv) => inv,
            Table::Filter { table, .. } => table.invocation_mut(),
        }
    }

    pub fn schema(&self) -> &FunctionDef {
        &self.invocation().schema
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Table::Invocation(inv) => write!(f, "{}", inv),
            Table::Filter { table, filter } => write!(f, "({}), {}", table, filter),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stream {
    Monitor(Table),
    /// Emits only on transitions where the predicate becomes true.
    EdgeFilter {
        stream: Box<Stream>,
        filter: BooleanExpression,
    },
    /// Every stream event triggers the table; its output feeds the table's
    /// `in_params`.
    Join {
        stream: Box<Stream>,
        table: Table,
        in_params: Vec<InputParam>,
    },
}

impl Stream {
    pub fn invocation(&self) -> &Invocation {
        match self {
            Stream::Monitor(table) => table.invocation(),
            Stream::EdgeFilter { stream, .. } | Stream::Join { stream, .. } => stream.invocation(),
        }
    }

    pub fn invocation_mut(&mut self) -> &mut Invocation {
        match self {
            Stream::Monitor(table) => table.invocation_mut(),
            Stream::EdgeFilter { stream, .. } | Stream::Join { stream, .. } => {
                stream.invocation_mut()
            }
        }
    }

    pub fn schema(&self) -> &FunctionDef {
        &self.invocation().schema
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Monitor(table) => write!(f, "monitor ({})", table),
            Stream::EdgeFilter { stream, filter } => write!(f, "edge ({}) on {}", stream, filter),
            Stream::Join {
                stream,
                table,
                in_params,
            } => {
                write!(f, "({}) join ({})", stream, table)?;
                if !in_params.is_empty() {
                    write!(f, " on ({})", in_params.iter().join(", "))?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Invocation(Invocation),
    /// Shows the results to the user.
    Notify,
}

impl Action {
    pub fn invocation(&self) -> Option<&Invocation> {
        match self {
            Action::Invocation(inv) => Some(inv),
            Action::Notify => None,
        }
    }

    pub fn invocation_mut(&mut self) -> Option<&mut Invocation> {
        match self {
            Action::Invocation(inv) => Some(inv),
            Action::Notify => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Invocation(inv) => write!(f, "{}", inv),
            Action::Notify => write!(f, "notify"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// Runs the actions once per stream event.
    Rule { stream: Stream, actions: Vec<Action> },
    /// Runs the actions once, over the current result of the table if any.
    Command {
        table: Option<Table>,
        actions: Vec<Action>,
    },
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Rule { stream, actions } => {
                write!(f, "{} => {};", stream, actions.iter().join(", "))
            }
            Statement::Command { table, actions } => {
                write!(f, "now => ")?;
                if let Some(table) = table {
                    write!(f, "{} => ", table)?;
                }
                write!(f, "{};", actions.iter().join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn prettyprint(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.statements.iter().join("\n"))
    }
}
