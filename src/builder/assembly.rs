use crate::ast::{Action, Program, Statement, Stream, Table};

pub const NOTHING_SELECTED: &str = "Please choose at least one function.";

/// Merges the selected stages into one program.
///
/// Returns `None` when nothing is selected. A missing action becomes
/// `notify`; stream and query together become a join, so each stream event
/// runs the query and the action sees the joined rows.
pub(super) fn assemble(
    stream: Option<&Stream>,
    query: Option<&Table>,
    action: Option<&Action>,
) -> Option<Program> {
    if stream.is_none() && query.is_none() && action.is_none() {
        return None;
    }
    let actions = vec![action.cloned().unwrap_or(Action::Notify)];

    let statement = match (stream, query) {
        (Some(stream), Some(query)) => Statement::Rule {
            stream: Stream::Join {
                stream: Box::new(stream.clone()),
                table: query.clone(),
                in_params: Vec::new(),
            },
            actions,
        },
        (Some(stream), None) => Statement::Rule {
            stream: stream.clone(),
            actions,
        },
        (None, query) => Statement::Command {
            table: query.cloned(),
            actions,
        },
    };
    Some(Program::new(vec![statement]))
}
