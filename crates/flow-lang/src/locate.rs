//! The workflow locator (§4.2): finds workflow-annotated classes, their
//! single run method, and their signal-handler methods, purely from
//! annotation tokens — no reflection, no evaluation.
//!
//! The three recognised annotation spellings are an explicit, documented
//! enumerated set (per §9 DESIGN NOTES); extending it is a conscious change.

use std::path::Path;

use crate::error::{parse_error, FlowResult};
use crate::source::parser::{ClassDef, Decorator, FunctionDef};

pub const WORKFLOW_DEFN: &str = "workflow.defn";
pub const WORKFLOW_RUN: &str = "workflow.run";
pub const WORKFLOW_SIGNAL: &str = "workflow.signal";

fn has_decorator(decorators: &[Decorator], name: &str) -> bool {
    decorators.iter().any(|d| d.name == name)
}

/// Every class in the module annotated `@workflow.defn`.
pub fn locate_classes<'a>(
    path: &Path,
    classes: &'a [ClassDef],
) -> FlowResult<Vec<&'a ClassDef>> {
    let found: Vec<&ClassDef> = classes
        .iter()
        .filter(|c| has_decorator(&c.decorators, WORKFLOW_DEFN))
        .collect();
    if found.is_empty() {
        return Err(parse_error(
            path.display(),
            None,
            "no class annotated as a workflow definition",
            "add a `@workflow.defn` decorator to the workflow class",
        ));
    }
    Ok(found)
}

/// The single `@workflow.run` method of a workflow class. Fatal if absent
/// or ambiguous.
pub fn locate_run_method<'a>(path: &Path, class: &'a ClassDef) -> FlowResult<&'a FunctionDef> {
    let candidates: Vec<&FunctionDef> = class
        .methods
        .iter()
        .filter(|m| has_decorator(&m.decorators, WORKFLOW_RUN))
        .collect();
    match candidates.len() {
        0 => Err(parse_error(
            path.display(),
            Some(class.loc.line),
            format!("workflow class `{}` has no `@workflow.run` method", class.name),
            "add a `@workflow.run` decorator to the entry method",
        )),
        1 => Ok(candidates[0]),
        _ => Err(parse_error(
            path.display(),
            Some(class.loc.line),
            format!(
                "workflow class `{}` has {} methods annotated `@workflow.run`",
                class.name,
                candidates.len()
            ),
            "keep exactly one `@workflow.run` method per workflow class",
        )),
    }
}

/// Every method annotated `@workflow.signal` — the signal names this
/// workflow accepts asynchronously from peers.
pub fn locate_signal_handlers(class: &ClassDef) -> Vec<&FunctionDef> {
    class
        .methods
        .iter()
        .filter(|m| has_decorator(&m.decorators, WORKFLOW_SIGNAL))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::lexer::tokenize;
    use crate::source::parser::parse_module;

    fn classes(src: &str) -> Vec<ClassDef> {
        let toks = tokenize("t.py", src).unwrap();
        parse_module("t.py", &toks).unwrap().classes
    }

    #[test]
    fn finds_annotated_class() {
        let classes = classes(
            "@workflow.defn\nclass Foo:\n    @workflow.run\n    async def run(self):\n        pass\n",
        );
        let found = locate_classes(Path::new("t.py"), &classes).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Foo");
    }

    #[test]
    fn missing_workflow_defn_errors() {
        let classes = classes("class Foo:\n    async def run(self):\n        pass\n");
        assert!(locate_classes(Path::new("t.py"), &classes).is_err());
    }

    #[test]
    fn missing_run_method_errors() {
        let classes = classes("@workflow.defn\nclass Foo:\n    async def helper(self):\n        pass\n");
        let found = locate_classes(Path::new("t.py"), &classes).unwrap();
        assert!(locate_run_method(Path::new("t.py"), found[0]).is_err());
    }

    #[test]
    fn ambiguous_run_method_errors() {
        let classes = classes(
            "@workflow.defn\nclass Foo:\n    @workflow.run\n    async def run(self):\n        pass\n    @workflow.run\n    async def run2(self):\n        pass\n",
        );
        let found = locate_classes(Path::new("t.py"), &classes).unwrap();
        assert!(locate_run_method(Path::new("t.py"), found[0]).is_err());
    }

    #[test]
    fn collects_signal_handlers() {
        let classes = classes(
            "@workflow.defn\nclass Foo:\n    @workflow.run\n    async def run(self):\n        pass\n    @workflow.signal\n    async def ship(self):\n        pass\n    @workflow.signal\n    async def cancel(self):\n        pass\n",
        );
        let handlers = locate_signal_handlers(&classes[0]);
        let names: Vec<_> = handlers.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["ship", "cancel"]);
    }
}
