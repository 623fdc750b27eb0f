//! The call-site classifier (§4.3): walks a run method body in source
//! order, classifying every call expression against the supported
//! dispatch table. Produces a `Workflow` with a tree-shaped node sequence —
//! `if`/`else` pairs gated on a tracked decision/wait variable become
//! `FlowElement::Branch`, everything else is linear.
//!
//! Strict by design: any construct that contributes control-flow variance
//! but isn't in the supported set aborts the whole call with an
//! `UnsupportedConstruct` error rather than producing partial output.

use std::collections::HashMap;
use std::path::Path;

use crate::ast::{
    ActivityCall, ChildWorkflowCall, DecisionId, DecisionPoint, ExternalSignalSend, FlowElement,
    GraphNode, SignalTarget, SourceLoc, UnsupportedConstruct, WaitPoint, Workflow,
};
use crate::error::{decision_wait_usage_error, unsupported_construct_error, FlowResult};
use crate::locate;
use crate::source::lexer::FStringSegment;
use crate::source::parser::{ClassDef, Expr, Stmt};

/// Canonical activity-dispatch helper spellings (§9: an enumerated set,
/// extending it is a conscious change).
const ACTIVITY_HELPERS: &[&str] = &["execute_activity", "execute_local_activity"];
const CHILD_WORKFLOW_HELPER: &str = "execute_child_workflow";
const DECISION_HELPER: &str = "to_decision";
const WAIT_HELPER: &str = "wait_condition";
const EXTERNAL_SEND_TARGET_HELPER: &str = "get_external_workflow_handle";
const EXTERNAL_SEND_METHOD: &str = "signal";

struct ClassifyCtx<'a> {
    path: &'a Path,
    order: usize,
    /// Local variable name -> the decision/wait node it was bound from.
    bindings: HashMap<String, GraphNode>,
    accepted_wait_signals: Vec<String>,
}

impl<'a> ClassifyCtx<'a> {
    fn next_order(&mut self) -> usize {
        let i = self.order;
        self.order += 1;
        i
    }
}

/// Classify one workflow class's run method into a full `Workflow` record.
pub fn classify_workflow(path: &Path, class: &ClassDef) -> FlowResult<Workflow> {
    let run_method = locate::locate_run_method(path, class)?;
    let signal_handlers = locate::locate_signal_handlers(class)
        .into_iter()
        .map(|m| m.name.clone())
        .collect();

    let mut ctx = ClassifyCtx {
        path,
        order: 0,
        bindings: HashMap::new(),
        accepted_wait_signals: Vec::new(),
    };
    let nodes = classify_suite(&mut ctx, &run_method.body)?;

    Ok(Workflow {
        name: class.name.clone(),
        source_path: path.to_path_buf(),
        run_location: run_method.loc,
        nodes,
        signal_handlers,
        accepted_wait_signals: ctx.accepted_wait_signals,
    })
}

fn classify_suite(ctx: &mut ClassifyCtx, suite: &[Stmt]) -> FlowResult<Vec<FlowElement>> {
    let mut out = Vec::new();
    for stmt in suite {
        classify_stmt(ctx, stmt, &mut out)?;
    }
    Ok(out)
}

fn classify_stmt(ctx: &mut ClassifyCtx, stmt: &Stmt, out: &mut Vec<FlowElement>) -> FlowResult<()> {
    match stmt {
        Stmt::Expr(expr, loc) => {
            if let Some(node) = classify_call_expr(ctx, expr, *loc)? {
                out.push(FlowElement::Node(node));
            }
            Ok(())
        }
        Stmt::Assign { target, value, loc } => {
            if let Some(node) = classify_call_expr(ctx, value, *loc)? {
                if node.is_branch_point() {
                    // The binding is only ever consumed as a gate by a
                    // following `if`, which emits this call site as a
                    // `Branch`. Emitting a standalone `Node` here too would
                    // double-represent it in the tree.
                    ctx.bindings.insert(target.clone(), node);
                } else {
                    out.push(FlowElement::Node(node));
                }
            }
            Ok(())
        }
        Stmt::With { body, .. } => {
            out.extend(classify_suite(ctx, body)?);
            Ok(())
        }
        Stmt::If {
            test,
            body,
            orelse,
            loc,
        } => classify_if(ctx, test, body, orelse, *loc, out),
        Stmt::Unsupported { kind, loc, reason } => Err(unsupported(
            ctx.path,
            UnsupportedConstruct {
                kind: kind.clone(),
                loc: *loc,
                reason: reason.clone(),
            },
        )),
        Stmt::Return(_, _) | Stmt::Skip(_) => Ok(()),
    }
}

fn classify_if(
    ctx: &mut ClassifyCtx,
    test: &Expr,
    body: &[Stmt],
    orelse: &[Stmt],
    loc: SourceLoc,
    out: &mut Vec<FlowElement>,
) -> FlowResult<()> {
    let Some((var, swapped)) = resolve_branch_var(test) else {
        return Err(unsupported(
            ctx.path,
            UnsupportedConstruct {
                kind: "if".to_string(),
                loc,
                reason: "condition is not a reference to a to_decision/wait_condition result"
                    .to_string(),
            },
        ));
    };
    let Some(gate) = ctx.bindings.get(&var).cloned() else {
        return Err(unsupported(
            ctx.path,
            UnsupportedConstruct {
                kind: "if".to_string(),
                loc,
                reason: format!("`{var}` is not a tracked decision or wait variable"),
            },
        ));
    };
    let (true_suite, false_suite): (&[Stmt], &[Stmt]) = if swapped {
        (orelse, body)
    } else {
        (body, orelse)
    };
    let on_true = classify_suite(ctx, true_suite)?;
    let on_false = classify_suite(ctx, false_suite)?;
    out.push(FlowElement::Branch {
        gate,
        on_true,
        on_false,
    });
    Ok(())
}

fn resolve_branch_var(test: &Expr) -> Option<(String, bool)> {
    match test {
        Expr::Name(n) => Some((n.clone(), false)),
        Expr::Not(inner) => match inner.as_ref() {
            Expr::Name(n) => Some((n.clone(), true)),
            _ => None,
        },
        _ => None,
    }
}

fn unsupported(path: &Path, construct: UnsupportedConstruct) -> crate::error::FlowError {
    unsupported_construct_error(path.display(), construct.loc.line, construct.kind, construct.reason)
}

// ---------------------------------------------------------------------------
// Call-site dispatch (§4.3 table)
// ---------------------------------------------------------------------------

fn classify_call_expr(
    ctx: &mut ClassifyCtx,
    expr: &Expr,
    loc: SourceLoc,
) -> FlowResult<Option<GraphNode>> {
    let Expr::Call { func, args, .. } = expr else {
        return Ok(None);
    };

    let Some(method) = func.last_segment() else {
        // The callee itself isn't a plain name/attribute chain (e.g. the
        // result of another call) — a dynamically constructed target.
        if matches!(func.as_ref(), Expr::Call { .. }) {
            return Err(unsupported(
                ctx.path,
                UnsupportedConstruct {
                    kind: "dynamic-dispatch".to_string(),
                    loc,
                    reason: "call target is computed rather than a literal reference".to_string(),
                },
            ));
        }
        return Ok(None);
    };

    if ACTIVITY_HELPERS.contains(&method) {
        return classify_activity(ctx, args, loc).map(Some);
    }
    if method == CHILD_WORKFLOW_HELPER {
        return classify_child_workflow(ctx, args, loc).map(Some);
    }
    if method == DECISION_HELPER {
        return classify_decision(ctx, args, loc).map(Some);
    }
    if method == WAIT_HELPER {
        return classify_wait(ctx, args, loc);
    }
    if method == EXTERNAL_SEND_METHOD {
        if let Some(node) = classify_external_signal(ctx, func, args, loc)? {
            return Ok(Some(node));
        }
    }

    Ok(None)
}

fn positional_args(args: &[crate::source::parser::Arg]) -> Vec<&Expr> {
    args.iter().filter(|a| a.name.is_none()).map(|a| &a.value).collect()
}

fn classify_activity(
    ctx: &mut ClassifyCtx,
    args: &[crate::source::parser::Arg],
    loc: SourceLoc,
) -> FlowResult<GraphNode> {
    let positional = positional_args(args);
    let reference = positional.first().ok_or_else(|| {
        decision_wait_usage_error(ctx.path.display(), loc.line, "execute_activity", "missing activity reference argument")
    })?;
    let display_name = reference.last_segment().ok_or_else(|| {
        decision_wait_usage_error(
            ctx.path.display(),
            loc.line,
            "execute_activity",
            "activity reference must be a plain function or Class.method reference",
        )
    })?;
    Ok(GraphNode::Activity(ActivityCall {
        display_name: display_name.to_string(),
        order_index: ctx.next_order(),
        loc,
    }))
}

fn classify_child_workflow(
    ctx: &mut ClassifyCtx,
    args: &[crate::source::parser::Arg],
    loc: SourceLoc,
) -> FlowResult<GraphNode> {
    let positional = positional_args(args);
    let target = positional.first().ok_or_else(|| {
        decision_wait_usage_error(ctx.path.display(), loc.line, "execute_child_workflow", "missing target argument")
    })?;
    let target_name = match target {
        Expr::Str { value, is_fstring: false } => value.clone(),
        Expr::Name(n) => n.clone(),
        Expr::Attribute(base, attr) if attr == "run" => {
            base.last_segment().map(str::to_string).unwrap_or_else(|| attr.clone())
        }
        Expr::Attribute(_, attr) => attr.clone(),
        _ => {
            return Err(decision_wait_usage_error(
                ctx.path.display(),
                loc.line,
                "execute_child_workflow",
                "target must be a class reference, a Class.run reference, or a string literal",
            ))
        }
    };
    Ok(GraphNode::ChildWorkflow(ChildWorkflowCall {
        target_name,
        order_index: ctx.next_order(),
        loc,
    }))
}

fn classify_decision(
    ctx: &mut ClassifyCtx,
    args: &[crate::source::parser::Arg],
    loc: SourceLoc,
) -> FlowResult<GraphNode> {
    let positional = positional_args(args);
    if positional.len() < 2 {
        return Err(decision_wait_usage_error(
            ctx.path.display(),
            loc.line,
            DECISION_HELPER,
            "expected at least 2 positional arguments (value, name)",
        ));
    }
    let label = literal_str(positional[1]).ok_or_else(|| {
        decision_wait_usage_error(
            ctx.path.display(),
            loc.line,
            DECISION_HELPER,
            "the name argument must be a plain string literal",
        )
    })?;
    Ok(GraphNode::Decision(DecisionPoint {
        id: DecisionId::from_label(&label),
        label,
        order_index: ctx.next_order(),
        loc,
    }))
}

fn classify_wait(
    ctx: &mut ClassifyCtx,
    args: &[crate::source::parser::Arg],
    loc: SourceLoc,
) -> FlowResult<Option<GraphNode>> {
    let positional = positional_args(args);
    match positional.len() {
        2 => Ok(None),
        3 => {
            let label = literal_str(positional[2]).ok_or_else(|| {
                decision_wait_usage_error(
                    ctx.path.display(),
                    loc.line,
                    WAIT_HELPER,
                    "the name argument must be a plain string literal",
                )
            })?;
            ctx.accepted_wait_signals.push(label.clone());
            Ok(Some(GraphNode::Wait(WaitPoint {
                id: DecisionId::from_label(&label),
                label,
                order_index: ctx.next_order(),
                loc,
            })))
        }
        n => Err(decision_wait_usage_error(
            ctx.path.display(),
            loc.line,
            WAIT_HELPER,
            format!("expected 2 (built-in wait) or 3 (branching wait) positional arguments, found {n}"),
        )),
    }
}

fn classify_external_signal(
    ctx: &mut ClassifyCtx,
    func: &Expr,
    args: &[crate::source::parser::Arg],
    loc: SourceLoc,
) -> FlowResult<Option<GraphNode>> {
    let Expr::Attribute(base, _) = func else {
        return Ok(None);
    };
    let Expr::Call {
        func: inner_func,
        args: inner_args,
        ..
    } = base.as_ref()
    else {
        return Ok(None);
    };
    if inner_func.last_segment() != Some(EXTERNAL_SEND_TARGET_HELPER) {
        return Ok(None);
    }
    let inner_positional = positional_args(inner_args);
    let target_expr = inner_positional.first().ok_or_else(|| {
        decision_wait_usage_error(
            ctx.path.display(),
            loc.line,
            EXTERNAL_SEND_TARGET_HELPER,
            "missing target-workflow argument",
        )
    })?;
    let target = extract_signal_target(target_expr);

    let positional = positional_args(args);
    let signal_name = positional
        .first()
        .and_then(|e| literal_str(e))
        .ok_or_else(|| {
            decision_wait_usage_error(
                ctx.path.display(),
                loc.line,
                EXTERNAL_SEND_METHOD,
                "the signal name argument must be a plain string literal",
            )
        })?;

    Ok(Some(GraphNode::ExternalSignal(ExternalSignalSend {
        signal_name,
        target,
        order_index: ctx.next_order(),
        loc,
    })))
}

/// A plain (non-f-string) string literal, for name-bearing arguments that
/// must be statically known.
fn literal_str(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Str {
            value,
            is_fstring: false,
        } => Some(value.clone()),
        _ => None,
    }
}

/// External-signal target extraction (§4.3 name-extraction rules): a plain
/// literal yields `Literal`; an f-string with a literal head and at least
/// one placeholder yields `Pattern` with every placeholder masked as
/// `{*}`; anything else yields `Dynamic`.
fn extract_signal_target(expr: &Expr) -> SignalTarget {
    match expr {
        Expr::Str {
            value,
            is_fstring: false,
        } => SignalTarget::Literal(value.clone()),
        Expr::Str {
            value,
            is_fstring: true,
        } => {
            let segments = crate::source::lexer::parse_fstring_body(value);
            let has_placeholder = segments.iter().any(|s| matches!(s, FStringSegment::Placeholder));
            if !has_placeholder {
                return SignalTarget::Literal(value.clone());
            }
            let mut pattern = String::new();
            for seg in segments {
                match seg {
                    FStringSegment::Literal(s) => pattern.push_str(&s),
                    FStringSegment::Placeholder => pattern.push_str("{*}"),
                }
            }
            SignalTarget::Pattern(pattern)
        }
        _ => SignalTarget::Dynamic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::lexer::tokenize;
    use crate::source::parser::parse_module;
    use std::path::Path;

    fn classify_src(src: &str) -> FlowResult<Workflow> {
        let toks = tokenize("t.py", src).unwrap();
        let module = parse_module("t.py", &toks).unwrap();
        classify_workflow(Path::new("t.py"), &module.classes[0])
    }

    #[test]
    fn linear_workflow_has_no_branch_points() {
        let wf = classify_src(
            "@workflow.defn\nclass Linear:\n    @workflow.run\n    async def run(self):\n        await workflow.execute_activity(validate_input)\n        await workflow.execute_activity(process_data)\n        await workflow.execute_activity(save_result)\n",
        )
        .unwrap();
        assert_eq!(wf.branch_count(), 0);
        let names: Vec<_> = wf.activities().iter().map(|n| match n {
            GraphNode::Activity(a) => a.display_name.as_str(),
            _ => unreachable!(),
        }).collect();
        assert_eq!(names, vec!["validate_input", "process_data", "save_result"]);
    }

    #[test]
    fn decision_gates_its_true_branch_only() {
        let wf = classify_src(
            "@workflow.defn\nclass Transfer:\n    @workflow.run\n    async def run(self):\n        await workflow.execute_activity(withdraw_funds)\n        needs_convert = self.to_decision(True, \"NeedToConvert\")\n        if needs_convert:\n            await workflow.execute_activity(currency_convert)\n        await workflow.execute_activity(deposit_funds)\n",
        )
        .unwrap();
        assert_eq!(wf.branch_count(), 1);
        assert_eq!(wf.nodes.len(), 3);
        match &wf.nodes[1] {
            FlowElement::Branch { gate, on_true, on_false } => {
                assert!(matches!(gate, GraphNode::Decision(d) if d.label == "NeedToConvert"));
                assert_eq!(on_true.len(), 1);
                assert!(on_false.is_empty());
            }
            _ => panic!("expected branch"),
        }
    }

    #[test]
    fn non_literal_decision_name_is_fatal() {
        let err = classify_src(
            "@workflow.defn\nclass Bad:\n    @workflow.run\n    async def run(self):\n        label = compute_label()\n        self.to_decision(True, label)\n",
        );
        assert!(err.is_err());
    }

    #[test]
    fn two_argument_wait_is_ignored() {
        let wf = classify_src(
            "@workflow.defn\nclass Ping:\n    @workflow.run\n    async def run(self):\n        await workflow.wait_condition(lambda: True, 60)\n        await workflow.execute_activity(done)\n",
        )
        .unwrap();
        assert_eq!(wf.branch_count(), 0);
        assert_eq!(wf.activities().len(), 1);
    }

    #[test]
    fn three_argument_wait_is_a_branch_point() {
        let wf = classify_src(
            "@workflow.defn\nclass Approval:\n    @workflow.run\n    async def run(self):\n        outcome = self.wait_condition(lambda: True, 60, \"WaitForApproval\")\n        if outcome:\n            await workflow.execute_activity(process_approved)\n        else:\n            await workflow.execute_activity(handle_timeout)\n",
        )
        .unwrap();
        assert_eq!(wf.branch_count(), 1);
        assert_eq!(wf.accepted_wait_signals, vec!["WaitForApproval".to_string()]);
    }

    #[test]
    fn external_signal_literal_target() {
        let wf = classify_src(
            "@workflow.defn\nclass Sender:\n    @workflow.run\n    async def run(self):\n        await self.get_external_workflow_handle(\"shipping\").signal(\"ship_order\")\n",
        )
        .unwrap();
        assert_eq!(wf.nodes.len(), 1);
        match &wf.nodes[0] {
            FlowElement::Node(GraphNode::ExternalSignal(s)) => {
                assert_eq!(s.signal_name, "ship_order");
                assert_eq!(s.target, SignalTarget::Literal("shipping".to_string()));
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn external_signal_pattern_target_masks_placeholder() {
        let wf = classify_src(
            "@workflow.defn\nclass Sender:\n    @workflow.run\n    async def run(self):\n        await self.get_external_workflow_handle(f\"shipping-{region_id}\").signal(\"ship_order\")\n",
        )
        .unwrap();
        match &wf.nodes[0] {
            FlowElement::Node(GraphNode::ExternalSignal(s)) => {
                assert_eq!(s.target, SignalTarget::Pattern("shipping-{*}".to_string()));
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn loop_is_unsupported() {
        let err = classify_src(
            "@workflow.defn\nclass Bad:\n    @workflow.run\n    async def run(self):\n        for x in items:\n            await workflow.execute_activity(step)\n",
        );
        assert!(err.is_err());
    }

    #[test]
    fn if_not_gated_on_decision_is_unsupported() {
        let err = classify_src(
            "@workflow.defn\nclass Bad:\n    @workflow.run\n    async def run(self):\n        if some_flag:\n            await workflow.execute_activity(step)\n",
        );
        assert!(err.is_err());
    }
}
