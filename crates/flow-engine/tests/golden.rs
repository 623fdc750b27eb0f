//! End-to-end scenarios (§8): source file in, rendered output out, through
//! the three public facade functions.

use std::path::{Path, PathBuf};

use flow_config::ConfigurationBuilder;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Node and path labels for `CamelCase`/decision-style identifiers only
/// stay verbatim in the rendered output with word-splitting turned off.
fn literal_config() -> flow_config::Configuration {
    ConfigurationBuilder::new()
        .split_names_by_words(false)
        .build()
        .unwrap()
}

#[test]
fn linear_workflow_has_one_path_and_no_branches() {
    let config = literal_config();
    let output = flow_engine::analyze_workflow(&fixture("linear.py"), None, &config)
        .expect("analyze_workflow failed");

    assert!(output.contains("validate_input"));
    assert!(output.contains("process_data"));
    assert!(output.contains("save_result"));
    assert!(output.contains("Execution Paths (1 total):"));
    assert!(output.contains("Validation Warnings:"));
}

#[test]
fn money_transfer_two_sibling_decisions_yield_four_paths() {
    let config = literal_config();
    let output = flow_engine::analyze_workflow(&fixture("money_transfer.py"), None, &config)
        .expect("analyze_workflow failed");

    assert!(output.contains("NeedToConvert"));
    assert!(output.contains("IsTFN_Known"));
    assert!(output.contains("Execution Paths (4 total):"));
}

#[test]
fn wait_point_with_timeout_is_a_branch_point() {
    let config = literal_config();
    let output = flow_engine::analyze_workflow(&fixture("wait_approval.py"), None, &config)
        .expect("analyze_workflow failed");

    assert!(output.contains("WaitForApproval"));
    assert!(output.contains("process_approved"));
    assert!(output.contains("handle_timeout"));
    assert!(output.contains("Execution Paths (2 total):"));
    assert!(output.contains("Signaled"));
    assert!(output.contains("Timeout"));
}

#[test]
fn three_decision_loan_approval_yields_eight_paths() {
    let config = literal_config();
    let output = flow_engine::analyze_workflow(&fixture("loan_approval.py"), None, &config)
        .expect("analyze_workflow failed");

    assert!(output.contains("CreditCheckPassed"));
    assert!(output.contains("IncomeVerified"));
    assert!(output.contains("CollateralSufficient"));
    assert!(output.contains("Execution Paths (8 total):"));
}

#[test]
fn cap_violation_is_rejected_before_enumeration() {
    let config = literal_config();
    let err = flow_engine::analyze_workflow(&fixture("cap_violation.py"), None, &config)
        .expect_err("11 decision points should exceed the default max_decision_points of 10");

    let message = err.to_string();
    assert!(message.contains("11"));
    assert!(message.contains("max_decision_points"));
}

#[test]
fn cross_workflow_signal_chain_resolves_sender_to_receiver() {
    let config = literal_config();
    let search_dirs = vec![fixture("signal_receiver.py").parent().unwrap().to_path_buf()];
    let output = flow_engine::analyze_signal_graph(
        &fixture("signal_sender.py"),
        None,
        &search_dirs,
        &config,
    )
    .expect("analyze_signal_graph failed");

    assert!(output.contains("ShipmentCoordinator"));
    assert!(output.contains("CustomsClearance"));
    assert!(output.contains("shipment_packed"));
    assert!(!output.contains("unresolved"));
}
