use cinder_core::{Access, AnalyzerError, Node};
use cinder_test_helpers::compile::{analyze, static_options};
use cinder_test_helpers::fixtures::{
    assign_int, function_block, function_block_mut, if_else, if_node, if_true, template, template_with_globals,
    write_placeholder,
};

fn check(mut root: Node) -> Result<(), AnalyzerError> {
    let mut options = static_options();
    options.directly_access_defined_variables = true;
    analyze(&mut root, options).map(|_| ())
}

fn assert_unassigned(root: Node, name: &str) {
    match check(root) {
        Err(AnalyzerError::SemanticAnalyzer { name: reported, .. }) => assert_eq!(reported, name),
        other => panic!("expected ${} to be rejected, got {:?}", name, other),
    }
}

// ============================================================================
// Conditionals
// ============================================================================

#[test]
fn test_simple_if() {
    let root = template(vec![if_true(vec![assign_int("foo", 1)]), write_placeholder("foo")]);
    assert_unassigned(root, "foo");
}

#[test]
fn test_if_partial_else() {
    let root = template(vec![
        if_else(vec![assign_int("foo", 1)], vec![assign_int("bar", 1)]),
        write_placeholder("foo"),
    ]);
    assert_unassigned(root, "foo");
}

#[test]
fn test_partial_if_else() {
    let root = template(vec![
        if_else(vec![assign_int("foo", 1)], vec![assign_int("bar", 1)]),
        write_placeholder("bar"),
    ]);
    assert_unassigned(root, "bar");
}

#[test]
fn test_both_branches_assign() {
    let root = template(vec![
        if_else(vec![assign_int("foo", 1)], vec![assign_int("foo", 2)]),
        write_placeholder("foo"),
    ]);
    assert!(check(root).is_ok());
}

#[test]
fn test_nested_else() {
    let root = template(vec![
        if_else(
            vec![assign_int("foo", 1)],
            vec![if_else(vec![assign_int("foo", 2)], vec![assign_int("foo", 3)])],
        ),
        write_placeholder("foo"),
    ]);
    assert!(check(root).is_ok());
}

#[test]
fn test_nested_if() {
    let root = template(vec![
        if_else(
            vec![if_else(vec![assign_int("foo", 1)], vec![assign_int("foo", 2)])],
            vec![assign_int("foo", 3)],
        ),
        write_placeholder("foo"),
    ]);
    assert!(check(root).is_ok());
}

#[test]
fn test_partial_nested_if() {
    let root = template(vec![
        if_else(
            vec![if_else(vec![assign_int("foo", 1)], vec![assign_int("bar", 2)])],
            vec![assign_int("foo", 3)],
        ),
        write_placeholder("foo"),
    ]);
    assert_unassigned(root, "foo");
}

#[test]
fn test_partial_nested_else() {
    let root = template(vec![
        if_else(
            vec![assign_int("foo", 1)],
            vec![if_else(vec![assign_int("bar", 2)], vec![assign_int("baz", 3)])],
        ),
        write_placeholder("baz"),
    ]);
    assert_unassigned(root, "baz");
}

#[test]
fn test_partial_nested_else_if() {
    let root = template(vec![
        if_else(
            vec![assign_int("foo", 1)],
            vec![if_true(vec![assign_int("foo", 2)])],
        ),
        write_placeholder("foo"),
    ]);
    assert_unassigned(root, "foo");
}

#[test]
fn test_nested_partial_use() {
    let root = template(vec![
        if_true(vec![assign_int("foo", 1)]),
        if_true(vec![write_placeholder("foo")]),
    ]);
    assert_unassigned(root, "foo");
}

#[test]
fn test_assignment_inside_branch_is_visible_later_in_branch() {
    let root = template(vec![if_true(vec![assign_int("foo", 1), write_placeholder("foo")])]);
    assert!(check(root).is_ok());
}

// ============================================================================
// Globals and scopes
// ============================================================================

#[test]
fn test_global_placeholder_is_always_assigned() {
    let root = template_with_globals(&["foo"], vec![write_placeholder("foo")]);
    assert!(check(root).is_ok());
}

#[test]
fn test_function_scope_identifiers_are_assigned() {
    let mut root = template(vec![write_placeholder("self")]);
    function_block_mut(&mut root)
        .scope
        .local_identifiers
        .insert("self".to_string());
    assert!(check(root).is_ok());
}

#[test]
fn test_static_analysis_off_accepts_unassigned_reads() {
    let mut root = template(vec![write_placeholder("foo")]);
    let report = analyze(&mut root, Default::default()).unwrap();
    assert_eq!(report.resolutions[0].resolution.access, Access::Dynamic);
}

#[test]
fn test_first_violation_stops_analysis() {
    let mut root = template(vec![write_placeholder("foo"), write_placeholder("bar")]);
    let err = analyze(&mut root, static_options()).unwrap_err();
    assert_eq!(err.name(), "foo");
    assert!(!err.is_promoted_warning());
}

#[test]
fn test_joined_assignment_enables_direct_access() {
    let mut root = template(vec![
        if_else(vec![assign_int("foo", 1)], vec![assign_int("foo", 2)]),
        write_placeholder("foo"),
    ]);
    let mut options = static_options();
    options.directly_access_defined_variables = true;

    let report = analyze(&mut root, options).unwrap();
    assert_eq!(
        report.resolutions[0].resolution.access,
        Access::Local("foo".to_string())
    );
    let conditional = if_node(function_block(&root), 0);
    assert!(conditional.then_branch.scope.declares("foo"));
    assert!(!function_block(&root).scope.declares("foo"));
}
