//! Integration tests for workspace scanning and context resolution.
//!
//! These exercise the scan → resolve pipeline against real temporary
//! directories, covering the pairing rules end to end.

mod common;

use common::TestWorkspace;
use devhand::config::MarkerConfig;
use devhand::engine::{locate_workspace, resolve, resolve_invocation, scan, ContextError, Role};

fn default_markers() -> MarkerConfig {
    MarkerConfig::default()
}

// =============================================================================
// Sibling pairing
// =============================================================================

#[test]
fn frontend_resolves_backend_sibling() {
    let ws = TestWorkspace::paired();
    let map = scan(ws.root(), &default_markers()).unwrap();

    let ctx = resolve(&ws.frontend(), &map).unwrap();
    assert_eq!(ctx.current_role(), Some(Role::Frontend));
    assert_eq!(ctx.sibling().unwrap().name, "hello-world-be");
    assert_eq!(ctx.sibling().unwrap().role, Role::Backend);
}

#[test]
fn backend_resolves_frontend_sibling() {
    let ws = TestWorkspace::paired();
    let map = scan(ws.root(), &default_markers()).unwrap();

    let ctx = resolve(&ws.backend(), &map).unwrap();
    assert_eq!(ctx.current_role(), Some(Role::Backend));
    assert_eq!(ctx.sibling().unwrap().name, "hello-world-fe");
}

#[test]
fn zero_complement_candidates_never_fail_resolution() {
    let ws = TestWorkspace::empty();
    let fe = ws.add_project("solo-fe", "package.json");
    let map = scan(ws.root(), &default_markers()).unwrap();

    let ctx = resolve(&fe, &map).unwrap();
    assert!(ctx.sibling().is_none());
    assert!(!ctx.warnings().is_empty());
}

#[test]
fn two_complement_candidates_never_fail_resolution() {
    let ws = TestWorkspace::empty();
    let fe = ws.add_project("app-fe", "package.json");
    ws.add_project("api-a", "pyproject.toml");
    ws.add_project("api-b", "pyproject.toml");
    let map = scan(ws.root(), &default_markers()).unwrap();

    let ctx = resolve(&fe, &map).unwrap();
    assert!(ctx.sibling().is_none());
    assert!(ctx.warnings().iter().any(|w| w.contains("2 candidate")));
}

// =============================================================================
// Positions
// =============================================================================

#[test]
fn workspace_root_has_no_current_project() {
    let ws = TestWorkspace::paired();
    let map = scan(ws.root(), &default_markers()).unwrap();

    let ctx = resolve(ws.root(), &map).unwrap();
    assert!(ctx.is_workspace_root());
    assert_eq!(ctx.projects().len(), 2);
}

#[test]
fn deeply_nested_cwd_resolves_by_longest_prefix() {
    let ws = TestWorkspace::paired();
    ws.write_file("hello-world-fe/src/app/pages/index.tsx", "");
    let map = scan(ws.root(), &default_markers()).unwrap();

    let nested = ws.frontend().join("src").join("app").join("pages");
    let ctx = resolve(&nested, &map).unwrap();
    assert_eq!(ctx.current().unwrap().name, "hello-world-fe");
}

#[test]
fn unrelated_directory_is_outside_the_workspace() {
    let ws = TestWorkspace::paired();
    let elsewhere = TestWorkspace::empty();
    let map = scan(ws.root(), &default_markers()).unwrap();

    let err = resolve(elsewhere.root(), &map).unwrap_err();
    assert!(matches!(err, ContextError::OutsideWorkspace(_)));
}

// =============================================================================
// Root discovery
// =============================================================================

#[test]
fn root_located_from_every_position() {
    let ws = TestWorkspace::paired();
    ws.write_file("hello-world-be/app/routes/users.py", "");

    for cwd in [
        ws.root().to_path_buf(),
        ws.frontend(),
        ws.backend(),
        ws.backend().join("app").join("routes"),
    ] {
        let root = locate_workspace(&cwd, &default_markers()).unwrap();
        assert_eq!(root, ws.root(), "wrong root from {}", cwd.display());
    }
}

#[test]
fn invocation_respects_workspace_marker_overrides() {
    let ws = TestWorkspace::empty();
    ws.add_project("client", "angular.json");
    ws.add_project("server", "go.mod");
    ws.write_config(
        "[markers]\nfrontend = [\"angular.json\"]\nbackend = [\"go.mod\"]\n",
    );

    // User-level defaults cannot locate this workspace, but an explicit
    // scan with the workspace markers classifies both projects.
    let result = devhand::config::DhConfig::load(Some(ws.root())).unwrap();
    let map = scan(ws.root(), &result.config.markers()).unwrap();
    assert_eq!(map.len(), 2);

    let ctx = resolve(&ws.root().join("client"), &map).unwrap();
    assert_eq!(ctx.current_role(), Some(Role::Frontend));
    assert_eq!(ctx.sibling().unwrap().name, "server");
}

#[test]
fn full_invocation_pipeline_from_project_dir() {
    let ws = TestWorkspace::paired();
    let invocation = resolve_invocation(&ws.frontend()).unwrap();

    assert_eq!(invocation.map.len(), 2);
    assert_eq!(invocation.context.current().unwrap().role, Role::Frontend);
    assert_eq!(
        invocation.context.sibling().unwrap().name,
        "hello-world-be"
    );
}

// =============================================================================
// Classification details
// =============================================================================

#[test]
fn backend_markers_win_over_frontend_markers() {
    let ws = TestWorkspace::empty();
    let both = ws.add_project("fullstack", "package.json");
    ws.write_file("fullstack/pyproject.toml", "");
    let map = scan(ws.root(), &default_markers()).unwrap();

    assert_eq!(map.get(&both).unwrap().role, Role::Backend);
}

#[test]
fn unmarked_directories_are_not_projects() {
    let ws = TestWorkspace::paired();
    ws.write_file("docs/README.md", "");
    let map = scan(ws.root(), &default_markers()).unwrap();

    assert_eq!(map.len(), 2);
    assert!(map.get(&ws.root().join("docs")).is_none());
}
