use super::*;

fn checks() -> Vec<String> {
    vec!["workflow".to_string(), "ci".to_string()]
}

fn pair<'a>(base_ref: &'a str, head_ref: &'a str) -> BranchPair<'a> {
    BranchPair {
        base_ref,
        head_ref,
        head_sha: "6dcb09b5b57875f334f61aebed695e2e4193db5e",
    }
}

#[test]
fn test_gitflow_definition_shape() {
    let definition = WorkflowDefinition::gitflow(&checks());

    assert_eq!(definition.default_branch, "develop");
    let names: Vec<&str> = definition.branches.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["master", "develop", "release/"]);
    assert!(definition.branches.iter().all(|p| p.stable));
    assert!(definition.branches[0].releasable);
    assert!(definition.branches[2].starts_with);
}

#[test]
fn test_only_master_and_develop_protected_at_startup() {
    let definition = WorkflowDefinition::gitflow(&checks());

    let protected: Vec<&str> = definition
        .protected_at_startup()
        .map(|p| p.name.as_str())
        .collect();

    assert_eq!(protected, vec!["master", "develop"]);
}

#[test]
fn test_master_accepts_release_and_hotfix() {
    let definition = WorkflowDefinition::gitflow(&checks());

    assert_eq!(definition.verdict("master", "release/1.2"), Verdict::Compliant);
    assert_eq!(definition.verdict("master", "hotfix/crash"), Verdict::Compliant);
    assert_eq!(
        definition.verdict("master", "feature/login"),
        Verdict::NonCompliant
    );
    assert_eq!(definition.verdict("master", "develop"), Verdict::NonCompliant);
}

#[test]
fn test_develop_accepts_work_branches() {
    let definition = WorkflowDefinition::gitflow(&checks());

    for head in ["feature/a", "fix/b", "enhancement/c", "bugfix/d"] {
        assert_eq!(definition.verdict("develop", head), Verdict::Compliant, "{head}");
    }
    assert_eq!(
        definition.verdict("develop", "release/1.2"),
        Verdict::NonCompliant
    );
}

#[test]
fn test_release_prefix_policy() {
    let definition = WorkflowDefinition::gitflow(&checks());

    assert_eq!(
        definition.verdict("release/1.2", "hotfix/typo"),
        Verdict::Compliant
    );
    assert_eq!(
        definition.verdict("release/1.2", "feature/late"),
        Verdict::NonCompliant
    );
}

#[test]
fn test_unpoliced_base_is_compliant() {
    let definition = WorkflowDefinition::gitflow(&checks());

    assert!(definition.policy_for("gh-pages").is_none());
    assert_eq!(
        definition.verdict("gh-pages", "anything/at-all"),
        Verdict::Compliant
    );
}

#[test]
fn test_exact_names_do_not_match_as_prefix() {
    let definition = WorkflowDefinition::gitflow(&checks());

    assert!(definition.policy_for("master-old").is_none());
    assert!(definition.policy_for("developer").is_none());
}

#[test]
fn test_first_matching_policy_wins() {
    let mut definition = WorkflowDefinition::gitflow(&checks());
    let mut catch_all = definition.branches[2].clone();
    catch_all.name = "rel".to_string();
    catch_all.requirements.accepted_head_prefixes = vec!["feature/".to_string()];
    definition.branches.insert(0, catch_all);

    assert_eq!(
        definition.verdict("release/1.2", "feature/x"),
        Verdict::Compliant
    );
}

#[test]
fn test_check_workflow_compliant_status() {
    let definition = WorkflowDefinition::gitflow(&checks());

    let check = check_workflow(
        &definition,
        "octocat/hello-world",
        pair("master", "release/1.2"),
        Some("https://wiki.example.com/gitflow"),
    );

    assert_eq!(check.verdict, Verdict::Compliant);
    assert_eq!(check.status.context, WORKFLOW_CONTEXT);
    assert_eq!(check.status.state, StatusState::Success);
    assert_eq!(
        check.status.description.as_deref(),
        Some("Great! You comply with the workflow")
    );
    assert_eq!(check.status.repository, "octocat/hello-world");
    assert_eq!(check.status.sha, "6dcb09b5b57875f334f61aebed695e2e4193db5e");
}

#[test]
fn test_check_workflow_non_compliant_status() {
    let definition = WorkflowDefinition::gitflow(&checks());

    let check = check_workflow(
        &definition,
        "octocat/hello-world",
        pair("develop", "hotfix/oops"),
        None,
    );

    assert_eq!(check.verdict, Verdict::NonCompliant);
    assert_eq!(check.status.state, StatusState::Error);
    assert_eq!(
        check.status.description.as_deref(),
        Some("Oops! You're not complying with the workflow.")
    );

    let status = check.status.to_commit_status();
    assert_eq!(status.context, "workflow");
    assert_eq!(status.target_url, None);
}

#[test]
fn test_protection_request_uses_configured_checks() {
    let definition = WorkflowDefinition::gitflow(&checks());

    let request = definition.branches[0].protection_request();

    assert!(request.enforce_admins);
    let status_checks = request.required_status_checks.unwrap();
    assert!(status_checks.strict);
    assert_eq!(status_checks.contexts, checks());
}
