//! forge::ops
//!
//! Remote repository operations composed from [`Forge`] calls.
//!
//! Each operation is a single sequence of requests with no local state,
//! so the same code runs against GitHub and [`MockForge`](super::mock::MockForge).

use tracing::info;

use super::{CreatePrRequest, Forge, ForgeError, PullRequest, RemoteRef};
use crate::core::types::{BranchName, RefName};

/// Status line reported after a pull request is opened.
pub const PR_CREATED_STATUS: &str = "successfully created the pull request";

/// Fetch the encoded content of `path` on `branch`.
///
/// The branch is resolved first so that a missing branch is reported as
/// [`ForgeError::RefNotFound`] rather than as a missing file. The content is
/// returned exactly as the API encoded it.
///
/// # Errors
///
/// - [`ForgeError::RefNotFound`] if `branch` does not exist
/// - [`ForgeError::ContentNotFound`] if `path` is missing or a directory
pub async fn fetch_remote_file_content(
    forge: &dyn Forge,
    branch: &BranchName,
    path: &str,
) -> Result<String, ForgeError> {
    let path = path.trim_start_matches('/');
    let remote = forge.get_branch_ref(branch).await?;

    if path.is_empty() {
        return Err(ForgeError::ContentNotFound {
            path: String::new(),
            branch: branch.to_string(),
        });
    }

    let file = forge.get_file_content(path, &remote.refname).await?;
    info!(
        branch = %branch,
        path,
        sha = %remote.sha.short(7),
        "fetched file content"
    );
    Ok(file.content)
}

/// Open a pull request, filling in `default_base` when no base is given.
///
/// # Errors
///
/// - [`ForgeError::PullRequestCreation`] with the raw response body
pub async fn open_pull_request(
    forge: &dyn Forge,
    mut request: CreatePrRequest,
    default_base: &BranchName,
) -> Result<PullRequest, ForgeError> {
    if request.base.trim().is_empty() {
        request.base = default_base.to_string();
    }

    let pr = forge.create_pr(request).await?;
    info!(number = pr.number, head = %pr.head, base = %pr.base, "opened pull request");
    Ok(pr)
}

/// Create `new_branch` on the remote at the tip of `base`.
///
/// # Errors
///
/// - [`ForgeError::RefNotFound`] if `base` does not exist
/// - [`ForgeError::ApiError`] with status 422 if `new_branch` exists
pub async fn create_remote_branch(
    forge: &dyn Forge,
    base: &BranchName,
    new_branch: &BranchName,
) -> Result<RemoteRef, ForgeError> {
    let tip = forge.get_branch_ref(base).await?;
    let created = forge.create_branch_ref(new_branch, &tip.sha).await?;
    info!(
        branch = %RefName::for_branch(new_branch),
        base = %base,
        sha = %tip.sha.short(7),
        "created remote branch"
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Oid;
    use crate::forge::mock::{MockForge, MockOperation};

    fn sha() -> Oid {
        Oid::new("aa218f56b14c9653891f9e74264a383fa43fefbd").unwrap()
    }

    fn branch(name: &str) -> BranchName {
        BranchName::new(name).unwrap()
    }

    mod fetch_remote_file_content {
        use super::*;

        #[tokio::test]
        async fn returns_encoded_content() {
            let forge = MockForge::new()
                .with_branch(&branch("master"), &sha())
                .with_file(&branch("master"), "test-data/istio-version.yaml", "ZGF0YTo=\n");

            let content =
                fetch_remote_file_content(&forge, &branch("master"), "/test-data/istio-version.yaml")
                    .await
                    .unwrap();
            assert_eq!(content, "ZGF0YTo=\n");
        }

        #[tokio::test]
        async fn missing_branch_is_ref_not_found() {
            let forge = MockForge::new();
            let result = fetch_remote_file_content(&forge, &branch("develop"), "a.txt").await;
            assert!(matches!(result, Err(ForgeError::RefNotFound { .. })));
            // no content request is made for a missing branch
            assert_eq!(forge.operations().len(), 1);
        }

        #[tokio::test]
        async fn missing_file_is_content_not_found() {
            let forge = MockForge::new().with_branch(&branch("master"), &sha());
            let result = fetch_remote_file_content(&forge, &branch("master"), "nope.txt").await;
            assert!(matches!(
                result,
                Err(ForgeError::ContentNotFound { path, branch }) if path == "nope.txt" && branch == "master"
            ));
        }

        #[tokio::test]
        async fn empty_path_is_content_not_found() {
            let forge = MockForge::new().with_branch(&branch("master"), &sha());
            let result = fetch_remote_file_content(&forge, &branch("master"), "/").await;
            assert!(matches!(result, Err(ForgeError::ContentNotFound { .. })));
        }
    }

    mod open_pull_request {
        use super::*;

        fn request(base: &str) -> CreatePrRequest {
            CreatePrRequest {
                head: "feature-x".into(),
                base: base.into(),
                title: "Update file".into(),
                body: None,
                draft: false,
            }
        }

        #[tokio::test]
        async fn empty_base_uses_default() {
            let forge = MockForge::new()
                .with_branch(&branch("master"), &sha())
                .with_branch(&branch("feature-x"), &sha());

            let pr = open_pull_request(&forge, request(""), &branch("master"))
                .await
                .unwrap();
            assert_eq!(pr.base, "master");
            assert_eq!(
                forge.operations(),
                vec![MockOperation::CreatePr {
                    head: "feature-x".into(),
                    base: "master".into(),
                    title: "Update file".into(),
                    draft: false,
                }]
            );
        }

        #[tokio::test]
        async fn explicit_base_is_kept() {
            let forge = MockForge::new()
                .with_branch(&branch("main"), &sha())
                .with_branch(&branch("feature-x"), &sha());

            let pr = open_pull_request(&forge, request("main"), &branch("master"))
                .await
                .unwrap();
            assert_eq!(pr.base, "main");
        }
    }

    mod create_remote_branch {
        use super::*;

        #[tokio::test]
        async fn branches_from_base_tip() {
            let forge = MockForge::new().with_branch(&branch("master"), &sha());

            let created = create_remote_branch(&forge, &branch("master"), &branch("upgrade"))
                .await
                .unwrap();
            assert_eq!(created.refname.as_str(), "refs/heads/upgrade");
            assert_eq!(created.sha, sha());
        }

        #[tokio::test]
        async fn missing_base_fails_before_create() {
            let forge = MockForge::new();
            let result = create_remote_branch(&forge, &branch("master"), &branch("upgrade")).await;
            assert!(matches!(result, Err(ForgeError::RefNotFound { .. })));
            assert!(forge.branch_tip("upgrade").is_none());
        }
    }
}
