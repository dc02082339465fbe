//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge keeps branches, files and pull requests in memory and
//! answers the way GitHub does for the cases this tool cares about
//! (missing branches, missing files, rejected pull requests). A failure can
//! be injected per operation.
//!
//! # Example
//!
//! ```
//! use forgehand::core::types::{BranchName, Oid, RefName};
//! use forgehand::forge::mock::MockForge;
//! use forgehand::forge::Forge;
//!
//! # tokio_test::block_on(async {
//! let master = BranchName::new("master").unwrap();
//! let sha = Oid::new("aa218f56b14c9653891f9e74264a383fa43fefbd").unwrap();
//! let forge = MockForge::new()
//!     .with_branch(&master, &sha)
//!     .with_file(&master, "VERSION", "MS4yMi4w\n");
//!
//! let file = forge
//!     .get_file_content("VERSION", &RefName::for_branch(&master))
//!     .await
//!     .unwrap();
//! assert_eq!(file.content, "MS4yMi4w\n");
//! # });
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::{CreatePrRequest, FileContent, Forge, ForgeError, PullRequest, RemoteRef};
use crate::core::types::{BranchName, Oid, RefName};

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockForgeInner {
    /// Branch tips by short branch name.
    branches: HashMap<String, Oid>,
    /// Encoded file content by (branch, path).
    files: HashMap<(String, String), String>,
    /// Created PRs in creation order.
    prs: Vec<PullRequest>,
    /// Next PR number to assign.
    next_pr_number: u64,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail get_branch_ref with the given error.
    GetBranchRef(ForgeError),
    /// Fail create_branch_ref with the given error.
    CreateBranchRef(ForgeError),
    /// Fail get_file_content with the given error.
    GetFileContent(ForgeError),
    /// Fail create_pr with the given error.
    CreatePr(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    GetBranchRef { branch: String },
    CreateBranchRef { branch: String, sha: String },
    GetFileContent { path: String, at: String },
    CreatePr {
        head: String,
        base: String,
        title: String,
        draft: bool,
    },
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

impl MockForge {
    /// Create a new empty mock forge.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockForgeInner {
                branches: HashMap::new(),
                files: HashMap::new(),
                prs: Vec::new(),
                next_pr_number: 1,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Add (or move) a branch.
    pub fn with_branch(self, branch: &BranchName, sha: &Oid) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.branches.insert(branch.to_string(), sha.clone());
        }
        self
    }

    /// Add a file with already-encoded content on a branch.
    pub fn with_file(self, branch: &BranchName, path: &str, content: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner
                .files
                .insert((branch.to_string(), path.to_string()), content.to_string());
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use forgehand::forge::mock::{FailOn, MockForge};
    /// use forgehand::forge::ForgeError;
    ///
    /// let forge = MockForge::new().fail_on(FailOn::CreatePr(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Get all PRs created so far.
    pub fn pull_requests(&self) -> Vec<PullRequest> {
        let inner = self.inner.lock().unwrap();
        inner.prs.clone()
    }

    /// Current tip of a branch, if it exists.
    pub fn branch_tip(&self, branch: &str) -> Option<Oid> {
        let inner = self.inner.lock().unwrap();
        inner.branches.get(branch).cloned()
    }

    fn record(inner: &mut MockForgeInner, op: MockOperation) {
        inner.operations.push(op);
    }

    fn remote_ref(branch: &str, sha: &Oid) -> Result<RemoteRef, ForgeError> {
        let refname = RefName::new(format!("{}{}", RefName::HEADS_PREFIX, branch)).map_err(|e| {
            ForgeError::ApiError {
                status: 422,
                message: e.to_string(),
            }
        })?;
        Ok(RemoteRef {
            refname,
            sha: sha.clone(),
        })
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_branch_ref(&self, branch: &BranchName) -> Result<RemoteRef, ForgeError> {
        let mut inner = self.inner.lock().unwrap();
        Self::record(
            &mut inner,
            MockOperation::GetBranchRef {
                branch: branch.to_string(),
            },
        );

        if let Some(FailOn::GetBranchRef(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        match inner.branches.get(branch.as_str()) {
            Some(sha) => Self::remote_ref(branch.as_str(), sha),
            None => Err(ForgeError::RefNotFound {
                refname: RefName::for_branch(branch).to_string(),
            }),
        }
    }

    async fn create_branch_ref(
        &self,
        branch: &BranchName,
        sha: &Oid,
    ) -> Result<RemoteRef, ForgeError> {
        let mut inner = self.inner.lock().unwrap();
        Self::record(
            &mut inner,
            MockOperation::CreateBranchRef {
                branch: branch.to_string(),
                sha: sha.to_string(),
            },
        );

        if let Some(FailOn::CreateBranchRef(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        if inner.branches.contains_key(branch.as_str()) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "Reference already exists".into(),
            });
        }
        inner.branches.insert(branch.to_string(), sha.clone());
        Self::remote_ref(branch.as_str(), sha)
    }

    async fn get_file_content(&self, path: &str, at: &RefName) -> Result<FileContent, ForgeError> {
        let mut inner = self.inner.lock().unwrap();
        Self::record(
            &mut inner,
            MockOperation::GetFileContent {
                path: path.to_string(),
                at: at.to_string(),
            },
        );

        if let Some(FailOn::GetFileContent(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        let path = path.trim_start_matches('/');
        let branch = at
            .branch_name()
            .map(String::from)
            .unwrap_or_else(|| at.to_string());

        match inner.files.get(&(branch.clone(), path.to_string())) {
            Some(content) => Ok(FileContent {
                path: path.to_string(),
                sha: "0".repeat(40),
                encoding: "base64".into(),
                content: content.clone(),
            }),
            None => Err(ForgeError::ContentNotFound {
                path: path.to_string(),
                branch,
            }),
        }
    }

    async fn create_pr(&self, request: CreatePrRequest) -> Result<PullRequest, ForgeError> {
        let mut inner = self.inner.lock().unwrap();
        Self::record(
            &mut inner,
            MockOperation::CreatePr {
                head: request.head.clone(),
                base: request.base.clone(),
                title: request.title.clone(),
                draft: request.draft,
            },
        );

        if let Some(FailOn::CreatePr(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        for branch in [&request.head, &request.base] {
            if !inner.branches.contains_key(branch.as_str()) {
                return Err(ForgeError::PullRequestCreation {
                    status: 422,
                    body: format!(
                        r#"{{"message":"Validation Failed","errors":[{{"resource":"PullRequest","field":"{}","code":"invalid"}}]}}"#,
                        if branch == &request.head { "head" } else { "base" }
                    ),
                });
            }
        }

        let number = inner.next_pr_number;
        inner.next_pr_number += 1;

        let pr = PullRequest {
            number,
            url: format!("https://github.com/mock/repo/pull/{}", number),
            is_draft: request.draft,
            head: request.head,
            base: request.base,
            title: request.title,
        };
        inner.prs.push(pr.clone());
        Ok(pr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sha() -> Oid {
        Oid::new("aa218f56b14c9653891f9e74264a383fa43fefbd").unwrap()
    }

    fn branch(name: &str) -> BranchName {
        BranchName::new(name).unwrap()
    }

    #[tokio::test]
    async fn branch_lookup() {
        let forge = MockForge::new().with_branch(&branch("master"), &sha());

        let found = forge.get_branch_ref(&branch("master")).await.unwrap();
        assert_eq!(found.refname.as_str(), "refs/heads/master");
        assert_eq!(found.sha, sha());

        let missing = forge.get_branch_ref(&branch("develop")).await;
        assert!(matches!(missing, Err(ForgeError::RefNotFound { .. })));
    }

    #[tokio::test]
    async fn create_branch_ref_rejects_existing() {
        let forge = MockForge::new().with_branch(&branch("master"), &sha());

        forge
            .create_branch_ref(&branch("feature"), &sha())
            .await
            .unwrap();
        assert_eq!(forge.branch_tip("feature"), Some(sha()));

        let again = forge.create_branch_ref(&branch("feature"), &sha()).await;
        assert!(matches!(again, Err(ForgeError::ApiError { status: 422, .. })));
    }

    #[tokio::test]
    async fn create_pr_assigns_numbers() {
        let forge = MockForge::new()
            .with_branch(&branch("master"), &sha())
            .with_branch(&branch("feature"), &sha());

        let request = CreatePrRequest {
            head: "feature".into(),
            base: "master".into(),
            title: "Bump".into(),
            body: None,
            draft: false,
        };
        let first = forge.create_pr(request.clone()).await.unwrap();
        let second = forge.create_pr(request).await.unwrap();

        assert_eq!(first.number, 1);
        assert_eq!(second.number, 2);
        assert_eq!(forge.pull_requests().len(), 2);
    }

    #[tokio::test]
    async fn create_pr_with_unknown_head_is_rejected_with_body() {
        let forge = MockForge::new().with_branch(&branch("master"), &sha());

        let result = forge
            .create_pr(CreatePrRequest {
                head: "ghost".into(),
                base: "master".into(),
                title: "Bump".into(),
                body: None,
                draft: false,
            })
            .await;

        match result {
            Err(ForgeError::PullRequestCreation { status, body }) => {
                assert_eq!(status, 422);
                assert!(body.contains(r#""field":"head""#));
            }
            other => panic!("expected PullRequestCreation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fail_on_injects_error_and_records() {
        let forge = MockForge::new().fail_on(FailOn::GetFileContent(ForgeError::RateLimited));

        let result = forge
            .get_file_content("a.txt", &RefName::for_branch(&branch("master")))
            .await;
        assert!(matches!(result, Err(ForgeError::RateLimited)));
        assert_eq!(
            forge.operations(),
            vec![MockOperation::GetFileContent {
                path: "a.txt".into(),
                at: "refs/heads/master".into()
            }]
        );

        forge.clear_fail_on();
        let result = forge
            .get_file_content("a.txt", &RefName::for_branch(&branch("master")))
            .await;
        assert!(matches!(result, Err(ForgeError::ContentNotFound { .. })));
    }
}
