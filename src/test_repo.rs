use git2::{Oid, Repository, Signature, Time};
use std::{fs, path::Path};
use tempfile::TempDir;

pub struct TestRepo {
    pub repo: Repository,
    _temp_dir: TempDir,
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRepo {
    pub fn new() -> Self {
        let local_dir = tempfile::tempdir().unwrap();
        let local_repo_path = local_dir.path();

        // Initialize a new Git repository
        let local_repo = Repository::init(local_repo_path).unwrap();

        let mut config = local_repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();

        // Set the default branch to main (libgit2 defaults to master)
        local_repo.set_head("refs/heads/main").unwrap();

        // Create a tracked file and an initial commit so every test starts
        // from a non-empty history
        let file_path = local_repo_path.join("tracked.txt");
        fs::write(&file_path, "test content").unwrap();

        let mut index = local_repo.index().unwrap();
        index.add_path(Path::new("tracked.txt")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();

        let signature = Signature::now("Test User", "test@example.com").unwrap();
        local_repo
            .commit(
                Some("refs/heads/main"),
                &signature,
                &signature,
                "Initial commit",
                &local_repo.find_tree(tree_id).unwrap(),
                &[],
            )
            .expect("Failed to commit to local repo");

        Self {
            repo: local_repo,
            _temp_dir: local_dir,
        }
    }

    pub fn head_id(&self) -> Oid {
        self.repo.head().unwrap().peel_to_commit().unwrap().id()
    }

    /// Commits on top of HEAD and advances it, returning the new commit id.
    /// Messages must differ between commits sharing a parent, or identical
    /// metadata would hash to the same id.
    pub fn commit(&self, commit_msg: &str) -> Oid {
        let parent = self.head_id();
        let repo = &self.repo;
        let tree = repo.find_tree(self.tree_id()).unwrap();
        let sig = Signature::now("Test User", "test@example.com").unwrap();
        let parent_commit = repo.find_commit(parent).unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, commit_msg, &tree, &[&parent_commit])
            .unwrap()
    }

    /// Creates a commit with an explicit parent list without moving HEAD,
    /// for building branch and merge topologies out of raw ids.
    pub fn commit_with_parents(&self, commit_msg: &str, parents: &[Oid]) -> Oid {
        let repo = &self.repo;
        let tree = repo.find_tree(self.tree_id()).unwrap();
        let sig = Signature::now("Test User", "test@example.com").unwrap();
        let parent_commits: Vec<git2::Commit> = parents
            .iter()
            .map(|oid| repo.find_commit(*oid).unwrap())
            .collect();
        let parent_refs: Vec<&git2::Commit> = parent_commits.iter().collect();
        repo.commit(None, &sig, &sig, commit_msg, &tree, &parent_refs)
            .unwrap()
    }

    pub fn checkout_detached(&self, commit_id: Oid) -> &Self {
        self.repo.set_head_detached(commit_id).unwrap();
        self
    }

    /// Creates an annotated tag on `target` with a fixed tagger date.
    pub fn tag_annotated(&self, name: &str, target: Oid, tagged_at: i64) -> Oid {
        let object = self.repo.find_object(target, None).unwrap();
        let tagger =
            Signature::new("Test User", "test@example.com", &Time::new(tagged_at, 0)).unwrap();
        self.repo
            .tag(name, &object, &tagger, &format!("tag {}", name), false)
            .unwrap()
    }

    /// Creates an annotated tag whose target is another tag object.
    pub fn tag_of_tag(&self, name: &str, target_tag: Oid, tagged_at: i64) -> Oid {
        self.tag_annotated(name, target_tag, tagged_at)
    }

    pub fn tag_lightweight(&self, name: &str, target: Oid) -> Oid {
        let object = self.repo.find_object(target, None).unwrap();
        self.repo.tag_lightweight(name, &object, false).unwrap()
    }

    pub fn write_file(&self, file_name: &str, content: &str) -> &Self {
        fs::write(self.repo_path().join(file_name), content).unwrap();
        self
    }

    pub fn delete_file(&self, file_name: &str) -> &Self {
        fs::remove_file(self.repo_path().join(file_name)).unwrap();
        self
    }

    pub fn stage(&self, file_name: &str) -> &Self {
        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(file_name)).unwrap();
        index.write().unwrap();
        self
    }

    pub fn repo_path(&self) -> &Path {
        self.repo.workdir().unwrap()
    }

    fn tree_id(&self) -> Oid {
        let mut index = self.repo.index().unwrap();
        index.write_tree().unwrap()
    }
}
