use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::common;

/// Ordered snapshot of the collected files, handed over to the batch worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    entries: Vec<PathBuf>,
}

impl BatchJob {
    pub fn new(entries: Vec<PathBuf>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Deduplicated list of PDF files waiting for conversion, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct FileCollector {
    entries: Vec<PathBuf>,
}

impl FileCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.entries.iter().any(|p| p == path)
    }

    /// Returns `false` when the path was already listed.
    pub fn add(&mut self, path: PathBuf) -> bool {
        if self.contains_path(&path) {
            false
        } else {
            self.entries.push(path);
            true
        }
    }

    /// File picker results, anything without a PDF suffix is skipped.
    pub fn add_selected<I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = PathBuf> {
        paths.into_iter()
            .filter(|p| common::has_pdf_suffix(p))
            .filter(|p| self.add(p.clone()))
            .count()
    }

    /// Recursively collects PDF files below `root` and returns how many were found.
    ///
    /// Unreadable directories are skipped silently, a missing root finds nothing.
    /// Symlinked directories are not descended into, symlinked files are taken.
    pub fn scan_folder(&mut self, root: &Path) -> usize {
        let mut count = 0;

        for entry in WalkDir::new(root).follow_links(false).into_iter().filter_map(|e| e.ok()) {
            if common::has_pdf_suffix(entry.path()) && entry.path().is_file() {
                self.add(entry.into_path());
                count += 1;
            }
        }

        tracing::debug!("Scanned {}: {} PDF file(s)", root.display(), count);
        count
    }

    /// Drag and drop: PDF files are added, folders are scanned, the rest is ignored.
    pub fn add_dropped<I>(&mut self, paths: I) -> bool
    where
        I: IntoIterator<Item = PathBuf> {
        let mut accepted = false;

        for path in paths {
            if path.is_file() && common::has_pdf_suffix(&path) {
                self.add(path);
                accepted = true;
            } else if path.is_dir() {
                self.scan_folder(&path);
                accepted = true;
            }
        }

        accepted
    }

    /// Paths carried by a drag and drop payload.
    ///
    /// The payload is newline separated, with a `file://` prefix on some platforms.
    pub fn parse_drop_payload(event_text: &str) -> Vec<PathBuf> {
        event_text
            .split('\n')
            .map(|line| line.trim())
            .map(|line| line.strip_prefix("file://").unwrap_or(line))
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn snapshot(&self) -> BatchJob {
        BatchJob::new(self.entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::testing::touch;

    fn scratch_dir() -> PathBuf {
        crate::testing::scratch_dir("pdf2word_collector_tests")
    }

    #[test]
    fn adding_twice_keeps_one_entry() {
        let mut collector = FileCollector::new();

        assert!(collector.add(PathBuf::from("/docs/report.pdf")));
        assert!(!collector.add(PathBuf::from("/docs/report.pdf")));
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut collector = FileCollector::new();
        collector.add(PathBuf::from("b.pdf"));
        collector.add(PathBuf::from("a.pdf"));
        collector.add(PathBuf::from("b.pdf"));
        collector.add(PathBuf::from("c.pdf"));

        assert_eq!(collector.entries(), &[PathBuf::from("b.pdf"), PathBuf::from("a.pdf"), PathBuf::from("c.pdf")]);
    }

    #[test]
    fn folder_scan_only_takes_pdf_suffixes() {
        let dir = scratch_dir();
        touch(&dir.join("one.pdf"));
        touch(&dir.join("TWO.PDF"));
        touch(&dir.join("nested").join("deeper").join("three.Pdf"));
        touch(&dir.join("notes.txt"));
        touch(&dir.join("nested").join("image.png"));
        touch(&dir.join("nested").join("pdf"));

        let mut collector = FileCollector::new();
        let count = collector.scan_folder(&dir);

        assert_eq!(count, 3);
        assert_eq!(collector.len(), 3);
        assert!(collector.contains_path(&dir.join("TWO.PDF")));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn rescanning_does_not_duplicate() {
        let dir = scratch_dir();
        touch(&dir.join("one.pdf"));
        touch(&dir.join("two.pdf"));

        let mut collector = FileCollector::new();
        collector.scan_folder(&dir);
        collector.scan_folder(&dir);

        assert_eq!(collector.len(), 2);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn scanning_a_missing_folder_finds_nothing() {
        let mut collector = FileCollector::new();
        let missing = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string());

        assert_eq!(collector.scan_folder(&missing), 0);
        assert!(collector.is_empty());
    }

    #[test]
    fn dropped_paths_are_filtered() {
        let dir = scratch_dir();
        let pdf = dir.join("dropped.pdf");
        let txt = dir.join("dropped.txt");
        let sub = dir.join("folder");
        touch(&pdf);
        touch(&txt);
        touch(&sub.join("inside.PDF"));

        let mut collector = FileCollector::new();

        assert!(!collector.add_dropped(vec![txt.clone()]));
        assert!(!collector.add_dropped(vec![dir.join("gone.pdf")]));
        assert!(collector.add_dropped(vec![pdf.clone(), txt, sub.clone()]));
        assert_eq!(collector.entries(), &[pdf, sub.join("inside.PDF")]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn selected_paths_skip_non_pdf_and_duplicates() {
        let mut collector = FileCollector::new();
        let added = collector.add_selected(vec![
            PathBuf::from("/a/one.pdf"),
            PathBuf::from("/a/two.txt"),
            PathBuf::from("/a/one.pdf"),
            PathBuf::from("/a/three.PDF"),
        ]);

        assert_eq!(added, 2);
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn clear_empties_the_list() {
        let mut collector = FileCollector::new();
        collector.add_selected(vec![PathBuf::from("1.pdf"), PathBuf::from("2.pdf"), PathBuf::from("3.pdf")]);
        collector.clear();

        assert!(collector.is_empty());
        assert!(collector.snapshot().is_empty());
    }

    #[test]
    fn drop_payload_is_split_per_line() {
        let payload = "file:///home/me/a.pdf\r\n\n/home/me/docs\n  \nfile:///home/me/b c.PDF";

        assert_eq!(FileCollector::parse_drop_payload(payload), vec![
            PathBuf::from("/home/me/a.pdf"),
            PathBuf::from("/home/me/docs"),
            PathBuf::from("/home/me/b c.PDF"),
        ]);
        assert!(FileCollector::parse_drop_payload("").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn scan_does_not_follow_symlinked_folders() {
        let dir = scratch_dir();
        let outside = scratch_dir();
        touch(&dir.join("inside.pdf"));
        touch(&outside.join("outside.pdf"));
        std::os::unix::fs::symlink(&outside, dir.join("linked")).unwrap();
        std::os::unix::fs::symlink(dir.join("inside.pdf"), dir.join("alias.pdf")).unwrap();

        let mut collector = FileCollector::new();
        collector.scan_folder(&dir);

        assert!(collector.contains_path(&dir.join("inside.pdf")));
        assert!(collector.contains_path(&dir.join("alias.pdf")));
        assert!(!collector.contains_path(&dir.join("linked").join("outside.pdf")));
        assert_eq!(collector.len(), 2);

        let _ = fs::remove_dir_all(&dir);
        let _ = fs::remove_dir_all(&outside);
    }
}
