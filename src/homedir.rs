//! Home directory reconciliation
//!
//! When a new account adopts a pre-existing home directory, every file in
//! it must be re-owned, SELinux labels refreshed, and missing skeleton
//! entries copied in. The ownership walk is best-effort: per-entry failures
//! are collected in a [`ChownReport`] and never abort the walk, and a
//! caller-supplied progress callback fires every [`YIELD_EVERY`] entries so
//! the interface can keep pumping events.

use std::fs;
use std::io;
use std::os::unix::fs::{chown, lchown, symlink};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Entries processed between two progress callbacks.
pub const YIELD_EVERY: usize = 100;

/// Filename prefix of the kept problem-file report.
pub const REPORT_PREFIX: &str = "firstboot-homedir-";

/// Result of probing a path for existence, keeping "not found" distinct
/// from "could not tell".
#[derive(Debug)]
pub enum PathProbe {
    Exists,
    NotFound,
    Error(io::Error),
}

/// Probe a path without following a trailing symlink.
pub fn probe(path: &Path) -> PathProbe {
    match fs::symlink_metadata(path) {
        Ok(_) => PathProbe::Exists,
        Err(err) if err.kind() == io::ErrorKind::NotFound => PathProbe::NotFound,
        Err(err) => PathProbe::Error(err),
    }
}

/// Accumulator for the ownership walk: how many entries were re-owned and
/// which ones failed, in walk order.
#[derive(Debug, Default)]
pub struct ChownReport {
    pub succeeded: usize,
    pub failures: Vec<(PathBuf, io::Error)>,
}

impl ChownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Re-owns directory trees entry by entry, collecting failures and yielding
/// to the caller at a fixed cadence.
struct OwnershipFixer<'a> {
    uid: u32,
    gid: u32,
    processed: usize,
    report: ChownReport,
    progress: &'a mut dyn FnMut(),
}

impl<'a> OwnershipFixer<'a> {
    fn new(uid: u32, gid: u32, progress: &'a mut dyn FnMut()) -> Self {
        OwnershipFixer {
            uid,
            gid,
            processed: 0,
            report: ChownReport::default(),
            progress,
        }
    }

    /// Re-own a single entry without following symlinks.
    fn chown_one(&mut self, path: &Path) {
        match lchown(path, Some(self.uid), Some(self.gid)) {
            Ok(()) => self.report.succeeded += 1,
            Err(err) => self.report.failures.push((path.to_path_buf(), err)),
        }
        self.processed += 1;
        if self.processed % YIELD_EVERY == 0 {
            (self.progress)();
        }
    }

    /// Walk everything below `root` (the root itself is not touched here)
    /// and re-own each entry. Unreadable directories become failure entries
    /// instead of aborting the walk.
    fn fix_tree(&mut self, root: &Path) {
        for entry in WalkDir::new(root).follow_links(false).min_depth(1) {
            match entry {
                Ok(entry) => self.chown_one(entry.path()),
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    self.report.failures.push((path, io::Error::from(err)));
                }
            }
        }
    }
}

/// Make `uid:gid` the owner of an existing home directory and bring in any
/// skeleton entries it is missing.
///
/// The sequence follows the account tools' own behavior for a fresh home:
/// re-own the whole tree, refresh SELinux labels, then copy each skeleton
/// entry that does not already exist at the destination (never overwriting)
/// and re-own what was copied. Per-entry ownership failures end up in the
/// returned report; only setup errors (an unreadable skeleton directory,
/// say) abort.
pub fn adopt_home_directory(
    home: &Path,
    skel: &Path,
    uid: u32,
    gid: u32,
    mut progress: impl FnMut(),
) -> io::Result<ChownReport> {
    let mut fixer = OwnershipFixer::new(uid, gid, &mut progress);

    if let Err(err) = chown(home, Some(uid), Some(gid)) {
        fixer.report.failures.push((home.to_path_buf(), err));
    } else {
        fixer.report.succeeded += 1;
    }
    fixer.fix_tree(home);

    restore_selinux_labels(home);

    copy_missing_skel_entries(skel, home, &mut fixer)?;

    Ok(fixer.report)
}

/// Ask `restorecon` to relabel the tree. Fire-and-forget: a missing binary
/// or non-zero exit is logged and ignored.
fn restore_selinux_labels(home: &Path) {
    match std::process::Command::new("restorecon")
        .arg("-R")
        .arg(home)
        .status()
    {
        Ok(status) if status.success() => {
            debug!(home = %home.display(), "SELinux labels restored");
        }
        Ok(status) => {
            warn!(home = %home.display(), %status, "restorecon exited with failure");
        }
        Err(err) => {
            warn!(error = %err, "could not run restorecon");
        }
    }
}

/// Copy every skeleton entry that is missing at the destination, re-owning
/// copied entries through the fixer. Existing destination entries are left
/// untouched.
fn copy_missing_skel_entries(
    skel: &Path,
    home: &Path,
    fixer: &mut OwnershipFixer<'_>,
) -> io::Result<()> {
    let entries = match fs::read_dir(skel) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(skel = %skel.display(), "skeleton directory missing, nothing to copy");
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    for entry in entries {
        let entry = entry?;
        let dst = home.join(entry.file_name());
        if !matches!(probe(&dst), PathProbe::NotFound) {
            continue;
        }

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            copy_tree(&entry.path(), &dst)?;
            fixer.chown_one(&dst);
            fixer.fix_tree(&dst);
        } else {
            copy_entry(&entry.path(), &dst, file_type.is_symlink())?;
            fixer.chown_one(&dst);
        }
    }
    Ok(())
}

/// Recursively copy a directory, preserving permissions and recreating
/// symlinks as symlinks.
fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir(dst)?;
    fs::set_permissions(dst, fs::metadata(src)?.permissions())?;

    for entry in WalkDir::new(src).follow_links(false).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let target = dst.join(rel);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir(&target)?;
            fs::set_permissions(&target, entry.metadata()?.permissions())?;
        } else {
            copy_entry(entry.path(), &target, file_type.is_symlink())?;
        }
    }
    Ok(())
}

fn copy_entry(src: &Path, dst: &Path, is_symlink: bool) -> io::Result<()> {
    if is_symlink {
        symlink(fs::read_link(src)?, dst)?;
    } else {
        fs::copy(src, dst)?;
    }
    Ok(())
}

/// Write the failed paths to a uniquely named, kept file in the system
/// temp dir, one per line. The file is deliberately not cleaned up: the
/// operator is pointed at it.
pub fn write_problem_report(report: &ChownReport) -> io::Result<PathBuf> {
    use std::io::Write as _;

    let mut file = tempfile::Builder::new()
        .prefix(REPORT_PREFIX)
        .tempfile_in(std::env::temp_dir())?;
    for (path, _cause) in &report.failures {
        writeln!(file, "{}", path.display())?;
    }
    let (_file, path) = file.keep().map_err(|err| err.error)?;
    Ok(path)
}
