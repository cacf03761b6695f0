//! Nmap process wrapper.
//!
//! Executes nmap as a child process via `tokio::process::Command`, captures
//! the XML report from stdout and hands it to the result filter.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

use nmap_inventory_core::DiscoveredHost;
use tokio::process::Command;
use uuid::Uuid;

use crate::error::{DiscoverError, Result};
use crate::filter;
use crate::nmap_xml::{self, NmapRun};
use crate::request::ScanRequest;

/// Result of a single nmap scan execution.
pub struct ScanResult {
    /// Unique ID for this scan run.
    pub scan_id: Uuid,
    /// The request that was scanned.
    pub request: ScanRequest,
    /// Parsed nmap XML output.
    pub nmap_run: NmapRun,
    /// Hosts that passed the filter, in document order.
    pub hosts: Vec<DiscoveredHost>,
    /// Wall-clock duration of the scan.
    pub duration: std::time::Duration,
}

/// Wrapper around the nmap binary.
pub struct NmapScanner {
    nmap_path: String,
}

impl NmapScanner {
    pub fn new(nmap_path: &str) -> Self {
        Self {
            nmap_path: nmap_path.to_string(),
        }
    }

    /// Resolve the configured binary to an executable file.
    ///
    /// A bare name is looked up on `PATH`; anything containing a path
    /// separator is checked as given.
    pub fn resolve(&self) -> Result<PathBuf> {
        let candidate = Path::new(&self.nmap_path);
        let not_found = || DiscoverError::NmapNotFound {
            path: self.nmap_path.clone(),
        };

        if self.nmap_path.is_empty() {
            return Err(not_found());
        }

        if candidate.components().count() > 1 {
            return if is_executable(candidate) {
                Ok(candidate.to_path_buf())
            } else {
                Err(not_found())
            };
        }

        let search_path = env::var_os("PATH").unwrap_or_else(OsString::new);
        env::split_paths(&search_path)
            .map(|dir| dir.join(candidate))
            .find(|path| is_executable(path))
            .ok_or_else(not_found)
    }

    /// Verify nmap is installed and return its version banner.
    ///
    /// A binary that exits non-zero on `--version` is reported as a failed
    /// nmap run, not as an installed one.
    pub async fn verify_installation(&self) -> Result<String> {
        let nmap = self.resolve()?;
        let output = Command::new(&nmap)
            .arg("--version")
            .output()
            .await
            .map_err(|_| DiscoverError::NmapNotFound {
                path: self.nmap_path.clone(),
            })?;

        if !output.status.success() {
            return Err(DiscoverError::NmapFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run nmap against the request's target and return the raw XML report.
    ///
    /// The binary is resolved before anything is spawned. A non-zero exit
    /// is an error carrying the exit code and stderr.
    pub async fn scan_xml(&self, request: &ScanRequest) -> Result<Vec<u8>> {
        let nmap = self.resolve()?;

        let output = Command::new(&nmap)
            .args(request.args())
            .output()
            .await
            .map_err(|e| DiscoverError::NmapNotFound {
                path: format!("{}: {e}", nmap.display()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(DiscoverError::NmapFailed {
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        Ok(output.stdout)
    }

    /// Scan a target expression and filter the report.
    ///
    /// One call is one nmap process; there is no retry.
    pub async fn scan(&self, target: &str) -> Result<ScanResult> {
        let request = ScanRequest::new(target)?;
        let scan_id = Uuid::new_v4();
        let start = Instant::now();

        tracing::info!(
            scan_id = %scan_id,
            target = %request.target(),
            kind = request.target().kind(),
            "Starting nmap scan"
        );

        let xml = self.scan_xml(&request).await?;
        let nmap_run = nmap_xml::parse_nmap_xml(&xml)?;
        let hosts = filter::filter_hosts(&nmap_run);
        let duration = start.elapsed();

        tracing::info!(
            scan_id = %scan_id,
            target = %request.target(),
            hosts_up = nmap_run.hosts.iter().filter(|h| h.is_up()).count(),
            hosts = hosts.len(),
            duration_ms = duration.as_millis() as u64,
            "Nmap scan complete"
        );

        Ok(ScanResult {
            scan_id,
            request,
            nmap_run,
            hosts,
            duration,
        })
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
