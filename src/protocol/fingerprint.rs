/// Machine fingerprinting for device-bound licensing
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;

use crate::utils::detect_platform;

/// Number of hex characters kept from the SHA-256 digest
pub const HWID_LEN: usize = 32;

/// A hardware query could not be performed on this machine
#[derive(Debug, Error)]
#[error("hardware source unavailable: {0}")]
pub struct SourceUnavailable(pub String);

/// Where fingerprint material comes from
///
/// `Ok(None)` means the machine has no value for that field (it contributes
/// an empty string). `Err` means the platform query itself failed, which
/// switches the fingerprint to the hostname/username fallback.
pub trait HardwareSource: Send + Sync {
    fn processor_id(&self) -> Result<Option<String>, SourceUnavailable>;
    fn board_serial(&self) -> Result<Option<String>, SourceUnavailable>;
    fn first_mac(&self) -> Result<Option<String>, SourceUnavailable>;
    fn hostname(&self) -> String;
    fn username(&self) -> String;
}

/// Derives the HWID sent with register, login and verify requests
#[derive(Clone)]
pub struct HardwareFingerprint {
    source: Arc<dyn HardwareSource>,
    hash_fallback: bool,
}

impl HardwareFingerprint {
    /// Fingerprint backed by the real machine
    pub fn new() -> Self {
        Self::with_source(SystemSource)
    }

    pub fn with_source(source: impl HardwareSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
            hash_fallback: false,
        }
    }

    /// Hash the `hostname_username` fallback too, so every HWID has the same
    /// 32-hex shape. Changes the value seen by the server on fallback machines.
    pub fn hash_fallback(mut self, enabled: bool) -> Self {
        self.hash_fallback = enabled;
        self
    }

    /// Compute the HWID. Never fails.
    ///
    /// # Returns
    /// First 32 hex chars of SHA-256(cpu id ++ board serial ++ first MAC),
    /// or `hostname_username` when a platform query fails
    pub fn compute(&self) -> String {
        match self.collect_material() {
            Ok(material) => hash_identifier(&material),
            Err(e) => {
                warn!("Falling back to hostname/username fingerprint: {}", e);
                let fallback = format!("{}_{}", self.source.hostname(), self.source.username());
                if self.hash_fallback {
                    hash_identifier(&fallback)
                } else {
                    fallback
                }
            }
        }
    }

    fn collect_material(&self) -> Result<String, SourceUnavailable> {
        let mut material = String::new();
        material.push_str(&self.source.processor_id()?.unwrap_or_default());
        material.push_str(&self.source.board_serial()?.unwrap_or_default());
        material.push_str(&self.source.first_mac()?.unwrap_or_default());
        debug!("Collected {} bytes of fingerprint material", material.len());
        Ok(material)
    }
}

impl Default for HardwareFingerprint {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate the HWID for this machine with default settings
pub fn get_hardware_id() -> String {
    HardwareFingerprint::new().compute()
}

fn hash_identifier(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(HWID_LEN);
    digest
}

/// Reads identifiers from the running machine
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSource;

impl HardwareSource for SystemSource {
    fn processor_id(&self) -> Result<Option<String>, SourceUnavailable> {
        ensure_supported()?;
        Ok(processor_id())
    }

    fn board_serial(&self) -> Result<Option<String>, SourceUnavailable> {
        ensure_supported()?;
        board_serial()
    }

    fn first_mac(&self) -> Result<Option<String>, SourceUnavailable> {
        ensure_supported()?;
        first_mac()
    }

    fn hostname(&self) -> String {
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn username(&self) -> String {
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

fn ensure_supported() -> Result<(), SourceUnavailable> {
    let platform = detect_platform();
    if !platform.has_hardware_sources() {
        return Err(SourceUnavailable(format!(
            "no hardware queries for platform {}",
            platform.name()
        )));
    }
    Ok(())
}

/// CPUID leaf 1 as EDX then EAX, the same value WMI reports as ProcessorId
#[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
fn processor_id() -> Option<String> {
    #[cfg(target_arch = "x86")]
    use std::arch::x86::__cpuid;
    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64::__cpuid;

    // SAFETY: leaf 1 exists on every CPU able to run this binary
    #[allow(unused_unsafe)]
    let leaf = unsafe { __cpuid(1) };
    Some(format!("{:08X}{:08X}", leaf.edx, leaf.eax))
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "x86")))]
fn processor_id() -> Option<String> {
    let cpuinfo = std::fs::read_to_string("/proc/cpuinfo").ok()?;
    cpuinfo
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim() == "Serial")
        .map(|(_, value)| value.trim().to_string())
        .filter(|serial| !serial.is_empty())
}

#[cfg(target_os = "linux")]
fn board_serial() -> Result<Option<String>, SourceUnavailable> {
    use std::io::ErrorKind;

    match std::fs::read_to_string("/sys/class/dmi/id/board_serial") {
        Ok(serial) => Ok(non_empty(serial)),
        // board_serial is root-only on most distributions
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => Ok(None),
        Err(e) => Err(SourceUnavailable(format!("board_serial: {}", e))),
    }
}

#[cfg(target_os = "windows")]
fn board_serial() -> Result<Option<String>, SourceUnavailable> {
    let output = command_output("wmic", &["baseboard", "get", "serialnumber"])?;
    Ok(output
        .lines()
        .skip(1)
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string))
}

#[cfg(target_os = "macos")]
fn board_serial() -> Result<Option<String>, SourceUnavailable> {
    let output = command_output("ioreg", &["-rd1", "-c", "IOPlatformExpertDevice"])?;
    Ok(output
        .lines()
        .find(|line| line.contains("IOPlatformSerialNumber"))
        .and_then(|line| line.rsplit('"').nth(1))
        .map(str::to_string)
        .filter(|serial| !serial.is_empty()))
}

#[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
fn board_serial() -> Result<Option<String>, SourceUnavailable> {
    Err(SourceUnavailable("board serial".to_string()))
}

/// MAC of the first non-loopback adapter, adapters visited in name order
#[cfg(target_os = "linux")]
fn first_mac() -> Result<Option<String>, SourceUnavailable> {
    let entries = std::fs::read_dir("/sys/class/net")
        .map_err(|e| SourceUnavailable(format!("/sys/class/net: {}", e)))?;

    let mut interfaces: Vec<String> = entries
        .flatten()
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name != "lo")
        .collect();
    interfaces.sort();

    for iface in interfaces {
        let addr_path = format!("/sys/class/net/{}/address", iface);
        if let Ok(addr) = std::fs::read_to_string(&addr_path) {
            if let Some(mac) = non_empty(addr).filter(|mac| !is_null_mac(mac)) {
                return Ok(Some(mac));
            }
        }
    }

    Ok(None)
}

#[cfg(target_os = "windows")]
fn first_mac() -> Result<Option<String>, SourceUnavailable> {
    let output = command_output("getmac", &["/fo", "csv", "/nh"])?;
    Ok(output
        .lines()
        .filter_map(|line| line.split(',').next())
        .map(|field| field.trim().trim_matches('"').replace('-', ":"))
        .find(|mac| mac.len() == 17 && !is_null_mac(mac)))
}

#[cfg(target_os = "macos")]
fn first_mac() -> Result<Option<String>, SourceUnavailable> {
    let output = command_output("ifconfig", &[])?;
    Ok(output
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("ether "))
        .map(|rest| rest.split_whitespace().next().unwrap_or_default().to_string())
        .find(|mac| !mac.is_empty() && !is_null_mac(mac)))
}

#[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
fn first_mac() -> Result<Option<String>, SourceUnavailable> {
    Err(SourceUnavailable("network adapters".to_string()))
}

#[cfg(any(target_os = "windows", target_os = "macos"))]
fn command_output(program: &str, args: &[&str]) -> Result<String, SourceUnavailable> {
    let output = std::process::Command::new(program)
        .args(args)
        .output()
        .map_err(|e| SourceUnavailable(format!("{}: {}", program, e)))?;

    if !output.status.success() {
        return Err(SourceUnavailable(format!("{} exited with {}", program, output.status)));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn is_null_mac(mac: &str) -> bool {
    mac.chars().all(|c| c == '0' || c == ':')
}
