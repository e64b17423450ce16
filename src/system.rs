// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Best-effort detection of the host hardware, logged alongside benchmark
//! results so scores can be read in context.

use std::thread;

/// A snapshot of the host system.
#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub os: String,
    pub cpu_model: String,
    pub cpu_cores: usize,
    pub total_memory_bytes: u64,
}

impl SystemInfo {
    /// Reads the host's details. Fields that cannot be determined get
    /// placeholder values rather than failing; the benchmarks run the same
    /// either way.
    pub fn detect() -> SystemInfo {
        SystemInfo {
            os: os_description(),
            cpu_model: cpu_model(),
            cpu_cores: cpu_cores(),
            total_memory_bytes: total_memory_bytes(),
        }
    }

    pub fn total_memory_mib(&self) -> u64 {
        self.total_memory_bytes / (1024 * 1024)
    }
}

fn os_description() -> String {
    #[cfg(target_os = "linux")]
    {
        if let Ok(release) = std::fs::read_to_string("/proc/sys/kernel/osrelease") {
            return format!("linux {}", release.trim());
        }
    }
    std::env::consts::OS.to_string()
}

fn cpu_model() -> String {
    #[cfg(target_os = "linux")]
    {
        if let Ok(cpuinfo) = std::fs::read_to_string("/proc/cpuinfo") {
            if let Some(model) = parse_cpu_model(&cpuinfo) {
                return model;
            }
        }
    }
    String::from("unknown")
}

fn cpu_cores() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn total_memory_bytes() -> u64 {
    #[cfg(target_os = "linux")]
    {
        if let Ok(meminfo) = std::fs::read_to_string("/proc/meminfo") {
            if let Some(kib) = parse_mem_total_kib(&meminfo) {
                return kib * 1024;
            }
        }
    }
    0
}

fn parse_cpu_model(cpuinfo: &str) -> Option<String> {
    for line in cpuinfo.lines() {
        if let Some(rest) = line.strip_prefix("model name") {
            if let Some((_, value)) = rest.split_once(':') {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}

fn parse_mem_total_kib(meminfo: &str) -> Option<u64> {
    let line = meminfo.lines().find(|line| line.starts_with("MemTotal:"))?;
    line.split_whitespace().nth(1)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpu_model() {
        let cpuinfo = "processor\t: 0\n\
                       vendor_id\t: GenuineIntel\n\
                       model name\t: Intel(R) Core(TM) i7-9700K CPU @ 3.60GHz\n\
                       cache size\t: 12288 KB\n";
        assert_eq!(
            parse_cpu_model(cpuinfo).as_deref(),
            Some("Intel(R) Core(TM) i7-9700K CPU @ 3.60GHz")
        );
    }

    #[test]
    fn test_parse_cpu_model_missing() {
        assert_eq!(parse_cpu_model("flags\t: fpu vme\n"), None);
    }

    #[test]
    fn test_parse_mem_total() {
        let meminfo = "MemTotal:       16315516 kB\n\
                       MemFree:         1189806 kB\n";
        assert_eq!(parse_mem_total_kib(meminfo), Some(16_315_516));
    }

    #[test]
    fn test_detect_reports_at_least_one_core() {
        let info = SystemInfo::detect();
        assert!(info.cpu_cores >= 1);
        assert!(!info.os.is_empty());
    }
}
