//! kAFL harness flag configuration.
//!
//! The agent library header carries its harness configuration as a block of
//! `#define CONFIG_KAFL_*` lines between two sentinel comments. The block
//! is treated as a flat flag-name/boolean persisted config: a commented-out
//! define is a disabled flag. Only the sentinel-bounded region is ever
//! rewritten, and the file's EOL convention (CRLF vs LF) is preserved.
//!
//! The flag set must be kept in sync with the harness config flags in the
//! kAFL agent and TDVF source.

use crate::error::{Result, TdvfError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Sentinel opening the harness configuration region.
pub const CONFIG_START: &str = "/** KAFL HARNESS CONFIGURATION START **/";
/// Sentinel closing the harness configuration region.
pub const CONFIG_END: &str = "/** KAFL HARNESS CONFIGURATION END **/";

/// File name of the agent library header inside the TDVF tree.
pub const AGENT_HEADER_NAME: &str = "KaflAgentLib.h";

/// Compile-time harness selection flags of the kAFL agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HarnessFlag {
    FuzzBootLoader,
    FuzzVirtioRead,
    FuzzBlkDevInit,
    FuzzTdhob,
}

impl HarnessFlag {
    pub const ALL: [HarnessFlag; 4] = [
        HarnessFlag::FuzzBootLoader,
        HarnessFlag::FuzzVirtioRead,
        HarnessFlag::FuzzBlkDevInit,
        HarnessFlag::FuzzTdhob,
    ];

    /// The preprocessor define carried in the header.
    pub fn define(self) -> &'static str {
        match self {
            HarnessFlag::FuzzBootLoader => "CONFIG_KAFL_FUZZ_BOOT_LOADER",
            HarnessFlag::FuzzVirtioRead => "CONFIG_KAFL_FUZZ_VIRTIO_READ",
            HarnessFlag::FuzzBlkDevInit => "CONFIG_KAFL_FUZZ_BLK_DEV_INIT",
            HarnessFlag::FuzzTdhob => "CONFIG_KAFL_FUZZ_TDHOB",
        }
    }

    /// Short flag name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            HarnessFlag::FuzzBootLoader => "FUZZ_BOOT_LOADER",
            HarnessFlag::FuzzVirtioRead => "FUZZ_VIRTIO_READ",
            HarnessFlag::FuzzBlkDevInit => "FUZZ_BLK_DEV_INIT",
            HarnessFlag::FuzzTdhob => "FUZZ_TDHOB",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.name() == name)
            .ok_or_else(|| TdvfError::NotFound(format!("harness flag {name}")))
    }
}

/// Flag-name to enabled-state mapping.
pub type HarnessConfig = BTreeMap<HarnessFlag, bool>;

/// The EOL convention of a header file.
pub fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Split text into (head, region, tail) around a sentinel-bounded region.
///
/// `head` ends just after the start-marker line, `tail` begins at the
/// end-marker line, so `head + replacement + tail` rebuilds the file.
pub fn split_region<'a>(
    text: &'a str,
    start_marker: &str,
    end_marker: &str,
) -> Result<(&'a str, &'a str, &'a str)> {
    let mut region_start = None;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if region_start.is_none() {
            if trimmed == start_marker {
                region_start = Some(offset);
            }
        } else if trimmed == end_marker {
            let start = region_start.unwrap();
            return Ok((&text[..start], &text[start..line_start], &text[line_start..]));
        }
    }
    let missing = if region_start.is_none() {
        start_marker
    } else {
        end_marker
    };
    Err(TdvfError::NotFound(format!("sentinel line {missing:?}")))
}

/// Replace a sentinel-bounded region, leaving the rest of the file intact.
pub fn replace_region(
    text: &str,
    start_marker: &str,
    end_marker: &str,
    replacement: &str,
) -> Result<String> {
    let (head, _, tail) = split_region(text, start_marker, end_marker)?;
    Ok(format!("{head}{replacement}{tail}"))
}

/// Parse the current flag states out of the configuration region.
pub fn parse_config(region: &str) -> HarnessConfig {
    let mut config = HarnessConfig::new();
    for line in region.lines() {
        for flag in HarnessFlag::ALL {
            if line.contains(flag.define()) {
                let disabled = line.trim_start().starts_with("//");
                config.insert(flag, !disabled);
            }
        }
    }
    config
}

/// Render a configuration region: one define per flag, commented out when
/// disabled.
pub fn render_config(config: &HarnessConfig, eol: &str) -> String {
    let mut region = String::new();
    for (flag, enabled) in config {
        if !enabled {
            region.push_str("// ");
        }
        region.push_str("#define ");
        region.push_str(flag.define());
        region.push_str(eol);
    }
    region
}

/// Read the harness configuration out of full header text.
pub fn read_config(header: &str) -> Result<HarnessConfig> {
    let (_, region, _) = split_region(header, CONFIG_START, CONFIG_END)?;
    Ok(parse_config(region))
}

/// Rewrite the header text with one flag switched.
pub fn set_flag(header: &str, flag: HarnessFlag, enabled: bool) -> Result<String> {
    let (head, region, tail) = split_region(header, CONFIG_START, CONFIG_END)?;
    let mut config = parse_config(region);
    config.insert(flag, enabled);
    let rendered = render_config(&config, line_ending(header));
    Ok(format!("{head}{rendered}{tail}"))
}

/// Locate the agent library header below the TDVF root.
///
/// Candidates are taken in lexical order for determinism.
pub fn find_agent_header(tdvf_root: &Path) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = WalkDir::new(tdvf_root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.file_name().is_some_and(|name| name == AGENT_HEADER_NAME))
        .collect();
    candidates.sort();
    candidates.into_iter().next().ok_or_else(|| {
        TdvfError::NotFound(format!(
            "{AGENT_HEADER_NAME} under {}",
            tdvf_root.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\
#ifndef KAFL_AGENT_LIB_H
/** KAFL HARNESS CONFIGURATION START **/
#define CONFIG_KAFL_FUZZ_BOOT_LOADER
// #define CONFIG_KAFL_FUZZ_VIRTIO_READ
#define CONFIG_KAFL_FUZZ_TDHOB
/** KAFL HARNESS CONFIGURATION END **/
#endif
";

    #[test]
    fn test_split_region() {
        let (head, region, tail) = split_region(HEADER, CONFIG_START, CONFIG_END).unwrap();
        assert!(head.ends_with("CONFIGURATION START **/\n"));
        assert_eq!(region.lines().count(), 3);
        assert!(tail.starts_with("/** KAFL HARNESS CONFIGURATION END"));
        assert_eq!(format!("{head}{region}{tail}"), HEADER);
    }

    #[test]
    fn test_missing_sentinel() {
        assert!(matches!(
            split_region("no sentinels here\n", CONFIG_START, CONFIG_END),
            Err(TdvfError::NotFound(_))
        ));
    }

    #[test]
    fn test_parse_config_states() {
        let config = read_config(HEADER).unwrap();
        assert_eq!(config.get(&HarnessFlag::FuzzBootLoader), Some(&true));
        assert_eq!(config.get(&HarnessFlag::FuzzVirtioRead), Some(&false));
        assert_eq!(config.get(&HarnessFlag::FuzzTdhob), Some(&true));
        // not present in the region at all
        assert_eq!(config.get(&HarnessFlag::FuzzBlkDevInit), None);
    }

    #[test]
    fn test_set_flag_round_trip() {
        let updated = set_flag(HEADER, HarnessFlag::FuzzVirtioRead, true).unwrap();
        let config = read_config(&updated).unwrap();
        assert_eq!(config.get(&HarnessFlag::FuzzVirtioRead), Some(&true));
        // untouched flags keep their state
        assert_eq!(config.get(&HarnessFlag::FuzzBootLoader), Some(&true));
        // head and tail stay intact
        assert!(updated.starts_with("#ifndef KAFL_AGENT_LIB_H\n"));
        assert!(updated.ends_with("#endif\n"));
    }

    #[test]
    fn test_crlf_preserved() {
        let crlf_header = HEADER.replace('\n', "\r\n");
        let updated = set_flag(&crlf_header, HarnessFlag::FuzzBootLoader, false).unwrap();
        assert!(updated.contains("// #define CONFIG_KAFL_FUZZ_BOOT_LOADER\r\n"));
        assert!(!updated.contains("\n#define CONFIG_KAFL_FUZZ_TDHOB\n"));
    }

    #[test]
    fn test_flag_names_round_trip() {
        for flag in HarnessFlag::ALL {
            assert_eq!(HarnessFlag::from_name(flag.name()).unwrap(), flag);
        }
        assert!(HarnessFlag::from_name("FUZZ_NOPE").is_err());
    }
}
