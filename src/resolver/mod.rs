//! Asset selection: reduce a release's asset list to exactly one asset
//!
//! Selection is a pipeline of independent filter stages over asset names:
//! 1. system name aliases (case-insensitive)
//! 2. libc family aliases, skipped when the host has none (macOS)
//! 3. machine architecture aliases (case-insensitive)
//! 4. `not_matches` regex exclusions
//! 5. `not_endswith` suffix exclusions
//!
//! Every stage is a predicate on a single name, so the result does not depend
//! on the order the stages run in. Exactly one survivor is required; zero or
//! several are errors listing the candidates.

use log::debug;
use regex::Regex;

use crate::error::{InstallerError, Result};
use crate::github::{Asset, GithubClient};
use crate::platform::Platform;

/// Which filters to apply when picking an asset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchCriteria {
    pub match_system: bool,
    pub match_machine: bool,
    pub match_c_std_lib: bool,
    pub not_matches: Vec<String>,
    pub not_endswith: Vec<String>,
    pub tag: Option<String>,
}

#[cfg(test)]
impl MatchCriteria {
    /// System and machine matching, the most common combination
    pub fn system_machine() -> Self {
        Self {
            match_system: true,
            match_machine: true,
            ..Self::default()
        }
    }

    /// System, libc and machine matching
    pub fn system_libc_machine() -> Self {
        Self {
            match_c_std_lib: true,
            ..Self::system_machine()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    System,
    CStdLib,
    Machine,
    NotMatches,
    NotEndswith,
}

const PIPELINE: [Stage; 5] = [
    Stage::System,
    Stage::CStdLib,
    Stage::Machine,
    Stage::NotMatches,
    Stage::NotEndswith,
];

/// Fetch the release for `owner/repo` and select the asset for `platform`
pub fn resolve(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    criteria: &MatchCriteria,
    platform: &Platform,
) -> Result<Asset> {
    let release = client.release(owner, repo, criteria.tag.as_deref())?;
    select_asset(owner, repo, &release.assets, criteria, platform)
}

/// Pure selection over an already fetched asset list
pub fn select_asset(
    owner: &str,
    repo: &str,
    assets: &[Asset],
    criteria: &MatchCriteria,
    platform: &Platform,
) -> Result<Asset> {
    select_in_order(owner, repo, assets, criteria, platform, &PIPELINE)
}

fn select_in_order(
    owner: &str,
    repo: &str,
    assets: &[Asset],
    criteria: &MatchCriteria,
    platform: &Platform,
    order: &[Stage],
) -> Result<Asset> {
    let not_matches = compile_patterns(&criteria.not_matches)?;
    let mut candidates: Vec<&Asset> = assets.iter().collect();
    debug!("Got {} assets: {:?}", candidates.len(), names(&candidates));

    for stage in order {
        let keep: Box<dyn Fn(&str) -> bool + '_> = match stage {
            Stage::System if criteria.match_system => {
                Box::new(|name: &str| contains_any(name, platform.system.aliases()))
            }
            Stage::CStdLib if criteria.match_c_std_lib => match platform.libc {
                Some(libc) => Box::new(move |name: &str| contains_any(name, libc.aliases())),
                None => continue,
            },
            Stage::Machine if criteria.match_machine => {
                Box::new(|name: &str| contains_any(name, platform.machine.aliases()))
            }
            Stage::NotMatches if !not_matches.is_empty() => {
                Box::new(|name: &str| !not_matches.iter().any(|re| re.is_match(name)))
            }
            Stage::NotEndswith if !criteria.not_endswith.is_empty() => Box::new(|name: &str| {
                !criteria
                    .not_endswith
                    .iter()
                    .any(|suffix| name.ends_with(suffix.as_str()))
            }),
            _ => continue,
        };
        candidates.retain(|asset| keep(asset.name.as_str()));
        debug!(
            "After {stage:?} filter, got {} assets: {:?}",
            candidates.len(),
            names(&candidates)
        );
    }

    match candidates.as_slice() {
        [single] => Ok((*single).clone()),
        [] => Err(InstallerError::NoMatchingAsset {
            owner: owner.to_string(),
            repo: repo.to_string(),
            candidates: joined(assets.iter()),
        }),
        many => Err(InstallerError::AmbiguousAsset {
            owner: owner.to_string(),
            repo: repo.to_string(),
            count: many.len(),
            candidates: joined(many.iter().copied()),
        }),
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| InstallerError::InvalidPattern {
                pattern: p.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

fn contains_any(name: &str, aliases: &[&str]) -> bool {
    let lower = name.to_lowercase();
    aliases.iter().any(|alias| lower.contains(alias))
}

fn names<'a>(assets: &[&'a Asset]) -> Vec<&'a str> {
    assets.iter().map(|a| a.name.as_str()).collect()
}

fn joined<'a>(assets: impl Iterator<Item = &'a Asset>) -> String {
    assets
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
