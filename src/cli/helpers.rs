//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use miette::Result;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::{Clock, Config, ConsoleNotifier, JsonDirStore, Lab, Project, ShortIdIndex};

/// The lab as seen by one CLI invocation
pub type CliLab = Lab<JsonDirStore, ConsoleNotifier>;

/// Find the project named by `--project`, or discover it from the cwd
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    }
    .map_err(|e| miette::miette!("{}", e))
}

/// An opened project with its configuration, lab and short ID index
pub struct Session {
    pub project: Project,
    pub config: Config,
    pub short_ids: ShortIdIndex,
    pub lab: CliLab,
}

impl Session {
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = open_project(global)?;
        let config = Config::load_for(Some(&project));
        let notifier = ConsoleNotifier::new(global.quiet || machine_format(global.format));
        let lab = Lab::open(project.store(), notifier, Clock::System)?
            .with_urgent_days(config.urgent_days());
        let short_ids = ShortIdIndex::load(&project);

        Ok(Self {
            project,
            config,
            short_ids,
            lab,
        })
    }

    /// Resolve a user reference (`ORD@3`, full ID, or a unique ULID
    /// fragment) against the given candidates
    pub fn resolve<'a>(
        &self,
        reference: &str,
        prefix: EntityPrefix,
        candidates: impl IntoIterator<Item = &'a EntityId>,
    ) -> Result<EntityId> {
        resolve_id(&self.short_ids, reference, prefix, candidates)
    }

    /// Persist the short ID index and fail if any collection is unsaved
    pub fn finish(self) -> Result<()> {
        if let Err(e) = self.short_ids.save(&self.project) {
            tracing::warn!(error = %e, "could not save short ID index");
        }

        let unsaved = self.lab.unsaved_collections();
        if unsaved.is_empty() {
            return Ok(());
        }
        let details: Vec<String> = unsaved
            .iter()
            .map(|(key, reason)| format!("{}: {}", key, reason))
            .collect();
        Err(miette::miette!(
            help = "changes were applied in memory only; fix the data directory and retry",
            "failed to save {} collection(s)\n  {}",
            unsaved.len(),
            details.join("\n  ")
        ))
    }
}

/// Print a new record's short ID (or its full ID for `--format id`)
pub fn report_created(global: &GlobalOpts, id: &EntityId, short_id: &str) {
    match global.format {
        OutputFormat::Id => println!("{}", id),
        _ if global.quiet || machine_format(global.format) => {}
        _ => println!(
            "   {} {}",
            console::style(short_id).cyan(),
            console::style(id).dim()
        ),
    }
}

/// Formats meant for other programs; success chatter would corrupt them
pub fn machine_format(format: OutputFormat) -> bool {
    matches!(
        format,
        OutputFormat::Json | OutputFormat::Yaml | OutputFormat::Csv | OutputFormat::Id
    )
}

/// Resolve a reference to one of `candidates`
pub fn resolve_id<'a>(
    short_ids: &ShortIdIndex,
    reference: &str,
    prefix: EntityPrefix,
    candidates: impl IntoIterator<Item = &'a EntityId>,
) -> Result<EntityId> {
    let reference = reference.trim();
    let resolved = short_ids.resolve(reference).ok_or_else(|| {
        miette::miette!(
            "unknown short ID '{}'; run '{} list' to refresh short IDs",
            reference,
            prefix.kind()
        )
    })?;

    if let Ok(id) = resolved.parse::<EntityId>() {
        if id.prefix() != prefix {
            return Err(miette::miette!(
                "'{}' is a {} ID, expected a {} ID",
                reference,
                id.prefix().kind(),
                prefix.kind()
            ));
        }
        return Ok(id);
    }

    let needle = resolved.to_uppercase();
    let matches: Vec<&EntityId> = candidates
        .into_iter()
        .filter(|id| id.to_string().contains(&needle))
        .collect();
    match matches.as_slice() {
        [single] => Ok((*single).clone()),
        [] => Err(miette::miette!(
            "no {} found matching '{}'",
            prefix.kind(),
            reference
        )),
        many => Err(miette::miette!(
            "'{}' is ambiguous: matches {} {}s",
            reference,
            many.len(),
            prefix.kind()
        )),
    }
}

/// Short ID if one is assigned, otherwise the truncated full ID
pub fn display_id(short_ids: &ShortIdIndex, id: &EntityId) -> String {
    short_ids
        .get_short_id(id)
        .map(str::to_string)
        .unwrap_or_else(|| format_short_id(id))
}

/// Format an EntityId for display, truncating if too long
///
/// IDs longer than 16 characters are truncated to 13 chars with "..." suffix.
pub fn format_short_id(id: &EntityId) -> String {
    let s = id.to_string();
    if s.len() > 16 {
        format!("{}...", &s[..13])
    } else {
        s
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Ask for confirmation unless `--yes` was given
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| miette::miette!("confirmation failed: {} (pass --yes to skip)", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_short_id() {
        let id = EntityId::new(EntityPrefix::Ord);
        let formatted = format_short_id(&id);
        assert!(formatted.len() <= 16);
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("zażółć gęślą", 8), "zażół...");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("14, 15"), "\"14, 15\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }

    #[test]
    fn test_resolve_short_full_and_fragment() {
        let a = EntityId::new(EntityPrefix::Doc);
        let b = EntityId::new(EntityPrefix::Doc);
        let mut short_ids = ShortIdIndex::new();
        short_ids.rebuild(EntityPrefix::Doc, [&a, &b]);
        let all = [a.clone(), b.clone()];

        let by_short = resolve_id(&short_ids, "DOC@2", EntityPrefix::Doc, &all).unwrap();
        assert_eq!(by_short, b);

        let by_full = resolve_id(&short_ids, &a.to_string(), EntityPrefix::Doc, &all).unwrap();
        assert_eq!(by_full, a);

        let tail = a.ulid().to_string()[20..].to_lowercase();
        let by_fragment = resolve_id(&short_ids, &tail, EntityPrefix::Doc, &all).unwrap();
        assert_eq!(by_fragment, a);
    }

    #[test]
    fn test_resolve_rejects_wrong_kind() {
        let order = EntityId::new(EntityPrefix::Ord);
        let short_ids = ShortIdIndex::new();
        let err = resolve_id(&short_ids, &order.to_string(), EntityPrefix::Doc, []).unwrap_err();
        assert!(err.to_string().contains("expected a doctor ID"));
    }

    #[test]
    fn test_resolve_unknown_short_id() {
        let short_ids = ShortIdIndex::new();
        assert!(resolve_id(&short_ids, "ORD@9", EntityPrefix::Ord, []).is_err());
    }
}
