//! Skill-overlap matching between a job's required skills and every user's
//! recorded skills.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use super::{ServiceError, ServiceResult};
use crate::database::models::Skill;
use crate::database::SkillStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLabel {
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMatch {
    pub user_id: i64,
    #[serde(rename = "match")]
    pub label: MatchLabel,
    pub match_count: usize,
    pub matched_skills: Vec<String>,
}

fn normalize(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Accepts a comma-separated string or an array (non-string elements are
/// ignored). Output is lowercase, trimmed, non-empty and deduplicated in
/// first-seen order.
pub fn normalize_required(job_skills: Option<&Value>) -> ServiceResult<Vec<String>> {
    let raw: Vec<String> = match job_skills {
        Some(Value::String(s)) => s.split(',').map(normalize).collect(),
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(normalize).collect(),
        _ => {
            return Err(ServiceError::invalid(
                "jobSkills",
                "Invalid data. Expect jobSkills as string or array of strings.",
            ))
        }
    };

    let mut seen = HashSet::new();
    Ok(raw
        .into_iter()
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect())
}

/// Users with no overlap are left out, so every result is labelled `yes`.
pub fn match_skills(required: &[String], skills: &[Skill]) -> Vec<SkillMatch> {
    let mut by_user: BTreeMap<i64, HashSet<String>> = BTreeMap::new();
    for row in skills {
        by_user.entry(row.user_id).or_default().insert(normalize(&row.skill));
    }

    by_user
        .into_iter()
        .filter_map(|(user_id, owned)| {
            let matched_skills: Vec<String> = required.iter().filter(|s| owned.contains(*s)).cloned().collect();
            let match_count = matched_skills.len();
            if match_count == 0 {
                return None;
            }
            Some(SkillMatch {
                user_id,
                label: if match_count >= 1 { MatchLabel::Yes } else { MatchLabel::No },
                match_count,
                matched_skills,
            })
        })
        .collect()
}

pub async fn match_job_skills<S>(store: &S, job_skills: Option<&Value>) -> ServiceResult<Vec<SkillMatch>>
where
    S: SkillStore + ?Sized,
{
    let required = normalize_required(job_skills)?;
    let skills = store.all_skills().await?;
    let matches = match_skills(&required, &skills);
    tracing::debug!(
        "Matched {} users against {} required skills",
        matches.len(),
        required.len()
    );
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn skill(user_id: i64, name: &str) -> Skill {
        Skill {
            id: 0,
            user_id,
            skill: name.to_string(),
            level: None,
            rating: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn normalizes_strings_and_arrays() {
        assert_eq!(
            normalize_required(Some(&json!(" Java, ,SQL ,java"))).unwrap(),
            vec!["java", "sql"]
        );
        assert_eq!(
            normalize_required(Some(&json!(["Rust", 3, " go "]))).unwrap(),
            vec!["rust", "go"]
        );
        assert!(normalize_required(Some(&json!({ "skill": "java" }))).is_err());
        assert!(normalize_required(None).is_err());
    }

    #[test]
    fn users_without_overlap_are_omitted() {
        let required = normalize_required(Some(&json!(["Java", "python"]))).unwrap();
        let skills = vec![skill(1, "java"), skill(1, "sql"), skill(2, "go")];

        let matches = match_skills(&required, &skills);
        assert_eq!(
            matches,
            vec![SkillMatch {
                user_id: 1,
                label: MatchLabel::Yes,
                match_count: 1,
                matched_skills: vec!["java".to_string()],
            }]
        );
    }

    #[test]
    fn stored_skills_compare_case_insensitively() {
        let required = vec!["postgres".to_string()];
        let matches = match_skills(&required, &[skill(4, "  PostgreS ")]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched_skills, vec!["postgres"]);
    }

    #[test]
    fn label_serializes_under_match_key() {
        let value = serde_json::to_value(SkillMatch {
            user_id: 1,
            label: MatchLabel::Yes,
            match_count: 1,
            matched_skills: vec!["java".into()],
        })
        .unwrap();
        assert_eq!(value["match"], "yes");
        assert_eq!(value["matchCount"], 1);
    }
}
